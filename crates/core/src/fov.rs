//! Field-of-view computation over the level grid.
//! Shadowcasting is the default; a pure-distance mode exists as a
//! feature-flagged fallback. Both feed the monotonic `explored` grid.

use std::collections::BTreeSet;

use crate::state::Map;
use crate::types::{Pos, TileKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FovMode {
    /// Recursive symmetric shadowcasting across the 8 octants; opaque tiles
    /// cast shadows over everything strictly behind them.
    Shadowcast,
    /// Every tile within Euclidean range is visible regardless of occlusion.
    Distance,
}

/// Clears and recomputes `visible`, then folds it into `explored`. Tiles are
/// occluded by walls and by unbroken sight-blocking props (`opaque_props`).
/// An out-of-bounds observer sees nothing.
pub fn compute_fov(
    map: &mut Map,
    opaque_props: &BTreeSet<Pos>,
    origin: Pos,
    radius: i32,
    mode: FovMode,
) {
    map.clear_visible();
    if !map.in_bounds(origin) || radius < 0 {
        return;
    }
    map.set_visible(origin, true);

    match mode {
        FovMode::Distance => mark_within_distance(map, origin, radius),
        FovMode::Shadowcast => {
            for octant in 0..8 {
                scan_octant(
                    map,
                    opaque_props,
                    origin,
                    radius,
                    1,
                    Slope::new(1, 1),
                    Slope::new(0, 1),
                    octant,
                );
            }
            drop_octant_seam_artifacts(map, opaque_props, origin, radius);
        }
    }

    for idx in 0..map.visible.len() {
        if map.visible[idx] {
            map.explored[idx] = true;
        }
    }
}

fn transform_octant(orig: Pos, x: i32, y: i32, oct: u8) -> Pos {
    match oct {
        0 => Pos { y: orig.y - y, x: orig.x + x },
        1 => Pos { y: orig.y - x, x: orig.x + y },
        2 => Pos { y: orig.y - x, x: orig.x - y },
        3 => Pos { y: orig.y - y, x: orig.x - x },
        4 => Pos { y: orig.y + y, x: orig.x - x },
        5 => Pos { y: orig.y + x, x: orig.x - y },
        6 => Pos { y: orig.y + x, x: orig.x + y },
        7 => Pos { y: orig.y + y, x: orig.x + x },
        _ => orig,
    }
}

#[derive(Clone, Copy)]
struct Slope {
    y: i32,
    x: i32,
}

impl Slope {
    fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    fn greater_or_equal(&self, other: &Slope) -> bool {
        self.y * other.x >= other.y * self.x
    }

    fn greater_than(&self, other: &Slope) -> bool {
        self.y * other.x > other.y * self.x
    }
}

fn is_opaque(map: &Map, opaque_props: &BTreeSet<Pos>, pos: Pos) -> bool {
    map.tile_at(pos) == TileKind::Wall || opaque_props.contains(&pos)
}

fn within_radius(origin: Pos, pos: Pos, radius: i32) -> bool {
    let dy = pos.y - origin.y;
    let dx = pos.x - origin.x;
    dy * dy + dx * dx <= radius * radius
}

#[allow(clippy::too_many_arguments)]
fn scan_octant(
    map: &mut Map,
    opaque_props: &BTreeSet<Pos>,
    orig: Pos,
    radius: i32,
    dist: i32,
    start: Slope,
    end: Slope,
    oct: u8,
) {
    if dist > radius {
        return;
    }
    let mut blocked = false;
    let mut cur_start = start;
    for y in (0..=dist).rev() {
        let top = Slope::new(2 * y + 1, 2 * dist - 1);
        let bot = Slope::new(2 * y - 1, 2 * dist + 1);
        if cur_start.greater_or_equal(&bot) && top.greater_than(&end) {
            let p = transform_octant(orig, dist, y, oct);
            if map.in_bounds(p) && within_radius(orig, p, radius) {
                map.set_visible(p, true);
            }
            if is_opaque(map, opaque_props, p) {
                if !blocked {
                    scan_octant(map, opaque_props, orig, radius, dist + 1, cur_start, top, oct);
                    blocked = true;
                }
                cur_start = bot;
            } else if blocked {
                blocked = false;
            }
        }
    }
    if !blocked {
        scan_octant(map, opaque_props, orig, radius, dist + 1, cur_start, end, oct);
    }
}

/// Octant seams can leak visibility around corners; anything without a
/// direct line of sight back to the observer is dropped again before the
/// explored merge.
fn drop_octant_seam_artifacts(
    map: &mut Map,
    opaque_props: &BTreeSet<Pos>,
    origin: Pos,
    radius: i32,
) {
    let min_y = (origin.y - radius).max(0);
    let max_y = (origin.y + radius + 1).min(map.height as i32);
    let min_x = (origin.x - radius).max(0);
    let max_x = (origin.x + radius + 1).min(map.width as i32);

    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = Pos { y, x };
            if p == origin || !map.is_visible(p) {
                continue;
            }
            if !has_direct_line_of_sight(map, opaque_props, origin, p) {
                map.set_visible(p, false);
            }
        }
    }
}

fn mark_within_distance(map: &mut Map, origin: Pos, radius: i32) {
    let min_y = (origin.y - radius).max(0);
    let max_y = (origin.y + radius + 1).min(map.height as i32);
    let min_x = (origin.x - radius).max(0);
    let max_x = (origin.x + radius + 1).min(map.width as i32);

    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = Pos { y, x };
            if within_radius(origin, p, radius) {
                map.set_visible(p, true);
            }
        }
    }
}

fn has_direct_line_of_sight(
    map: &Map,
    opaque_props: &BTreeSet<Pos>,
    origin: Pos,
    target: Pos,
) -> bool {
    let dx = target.x - origin.x;
    let dy = target.y - origin.y;
    let sx = dx.signum();
    let sy = dy.signum();
    let total_dist_x = dx.abs();
    let total_dist_y = dy.abs();

    let mut x = origin.x;
    let mut y = origin.y;
    let mut current_step_x = 0;
    let mut current_step_y = 0;

    while current_step_x < total_dist_x || current_step_y < total_dist_y {
        let lhs = (1 + 2 * current_step_x) * total_dist_y;
        let rhs = (1 + 2 * current_step_y) * total_dist_x;

        if lhs == rhs {
            x += sx;
            y += sy;
            current_step_x += 1;
            current_step_y += 1;
        } else if lhs < rhs {
            x += sx;
            current_step_x += 1;
        } else {
            y += sy;
            current_step_y += 1;
        }

        if x == target.x && y == target.y {
            break;
        }
        if is_opaque(map, opaque_props, Pos { y, x }) {
            return false;
        }
    }
    true
}

/// Text rendering of tiles plus visibility flags for test failure output.
#[allow(dead_code)]
pub(crate) fn draw_map_diag(map: &Map, observer: Pos) -> String {
    let mut text = String::new();
    for y in 0..map.height {
        for x in 0..map.width {
            let p = Pos { y: y as i32, x: x as i32 };
            let c = if p == observer {
                '@'
            } else {
                match map.tile_at(p) {
                    TileKind::Wall => '#',
                    TileKind::Floor => '.',
                    TileKind::Door => '+',
                    TileKind::UpStairs => '<',
                    TileKind::DownStairs => '>',
                }
            };
            let v = if map.is_visible(p) { 'v' } else { 'h' };
            let d = if map.is_explored(p) { 'd' } else { 'u' };
            text.push_str(&format!("{c}{v}{d} "));
        }
        text.push('\n');
    }
    text
}
