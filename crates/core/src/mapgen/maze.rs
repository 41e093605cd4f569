//! Corridor skeleton carving: an explicit-stack randomized backtracker over
//! the odd-coordinate anchor lattice. Deep recursion on large grids is not
//! an option here, so the worklist is a Vec, not the call stack.

use crate::rng::RandomSource;
use crate::types::{Pos, TileKind};

use super::grid::{in_interior, index, tile_at};
use super::model::Room;

const CARVE_DIRECTIONS: [(i32, i32); 4] = [(-2, 0), (0, 2), (2, 0), (0, -2)];

/// Fills every wall pocket outside the rooms with a spanning corridor maze.
/// Each pocket (region separated from the rest by rooms) gets its own
/// backtracker pass; joining pockets to rooms is the connector planner's job.
pub(super) fn carve_maze(
    tiles: &mut [TileKind],
    width: usize,
    height: usize,
    rooms: &[Room],
    rng: &mut dyn RandomSource,
) {
    let keep_out: Vec<Room> = rooms.iter().map(|room| room.expanded(1)).collect();

    let mut anchor_y = 1;
    while anchor_y < (height - 1) as i32 {
        let mut anchor_x = 1;
        while anchor_x < (width - 1) as i32 {
            let anchor = Pos { y: anchor_y, x: anchor_x };
            if is_carvable_anchor(tiles, width, height, &keep_out, anchor) {
                carve_pocket(tiles, width, height, &keep_out, anchor, rng);
            }
            anchor_x += 2;
        }
        anchor_y += 2;
    }
}

fn carve_pocket(
    tiles: &mut [TileKind],
    width: usize,
    height: usize,
    keep_out: &[Room],
    start: Pos,
    rng: &mut dyn RandomSource,
) {
    tiles[index(width, start)] = TileKind::Floor;
    let mut stack = vec![start];

    while let Some(&current) = stack.last() {
        let mut candidates: Vec<(Pos, Pos)> = Vec::with_capacity(4);
        for (dy, dx) in CARVE_DIRECTIONS {
            let target = Pos { y: current.y + dy, x: current.x + dx };
            let between = Pos { y: current.y + dy / 2, x: current.x + dx / 2 };
            if is_carvable_anchor(tiles, width, height, keep_out, target)
                && is_carvable_wall(tiles, width, height, keep_out, between)
            {
                candidates.push((target, between));
            }
        }

        match candidates.len() {
            0 => {
                stack.pop();
            }
            n => {
                let (target, between) = candidates[rng.range_usize(0, n - 1)];
                tiles[index(width, between)] = TileKind::Floor;
                tiles[index(width, target)] = TileKind::Floor;
                stack.push(target);
            }
        }
    }
}

fn is_carvable_anchor(
    tiles: &[TileKind],
    width: usize,
    height: usize,
    keep_out: &[Room],
    pos: Pos,
) -> bool {
    pos.y % 2 == 1
        && pos.x % 2 == 1
        && is_carvable_wall(tiles, width, height, keep_out, pos)
}

fn is_carvable_wall(
    tiles: &[TileKind],
    width: usize,
    height: usize,
    keep_out: &[Room],
    pos: Pos,
) -> bool {
    in_interior(width, height, pos)
        && tile_at(tiles, width, pos) == TileKind::Wall
        && !keep_out.iter().any(|zone| zone.contains(pos))
}
