//! Route redundancy: counting vertex-disjoint entrance-to-exit paths and
//! opening extra connections until a target count is met or the bounded
//! attempts run out. Also the reachability stitch that guarantees every room
//! joins the entrance component before population runs.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::rng::{self, RandomSource};
use crate::types::{GenEvent, Pos, TileKind};

use super::connectors::{connector_candidates, ring_opening_count};
use super::grid::{
    in_interior, index, is_route_walkable_at, orthogonal_neighbors, tile_at,
    walkable_orthogonal_neighbor_count,
};
use super::model::Room;

const REOPEN_ATTEMPTS: usize = 30;
const SHORTCUT_ATTEMPTS: usize = 50;
const DISJOINT_COUNT_CAP: u32 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct ConnectivityReport {
    pub(super) initial_count: u32,
    pub(super) achieved_count: u32,
}

/// Number of entrance-to-exit routes sharing no interior tile, measured by
/// repeatedly finding a shortest path on a working copy and blocking its
/// interior.
pub(super) fn count_disjoint_paths(
    tiles: &[TileKind],
    width: usize,
    height: usize,
    entry: Pos,
    exit: Pos,
) -> u32 {
    if entry == exit {
        return 1;
    }
    let mut blocked: BTreeSet<Pos> = BTreeSet::new();
    let mut count = 0;
    while count < DISJOINT_COUNT_CAP {
        let Some(path) = shortest_path(tiles, width, height, &blocked, entry, exit) else {
            break;
        };
        count += 1;
        if path.len() <= 2 {
            // Endpoints are adjacent; there is no interior to block and no
            // further distinct route through this edge.
            break;
        }
        for &pos in &path[1..path.len() - 1] {
            blocked.insert(pos);
        }
    }
    count
}

pub(super) fn augment_connectivity(
    tiles: &mut [TileKind],
    width: usize,
    height: usize,
    rooms: &[Room],
    entry: Pos,
    exit: Pos,
    target: u32,
    rng: &mut dyn RandomSource,
    events: &mut Vec<GenEvent>,
) -> ConnectivityReport {
    let initial_count = count_disjoint_paths(tiles, width, height, entry, exit);
    let mut achieved_count = initial_count;

    if achieved_count < target {
        let mut reopen_pool: Vec<Pos> = rooms
            .iter()
            .filter(|room| !room.is_secure)
            .flat_map(|room| connector_candidates(tiles, width, height, room))
            .collect();
        rng::shuffle(rng, &mut reopen_pool);

        for pos in reopen_pool.into_iter().take(REOPEN_ATTEMPTS) {
            if achieved_count >= target {
                break;
            }
            if tile_at(tiles, width, pos) != TileKind::Wall {
                continue;
            }
            tiles[index(width, pos)] = TileKind::Floor;
            achieved_count = count_disjoint_paths(tiles, width, height, entry, exit);
        }
    }

    if achieved_count < target {
        let mut shortcut_pool = shortcut_candidates(tiles, width, height, rooms);
        rng::shuffle(rng, &mut shortcut_pool);

        for pos in shortcut_pool.into_iter().take(SHORTCUT_ATTEMPTS) {
            if achieved_count >= target {
                break;
            }
            if tile_at(tiles, width, pos) != TileKind::Wall {
                continue;
            }
            tiles[index(width, pos)] = TileKind::Floor;
            achieved_count = count_disjoint_paths(tiles, width, height, entry, exit);
        }
    }

    if achieved_count < target {
        events.push(GenEvent::RedundancyBelowTarget { measured: achieved_count, target });
    }

    ConnectivityReport { initial_count, achieved_count }
}

/// Wall tiles whose opening would create a branch or shortcut: at least two
/// walkable orthogonal neighbors. Secure perimeter rings are off-limits; the
/// chokepoint guarantee outranks the redundancy goal.
fn shortcut_candidates(
    tiles: &[TileKind],
    width: usize,
    height: usize,
    rooms: &[Room],
) -> Vec<Pos> {
    let mut candidates = Vec::new();
    for y in 1..(height - 1) {
        for x in 1..(width - 1) {
            let pos = Pos { y: y as i32, x: x as i32 };
            if tile_at(tiles, width, pos) != TileKind::Wall {
                continue;
            }
            if on_any_secure_ring(rooms, pos) {
                continue;
            }
            if walkable_orthogonal_neighbor_count(tiles, width, height, pos) >= 2 {
                candidates.push(pos);
            }
        }
    }
    candidates
}

fn on_any_secure_ring(rooms: &[Room], pos: Pos) -> bool {
    rooms.iter().any(|room| room.is_secure && room.on_perimeter_ring(pos))
}

/// Joins every room's walkable component to the entrance component by
/// carving the shortest wall run that does not violate a secure ring. Runs
/// after the connector planner as the connectivity backstop.
pub(super) fn stitch_unreachable_rooms(
    tiles: &mut [TileKind],
    width: usize,
    height: usize,
    rooms: &[Room],
    entry: Pos,
    events: &mut Vec<GenEvent>,
) {
    let mut reached = reachable_from(tiles, width, height, entry);

    for (room_index, room) in rooms.iter().enumerate() {
        let center = room.center();
        if reached.contains(&center) {
            continue;
        }

        let stitched = if room.is_secure && ring_opening_count(tiles, width, height, room) == 0 {
            stitch_through_portal(tiles, width, height, rooms, room, &reached)
        } else {
            // The component (interior plus whatever its openings reach) gets
            // wired up without touching any secure ring, its own included;
            // a secure room must never gain a second opening here.
            let component = reachable_from(tiles, width, height, center);
            let path = carve_search(tiles, width, height, &component, &reached, |pos| {
                on_any_secure_ring(rooms, pos)
            });
            match path {
                Some(path) => {
                    carve_floor_run(tiles, width, &path);
                    true
                }
                None => false,
            }
        };

        if stitched {
            reached = reachable_from(tiles, width, height, entry);
            events.push(GenEvent::RoomStitched { room_index });
        } else {
            events.push(GenEvent::StitchFailed { room_index });
        }
    }
}

/// Opens a sealed secure room through exactly one ring tile: pick a side
/// (non-corner) ring tile as the door, then route from the tile just beyond
/// it to the reached set without touching any ring at all.
fn stitch_through_portal(
    tiles: &mut [TileKind],
    width: usize,
    height: usize,
    rooms: &[Room],
    room: &Room,
    reached: &BTreeSet<Pos>,
) -> bool {
    let top = room.y as i32;
    let bottom = room.bottom() as i32;
    let left = room.x as i32;
    let right = room.right() as i32;

    let mut portals: Vec<(Pos, Pos)> = Vec::new();
    for x in left..=right {
        portals.push((Pos { y: top - 1, x }, Pos { y: top - 2, x }));
        portals.push((Pos { y: bottom + 1, x }, Pos { y: bottom + 2, x }));
    }
    for y in top..=bottom {
        portals.push((Pos { y, x: left - 1 }, Pos { y, x: left - 2 }));
        portals.push((Pos { y, x: right + 1 }, Pos { y, x: right + 2 }));
    }

    for (door, outward) in portals {
        if !in_interior(width, height, outward) || on_any_secure_ring(rooms, outward) {
            continue;
        }
        let path = if reached.contains(&outward) {
            Some(vec![outward])
        } else {
            carve_search(tiles, width, height, &BTreeSet::from([outward]), reached, |pos| {
                on_any_secure_ring(rooms, pos)
            })
        };
        let Some(path) = path else {
            continue;
        };

        tiles[index(width, door)] = TileKind::Door;
        carve_floor_run(tiles, width, &path);
        return true;
    }
    false
}

fn carve_floor_run(tiles: &mut [TileKind], width: usize, path: &[Pos]) {
    for &pos in path {
        if tile_at(tiles, width, pos) == TileKind::Wall {
            tiles[index(width, pos)] = TileKind::Floor;
        }
    }
}

pub(super) fn reachable_from(
    tiles: &[TileKind],
    width: usize,
    height: usize,
    start: Pos,
) -> BTreeSet<Pos> {
    let mut seen = BTreeSet::new();
    if !is_route_walkable_at(tiles, width, height, start) {
        return seen;
    }
    seen.insert(start);
    let mut open = VecDeque::from([start]);
    while let Some(pos) = open.pop_front() {
        for next in orthogonal_neighbors(pos) {
            if is_route_walkable_at(tiles, width, height, next) && seen.insert(next) {
                open.push_back(next);
            }
        }
    }
    seen
}

fn shortest_path(
    tiles: &[TileKind],
    width: usize,
    height: usize,
    blocked: &BTreeSet<Pos>,
    entry: Pos,
    exit: Pos,
) -> Option<Vec<Pos>> {
    if !is_route_walkable_at(tiles, width, height, entry)
        || !is_route_walkable_at(tiles, width, height, exit)
    {
        return None;
    }

    let mut came_from: BTreeMap<Pos, Pos> = BTreeMap::new();
    let mut seen = BTreeSet::from([entry]);
    let mut open = VecDeque::from([entry]);

    while let Some(pos) = open.pop_front() {
        for next in orthogonal_neighbors(pos) {
            if seen.contains(&next)
                || blocked.contains(&next)
                || !is_route_walkable_at(tiles, width, height, next)
            {
                continue;
            }
            came_from.insert(next, pos);
            if next == exit {
                return Some(reconstruct(&came_from, entry, exit));
            }
            seen.insert(next);
            open.push_back(next);
        }
    }
    None
}

/// Multi-source BFS through carve space: walkable tiles plus interior walls
/// not rejected by `forbidden`. Returns the tile run from a component tile
/// to the first tile of the reached set.
fn carve_search(
    tiles: &[TileKind],
    width: usize,
    height: usize,
    sources: &BTreeSet<Pos>,
    targets: &BTreeSet<Pos>,
    forbidden: impl Fn(Pos) -> bool,
) -> Option<Vec<Pos>> {
    let mut came_from: BTreeMap<Pos, Pos> = BTreeMap::new();
    let mut seen: BTreeSet<Pos> = sources.clone();
    let mut open: VecDeque<Pos> = sources.iter().copied().collect();

    while let Some(pos) = open.pop_front() {
        for next in orthogonal_neighbors(pos) {
            if seen.contains(&next) || !in_interior(width, height, next) || forbidden(next) {
                continue;
            }
            let traversable = is_route_walkable_at(tiles, width, height, next)
                || tile_at(tiles, width, next) == TileKind::Wall;
            if !traversable {
                continue;
            }
            came_from.insert(next, pos);
            if targets.contains(&next) {
                let mut path = vec![next];
                let mut cursor = next;
                while let Some(&previous) = came_from.get(&cursor) {
                    path.push(previous);
                    cursor = previous;
                }
                path.reverse();
                return Some(path);
            }
            seen.insert(next);
            open.push_back(next);
        }
    }
    None
}

fn reconstruct(came_from: &BTreeMap<Pos, Pos>, entry: Pos, exit: Pos) -> Vec<Pos> {
    let mut path = vec![exit];
    let mut cursor = exit;
    while cursor != entry {
        cursor = *came_from.get(&cursor).expect("path must be reconstructible");
        path.push(cursor);
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ChaChaSource;

    fn walled_grid(width: usize, height: usize) -> Vec<TileKind> {
        vec![TileKind::Wall; width * height]
    }

    fn carve_row(tiles: &mut [TileKind], width: usize, y: usize, from_x: usize, to_x: usize) {
        for x in from_x..=to_x {
            tiles[y * width + x] = TileKind::Floor;
        }
    }

    #[test]
    fn single_corridor_counts_one_disjoint_path() {
        let width = 12;
        let height = 7;
        let mut tiles = walled_grid(width, height);
        carve_row(&mut tiles, width, 3, 1, 10);

        let count = count_disjoint_paths(
            &tiles,
            width,
            height,
            Pos { y: 3, x: 1 },
            Pos { y: 3, x: 10 },
        );
        assert_eq!(count, 1);
    }

    #[test]
    fn two_separate_corridors_count_two_disjoint_paths() {
        let width = 12;
        let height = 9;
        let mut tiles = walled_grid(width, height);
        carve_row(&mut tiles, width, 2, 2, 9);
        carve_row(&mut tiles, width, 6, 2, 9);
        // Shared endpoints joining both corridors.
        tiles[2 * width + 1] = TileKind::Floor;
        tiles[6 * width + 1] = TileKind::Floor;
        for y in 2..=6 {
            tiles[y * width + 1] = TileKind::Floor;
        }
        tiles[2 * width + 10] = TileKind::Floor;
        tiles[6 * width + 10] = TileKind::Floor;
        for y in 2..=6 {
            tiles[y * width + 10] = TileKind::Floor;
        }

        let count = count_disjoint_paths(
            &tiles,
            width,
            height,
            Pos { y: 4, x: 1 },
            Pos { y: 4, x: 10 },
        );
        assert_eq!(count, 2);
    }

    #[test]
    fn disconnected_endpoints_count_zero() {
        let width = 12;
        let height = 7;
        let mut tiles = walled_grid(width, height);
        carve_row(&mut tiles, width, 2, 1, 4);
        carve_row(&mut tiles, width, 4, 7, 10);

        let count = count_disjoint_paths(
            &tiles,
            width,
            height,
            Pos { y: 2, x: 1 },
            Pos { y: 4, x: 10 },
        );
        assert_eq!(count, 0);
    }

    #[test]
    fn augmentation_opens_shortcuts_and_never_decreases_the_count() {
        let width = 14;
        let height = 11;
        let mut tiles = walled_grid(width, height);
        // Two open chambers split by a single-tile wall column with one gap.
        for y in 1..10 {
            carve_row(&mut tiles, width, y, 1, 5);
            carve_row(&mut tiles, width, y, 7, 12);
        }
        tiles[5 * width + 6] = TileKind::Floor;

        let entry = Pos { y: 5, x: 2 };
        let exit = Pos { y: 5, x: 11 };
        assert_eq!(count_disjoint_paths(&tiles, width, height, entry, exit), 1);

        let mut rng = ChaChaSource::seeded(404);
        let mut events = Vec::new();
        let report = augment_connectivity(
            &mut tiles,
            width,
            height,
            &[],
            entry,
            exit,
            3,
            &mut rng,
            &mut events,
        );

        assert_eq!(report.initial_count, 1);
        assert!(report.achieved_count >= report.initial_count);
        assert!(
            report.achieved_count >= 3,
            "the dividing wall offers plenty of shortcut candidates, got {}",
            report.achieved_count
        );
        assert!(events.is_empty(), "no shortfall should be reported: {events:?}");
    }

    #[test]
    fn augmentation_records_shortfall_when_no_repair_is_possible() {
        let width = 12;
        let height = 5;
        let mut tiles = walled_grid(width, height);
        carve_row(&mut tiles, width, 2, 1, 10);

        let entry = Pos { y: 2, x: 1 };
        let exit = Pos { y: 2, x: 10 };
        let mut rng = ChaChaSource::seeded(1);
        let mut events = Vec::new();
        let report = augment_connectivity(
            &mut tiles,
            width,
            height,
            &[],
            entry,
            exit,
            3,
            &mut rng,
            &mut events,
        );

        assert!(report.achieved_count < 3);
        assert!(events.iter().any(|event| matches!(
            event,
            GenEvent::RedundancyBelowTarget { target: 3, .. }
        )));
    }

    #[test]
    fn stitch_connects_an_isolated_room_component() {
        let width = 18;
        let height = 11;
        let mut tiles = walled_grid(width, height);
        let mut west = Room::plain(2, 3, 4, 4);
        west.is_start = true;
        let east = Room::plain(11, 3, 4, 4);
        for room in [&west, &east] {
            for y in room.y..=room.bottom() {
                for x in room.x..=room.right() {
                    tiles[y * width + x] = TileKind::Floor;
                }
            }
        }

        let entry = west.center();
        let mut events = Vec::new();
        stitch_unreachable_rooms(&mut tiles, width, height, &[west, east], entry, &mut events);

        let reached = reachable_from(&tiles, width, height, entry);
        assert!(reached.contains(&east.center()), "stitch must join the east room");
        assert!(events.iter().any(|event| matches!(event, GenEvent::RoomStitched { room_index: 1 })));
    }

    #[test]
    fn stitch_gives_a_sealed_secure_room_a_single_door() {
        let width = 18;
        let height = 12;
        let mut tiles = walled_grid(width, height);
        let mut start = Room::plain(2, 3, 4, 4);
        start.is_start = true;
        let mut vault = Room::plain(11, 4, 4, 4);
        vault.is_secure = true;
        for room in [&start, &vault] {
            for y in room.y..=room.bottom() {
                for x in room.x..=room.right() {
                    tiles[y * width + x] = TileKind::Floor;
                }
            }
        }

        let entry = start.center();
        let mut events = Vec::new();
        stitch_unreachable_rooms(&mut tiles, width, height, &[start, vault], entry, &mut events);

        assert_eq!(ring_opening_count(&tiles, width, height, &vault), 1);
        let reached = reachable_from(&tiles, width, height, entry);
        assert!(reached.contains(&vault.center()));
    }
}
