//! Room placement by rejection sampling and start/exit/boss designation.

use crate::rng::RandomSource;
use crate::types::{GenEvent, GenerateError, Pos, TileKind};

use super::grid::{index, manhattan};
use super::model::Room;

const MIN_ROOM_WIDTH: usize = 4;
const MAX_ROOM_WIDTH: usize = 10;
const MIN_ROOM_HEIGHT: usize = 3;
const MAX_ROOM_HEIGHT: usize = 7;
const PLACEMENT_ATTEMPTS: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct RoomPlan {
    pub(super) rooms: Vec<Room>,
    pub(super) start_index: usize,
    pub(super) exit_index: usize,
    pub(super) boss_index: Option<usize>,
}

/// Places up to `target_room_count` non-overlapping rooms. A shortfall is a
/// degraded-but-accepted outcome; an empty result is the one fatal
/// precondition of the whole pipeline.
pub(super) fn place_rooms(
    width: usize,
    height: usize,
    target_room_count: usize,
    rng: &mut dyn RandomSource,
    events: &mut Vec<GenEvent>,
) -> Result<RoomPlan, GenerateError> {
    let mut rooms: Vec<Room> = Vec::new();

    for _ in 0..PLACEMENT_ATTEMPTS {
        if rooms.len() >= target_room_count {
            break;
        }
        let room_width = rng.range_usize(MIN_ROOM_WIDTH, MAX_ROOM_WIDTH);
        let room_height = rng.range_usize(MIN_ROOM_HEIGHT, MAX_ROOM_HEIGHT);

        // Keep the full one-tile perimeter ring off the grid border so repair
        // carves can always route around a room.
        if room_width + 4 > width || room_height + 4 > height {
            continue;
        }
        let max_x = width - room_width - 2;
        let max_y = height - room_height - 2;
        let x = rng.range_usize(2, max_x);
        let y = rng.range_usize(2, max_y);

        let candidate = Room::plain(x, y, room_width, room_height);
        let candidate_with_margin = candidate.expanded(1);
        if rooms.iter().any(|existing| existing.expanded(1).intersects(&candidate_with_margin)) {
            continue;
        }
        rooms.push(candidate);
    }

    if rooms.is_empty() {
        return Err(GenerateError::NoRoomsPlaced);
    }
    if rooms.len() < target_room_count {
        events.push(GenEvent::RoomShortfall { requested: target_room_count, placed: rooms.len() });
    }

    rooms.sort_by_key(|room| {
        let center = room.center();
        (center.y, center.x, room.height, room.width)
    });

    let start_index = 0;
    rooms[start_index].is_start = true;
    let start_center = rooms[start_index].center();

    let exit_index = farthest_room_index(&rooms, start_center, &[start_index]);
    let boss_index = if rooms.len() >= 3 {
        let index = farthest_room_index(&rooms, start_center, &[start_index, exit_index]);
        rooms[index].is_boss = true;
        rooms[index].is_secure = true;
        Some(index)
    } else {
        None
    };

    mark_treasure_rooms(&mut rooms, start_index, exit_index, boss_index, rng);

    Ok(RoomPlan { rooms, start_index, exit_index, boss_index })
}

/// Farthest room center from `origin` among rooms not in `excluded`,
/// greater-(y, x) winning ties.
fn farthest_room_index(rooms: &[Room], origin: Pos, excluded: &[usize]) -> usize {
    let mut best_index = (0..rooms.len()).find(|i| !excluded.contains(i)).unwrap_or(0);
    let mut best_distance = 0_u32;
    let mut best_center = rooms[best_index].center();
    for (index, room) in rooms.iter().enumerate() {
        if excluded.contains(&index) {
            continue;
        }
        let center = room.center();
        let distance = manhattan(origin, center);
        if distance > best_distance
            || (distance == best_distance && (center.y, center.x) > (best_center.y, best_center.x))
        {
            best_index = index;
            best_distance = distance;
            best_center = center;
        }
    }
    best_index
}

fn mark_treasure_rooms(
    rooms: &mut [Room],
    start_index: usize,
    exit_index: usize,
    boss_index: Option<usize>,
    rng: &mut dyn RandomSource,
) {
    let eligible: Vec<usize> = (0..rooms.len())
        .filter(|&i| i != start_index && i != exit_index && Some(i) != boss_index)
        .collect();
    if eligible.is_empty() {
        return;
    }
    let treasure_count = rng.range_usize(0, eligible.len().min(2));
    let mut pool = eligible;
    for _ in 0..treasure_count {
        let pick = rng.range_usize(0, pool.len() - 1);
        let room_index = pool.remove(pick);
        rooms[room_index].is_secure = true;
    }
}

pub(super) fn carve_room(tiles: &mut [TileKind], width: usize, room: &Room) {
    for y in room.y..=room.bottom() {
        for x in room.x..=room.right() {
            tiles[index(width, Pos { y: y as i32, x: x as i32 })] = TileKind::Floor;
        }
    }
}
