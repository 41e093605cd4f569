//! Connector planning: every room is joined to the carved level through its
//! perimeter ring. Secure rooms get exactly one opening; ordinary rooms one
//! to three.

use crate::rng::{self, RandomSource};
use crate::types::{GenEvent, Pos, TileKind};

use super::grid::{in_interior, index, is_route_walkable_at, tile_at};
use super::model::Room;

const DOOR_CHANCE: f32 = 0.35;

pub(super) fn plan_connectors(
    tiles: &mut [TileKind],
    width: usize,
    height: usize,
    rooms: &[Room],
    rng: &mut dyn RandomSource,
    events: &mut Vec<GenEvent>,
) {
    for (room_index, room) in rooms.iter().enumerate() {
        let mut candidates = connector_candidates(tiles, width, height, room);
        if candidates.is_empty() {
            if force_connector(tiles, width, height, rooms, room_index) {
                events.push(GenEvent::ForcedConnector { room_index });
            }
            continue;
        }

        let chosen_count = if room.is_secure {
            1
        } else {
            rng.range_usize(1, 3).min(candidates.len())
        };
        rng::shuffle(rng, &mut candidates);
        for &pos in candidates.iter().take(chosen_count) {
            let tile = if room.is_secure || rng.chance(DOOR_CHANCE) {
                TileKind::Door
            } else {
                TileKind::Floor
            };
            tiles[index(width, pos)] = tile;
        }
    }
}

/// Organic candidates: ring wall tiles whose outward neighbor is already
/// carved, enumerated side by side in scan order.
pub(super) fn connector_candidates(
    tiles: &[TileKind],
    width: usize,
    height: usize,
    room: &Room,
) -> Vec<Pos> {
    let mut candidates = Vec::new();
    let top = room.y as i32;
    let bottom = room.bottom() as i32;
    let left = room.x as i32;
    let right = room.right() as i32;

    for x in left..=right {
        maybe_push(&mut candidates, tiles, width, height, Pos { y: top - 1, x }, (-1, 0));
        maybe_push(&mut candidates, tiles, width, height, Pos { y: bottom + 1, x }, (1, 0));
    }
    for y in top..=bottom {
        maybe_push(&mut candidates, tiles, width, height, Pos { y, x: left - 1 }, (0, -1));
        maybe_push(&mut candidates, tiles, width, height, Pos { y, x: right + 1 }, (0, 1));
    }
    candidates
}

fn maybe_push(
    candidates: &mut Vec<Pos>,
    tiles: &[TileKind],
    width: usize,
    height: usize,
    ring: Pos,
    outward: (i32, i32),
) {
    if !in_interior(width, height, ring) || tile_at(tiles, width, ring) != TileKind::Wall {
        return;
    }
    let beyond = Pos { y: ring.y + outward.0, x: ring.x + outward.1 };
    if is_route_walkable_at(tiles, width, height, beyond) {
        candidates.push(ring);
    }
}

/// Fallback for rooms sealed in untouched wall: scan the four cardinal rays
/// from the edge midpoints and carve the first one that reaches carved
/// floor. A ray refuses to pierce another secure room's zone.
fn force_connector(
    tiles: &mut [TileKind],
    width: usize,
    height: usize,
    rooms: &[Room],
    room_index: usize,
) -> bool {
    let room = &rooms[room_index];
    let center = room.center();
    let rays = [
        (Pos { y: room.y as i32 - 1, x: center.x }, (-1_i32, 0_i32)),
        (Pos { y: center.y, x: room.right() as i32 + 1 }, (0, 1)),
        (Pos { y: room.bottom() as i32 + 1, x: center.x }, (1, 0)),
        (Pos { y: center.y, x: room.x as i32 - 1 }, (0, -1)),
    ];

    for (start, (dy, dx)) in rays {
        let mut to_carve = Vec::new();
        let mut cursor = start;
        let mut reached_floor = false;
        while in_interior(width, height, cursor) {
            if is_route_walkable_at(tiles, width, height, cursor) {
                reached_floor = true;
                break;
            }
            if blocked_by_other_secure_room(rooms, room_index, cursor) {
                break;
            }
            to_carve.push(cursor);
            cursor = Pos { y: cursor.y + dy, x: cursor.x + dx };
        }
        if !reached_floor || to_carve.is_empty() {
            continue;
        }

        for (step, pos) in to_carve.iter().enumerate() {
            let tile = if step == 0 && room.is_secure { TileKind::Door } else { TileKind::Floor };
            tiles[index(width, *pos)] = tile;
        }
        return true;
    }
    false
}

fn blocked_by_other_secure_room(rooms: &[Room], room_index: usize, pos: Pos) -> bool {
    rooms.iter().enumerate().any(|(other_index, other)| {
        other_index != room_index && other.is_secure && other.expanded(1).contains(pos)
    })
}

/// Walkable openings on a room's one-tile perimeter ring. Secure rooms must
/// always report exactly one.
pub(super) fn ring_opening_count(
    tiles: &[TileKind],
    width: usize,
    height: usize,
    room: &Room,
) -> usize {
    let zone = room.expanded(1);
    let mut count = 0;
    for y in zone.y..=zone.bottom() {
        for x in zone.x..=zone.right() {
            let pos = Pos { y: y as i32, x: x as i32 };
            if room.on_perimeter_ring(pos) && is_route_walkable_at(tiles, width, height, pos) {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ChaChaSource;

    fn sealed_room_fixture(width: usize, height: usize, room: Room) -> Vec<TileKind> {
        let mut tiles = vec![TileKind::Wall; width * height];
        for y in room.y..=room.bottom() {
            for x in room.x..=room.right() {
                tiles[y * width + x] = TileKind::Floor;
            }
        }
        tiles
    }

    #[test]
    fn sealed_room_yields_no_organic_candidates() {
        let room = Room::plain(5, 5, 5, 4);
        let tiles = sealed_room_fixture(20, 16, room);
        assert!(connector_candidates(&tiles, 20, 16, &room).is_empty());
    }

    #[test]
    fn candidate_requires_carved_floor_beyond_the_ring() {
        let room = Room::plain(5, 5, 5, 4);
        let width = 20;
        let height = 16;
        let mut tiles = sealed_room_fixture(width, height, room);
        // Corridor hugging the ring from the east: ring x=10, corridor x=11.
        tiles[6 * width + 11] = TileKind::Floor;

        let candidates = connector_candidates(&tiles, width, height, &room);
        assert_eq!(candidates, vec![Pos { y: 6, x: 10 }]);
    }

    #[test]
    fn secure_room_gets_exactly_one_door() {
        let room = {
            let mut room = Room::plain(5, 5, 5, 4);
            room.is_secure = true;
            room
        };
        let width = 20;
        let height = 16;
        let mut tiles = sealed_room_fixture(width, height, room);
        // Carved corridor along the whole east side.
        for y in 5..=8 {
            tiles[y * width + 11] = TileKind::Floor;
        }

        let mut rng = ChaChaSource::seeded(41);
        let mut events = Vec::new();
        plan_connectors(&mut tiles, width, height, &[room], &mut rng, &mut events);

        assert_eq!(ring_opening_count(&tiles, width, height, &room), 1);
        let opening = (0..height as i32)
            .flat_map(|y| (0..width as i32).map(move |x| Pos { y, x }))
            .find(|&pos| room.on_perimeter_ring(pos) && tile_at(&tiles, width, pos) == TileKind::Door)
            .expect("secure opening must be a door");
        assert!(room.on_perimeter_ring(opening));
    }

    #[test]
    fn ordinary_room_gets_between_one_and_three_openings() {
        let room = Room::plain(5, 5, 6, 5);
        let width = 22;
        let height = 18;
        let mut tiles = sealed_room_fixture(width, height, room);
        for y in 4..=10 {
            tiles[y * width + 12] = TileKind::Floor;
        }
        for x in 4..=11 {
            tiles[3 * width + x] = TileKind::Floor;
        }

        let mut rng = ChaChaSource::seeded(1312);
        let mut events = Vec::new();
        plan_connectors(&mut tiles, width, height, &[room], &mut rng, &mut events);

        let openings = ring_opening_count(&tiles, width, height, &room);
        assert!((1..=3).contains(&openings), "got {openings} openings");
    }

    #[test]
    fn fully_sealed_room_is_force_connected() {
        let room = Room::plain(4, 4, 5, 4);
        let width = 24;
        let height = 18;
        let mut tiles = sealed_room_fixture(width, height, room);
        // A lone corridor column far to the east for the ray to reach.
        for y in 1..(height - 1) {
            tiles[y * width + 15] = TileKind::Floor;
        }

        let mut rng = ChaChaSource::seeded(8);
        let mut events = Vec::new();
        plan_connectors(&mut tiles, width, height, &[room], &mut rng, &mut events);

        assert!(events.iter().any(|event| matches!(event, GenEvent::ForcedConnector { room_index: 0 })));
        assert!(ring_opening_count(&tiles, width, height, &room) >= 1);
    }

    #[test]
    fn forced_ray_never_pierces_another_secure_room() {
        let sealed = Room::plain(3, 6, 4, 3);
        let mut secure = Room::plain(9, 5, 5, 5);
        secure.is_secure = true;
        let width = 26;
        let height = 16;
        let mut tiles = vec![TileKind::Wall; width * height];
        for room in [&sealed, &secure] {
            for y in room.y..=room.bottom() {
                for x in room.x..=room.right() {
                    tiles[y * width + x] = TileKind::Floor;
                }
            }
        }
        // Floor on the far side of the secure room: the eastward ray would
        // have to cross the secure zone to get there and must refuse.
        for y in 1..(height - 1) {
            tiles[y * width + 20] = TileKind::Floor;
        }
        // Floor row to the south that a legal ray can reach instead.
        for x in 1..(width - 1) {
            tiles[13 * width + x] = TileKind::Floor;
        }

        assert!(force_connector(&mut tiles, width, height, &[sealed, secure], 0));

        assert_eq!(ring_opening_count(&tiles, width, height, &secure), 0);
    }
}
