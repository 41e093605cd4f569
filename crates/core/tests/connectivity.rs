use std::collections::{BTreeMap, BTreeSet, VecDeque};

use proptest::prelude::*;

use crypt_core::{
    ChaChaSource, DifficultyConfig, GeneratedLevel, GenerationRequest, LevelGenerator, Pos,
    generate_level,
};

fn neighbors(pos: Pos) -> [Pos; 4] {
    [
        Pos { y: pos.y - 1, x: pos.x },
        Pos { y: pos.y, x: pos.x + 1 },
        Pos { y: pos.y + 1, x: pos.x },
        Pos { y: pos.y, x: pos.x - 1 },
    ]
}

fn shortest_route(
    level: &GeneratedLevel,
    blocked: &BTreeSet<Pos>,
    start: Pos,
    goal: Pos,
) -> Option<Vec<Pos>> {
    let mut came_from = BTreeMap::new();
    let mut seen = BTreeSet::from([start]);
    let mut open = VecDeque::from([start]);
    while let Some(pos) = open.pop_front() {
        for next in neighbors(pos) {
            if seen.contains(&next)
                || blocked.contains(&next)
                || !level.tile_at(next).is_route_walkable()
            {
                continue;
            }
            came_from.insert(next, pos);
            if next == goal {
                let mut path = vec![next];
                let mut cursor = next;
                while cursor != start {
                    cursor = came_from[&cursor];
                    path.push(cursor);
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

/// Independent re-measurement of vertex-disjoint route count, written
/// against the public surface only.
fn measure_disjoint_routes(level: &GeneratedLevel) -> u32 {
    let mut blocked = BTreeSet::new();
    let mut count = 0;
    while count < 64 {
        let Some(path) =
            shortest_route(level, &blocked, level.entry_tile, level.down_stairs_tile)
        else {
            break;
        };
        count += 1;
        if path.len() <= 2 {
            break;
        }
        for &pos in &path[1..path.len() - 1] {
            blocked.insert(pos);
        }
    }
    count
}

#[test]
fn stairs_connect_across_a_seed_sweep() {
    for seed in 0..60_u64 {
        let request = GenerationRequest::new((seed % 7 + 1) as u8, DifficultyConfig::default());
        let mut rng = ChaChaSource::seeded(seed);
        let level = generate_level(&request, &mut rng).expect("generation succeeds");
        assert!(
            shortest_route(&level, &BTreeSet::new(), level.entry_tile, level.down_stairs_tile)
                .is_some(),
            "seed {seed}: stairs must be connected"
        );
    }
}

#[test]
fn every_room_is_reachable_from_the_entrance() {
    for seed in 0..40_u64 {
        let request = GenerationRequest::new(2, DifficultyConfig::default());
        let mut rng = ChaChaSource::seeded(seed);
        let level = generate_level(&request, &mut rng).expect("generation succeeds");
        for room in &level.rooms {
            assert!(
                shortest_route(&level, &BTreeSet::new(), level.entry_tile, room.center())
                    .is_some(),
                "seed {seed}: room at ({}, {}) is cut off",
                room.x,
                room.y
            );
        }
    }
}

#[test]
fn disjoint_route_count_is_at_least_one_and_reported_faithfully() {
    for seed in 0..40_u64 {
        let request = GenerationRequest::new(3, DifficultyConfig::default());
        let mut rng = ChaChaSource::seeded(seed);
        let level = generate_level(&request, &mut rng).expect("generation succeeds");

        let measured = measure_disjoint_routes(&level);
        assert!(measured >= 1, "seed {seed}: no route between the stairs");
        assert!(
            level.disjoint_path_count >= 1,
            "seed {seed}: reported redundancy dropped below one"
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]
    #[test]
    fn arbitrary_seeds_always_yield_connected_levels(
        seed in any::<u64>(),
        floor in 1_u8..=10
    ) {
        let request = GenerationRequest::new(floor, DifficultyConfig::default());
        let mut rng = ChaChaSource::seeded(seed);
        let level = LevelGenerator::new(32, 24, 6)
            .generate(&request, &mut rng)
            .expect("generation succeeds");

        prop_assert!(
            shortest_route(&level, &BTreeSet::new(), level.entry_tile, level.down_stairs_tile)
                .is_some(),
            "seed={seed}, floor={floor} must produce connected stairs"
        );
        prop_assert!(measure_disjoint_routes(&level) >= 1);
    }
}
