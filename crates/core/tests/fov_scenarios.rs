use std::collections::BTreeSet;

use crypt_core::{
    ChaChaSource, DifficultyConfig, FovMode, GenerationRequest, Map, Pos, TileKind, World,
    compute_fov, generate_level,
};

/// A 9x9 open chamber inside an 11x11 grid, observer dead center.
fn open_chamber() -> (Map, Pos) {
    let mut map = Map::new(11, 11);
    for y in 1..10 {
        for x in 1..10 {
            map.set_tile(Pos { y, x }, TileKind::Floor);
        }
    }
    (map, Pos { y: 5, x: 5 })
}

#[test]
fn open_chamber_radius_four_shows_exactly_the_euclidean_disc() {
    let (mut map, observer) = open_chamber();
    compute_fov(&mut map, &BTreeSet::new(), observer, 4, FovMode::Shadowcast);

    for y in 1..10 {
        for x in 1..10 {
            let pos = Pos { y, x };
            let dy = pos.y - observer.y;
            let dx = pos.x - observer.x;
            let inside = dy * dy + dx * dx <= 16;
            assert_eq!(
                map.is_visible(pos),
                inside,
                "tile {pos:?} visibility should be {inside}"
            );
        }
    }
}

#[test]
fn single_wall_shadows_the_tile_behind_it() {
    let (mut map, observer) = open_chamber();
    // Wall two steps east; the tile at distance three sits in its shadow.
    map.set_tile(Pos { y: 5, x: 7 }, TileKind::Wall);
    compute_fov(&mut map, &BTreeSet::new(), observer, 4, FovMode::Shadowcast);

    assert!(map.is_visible(Pos { y: 5, x: 6 }));
    assert!(map.is_visible(Pos { y: 5, x: 7 }), "the occluder itself is seen");
    assert!(!map.is_visible(Pos { y: 5, x: 8 }), "the tile behind the wall is shadowed");
    assert!(!map.is_visible(Pos { y: 5, x: 9 }));
}

#[test]
fn exploration_is_monotonic_across_a_patrol() {
    let request = GenerationRequest::new(2, DifficultyConfig::default());
    let mut rng = ChaChaSource::seeded(77);
    let generated = generate_level(&request, &mut rng).expect("generation succeeds");
    let mut world = World::new(2, &generated);

    let stops: Vec<Pos> = (0..world.map.height as i32)
        .flat_map(|y| (0..world.map.width as i32).map(move |x| Pos { y, x }))
        .filter(|&pos| world.map.tile_at(pos) == TileKind::Floor)
        .step_by(17)
        .collect();

    let mut explored_so_far = world.map.explored.clone();
    for stop in stops {
        world.compute_fov(stop, 6);

        for idx in 0..world.map.visible.len() {
            if world.map.visible[idx] {
                assert!(world.map.explored[idx], "visible tile must be explored in the same call");
            }
        }
        for idx in 0..explored_so_far.len() {
            if explored_so_far[idx] {
                assert!(world.map.explored[idx], "explored tile reverted to unexplored");
            }
        }
        explored_so_far = world.map.explored.clone();
    }
}

#[test]
fn unbroken_crates_occlude_until_smashed() {
    let request = GenerationRequest::new(1, DifficultyConfig::default());
    let mut rng = ChaChaSource::seeded(41);
    let generated = generate_level(&request, &mut rng).expect("generation succeeds");
    let mut world = World::new(1, &generated);

    // Synthetic corridor test through the world surface: find a crate, look
    // straight past it.
    let Some((id, crate_pos)) = world
        .objects
        .iter()
        .find(|(_, object)| object.kind.blocks_sight())
        .map(|(id, object)| (id, object.pos))
    else {
        return;
    };

    let observer = Pos { y: crate_pos.y, x: crate_pos.x - 2 };
    let between = Pos { y: crate_pos.y, x: crate_pos.x - 1 };
    let behind = Pos { y: crate_pos.y, x: crate_pos.x + 1 };
    if !world.map.in_bounds(observer)
        || world.map.tile_at(observer) != TileKind::Floor
        || world.map.tile_at(behind) != TileKind::Floor
        || world.map.tile_at(between) != TileKind::Floor
    {
        return;
    }
    // The lane must hold no other sight blocker or the reveal check would
    // test the wrong object.
    if world.objects.values().any(|object| {
        object.kind.blocks_sight()
            && object.pos != crate_pos
            && [observer, between, behind].contains(&object.pos)
    }) {
        return;
    }

    world.compute_fov(observer, 8);
    let occluded = !world.map.is_visible(behind);

    world.objects[id].broken = true;
    world.compute_fov(observer, 8);
    assert!(world.map.is_visible(behind), "a broken crate no longer blocks sight");
    assert!(occluded, "an unbroken crate blocks the tile directly behind it");
}

#[test]
fn distance_mode_sees_through_everything_in_range() {
    let (mut map, observer) = open_chamber();
    map.set_tile(Pos { y: 5, x: 7 }, TileKind::Wall);
    compute_fov(&mut map, &BTreeSet::new(), observer, 4, FovMode::Distance);

    assert!(map.is_visible(Pos { y: 5, x: 8 }));
    assert!(map.is_visible(Pos { y: 5, x: 9 }));
    assert!(!map.is_visible(Pos { y: 5, x: 10 }), "range still applies");
}
