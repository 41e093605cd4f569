//! Monster, NPC, item, and object placement over a finished layout.
//! Placement legality lives here; runtime lifecycle of the records belongs
//! to the gameplay systems that consume them.

use std::collections::BTreeSet;

use crate::config::DifficultyConfig;
use crate::content::{LOOT_TABLE, SPAWNABLE_KINDS, TREASURE_TABLE, monster_stats, spawn_weight};
use crate::rng::{self, RandomSource};
use crate::types::{GenEvent, ItemKind, MonsterKind, NpcKind, ObjectKind, Pos, TileKind};

use super::grid::{
    manhattan, nearest_open_floor_tile, orthogonal_neighbors, surrounding_neighbors, tile_at,
};
use super::model::{ItemSpawn, MonsterSpawn, NpcSpawn, ObjectSpawn, Room};

const ROOM_AREA_PER_MONSTER: usize = 12;
const MAX_MONSTERS_PER_ROOM: usize = 5;
const SPECIES_RESAMPLE_ATTEMPTS: usize = 5;
const MIN_PROPS: usize = 5;
const MAX_PROPS: usize = 10;
const ROOM_LOOT_CHANCE: f32 = 0.4;
const BASE_TRAP_DAMAGE: f32 = 2.0;
/// Monsters keep this much Manhattan distance from the entrance regardless
/// of their species ring.
const SANCTUARY_RADIUS: u32 = 2;

pub(super) struct PopulationContext<'a> {
    pub(super) floor_number: u8,
    pub(super) config: &'a DifficultyConfig,
    pub(super) merchant_absence_streak: u32,
    pub(super) gambler_absence_streak: u32,
    pub(super) width: usize,
    pub(super) height: usize,
    pub(super) tiles: &'a [TileKind],
    pub(super) rooms: &'a [Room],
    pub(super) entry_tile: Pos,
    pub(super) boss_room_index: Option<usize>,
}

#[derive(Default)]
pub(super) struct PopulationResult {
    pub(super) monster_spawns: Vec<MonsterSpawn>,
    pub(super) npc_spawns: Vec<NpcSpawn>,
    pub(super) item_spawns: Vec<ItemSpawn>,
    pub(super) object_spawns: Vec<ObjectSpawn>,
    occupied: BTreeSet<Pos>,
}

pub(super) fn populate(
    context: &PopulationContext<'_>,
    rng: &mut dyn RandomSource,
    events: &mut Vec<GenEvent>,
) -> PopulationResult {
    let mut result = PopulationResult::default();

    place_boss(context, &mut result);
    place_npc(context, &mut result, rng);
    place_room_monsters(context, &mut result, rng);
    place_corridor_monsters(context, &mut result, rng);
    place_keys(context, &mut result, rng, events);
    place_treasure(context, &mut result, rng, events);
    place_props(context, &mut result, rng);
    place_traps(context, &mut result, rng);
    place_shrines(context, &mut result, rng);
    place_altar(context, &mut result, rng, events);
    place_room_loot(context, &mut result, rng, events);

    result.monster_spawns.sort_by_key(|spawn| (spawn.pos.y, spawn.pos.x, spawn.kind));
    result.npc_spawns.sort_by_key(|spawn| (spawn.pos.y, spawn.pos.x, spawn.kind));
    result.item_spawns.sort_by_key(|spawn| (spawn.pos.y, spawn.pos.x, spawn.kind));
    result.object_spawns.sort_by_key(|spawn| (spawn.pos.y, spawn.pos.x, spawn.kind));
    result
}

impl PopulationResult {
    fn is_free(&self, pos: Pos) -> bool {
        !self.occupied.contains(&pos)
    }

    fn push_monster(&mut self, kind: MonsterKind, pos: Pos, hp_mult: f32) {
        let stats = monster_stats(kind);
        self.monster_spawns.push(MonsterSpawn {
            kind,
            pos,
            hp: ((stats.hp as f32) * hp_mult).round() as i32,
            attack: stats.attack,
            defense: stats.defense,
            speed: stats.speed,
        });
        self.occupied.insert(pos);
    }

    fn push_npc(&mut self, kind: NpcKind, pos: Pos) {
        self.npc_spawns.push(NpcSpawn { kind, pos });
        self.occupied.insert(pos);
    }

    fn push_item(&mut self, kind: ItemKind, pos: Pos) {
        self.item_spawns.push(ItemSpawn { kind, pos });
        self.occupied.insert(pos);
    }

    fn push_object(&mut self, kind: ObjectKind, pos: Pos) {
        self.object_spawns.push(ObjectSpawn { kind, pos });
        self.occupied.insert(pos);
    }

    /// Mandatory placements may claim an occupied tile; whatever stood there
    /// is removed across all four record categories.
    fn evict(&mut self, pos: Pos) {
        self.monster_spawns.retain(|spawn| spawn.pos != pos);
        self.npc_spawns.retain(|spawn| spawn.pos != pos);
        self.item_spawns.retain(|spawn| spawn.pos != pos);
        self.object_spawns.retain(|spawn| spawn.pos != pos);
        self.occupied.remove(&pos);
    }
}

fn is_open_floor(context: &PopulationContext<'_>, pos: Pos) -> bool {
    tile_at(context.tiles, context.width, pos) == TileKind::Floor
}

fn random_room_tile(room: &Room, rng: &mut dyn RandomSource) -> Pos {
    Pos {
        y: rng.range_usize(room.y, room.bottom()) as i32,
        x: rng.range_usize(room.x, room.right()) as i32,
    }
}

fn place_boss(context: &PopulationContext<'_>, result: &mut PopulationResult) {
    let Some(boss_room_index) = context.boss_room_index else {
        return;
    };
    let pos = context.rooms[boss_room_index].center();
    result.push_monster(MonsterKind::CryptWarden, pos, context.config.boss_hp_mult);
}

fn place_npc(
    context: &PopulationContext<'_>,
    result: &mut PopulationResult,
    rng: &mut dyn RandomSource,
) {
    let merchant = rng.chance(context.config.npc_chance(context.merchant_absence_streak));
    let gambler = rng.chance(context.config.npc_chance(context.gambler_absence_streak));
    let kind = match (merchant, gambler) {
        (true, true) => {
            if rng.chance(0.5) {
                NpcKind::Merchant
            } else {
                NpcKind::Gambler
            }
        }
        (true, false) => NpcKind::Merchant,
        (false, true) => NpcKind::Gambler,
        (false, false) => return,
    };

    if context.rooms.is_empty() {
        return;
    }
    for _ in 0..20 {
        let room = &context.rooms[rng.range_usize(0, context.rooms.len() - 1)];
        if room.is_secure {
            continue;
        }
        let pos = random_room_tile(room, rng);
        if is_open_floor(context, pos) && result.is_free(pos) {
            result.push_npc(kind, pos);
            return;
        }
    }
}

fn place_room_monsters(
    context: &PopulationContext<'_>,
    result: &mut PopulationResult,
    rng: &mut dyn RandomSource,
) {
    for room in context.rooms {
        if room.is_start || room.is_secure {
            continue;
        }
        let base_count = room.area() / ROOM_AREA_PER_MONSTER;
        let scaled = ((base_count as f32) * context.config.monster_density).round() as usize;
        let count = scaled.min(MAX_MONSTERS_PER_ROOM);

        for _ in 0..count {
            for _attempt in 0..8 {
                let pos = random_room_tile(room, rng);
                if !is_open_floor(context, pos) || !result.is_free(pos) {
                    continue;
                }
                let distance = manhattan(pos, context.entry_tile);
                if distance < SANCTUARY_RADIUS {
                    continue;
                }
                let kind = pick_species(context.floor_number, distance, rng);
                result.push_monster(kind, pos, 1.0);
                break;
            }
        }
    }
}

fn place_corridor_monsters(
    context: &PopulationContext<'_>,
    result: &mut PopulationResult,
    rng: &mut dyn RandomSource,
) {
    for y in 1..(context.height - 1) {
        for x in 1..(context.width - 1) {
            let pos = Pos { y: y as i32, x: x as i32 };
            if !is_open_floor(context, pos)
                || context.rooms.iter().any(|room| room.contains(pos))
                || !result.is_free(pos)
            {
                continue;
            }
            let distance = manhattan(pos, context.entry_tile);
            if distance < SANCTUARY_RADIUS {
                continue;
            }
            if !rng.chance(context.config.corridor_spawn_chance) {
                continue;
            }
            let kind = pick_species(context.floor_number, distance, rng);
            result.push_monster(kind, pos, 1.0);
        }
    }
}

/// Weighted draw biased by floor depth, resampled while the candidate tile
/// violates the drawn species' spawn ring. The fallback draw is unweighted
/// but stays inside the ring constraint; the weakest species declares no
/// ring, so the pool is never empty.
fn pick_species(floor_number: u8, distance: u32, rng: &mut dyn RandomSource) -> MonsterKind {
    let total: u32 = SPAWNABLE_KINDS.iter().map(|&kind| spawn_weight(kind, floor_number)).sum();
    for _ in 0..SPECIES_RESAMPLE_ATTEMPTS {
        let kind = weighted_draw(floor_number, total, rng);
        if monster_stats(kind).min_spawn_distance <= distance {
            return kind;
        }
    }

    let eligible: Vec<MonsterKind> = SPAWNABLE_KINDS
        .into_iter()
        .filter(|&kind| monster_stats(kind).min_spawn_distance <= distance)
        .collect();
    eligible[rng.range_usize(0, eligible.len() - 1)]
}

fn weighted_draw(floor_number: u8, total: u32, rng: &mut dyn RandomSource) -> MonsterKind {
    let mut roll = rng.range_usize(0, (total - 1) as usize) as u32;
    for kind in SPAWNABLE_KINDS {
        let weight = spawn_weight(kind, floor_number);
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    MonsterKind::CarrionRat
}

fn place_keys(
    context: &PopulationContext<'_>,
    result: &mut PopulationResult,
    rng: &mut dyn RandomSource,
    events: &mut Vec<GenEvent>,
) {
    let secure_count = context.rooms.iter().filter(|room| room.is_secure).count();
    let open_rooms: Vec<&Room> =
        context.rooms.iter().filter(|room| !room.is_secure).collect();
    if open_rooms.is_empty() {
        return;
    }
    for _ in 0..secure_count {
        let room = open_rooms[rng.range_usize(0, open_rooms.len() - 1)];
        let target = random_room_tile(room, rng);
        place_item_with_fallback(context, result, ItemKind::Key, target, events);
    }
}

fn place_treasure(
    context: &PopulationContext<'_>,
    result: &mut PopulationResult,
    rng: &mut dyn RandomSource,
    events: &mut Vec<GenEvent>,
) {
    for room in context.rooms {
        if !room.is_secure {
            continue;
        }
        let relic = ItemKind::Relic(TREASURE_TABLE[rng.range_usize(0, TREASURE_TABLE.len() - 1)]);
        place_item_with_fallback(context, result, relic, room.center(), events);
    }
}

fn place_props(
    context: &PopulationContext<'_>,
    result: &mut PopulationResult,
    rng: &mut dyn RandomSource,
) {
    let prop_count = rng.range_usize(MIN_PROPS, MAX_PROPS);
    for _ in 0..prop_count {
        for _attempt in 0..10 {
            let target = Pos {
                y: rng.range_usize(1, context.height - 2) as i32,
                x: rng.range_usize(1, context.width - 2) as i32,
            };
            let pos =
                nearest_open_floor_tile(context.tiles, context.width, context.height, target);
            if !is_open_floor(context, pos)
                || !result.is_free(pos)
                || manhattan(pos, context.entry_tile) <= 1
            {
                continue;
            }
            let kind = if rng.chance(0.5) { ObjectKind::Crate } else { ObjectKind::Barrel };
            result.push_object(kind, pos);
            break;
        }
    }
}

fn place_traps(
    context: &PopulationContext<'_>,
    result: &mut PopulationResult,
    rng: &mut dyn RandomSource,
) {
    let damage = ((BASE_TRAP_DAMAGE + context.floor_number as f32)
        * context.config.trap_damage_mult)
        .round()
        .max(1.0) as i32;

    for y in 1..(context.height - 1) {
        for x in 1..(context.width - 1) {
            let pos = Pos { y: y as i32, x: x as i32 };
            if !is_open_floor(context, pos)
                || !result.is_free(pos)
                || manhattan(pos, context.entry_tile) <= 1
            {
                continue;
            }
            if rng.chance(context.config.trap_density) {
                result.push_object(ObjectKind::Trap { damage }, pos);
            }
        }
    }
}

fn place_shrines(
    context: &PopulationContext<'_>,
    result: &mut PopulationResult,
    rng: &mut dyn RandomSource,
) {
    let mut dead_ends: Vec<Pos> = Vec::new();
    for y in 1..(context.height - 1) {
        for x in 1..(context.width - 1) {
            let pos = Pos { y: y as i32, x: x as i32 };
            if !is_open_floor(context, pos)
                || !result.is_free(pos)
                || manhattan(pos, context.entry_tile) <= 1
            {
                continue;
            }
            let wall_neighbors = orthogonal_neighbors(pos)
                .into_iter()
                .filter(|&next| tile_at(context.tiles, context.width, next) == TileKind::Wall)
                .count();
            if wall_neighbors >= 3 {
                dead_ends.push(pos);
            }
        }
    }
    rng::shuffle(rng, &mut dead_ends);

    let shrine_count = rng.range_usize(1, 2);
    let mut placed = 0;
    for pos in dead_ends {
        if placed >= shrine_count {
            return;
        }
        result.push_object(ObjectKind::Shrine, pos);
        placed += 1;
    }

    // Not enough dead ends; fall back to any open tile.
    for _attempt in 0..20 {
        if placed >= shrine_count {
            return;
        }
        let pos = Pos {
            y: rng.range_usize(1, context.height - 2) as i32,
            x: rng.range_usize(1, context.width - 2) as i32,
        };
        if is_open_floor(context, pos)
            && result.is_free(pos)
            && manhattan(pos, context.entry_tile) > 1
        {
            result.push_object(ObjectKind::Shrine, pos);
            placed += 1;
        }
    }
}

fn place_altar(
    context: &PopulationContext<'_>,
    result: &mut PopulationResult,
    rng: &mut dyn RandomSource,
    events: &mut Vec<GenEvent>,
) {
    let mandatory = context.config.guaranteed_altar;
    if !mandatory && !rng.chance(context.config.altar_chance) {
        return;
    }

    let mut fallback_site: Option<(Pos, Pos)> = None;
    for y in 1..(context.height - 1) {
        for x in 1..(context.width - 2) {
            let west = Pos { y: y as i32, x: x as i32 };
            let east = Pos { y: y as i32, x: x as i32 + 1 };
            if !is_open_floor(context, west)
                || !is_open_floor(context, east)
                || manhattan(west, context.entry_tile) <= 1
                || manhattan(east, context.entry_tile) <= 1
            {
                continue;
            }
            if result.is_free(west) && result.is_free(east) {
                result.push_object(ObjectKind::Altar, west);
                result.push_object(ObjectKind::Altar, east);
                return;
            }
            if fallback_site.is_none() {
                fallback_site = Some((west, east));
            }
        }
    }

    if mandatory {
        if let Some((west, east)) = fallback_site {
            result.evict(west);
            result.evict(east);
            result.push_object(ObjectKind::Altar, west);
            result.push_object(ObjectKind::Altar, east);
            events.push(GenEvent::AltarEvicted { pos: west });
            return;
        }
    }
    events.push(GenEvent::AltarSkipped);
}

fn place_room_loot(
    context: &PopulationContext<'_>,
    result: &mut PopulationResult,
    rng: &mut dyn RandomSource,
    events: &mut Vec<GenEvent>,
) {
    for room in context.rooms {
        if room.is_secure {
            continue;
        }
        if !rng.chance(ROOM_LOOT_CHANCE) {
            continue;
        }
        let kind = ItemKind::Consumable(LOOT_TABLE[rng.range_usize(0, LOOT_TABLE.len() - 1)]);
        let target = random_room_tile(room, rng);
        place_item_with_fallback(context, result, kind, target, events);
    }
}

/// Items that land on an occupied tile slide to the first free floor tile
/// among the 8 neighbors; when none exists the item simply is not placed.
fn place_item_with_fallback(
    context: &PopulationContext<'_>,
    result: &mut PopulationResult,
    kind: ItemKind,
    target: Pos,
    events: &mut Vec<GenEvent>,
) {
    if is_open_floor(context, target) && result.is_free(target) {
        result.push_item(kind, target);
        return;
    }
    for neighbor in surrounding_neighbors(target) {
        if neighbor.x >= 1
            && neighbor.y >= 1
            && (neighbor.x as usize) < context.width - 1
            && (neighbor.y as usize) < context.height - 1
            && is_open_floor(context, neighbor)
            && result.is_free(neighbor)
        {
            result.push_item(kind, neighbor);
            return;
        }
    }
    events.push(GenEvent::ItemPlacementSkipped { kind });
}
