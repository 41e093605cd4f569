//! Procedural level generation split into coherent submodules.

pub mod model;

mod connectivity;
mod connectors;
mod grid;
mod maze;
mod population;
mod rooms;

pub use model::{GeneratedLevel, ItemSpawn, MonsterSpawn, NpcSpawn, ObjectSpawn, Room};

use crate::config::DifficultyConfig;
use crate::rng::RandomSource;
use crate::types::{GenEvent, GenerateError, Pos, TileKind};

use self::connectivity::{augment_connectivity, stitch_unreachable_rooms};
use self::connectors::plan_connectors;
use self::grid::{index, manhattan};
use self::maze::carve_maze;
use self::population::{PopulationContext, populate};
use self::rooms::{carve_room, place_rooms};

pub const DEFAULT_MAP_WIDTH: usize = 48;
pub const DEFAULT_MAP_HEIGHT: usize = 32;
pub const DEFAULT_ROOM_COUNT: usize = 8;

/// Everything a level build needs besides randomness. Passed explicitly;
/// nothing in the pipeline reads ambient state.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    pub floor_number: u8,
    pub config: DifficultyConfig,
    /// Levels since a merchant last appeared, for the pity rule.
    pub merchant_absence_streak: u32,
    pub gambler_absence_streak: u32,
}

impl GenerationRequest {
    pub fn new(floor_number: u8, config: DifficultyConfig) -> Self {
        Self { floor_number, config, merchant_absence_streak: 0, gambler_absence_streak: 0 }
    }
}

pub struct LevelGenerator {
    width: usize,
    height: usize,
    target_room_count: usize,
}

impl Default for LevelGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_WIDTH, DEFAULT_MAP_HEIGHT, DEFAULT_ROOM_COUNT)
    }
}

/// Single entry point over the default grid size.
pub fn generate_level(
    request: &GenerationRequest,
    rng: &mut dyn RandomSource,
) -> Result<GeneratedLevel, GenerateError> {
    LevelGenerator::default().generate(request, rng)
}

impl LevelGenerator {
    pub fn new(width: usize, height: usize, target_room_count: usize) -> Self {
        Self { width, height, target_room_count }
    }

    /// Runs the whole pipeline: rooms, maze, connectors, stairs, the
    /// reachability stitch, redundancy augmentation, population. The caller
    /// gets either a connected walkable level or an error; never a partial
    /// grid.
    pub fn generate(
        &self,
        request: &GenerationRequest,
        rng: &mut dyn RandomSource,
    ) -> Result<GeneratedLevel, GenerateError> {
        let mut events: Vec<GenEvent> = Vec::new();

        let plan = place_rooms(self.width, self.height, self.target_room_count, rng, &mut events)?;

        let mut tiles = vec![TileKind::Wall; self.width * self.height];
        for room in &plan.rooms {
            carve_room(&mut tiles, self.width, room);
        }
        carve_maze(&mut tiles, self.width, self.height, &plan.rooms, rng);
        plan_connectors(&mut tiles, self.width, self.height, &plan.rooms, rng, &mut events);

        let entry_tile = plan.rooms[plan.start_index].center();
        let down_stairs_tile = if plan.exit_index == plan.start_index {
            self.farthest_tile_within_room(&plan.rooms[plan.start_index], entry_tile)
        } else {
            plan.rooms[plan.exit_index].center()
        };
        tiles[index(self.width, entry_tile)] = TileKind::UpStairs;
        tiles[index(self.width, down_stairs_tile)] = TileKind::DownStairs;

        stitch_unreachable_rooms(
            &mut tiles,
            self.width,
            self.height,
            &plan.rooms,
            entry_tile,
            &mut events,
        );

        let report = augment_connectivity(
            &mut tiles,
            self.width,
            self.height,
            &plan.rooms,
            entry_tile,
            down_stairs_tile,
            request.config.redundancy_target,
            rng,
            &mut events,
        );

        let context = PopulationContext {
            floor_number: request.floor_number,
            config: &request.config,
            merchant_absence_streak: request.merchant_absence_streak,
            gambler_absence_streak: request.gambler_absence_streak,
            width: self.width,
            height: self.height,
            tiles: &tiles,
            rooms: &plan.rooms,
            entry_tile,
            boss_room_index: plan.boss_index,
        };
        let placements = populate(&context, rng, &mut events);

        Ok(GeneratedLevel {
            width: self.width,
            height: self.height,
            tiles,
            rooms: plan.rooms,
            entry_tile,
            down_stairs_tile,
            monster_spawns: placements.monster_spawns,
            npc_spawns: placements.npc_spawns,
            item_spawns: placements.item_spawns,
            object_spawns: placements.object_spawns,
            disjoint_path_count: report.achieved_count,
            events,
        })
    }

    /// Down-stairs fallback for degenerate single-room levels: the room tile
    /// farthest from the entrance, greater-(y, x) breaking ties.
    fn farthest_tile_within_room(&self, room: &Room, entry_tile: Pos) -> Pos {
        let mut best = entry_tile;
        let mut best_distance = 0_u32;
        for y in room.y..=room.bottom() {
            for x in room.x..=room.right() {
                let pos = Pos { y: y as i32, x: x as i32 };
                let distance = manhattan(pos, entry_tile);
                if distance > best_distance
                    || (distance == best_distance && (pos.y, pos.x) > (best.y, best.x))
                {
                    best = pos;
                    best_distance = distance;
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ChaChaSource;

    #[test]
    fn generate_level_matches_level_generator_output() {
        let request = GenerationRequest::new(2, DifficultyConfig::default());

        let mut rng_a = ChaChaSource::seeded(123);
        let from_helper = generate_level(&request, &mut rng_a).expect("generation succeeds");

        let mut rng_b = ChaChaSource::seeded(123);
        let from_generator = LevelGenerator::default()
            .generate(&request, &mut rng_b)
            .expect("generation succeeds");

        assert_eq!(from_helper, from_generator);
    }

    #[test]
    fn generated_level_has_exactly_one_of_each_stairs() {
        let request = GenerationRequest::new(1, DifficultyConfig::default());
        let mut rng = ChaChaSource::seeded(9000);
        let level = generate_level(&request, &mut rng).expect("generation succeeds");

        let ups = level.tiles.iter().filter(|&&t| t == TileKind::UpStairs).count();
        let downs = level.tiles.iter().filter(|&&t| t == TileKind::DownStairs).count();
        assert_eq!(ups, 1);
        assert_eq!(downs, 1);
        assert_eq!(level.tile_at(level.entry_tile), TileKind::UpStairs);
        assert_eq!(level.tile_at(level.down_stairs_tile), TileKind::DownStairs);
    }

    #[test]
    fn tiny_grid_aborts_instead_of_handing_back_a_degenerate_level() {
        let request = GenerationRequest::new(1, DifficultyConfig::default());
        let mut rng = ChaChaSource::seeded(4);
        let result = LevelGenerator::new(6, 5, 3).generate(&request, &mut rng);
        assert_eq!(result, Err(GenerateError::NoRoomsPlaced));
    }
}
