pub mod config;
pub mod content;
pub mod fov;
pub mod mapgen;
pub mod rng;
pub mod state;
pub mod types;
pub mod walkability;

pub use config::{DifficultyConfig, DifficultyTier};
pub use fov::{FovMode, compute_fov};
pub use mapgen::{
    GeneratedLevel, GenerationRequest, ItemSpawn, LevelGenerator, MonsterSpawn, NpcSpawn,
    ObjectSpawn, Room, generate_level,
};
pub use rng::{ChaChaSource, RandomSource, derive_floor_seed};
pub use state::{FOV_RADIUS, Item, Map, Monster, Npc, PlacedObject, World};
pub use types::*;
pub use walkability::is_walkable;
