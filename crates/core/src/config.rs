//! Difficulty tier configuration consumed by the generation pipeline.
//! Values arrive either from the built-in tier presets or from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyTier {
    Apprentice,
    Standard,
    Nightmare,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    /// Multiplies the per-room monster count derived from room area.
    pub monster_density: f32,
    /// Per open non-room floor tile chance of a sparse corridor spawn.
    pub corridor_spawn_chance: f32,
    /// Per floor tile chance of a trap.
    pub trap_density: f32,
    pub trap_damage_mult: f32,
    pub boss_hp_mult: f32,
    /// When set, altar placement may evict occupants instead of giving up.
    pub guaranteed_altar: bool,
    pub altar_chance: f32,
    /// Minimum vertex-disjoint entrance-to-exit routes to aim for.
    pub redundancy_target: u32,
    pub npc_base_chance: f32,
    pub npc_pity_step: f32,
}

impl DifficultyConfig {
    pub fn for_tier(tier: DifficultyTier) -> Self {
        match tier {
            DifficultyTier::Apprentice => Self {
                monster_density: 0.7,
                corridor_spawn_chance: 0.01,
                trap_density: 0.01,
                trap_damage_mult: 0.8,
                boss_hp_mult: 0.8,
                guaranteed_altar: false,
                altar_chance: 0.2,
                redundancy_target: 3,
                npc_base_chance: 0.35,
                npc_pity_step: 0.2,
            },
            DifficultyTier::Standard => Self {
                monster_density: 1.0,
                corridor_spawn_chance: 0.02,
                trap_density: 0.02,
                trap_damage_mult: 1.0,
                boss_hp_mult: 1.0,
                guaranteed_altar: false,
                altar_chance: 0.35,
                redundancy_target: 3,
                npc_base_chance: 0.25,
                npc_pity_step: 0.15,
            },
            DifficultyTier::Nightmare => Self {
                monster_density: 1.5,
                corridor_spawn_chance: 0.04,
                trap_density: 0.045,
                trap_damage_mult: 1.6,
                boss_hp_mult: 1.5,
                guaranteed_altar: true,
                altar_chance: 1.0,
                redundancy_target: 4,
                npc_base_chance: 0.15,
                npc_pity_step: 0.1,
            },
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|_| ConfigError::Unreadable)?;
        Self::from_json_str(&text).map_err(|_| ConfigError::Malformed)
    }

    /// NPC presence chance after `absence_streak` levels without one.
    pub fn npc_chance(&self, absence_streak: u32) -> f32 {
        (self.npc_base_chance + self.npc_pity_step * absence_streak as f32).min(1.0)
    }
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self::for_tier(DifficultyTier::Standard)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    Unreadable,
    Malformed,
}
