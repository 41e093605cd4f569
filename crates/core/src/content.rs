use crate::types::{MonsterKind, NpcKind};

pub mod keys {
    pub const CONSUMABLE_EMBER_DRAUGHT: &str = "consumable_ember_draught";
    pub const CONSUMABLE_PALE_TINCTURE: &str = "consumable_pale_tincture";
    pub const CONSUMABLE_GRAVE_INCENSE: &str = "consumable_grave_incense";
    pub const CONSUMABLE_MIRROR_SALTS: &str = "consumable_mirror_salts";

    pub const RELIC_SUNKEN_CROWN: &str = "relic_sunken_crown";
    pub const RELIC_WARDENS_SEAL: &str = "relic_wardens_seal";
    pub const RELIC_HOLLOW_BELL: &str = "relic_hollow_bell";
}

pub struct MonsterStats {
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: u32,
    /// Concentric spawn ring: the species never spawns closer to the
    /// entrance tile than this Manhattan distance.
    pub min_spawn_distance: u32,
}

pub fn monster_stats(kind: MonsterKind) -> MonsterStats {
    match kind {
        MonsterKind::CarrionRat => {
            MonsterStats { hp: 4, attack: 1, defense: 0, speed: 14, min_spawn_distance: 0 }
        }
        MonsterKind::BoneScuttler => {
            MonsterStats { hp: 6, attack: 2, defense: 0, speed: 12, min_spawn_distance: 3 }
        }
        MonsterKind::MarrowHound => {
            MonsterStats { hp: 8, attack: 3, defense: 0, speed: 13, min_spawn_distance: 5 }
        }
        MonsterKind::Ghoul => {
            MonsterStats { hp: 12, attack: 4, defense: 1, speed: 10, min_spawn_distance: 6 }
        }
        MonsterKind::HollowKnight => {
            MonsterStats { hp: 18, attack: 5, defense: 3, speed: 8, min_spawn_distance: 8 }
        }
        MonsterKind::Wraith => {
            MonsterStats { hp: 14, attack: 6, defense: 1, speed: 12, min_spawn_distance: 10 }
        }
        MonsterKind::GraveTitan => {
            MonsterStats { hp: 26, attack: 7, defense: 4, speed: 6, min_spawn_distance: 12 }
        }
        MonsterKind::CryptWarden => {
            MonsterStats { hp: 60, attack: 9, defense: 4, speed: 9, min_spawn_distance: 0 }
        }
    }
}

pub const SPAWNABLE_KINDS: [MonsterKind; 7] = [
    MonsterKind::CarrionRat,
    MonsterKind::BoneScuttler,
    MonsterKind::MarrowHound,
    MonsterKind::Ghoul,
    MonsterKind::HollowKnight,
    MonsterKind::Wraith,
    MonsterKind::GraveTitan,
];

/// Weighted-selection weight for a species on the given floor. Zero means
/// the species is out of rotation there. The warden only appears as the
/// explicitly placed boss, never through the weighted draw.
pub fn spawn_weight(kind: MonsterKind, floor_number: u8) -> u32 {
    match floor_number {
        0..=2 => match kind {
            MonsterKind::CarrionRat => 50,
            MonsterKind::BoneScuttler => 30,
            MonsterKind::MarrowHound => 15,
            MonsterKind::Ghoul => 5,
            _ => 0,
        },
        3..=4 => match kind {
            MonsterKind::CarrionRat => 15,
            MonsterKind::BoneScuttler => 25,
            MonsterKind::MarrowHound => 25,
            MonsterKind::Ghoul => 20,
            MonsterKind::HollowKnight => 10,
            MonsterKind::Wraith => 5,
            _ => 0,
        },
        5..=6 => match kind {
            MonsterKind::BoneScuttler => 10,
            MonsterKind::MarrowHound => 20,
            MonsterKind::Ghoul => 25,
            MonsterKind::HollowKnight => 20,
            MonsterKind::Wraith => 15,
            MonsterKind::GraveTitan => 10,
            _ => 0,
        },
        _ => match kind {
            MonsterKind::MarrowHound => 10,
            MonsterKind::Ghoul => 20,
            MonsterKind::HollowKnight => 25,
            MonsterKind::Wraith => 25,
            MonsterKind::GraveTitan => 20,
            _ => 0,
        },
    }
}

pub struct NpcProfile {
    pub name: &'static str,
}

pub fn npc_profile(kind: NpcKind) -> NpcProfile {
    match kind {
        NpcKind::Merchant => NpcProfile { name: "Ossuary Merchant" },
        NpcKind::Gambler => NpcProfile { name: "Knucklebone Gambler" },
    }
}

pub const LOOT_TABLE: [&str; 4] = [
    keys::CONSUMABLE_EMBER_DRAUGHT,
    keys::CONSUMABLE_PALE_TINCTURE,
    keys::CONSUMABLE_GRAVE_INCENSE,
    keys::CONSUMABLE_MIRROR_SALTS,
];

pub const TREASURE_TABLE: [&str; 3] = [
    keys::RELIC_SUNKEN_CROWN,
    keys::RELIC_WARDENS_SEAL,
    keys::RELIC_HOLLOW_BELL,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_floor_tier_has_at_least_one_spawnable_species() {
        for floor in 1..=12_u8 {
            let total: u32 = SPAWNABLE_KINDS.iter().map(|&kind| spawn_weight(kind, floor)).sum();
            assert!(total > 0, "floor {floor} has an empty spawn table");
        }
    }

    #[test]
    fn weakest_species_has_no_ring_so_fallback_draws_never_strand_a_tile() {
        assert_eq!(monster_stats(MonsterKind::CarrionRat).min_spawn_distance, 0);
    }

    #[test]
    fn warden_never_enters_the_weighted_rotation() {
        for floor in 1..=12_u8 {
            assert_eq!(spawn_weight(MonsterKind::CryptWarden, floor), 0);
        }
    }
}
