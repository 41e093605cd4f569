//! The movement-validation query surface consumed by external AI and input
//! systems. Pure reads, no side effects, called at per-step frequency.

use crate::state::World;
use crate::types::{EntityRef, Pos, TileKind};

/// Composes tile kind, static-object occupancy, and (optionally) live-entity
/// occupancy into one answer. Out-of-bounds coordinates are simply not
/// walkable. Doors and stairs are interaction targets, not steps, so they
/// report false; an unbroken blocking prop claims its tile; a broken one no
/// longer does. `excluding` lets an entity ask about its own tile.
pub fn is_walkable(
    world: &World,
    pos: Pos,
    ignore_entities: bool,
    excluding: Option<EntityRef>,
) -> bool {
    if !world.map.in_bounds(pos) {
        return false;
    }
    if world.map.tile_at(pos) != TileKind::Floor {
        return false;
    }
    if world
        .objects
        .values()
        .any(|object| object.pos == pos && object.kind.blocks_movement() && !object.broken)
    {
        return false;
    }
    if ignore_entities {
        return true;
    }

    let excluded_monster = match excluding {
        Some(EntityRef::Monster(id)) => Some(id),
        _ => None,
    };
    if world.monsters.values().any(|monster| monster.pos == pos && Some(monster.id) != excluded_monster)
    {
        return false;
    }

    let excluded_npc = match excluding {
        Some(EntityRef::Npc(id)) => Some(id),
        _ => None,
    };
    if world.npcs.values().any(|npc| npc.pos == pos && Some(npc.id) != excluded_npc) {
        return false;
    }

    true
}
