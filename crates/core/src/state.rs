use std::collections::BTreeSet;

use slotmap::SlotMap;

use crate::fov::{FovMode, compute_fov};
use crate::mapgen::GeneratedLevel;
use crate::types::*;
use crate::walkability;

/// Observer radius used for the initial reveal when a level is installed.
pub const FOV_RADIUS: i32 = 8;

#[derive(Clone)]
pub struct Map {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<TileKind>,
    /// Recomputed from scratch on every field-of-view pass.
    pub visible: Vec<bool>,
    /// Monotonic: once a tile is explored it stays explored for the level's
    /// lifetime.
    pub explored: Vec<bool>,
}

impl Map {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![TileKind::Wall; width * height],
            visible: vec![false; width * height],
            explored: vec![false; width * height],
        }
    }

    pub fn from_tiles(width: usize, height: usize, tiles: Vec<TileKind>) -> Self {
        debug_assert_eq!(tiles.len(), width * height);
        Self {
            width,
            height,
            tiles,
            visible: vec![false; width * height],
            explored: vec![false; width * height],
        }
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height
    }

    pub fn tile_at(&self, pos: Pos) -> TileKind {
        if !self.in_bounds(pos) {
            return TileKind::Wall;
        }
        self.tiles[self.index(pos)]
    }

    pub fn set_tile(&mut self, pos: Pos, tile: TileKind) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        self.tiles[idx] = tile;
    }

    pub fn is_visible(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && self.visible[self.index(pos)]
    }

    pub fn is_explored(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && self.explored[self.index(pos)]
    }

    pub fn set_visible(&mut self, pos: Pos, value: bool) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        self.visible[idx] = value;
    }

    pub fn clear_visible(&mut self) {
        self.visible.fill(false);
    }

    pub(crate) fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }
}

#[derive(Clone, Debug)]
pub struct Monster {
    pub id: MonsterId,
    pub kind: MonsterKind,
    pub pos: Pos,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: u32,
}

#[derive(Clone, Debug)]
pub struct Npc {
    pub id: NpcId,
    pub kind: NpcKind,
    pub pos: Pos,
}

#[derive(Clone, Debug)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub pos: Pos,
}

#[derive(Clone, Debug)]
pub struct PlacedObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub pos: Pos,
    /// Destroyed props stop blocking movement and sight.
    pub broken: bool,
}

/// Live level state: the grid plus every placed record. Replaced wholesale
/// by `install_level`; combat and pickup mutate the registries afterwards,
/// all from the same single-threaded tick.
pub struct World {
    pub map: Map,
    pub floor_number: u8,
    pub entry_tile: Pos,
    pub down_stairs_tile: Pos,
    pub fov_mode: FovMode,
    pub monsters: SlotMap<MonsterId, Monster>,
    pub npcs: SlotMap<NpcId, Npc>,
    pub items: SlotMap<ItemId, Item>,
    pub objects: SlotMap<ObjectId, PlacedObject>,
}

impl World {
    pub fn new(floor_number: u8, generated: &GeneratedLevel) -> Self {
        let mut world = Self {
            map: Map::new(generated.width, generated.height),
            floor_number,
            entry_tile: generated.entry_tile,
            down_stairs_tile: generated.down_stairs_tile,
            fov_mode: FovMode::Shadowcast,
            monsters: SlotMap::with_key(),
            npcs: SlotMap::with_key(),
            items: SlotMap::with_key(),
            objects: SlotMap::with_key(),
        };
        world.install_level(floor_number, generated);
        world
    }

    /// Replaces every piece of live state with the generated level and runs
    /// the first visibility pass from the entrance. The one sanctioned
    /// hand-off point between generation and gameplay.
    pub fn install_level(&mut self, floor_number: u8, generated: &GeneratedLevel) {
        self.map = Map::from_tiles(generated.width, generated.height, generated.tiles.clone());
        self.floor_number = floor_number;
        self.entry_tile = generated.entry_tile;
        self.down_stairs_tile = generated.down_stairs_tile;

        self.monsters.clear();
        self.npcs.clear();
        self.items.clear();
        self.objects.clear();

        for spawn in &generated.monster_spawns {
            let id = self.monsters.insert(Monster {
                id: MonsterId::default(),
                kind: spawn.kind,
                pos: spawn.pos,
                hp: spawn.hp,
                max_hp: spawn.hp,
                attack: spawn.attack,
                defense: spawn.defense,
                speed: spawn.speed,
            });
            self.monsters[id].id = id;
        }
        for spawn in &generated.npc_spawns {
            let id = self.npcs.insert(Npc { id: NpcId::default(), kind: spawn.kind, pos: spawn.pos });
            self.npcs[id].id = id;
        }
        for spawn in &generated.item_spawns {
            let id =
                self.items.insert(Item { id: ItemId::default(), kind: spawn.kind, pos: spawn.pos });
            self.items[id].id = id;
        }
        for spawn in &generated.object_spawns {
            let id = self.objects.insert(PlacedObject {
                id: ObjectId::default(),
                kind: spawn.kind,
                pos: spawn.pos,
                broken: false,
            });
            self.objects[id].id = id;
        }

        self.compute_fov(generated.entry_tile, FOV_RADIUS);
    }

    /// Recomputes `visible` from the observer and folds the result into
    /// `explored`. Called once per movement-relevant tick.
    pub fn compute_fov(&mut self, origin: Pos, radius: i32) {
        let opaque_objects: BTreeSet<Pos> = self
            .objects
            .values()
            .filter(|object| object.kind.blocks_sight() && !object.broken)
            .map(|object| object.pos)
            .collect();
        compute_fov(&mut self.map, &opaque_objects, origin, radius, self.fov_mode);
    }

    pub fn is_walkable(&self, pos: Pos, ignore_entities: bool, excluding: Option<EntityRef>) -> bool {
        walkability::is_walkable(self, pos, ignore_entities, excluding)
    }

    /// Combat's removal hook once a monster dies.
    pub fn remove_monster(&mut self, id: MonsterId) -> Option<Monster> {
        self.monsters.remove(id)
    }
}
