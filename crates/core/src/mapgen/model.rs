//! Public data models for generated levels and their placement records.

use crate::types::{GenEvent, ItemKind, MonsterKind, NpcKind, ObjectKind, Pos, TileKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Room {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub is_start: bool,
    pub is_boss: bool,
    pub is_secure: bool,
}

impl Room {
    pub(super) fn plain(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self { x, y, width, height, is_start: false, is_boss: false, is_secure: false }
    }

    pub fn right(&self) -> usize {
        self.x + self.width - 1
    }

    pub fn bottom(&self) -> usize {
        self.y + self.height - 1
    }

    pub fn center(&self) -> Pos {
        Pos { y: (self.y + self.height / 2) as i32, x: (self.x + self.width / 2) as i32 }
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn contains(&self, pos: Pos) -> bool {
        if pos.x < 0 || pos.y < 0 {
            return false;
        }
        let px = pos.x as usize;
        let py = pos.y as usize;
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    pub(super) fn expanded(&self, margin: usize) -> Self {
        let expanded_x = self.x.saturating_sub(margin);
        let expanded_y = self.y.saturating_sub(margin);
        let expanded_right = self.right() + margin;
        let expanded_bottom = self.bottom() + margin;
        Self {
            x: expanded_x,
            y: expanded_y,
            width: expanded_right - expanded_x + 1,
            height: expanded_bottom - expanded_y + 1,
            is_start: self.is_start,
            is_boss: self.is_boss,
            is_secure: self.is_secure,
        }
    }

    pub(super) fn intersects(&self, other: &Self) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    /// True when `pos` lies on the one-tile wall ring around the room.
    pub fn on_perimeter_ring(&self, pos: Pos) -> bool {
        self.expanded(1).contains(pos) && !self.contains(pos)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonsterSpawn {
    pub kind: MonsterKind,
    pub pos: Pos,
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NpcSpawn {
    pub kind: NpcKind,
    pub pos: Pos,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemSpawn {
    pub kind: ItemKind,
    pub pos: Pos,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectSpawn {
    pub kind: ObjectKind,
    pub pos: Pos,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedLevel {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<TileKind>,
    pub rooms: Vec<Room>,
    /// The single UP stairs tile; also the spawn-ring origin.
    pub entry_tile: Pos,
    /// The single DOWN stairs tile.
    pub down_stairs_tile: Pos,
    pub monster_spawns: Vec<MonsterSpawn>,
    pub npc_spawns: Vec<NpcSpawn>,
    pub item_spawns: Vec<ItemSpawn>,
    pub object_spawns: Vec<ObjectSpawn>,
    /// Vertex-disjoint entrance-to-exit route count after augmentation.
    pub disjoint_path_count: u32,
    pub events: Vec<GenEvent>,
}

impl GeneratedLevel {
    pub fn tile_at(&self, pos: Pos) -> TileKind {
        if pos.x < 0 || pos.y < 0 {
            return TileKind::Wall;
        }
        let x = pos.x as usize;
        let y = pos.y as usize;
        if x >= self.width || y >= self.height {
            return TileKind::Wall;
        }
        self.tiles[y * self.width + x]
    }

    /// Stable byte encoding of everything gameplay-relevant. Two levels are
    /// the same level iff their canonical bytes match; diagnostics events
    /// are deliberately excluded.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        for tile in &self.tiles {
            bytes.push(tile_code(*tile));
        }

        bytes.extend((self.rooms.len() as u32).to_le_bytes());
        for room in &self.rooms {
            bytes.extend((room.x as u32).to_le_bytes());
            bytes.extend((room.y as u32).to_le_bytes());
            bytes.extend((room.width as u32).to_le_bytes());
            bytes.extend((room.height as u32).to_le_bytes());
            bytes.push(u8::from(room.is_start));
            bytes.push(u8::from(room.is_boss));
            bytes.push(u8::from(room.is_secure));
        }

        push_pos(&mut bytes, self.entry_tile);
        push_pos(&mut bytes, self.down_stairs_tile);

        bytes.extend((self.monster_spawns.len() as u32).to_le_bytes());
        for spawn in &self.monster_spawns {
            bytes.push(monster_code(spawn.kind));
            push_pos(&mut bytes, spawn.pos);
            bytes.extend(spawn.hp.to_le_bytes());
            bytes.extend(spawn.attack.to_le_bytes());
            bytes.extend(spawn.defense.to_le_bytes());
            bytes.extend(spawn.speed.to_le_bytes());
        }

        bytes.extend((self.npc_spawns.len() as u32).to_le_bytes());
        for spawn in &self.npc_spawns {
            bytes.push(match spawn.kind {
                NpcKind::Merchant => 0,
                NpcKind::Gambler => 1,
            });
            push_pos(&mut bytes, spawn.pos);
        }

        bytes.extend((self.item_spawns.len() as u32).to_le_bytes());
        for spawn in &self.item_spawns {
            push_item_kind(&mut bytes, spawn.kind);
            push_pos(&mut bytes, spawn.pos);
        }

        bytes.extend((self.object_spawns.len() as u32).to_le_bytes());
        for spawn in &self.object_spawns {
            match spawn.kind {
                ObjectKind::Trap { damage } => {
                    bytes.push(0);
                    bytes.extend(damage.to_le_bytes());
                }
                ObjectKind::Shrine => bytes.push(1),
                ObjectKind::Altar => bytes.push(2),
                ObjectKind::Crate => bytes.push(3),
                ObjectKind::Barrel => bytes.push(4),
            }
            push_pos(&mut bytes, spawn.pos);
        }

        bytes.extend(self.disjoint_path_count.to_le_bytes());
        bytes
    }
}

fn push_pos(bytes: &mut Vec<u8>, pos: Pos) {
    bytes.extend(pos.y.to_le_bytes());
    bytes.extend(pos.x.to_le_bytes());
}

fn push_item_kind(bytes: &mut Vec<u8>, kind: ItemKind) {
    match kind {
        ItemKind::Key => bytes.push(0),
        ItemKind::Consumable(id) => {
            bytes.push(1);
            bytes.extend((id.len() as u32).to_le_bytes());
            bytes.extend(id.as_bytes());
        }
        ItemKind::Relic(id) => {
            bytes.push(2);
            bytes.extend((id.len() as u32).to_le_bytes());
            bytes.extend(id.as_bytes());
        }
    }
}

fn tile_code(tile: TileKind) -> u8 {
    match tile {
        TileKind::Wall => 0,
        TileKind::Floor => 1,
        TileKind::Door => 2,
        TileKind::UpStairs => 3,
        TileKind::DownStairs => 4,
    }
}

fn monster_code(kind: MonsterKind) -> u8 {
    match kind {
        MonsterKind::CarrionRat => 0,
        MonsterKind::BoneScuttler => 1,
        MonsterKind::MarrowHound => 2,
        MonsterKind::Ghoul => 3,
        MonsterKind::HollowKnight => 4,
        MonsterKind::Wraith => 5,
        MonsterKind::GraveTitan => 6,
        MonsterKind::CryptWarden => 7,
    }
}
