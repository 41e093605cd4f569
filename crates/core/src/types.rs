use slotmap::new_key_type;

new_key_type! {
    pub struct MonsterId;
    pub struct NpcId;
    pub struct ItemId;
    pub struct ObjectId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TileKind {
    Wall,
    Floor,
    Door,
    UpStairs,
    DownStairs,
}

impl TileKind {
    /// Walkability as the generation pipeline sees it: doors and stairs are
    /// part of the traversable level graph even though the runtime movement
    /// oracle treats them as blocked until interacted with.
    pub fn is_route_walkable(self) -> bool {
        matches!(
            self,
            TileKind::Floor | TileKind::Door | TileKind::UpStairs | TileKind::DownStairs
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MonsterKind {
    CarrionRat,
    BoneScuttler,
    MarrowHound,
    Ghoul,
    HollowKnight,
    Wraith,
    GraveTitan,
    CryptWarden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NpcKind {
    Merchant,
    Gambler,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemKind {
    Key,
    Consumable(&'static str),
    Relic(&'static str),
}

/// Static placed objects. Each variant carries only the fields its kind
/// actually needs; interaction systems dispatch on the variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectKind {
    Trap { damage: i32 },
    Shrine,
    Altar,
    Crate,
    Barrel,
}

impl ObjectKind {
    pub fn blocks_movement(self) -> bool {
        matches!(self, ObjectKind::Crate | ObjectKind::Barrel | ObjectKind::Altar)
    }

    pub fn blocks_sight(self) -> bool {
        matches!(self, ObjectKind::Crate | ObjectKind::Barrel)
    }

    pub fn is_breakable(self) -> bool {
        matches!(self, ObjectKind::Crate | ObjectKind::Barrel)
    }
}

/// Live-entity reference used by occupancy queries that must exclude the
/// asking entity itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityRef {
    Monster(MonsterId),
    Npc(NpcId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerateError {
    /// Not a single room fit the requested grid. The caller holds no usable
    /// level and must retry with a new seed or different dimensions.
    NoRoomsPlaced,
}

/// Ordered diagnostics accumulated during generation. Best-effort shortfalls
/// land here instead of becoming errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenEvent {
    RoomShortfall { requested: usize, placed: usize },
    ForcedConnector { room_index: usize },
    RoomStitched { room_index: usize },
    StitchFailed { room_index: usize },
    RedundancyBelowTarget { measured: u32, target: u32 },
    ItemPlacementSkipped { kind: ItemKind },
    AltarEvicted { pos: Pos },
    AltarSkipped,
}
