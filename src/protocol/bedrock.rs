//! The Bedrock edition protocol, as spoken between the client and the
//! gateway.
//!
//! `client` holds packets sent by the Bedrock client; `server` holds
//! packets the gateway sends in the server's role.

pub mod client;
pub mod server;

/// Well-known Bedrock container ids.
pub mod container_id {
    pub const INVENTORY: u32 = 0;
    pub const OFFHAND: u32 = 119;
    pub const ARMOR: u32 = 120;
    pub const UI: u32 = 124;
}

/// A Bedrock item. Air is represented by [`ItemData::AIR`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemData {
    pub network_id: i32,
    pub count: u8,
    pub damage: u16,
    /// Runtime id of the block placed by this item, or 0.
    pub block_runtime_id: u32,
    pub tag: Option<ItemTag>,
}

impl ItemData {
    pub const AIR: ItemData = ItemData {
        network_id: 0,
        count: 0,
        damage: 0,
        block_runtime_id: 0,
        tag: None,
    };

    pub fn is_air(&self) -> bool {
        self.network_id == 0 || self.count == 0
    }
}

/// Item NBT fields carried over from Java components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemTag {
    pub custom_name: Option<String>,
    pub damage: Option<i32>,
    pub enchanted: bool,
}

/// Bedrock's named slot regions, used by item stack requests and
/// responses to address a slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ContainerSlotType {
    LevelEntity,
    Container,
    FurnaceIngredient,
    FurnaceFuel,
    FurnaceResult,
    BlastFurnaceIngredient,
    SmokerIngredient,
    HorseEquip,
    Trade2Ingredient1,
    Trade2Ingredient2,
    Trade2Result,
    HotbarAndInventory,
    Inventory,
    Hotbar,
    Armor,
    Offhand,
    CraftingInput,
    CraftingOutput,
    CreatedOutput,
    Cursor,
    AnvilInput,
    AnvilMaterial,
    AnvilResult,
}

/// Bedrock container window types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum ContainerType {
    Inventory = -1,
    Container = 0,
    Furnace = 2,
    Anvil = 5,
    Dispenser = 6,
    Hopper = 8,
    Horse = 12,
    Trade = 15,
    BlastFurnace = 27,
    Smoker = 28,
}

impl ContainerType {
    pub fn id(self) -> i8 {
        self as i8
    }
}
