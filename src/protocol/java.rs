//! The Java edition protocol, as spoken between the gateway and the
//! destination server.
//!
//! `server` holds packets sent by the server; `client` holds packets the
//! gateway sends in the client's role.

pub mod client;
pub mod server;

/// Protocol version announced in the handshake.
pub const PROTOCOL_VERSION: i32 = 767; // 1.21

/// Sentinel container id used by the server for the cursor slot.
pub const CURSOR_CONTAINER_ID: i32 = -1;

/// Container id of the player's own inventory, which is always open.
pub const PLAYER_CONTAINER_ID: i32 = 0;

/// A non-empty Java item stack. Empty slots are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStack {
    /// Item registry id.
    pub item_id: i32,
    pub count: u8,
    pub components: ItemComponents,
}

impl ItemStack {
    pub fn new(item_id: i32, count: u8) -> Self {
        Self {
            item_id,
            count,
            components: ItemComponents::default(),
        }
    }
}

/// The subset of data components the gateway carries across.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemComponents {
    pub damage: Option<i32>,
    pub custom_name: Option<String>,
    pub enchantment_glint: bool,
}

/// Namespaced entity type identifier, e.g. `minecraft:villager`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityType(String);

impl EntityType {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One trade offered by a merchant.
#[derive(Debug, Clone, PartialEq)]
pub struct MerchantOffer {
    pub first_input: ItemStack,
    pub second_input: Option<ItemStack>,
    pub output: ItemStack,
    pub disabled: bool,
    pub uses: i32,
    pub max_uses: i32,
    pub xp: i32,
    pub special_price: i32,
    pub price_multiplier: f32,
    pub demand: i32,
}

/// Click modes of the container click packet.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClickMode {
    Pickup,
    QuickMove,
    Swap,
    Throw,
}
