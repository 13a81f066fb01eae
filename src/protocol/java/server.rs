//! Packets sent by the Java server.
//!
//! Login, configuration and play packets share one enum because the
//! session, not the type system, tracks the connection phase.

use crate::{
    position::BlockPosition,
    protocol::java::{EntityType, ItemStack, MerchantOffer},
};
use minecraft_bedrock_gateway_macros::Packet;
use uuid::Uuid;

#[derive(Debug, Clone, Packet, strum::AsRefStr, strum::EnumDiscriminants)]
#[strum_discriminants(name(PacketKind), derive(Hash))]
#[packet(kind = "PacketKind")]
pub enum Packet {
    // Login
    LoginSuccess(LoginSuccess),
    // Login, configuration and play
    Disconnect(Disconnect),
    KeepAlive(KeepAlive),
    // Configuration
    FinishConfiguration(FinishConfiguration),
    // Play
    BundleDelimiter(BundleDelimiter),
    Login(Login),
    PlayerPosition(PlayerPosition),
    StartConfiguration(StartConfiguration),
    Transfer(Transfer),
    SystemChat(SystemChat),
    SpawnEntity(SpawnEntity),
    RemoveEntities(RemoveEntities),
    TeleportEntity(TeleportEntity),
    BlockUpdate(BlockUpdate),
    OpenScreen(OpenScreen),
    OpenHorseScreen(OpenHorseScreen),
    SetContainerContent(SetContainerContent),
    SetContainerSlot(SetContainerSlot),
    SetContainerProperty(SetContainerProperty),
    CloseContainer(CloseContainer),
    MerchantOffers(MerchantOffers),
}

#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub uuid: Uuid,
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct Disconnect {
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct KeepAlive {
    pub id: i64,
}

#[derive(Debug, Clone)]
pub struct FinishConfiguration;

#[derive(Debug, Clone)]
pub struct BundleDelimiter;

/// Join game.
#[derive(Debug, Clone)]
pub struct Login {
    pub entity_id: i32,
    pub game_mode: u8,
    pub dimension: String,
}

/// Synchronizes the player's position; must be acknowledged.
#[derive(Debug, Clone)]
pub struct PlayerPosition {
    pub teleport_id: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
}

/// Sent when the server (or a proxy in front of it) moves the
/// player back into the configuration phase, e.g. on a server switch.
#[derive(Debug, Clone)]
pub struct StartConfiguration;

/// Asks the client to reconnect to another server.
#[derive(Debug, Clone)]
pub struct Transfer {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct SystemChat {
    pub content: String,
    pub overlay: bool,
}

#[derive(Debug, Clone)]
pub struct SpawnEntity {
    pub entity_id: i32,
    pub uuid: Uuid,
    pub kind: EntityType,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub pitch: f32,
    pub yaw: f32,
}

#[derive(Debug, Clone)]
pub struct RemoveEntities {
    pub entities: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct TeleportEntity {
    pub entity_id: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

#[derive(Debug, Clone)]
pub struct BlockUpdate {
    pub position: BlockPosition,
    /// Java block state id.
    pub block_state: u32,
}

#[derive(Debug, Clone)]
pub struct OpenScreen {
    pub container_id: i32,
    /// Menu type registry id.
    pub menu_type: i32,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct OpenHorseScreen {
    pub container_id: i32,
    /// Number of slots, including saddle and body armor.
    pub slot_count: i32,
    pub entity_id: i32,
}

#[derive(Debug, Clone)]
pub struct SetContainerContent {
    pub container_id: i32,
    pub state_id: i32,
    pub items: Vec<Option<ItemStack>>,
    pub carried: Option<ItemStack>,
}

#[derive(Debug, Clone)]
pub struct SetContainerSlot {
    pub container_id: i32,
    pub state_id: i32,
    pub slot: i16,
    pub item: Option<ItemStack>,
}

#[derive(Debug, Clone)]
pub struct SetContainerProperty {
    pub container_id: i32,
    pub property: i16,
    pub value: i16,
}

#[derive(Debug, Clone)]
pub struct CloseContainer {
    pub container_id: i32,
}

#[derive(Debug, Clone)]
pub struct MerchantOffers {
    pub container_id: i32,
    pub offers: Vec<MerchantOffer>,
    pub villager_level: i32,
    pub experience: i32,
    pub regular_villager: bool,
    pub can_restock: bool,
}
