//! Packets the gateway sends to the Bedrock client.

use crate::{
    position::{BlockPosition, Vec3f},
    protocol::bedrock::{ContainerSlotType, ContainerType, ItemData},
};
use minecraft_bedrock_gateway_macros::Packet;

#[derive(Debug, Clone, Packet, strum::AsRefStr, strum::EnumDiscriminants)]
#[strum_discriminants(name(PacketKind), derive(Hash))]
#[packet(kind = "PacketKind")]
pub enum Packet {
    StartGame(StartGame),
    PlayStatus(PlayStatus),
    Disconnect(Disconnect),
    Transfer(Transfer),
    MovePlayer(MovePlayer),
    AddEntity(AddEntity),
    RemoveEntity(RemoveEntity),
    MoveEntityAbsolute(MoveEntityAbsolute),
    SetEntityLink(SetEntityLink),
    UpdateBlock(UpdateBlock),
    BlockEntityData(BlockEntityData),
    ContainerOpen(ContainerOpen),
    ContainerClose(ContainerClose),
    ContainerSetData(ContainerSetData),
    InventoryContent(InventoryContent),
    InventorySlot(InventorySlot),
    UpdateEquip(UpdateEquip),
    UpdateTrade(UpdateTrade),
    ItemStackResponse(ItemStackResponse),
}

#[derive(Debug, Clone)]
pub struct StartGame {
    pub unique_entity_id: i64,
    pub runtime_entity_id: u64,
    pub game_mode: i32,
    pub position: Vec3f,
    pub dimension: i32,
}

#[derive(Debug, Clone)]
pub struct PlayStatus {
    pub status: PlayStatusKind,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlayStatusKind {
    LoginSuccess,
    PlayerSpawn,
}

#[derive(Debug, Clone)]
pub struct Disconnect {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Transfer {
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct MovePlayer {
    pub runtime_entity_id: u64,
    pub position: Vec3f,
    pub yaw: f32,
    pub pitch: f32,
    pub teleport: bool,
}

#[derive(Debug, Clone)]
pub struct AddEntity {
    pub unique_entity_id: i64,
    pub runtime_entity_id: u64,
    pub identifier: String,
    pub position: Vec3f,
    pub pitch: f32,
    pub yaw: f32,
    /// Rendering scale; 0 hides the entity.
    pub scale: f32,
}

#[derive(Debug, Clone)]
pub struct RemoveEntity {
    pub unique_entity_id: i64,
}

#[derive(Debug, Clone)]
pub struct MoveEntityAbsolute {
    pub runtime_entity_id: u64,
    pub position: Vec3f,
    pub pitch: f32,
    pub yaw: f32,
    pub on_ground: bool,
    pub teleported: bool,
}

#[derive(Debug, Clone)]
pub struct SetEntityLink {
    pub from_unique_entity_id: i64,
    pub to_unique_entity_id: i64,
    pub link: EntityLinkKind,
    pub immediate: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntityLinkKind {
    Remove,
    Rider,
    Passenger,
}

#[derive(Debug, Clone)]
pub struct UpdateBlock {
    pub position: BlockPosition,
    pub runtime_id: u32,
    /// 0 for the block itself, 1 for the liquid layer.
    pub layer: u32,
    pub priority: bool,
}

#[derive(Debug, Clone)]
pub struct BlockEntityData {
    pub position: BlockPosition,
    pub data: BlockEntityTag,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockEntityTag {
    Chest {
        custom_name: String,
        /// The other half of a double chest.
        pair: Option<BlockPosition>,
    },
}

#[derive(Debug, Clone)]
pub struct ContainerOpen {
    pub container_id: u8,
    pub container_type: ContainerType,
    pub position: BlockPosition,
    /// Holder entity, or -1 for block-held containers.
    pub unique_entity_id: i64,
}

#[derive(Debug, Clone)]
pub struct ContainerClose {
    pub container_id: u8,
    pub server_initiated: bool,
}

#[derive(Debug, Clone)]
pub struct ContainerSetData {
    pub container_id: u8,
    pub property: i32,
    pub value: i32,
}

#[derive(Debug, Clone)]
pub struct InventoryContent {
    pub container_id: u32,
    pub items: Vec<ItemData>,
}

#[derive(Debug, Clone)]
pub struct InventorySlot {
    pub container_id: u32,
    pub slot: u32,
    pub item: ItemData,
}

/// Opens an entity-held equipment window (horses and relatives).
#[derive(Debug, Clone)]
pub struct UpdateEquip {
    pub container_id: u8,
    pub container_type: ContainerType,
    pub size: u32,
    pub unique_entity_id: i64,
    pub slots: Vec<EquipSlot>,
}

/// Describes one equipment slot and the items the UI accepts in it.
#[derive(Debug, Clone, PartialEq)]
pub struct EquipSlot {
    pub slot_number: u32,
    pub accepted_items: Vec<String>,
}

/// Opens the trading window with the given offers.
#[derive(Debug, Clone)]
pub struct UpdateTrade {
    pub container_id: u8,
    pub container_type: ContainerType,
    pub trade_tier: i32,
    pub display_name: String,
    pub trader_unique_entity_id: i64,
    pub player_unique_entity_id: i64,
    pub offers: Vec<TradeOffer>,
    pub tier_exp_requirements: Vec<i32>,
    pub new_trading_ui: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeOffer {
    /// 1-based; matches the recipe network id of the selecting request.
    pub net_id: u32,
    pub buy_a: ItemData,
    pub buy_b: Option<ItemData>,
    pub sell: ItemData,
    pub uses: i32,
    pub max_uses: i32,
    pub tier: i32,
    pub trader_exp: i32,
    pub demand: i32,
    pub price_multiplier: f32,
}

#[derive(Debug, Clone)]
pub struct ItemStackResponse {
    pub responses: Vec<StackResponse>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackResponse {
    pub request_id: i32,
    pub status: StackResponseStatus,
    /// Slots touched by an accepted request.
    pub containers: Vec<StackResponseContainer>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StackResponseStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackResponseContainer {
    pub container: ContainerSlotType,
    pub slots: Vec<u8>,
}
