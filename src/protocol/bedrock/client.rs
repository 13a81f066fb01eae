//! Packets sent by the Bedrock client.

use crate::{position::Vec3f, protocol::bedrock::ContainerSlotType};
use minecraft_bedrock_gateway_macros::Packet;

#[derive(Debug, Clone, Packet, strum::AsRefStr, strum::EnumDiscriminants)]
#[strum_discriminants(name(PacketKind), derive(Hash))]
#[packet(kind = "PacketKind")]
pub enum Packet {
    SetLocalPlayerAsInitialized(SetLocalPlayerAsInitialized),
    MovePlayer(MovePlayer),
    Animate(Animate),
    ContainerClose(ContainerClose),
    ItemStackRequest(ItemStackRequest),
    FilterText(FilterText),
    Disconnect(Disconnect),
}

/// Sent once the client has finished loading and is ready to play.
#[derive(Debug, Clone)]
pub struct SetLocalPlayerAsInitialized {
    pub runtime_entity_id: u64,
}

#[derive(Debug, Clone)]
pub struct MovePlayer {
    pub runtime_entity_id: u64,
    pub position: Vec3f,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

#[derive(Debug, Clone)]
pub struct Animate {
    pub action: i32,
    pub runtime_entity_id: u64,
}

#[derive(Debug, Clone)]
pub struct ContainerClose {
    pub container_id: u8,
    pub server_initiated: bool,
}

/// A batch of inventory requests. Bedrock predicts each request locally
/// and waits for a matching response to confirm or revert it.
#[derive(Debug, Clone)]
pub struct ItemStackRequest {
    pub requests: Vec<StackRequest>,
}

#[derive(Debug, Clone)]
pub struct StackRequest {
    pub request_id: i32,
    pub actions: Vec<StackRequestAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StackRequestAction {
    Take {
        count: u8,
        source: StackRequestSlot,
        destination: StackRequestSlot,
    },
    Place {
        count: u8,
        source: StackRequestSlot,
        destination: StackRequestSlot,
    },
    Swap {
        source: StackRequestSlot,
        destination: StackRequestSlot,
    },
    Drop {
        count: u8,
        source: StackRequestSlot,
    },
    /// Also used by trade windows to pick an offer, identified by its
    /// network id.
    CraftRecipe { recipe_network_id: u32 },
    /// A recipe taking text input, such as an anvil rename. The codec
    /// resolves the request's filter string index into `filter_string`.
    CraftRecipeOptional {
        recipe_network_id: u32,
        filter_string: Option<String>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StackRequestSlot {
    pub container: ContainerSlotType,
    pub slot: u8,
}

/// Text typed into a window's text field, such as the anvil name.
#[derive(Debug, Clone)]
pub struct FilterText {
    pub text: String,
    pub from_server: bool,
}

#[derive(Debug, Clone)]
pub struct Disconnect {
    pub reason: String,
}
