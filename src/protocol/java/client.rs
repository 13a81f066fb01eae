//! Packets the gateway sends to the Java server.

use crate::protocol::java::{ClickMode, ItemStack};
use minecraft_bedrock_gateway_macros::Packet;
use uuid::Uuid;

#[derive(Debug, Clone, Packet, strum::AsRefStr, strum::EnumDiscriminants)]
#[strum_discriminants(name(PacketKind), derive(Hash))]
#[packet(kind = "PacketKind")]
pub enum Packet {
    Handshake(Handshake),
    LoginStart(LoginStart),
    LoginAcknowledged(LoginAcknowledged),
    FinishConfiguration(FinishConfiguration),
    ConfigurationAcknowledged(ConfigurationAcknowledged),
    KeepAlive(KeepAlive),
    AcceptTeleportation(AcceptTeleportation),
    MovePlayerPosition(MovePlayerPosition),
    ContainerClick(ContainerClick),
    CloseContainer(CloseContainer),
    SelectTrade(SelectTrade),
    RenameItem(RenameItem),
}

#[derive(Debug, Clone)]
pub struct Handshake {
    pub protocol_version: i32,
    pub server_address: String,
    pub server_port: u16,
    pub next_state: NextState,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NextState {
    Status,
    Login,
    Transfer,
}

#[derive(Debug, Clone)]
pub struct LoginStart {
    pub username: String,
    pub uuid: Uuid,
}

#[derive(Debug, Clone)]
pub struct LoginAcknowledged;

/// Acknowledges the server's finish-configuration packet.
#[derive(Debug, Clone)]
pub struct FinishConfiguration;

/// Acknowledges the server's start-configuration packet.
#[derive(Debug, Clone)]
pub struct ConfigurationAcknowledged;

#[derive(Debug, Clone)]
pub struct KeepAlive {
    pub id: i64,
}

#[derive(Debug, Clone)]
pub struct AcceptTeleportation {
    pub teleport_id: i32,
}

#[derive(Debug, Clone)]
pub struct MovePlayerPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub on_ground: bool,
}

#[derive(Debug, Clone)]
pub struct ContainerClick {
    pub container_id: i32,
    /// Last state id received from the server for this container.
    pub state_id: i32,
    pub slot: i16,
    pub button: i8,
    pub mode: ClickMode,
    /// Predicted contents of the slots this click changes.
    pub changed_slots: Vec<(i16, Option<ItemStack>)>,
    pub carried: Option<ItemStack>,
}

#[derive(Debug, Clone)]
pub struct CloseContainer {
    pub container_id: i32,
}

#[derive(Debug, Clone)]
pub struct SelectTrade {
    pub offer_index: i32,
}

/// Sets the name of the item in an open anvil.
#[derive(Debug, Clone)]
pub struct RenameItem {
    pub name: String,
}
