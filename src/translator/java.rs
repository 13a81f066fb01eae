//! Translators for packets sent by the Java server.

mod connection;
mod entity;
mod inventory;
mod player;
mod world;

pub(crate) use player::PLAYER_EYE_HEIGHT;

use crate::{protocol::java::server::Packet, registry::TranslatorRegistryBuilder};

pub fn register(builder: TranslatorRegistryBuilder<Packet>) -> TranslatorRegistryBuilder<Packet> {
    builder
        .register(connection::LoginSuccessTranslator)
        .register(connection::FinishConfigurationTranslator)
        .register(connection::KeepAliveTranslator)
        .register(connection::DisconnectTranslator)
        .register(connection::StartConfigurationTranslator)
        .register(connection::TransferTranslator)
        .register(player::LoginTranslator)
        .register(player::PlayerPositionTranslator)
        .register(entity::SpawnEntityTranslator)
        .register(entity::RemoveEntitiesTranslator)
        .register(entity::TeleportEntityTranslator)
        .register(world::BlockUpdateTranslator)
        .register(inventory::OpenScreenTranslator)
        .register(inventory::OpenHorseScreenTranslator)
        .register(inventory::SetContainerContentTranslator)
        .register(inventory::SetContainerSlotTranslator)
        .register(inventory::SetContainerPropertyTranslator)
        .register(inventory::CloseContainerTranslator)
        .register(inventory::MerchantOffersTranslator)
}
