//! Translators for packets sent by the Bedrock client.

mod inventory;
mod player;

use crate::{protocol::bedrock::client::Packet, registry::TranslatorRegistryBuilder};

pub fn register(builder: TranslatorRegistryBuilder<Packet>) -> TranslatorRegistryBuilder<Packet> {
    builder
        .register(player::SetLocalPlayerAsInitializedTranslator)
        .register(player::MovePlayerTranslator)
        .register(player::DisconnectTranslator)
        .register(inventory::ContainerCloseTranslator)
        .register(inventory::ItemStackRequestTranslator)
        .register(inventory::FilterTextTranslator)
}
