//! Packet translators and the registries they are collected into.

pub mod bedrock;
pub mod java;

use crate::{
    protocol::{self, Packet, PacketVariant},
    registry::TranslatorRegistry,
    session::Session,
};

/// Translates one concrete packet type.
///
/// Translators are stateless; everything they touch lives in the session.
/// A translator decides for itself which phases it acts in.
pub trait Translator: Send + Sync + 'static {
    /// The direction enum the packet arrives in.
    type Source: Packet;
    type Packet: PacketVariant<Self::Source>;

    fn translate(&self, session: &mut Session, packet: &Self::Packet);
}

pub type JavaRegistry = TranslatorRegistry<protocol::java::server::Packet>;
pub type BedrockRegistry = TranslatorRegistry<protocol::bedrock::client::Packet>;

/// Translators for packets from the Java server.
pub fn java_registry() -> JavaRegistry {
    java::register(TranslatorRegistry::builder()).build()
}

/// Translators for packets from the Bedrock client.
pub fn bedrock_registry() -> BedrockRegistry {
    bedrock::register(TranslatorRegistry::builder()).build()
}

/// Whether the session is in one of `phases`; logs when it is not.
pub(crate) fn in_phase(session: &Session, phases: &[crate::phase::Phase], packet: &str) -> bool {
    let phase = session.phase();
    if phases.contains(&phase) {
        return true;
    }
    tracing::debug!("Ignoring {packet} in phase {phase:?}");
    false
}
