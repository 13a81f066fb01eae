//! Typed packet values for both protocols.
//!
//! Byte-level encoding is handled by the codec that feeds the gateway,
//! so only the fields the translation layer reads or writes are modeled.
//! Each direction of each protocol is one enum; the enums derive
//! [`Packet`], which produces the kind tag used to key the translator
//! registry.

use std::{fmt::Debug, hash::Hash};

pub mod bedrock;
pub mod java;

/// An enum of every packet travelling in one direction of one protocol.
pub trait Packet: Debug + AsRef<str> + Send + Sync + 'static {
    /// Fieldless tag with one value per packet struct.
    type Kind: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;
}

/// Implemented by each concrete packet struct for the enum that carries it.
pub trait PacketVariant<P: Packet>: Sized + 'static {
    const KIND: P::Kind;

    /// Borrows the concrete packet out of the enum, or `None`
    /// if `packet` is a different variant.
    fn extract(packet: &P) -> Option<&Self>;
}
