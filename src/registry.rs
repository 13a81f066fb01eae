//! Packet kind → translator lookup, one registry per inbound direction.

use crate::{
    protocol::{Packet, PacketVariant},
    session::Session,
    translator::Translator,
};
use ahash::AHashMap;

/// A translator with its concrete packet type erased, so translators for
/// different packets can share one map.
trait ErasedTranslator<P: Packet>: Send + Sync {
    fn translate_erased(&self, session: &mut Session, packet: &P);
}

impl<P, T> ErasedTranslator<P> for T
where
    P: Packet,
    T: Translator<Source = P>,
{
    fn translate_erased(&self, session: &mut Session, packet: &P) {
        match T::Packet::extract(packet) {
            Some(inner) => self.translate(session, inner),
            None => tracing::error!(
                "Translator for {:?} was handed a {}",
                T::Packet::KIND,
                packet.as_ref()
            ),
        }
    }
}

/// Collects translators at startup.
pub struct TranslatorRegistryBuilder<P: Packet> {
    translators: AHashMap<P::Kind, Box<dyn ErasedTranslator<P>>>,
}

impl<P: Packet> Default for TranslatorRegistryBuilder<P> {
    fn default() -> Self {
        Self {
            translators: AHashMap::new(),
        }
    }
}

impl<P: Packet> TranslatorRegistryBuilder<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `translator` for its packet kind. A later registration
    /// for the same kind replaces the earlier one.
    pub fn register<T>(mut self, translator: T) -> Self
    where
        T: Translator<Source = P>,
    {
        let kind = T::Packet::KIND;
        if self.translators.insert(kind, Box::new(translator)).is_some() {
            tracing::warn!("Translator for {kind:?} registered twice; keeping the later one");
        }
        self
    }

    pub fn build(self) -> TranslatorRegistry<P> {
        TranslatorRegistry {
            translators: self.translators,
        }
    }
}

/// Immutable translator table shared by every session.
pub struct TranslatorRegistry<P: Packet> {
    translators: AHashMap<P::Kind, Box<dyn ErasedTranslator<P>>>,
}

impl<P: Packet> TranslatorRegistry<P> {
    pub fn builder() -> TranslatorRegistryBuilder<P> {
        TranslatorRegistryBuilder::new()
    }

    /// Runs the translator registered for `packet`'s kind. Packets without
    /// one are dropped. Returns whether a translator ran.
    pub fn dispatch(&self, session: &mut Session, packet: &P) -> bool {
        match self.translators.get(&packet.kind()) {
            Some(translator) => {
                tracing::trace!("Translating {}", packet.as_ref());
                translator.translate_erased(session, packet);
                true
            }
            None => {
                tracing::debug!("No translator for {}; dropping", packet.as_ref());
                false
            }
        }
    }

    pub fn is_registered(&self, kind: P::Kind) -> bool {
        self.translators.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.translators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translators.is_empty()
    }
}
