//! Bidirectional mapping between Java entity ids and the Bedrock ids the
//! gateway hands to the client.
//!
//! Owned by a single session and only touched from that session's task,
//! so it needs no synchronization.

use crate::{
    entity_id::{BedrockEntityId, JavaEntityId},
    protocol::java::EntityType,
};
use ahash::AHashMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityEntry {
    pub java_id: JavaEntityId,
    pub bedrock_id: BedrockEntityId,
    pub uuid: Option<Uuid>,
    pub kind: EntityType,
}

/// Entity identity mappings for one session.
///
/// Bedrock ids are allocated from a counter and never handed out twice
/// during the registry's lifetime, so a stale Bedrock id can never alias
/// a newer entity.
#[derive(Debug)]
pub struct IdentityRegistry {
    by_java: AHashMap<JavaEntityId, IdentityEntry>,
    by_bedrock: AHashMap<BedrockEntityId, JavaEntityId>,
    by_uuid: AHashMap<Uuid, JavaEntityId>,
    next_id: u64,
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self {
            by_java: AHashMap::new(),
            by_bedrock: AHashMap::new(),
            by_uuid: AHashMap::new(),
            next_id: 1,
        }
    }

    /// Records a spawned Java entity and allocates its Bedrock id.
    ///
    /// If `java_id` is already mapped (the server reused an id without
    /// removing the entity first), the old entry is replaced and returned
    /// so the caller can despawn it on the client.
    pub fn map_entity(
        &mut self,
        java_id: JavaEntityId,
        uuid: Option<Uuid>,
        kind: EntityType,
    ) -> (BedrockEntityId, Option<IdentityEntry>) {
        let stale = self.release(java_id);
        if let Some(stale) = &stale {
            tracing::warn!(
                "Entity {java_id} spawned again without being removed; replacing {} ({})",
                stale.bedrock_id,
                stale.kind.as_str(),
            );
        }

        let bedrock_id = self.allocate_local();
        if let Some(uuid) = uuid {
            if let Some(previous) = self.by_uuid.insert(uuid, java_id) {
                tracing::debug!("UUID {uuid} moved from {previous} to {java_id}");
            }
        }
        self.by_bedrock.insert(bedrock_id, java_id);
        self.by_java.insert(
            java_id,
            IdentityEntry {
                java_id,
                bedrock_id,
                uuid,
                kind,
            },
        );
        (bedrock_id, stale)
    }

    /// Allocates a Bedrock id with no Java counterpart, for entities the
    /// gateway creates on its own (the local player, fake traders).
    pub fn allocate_local(&mut self) -> BedrockEntityId {
        let id = BedrockEntityId::new(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn internal_id(&self, java_id: JavaEntityId) -> Option<BedrockEntityId> {
        self.by_java.get(&java_id).map(|entry| entry.bedrock_id)
    }

    pub fn external_id(&self, bedrock_id: BedrockEntityId) -> Option<JavaEntityId> {
        self.by_bedrock.get(&bedrock_id).copied()
    }

    pub fn entry(&self, java_id: JavaEntityId) -> Option<&IdentityEntry> {
        self.by_java.get(&java_id)
    }

    pub fn by_uuid(&self, uuid: Uuid) -> Option<&IdentityEntry> {
        self.by_uuid
            .get(&uuid)
            .and_then(|java_id| self.by_java.get(java_id))
    }

    /// Removes the mapping for a despawned entity, returning it if
    /// it existed.
    pub fn release(&mut self, java_id: JavaEntityId) -> Option<IdentityEntry> {
        let entry = self.by_java.remove(&java_id)?;
        self.by_bedrock.remove(&entry.bedrock_id);
        if let Some(uuid) = entry.uuid {
            if self.by_uuid.get(&uuid) == Some(&java_id) {
                self.by_uuid.remove(&uuid);
            }
        }
        Some(entry)
    }

    /// Drops every mapping. The id counter keeps counting.
    pub fn clear(&mut self) -> Vec<IdentityEntry> {
        self.by_bedrock.clear();
        self.by_uuid.clear();
        self.by_java.drain().map(|(_, entry)| entry).collect()
    }

    pub fn len(&self) -> usize {
        self.by_java.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_java.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IdentityEntry> {
        self.by_java.values()
    }
}
