//! Static translation tables loaded at startup: block states and items.
//!
//! Tables are immutable once built. [`MappingsHandle`] publishes a new
//! set atomically on reload; sessions pick it up at the start of their
//! next dispatch cycle.

pub mod blocks;
pub mod items;

use crate::mappings::{
    blocks::{BlockMappingSource, BlockStateTable},
    items::{ItemMappingSource, ItemMappings},
};
use std::{path::Path, sync::Arc};
use tokio::sync::watch;

#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error(
        "Bedrock palette entry {bedrock_id} is claimed by Java state {first} and Java state {second}"
    )]
    DuplicateBedrockState {
        bedrock_id: u32,
        first: u32,
        second: u32,
    },
    #[error("Java state {java_id} is mapped to Bedrock palette entries {first} and {second}")]
    DuplicateJavaState { java_id: u32, first: u32, second: u32 },
    #[error("Java item {java_id} is mapped to both {first} and {second}")]
    DuplicateItem {
        java_id: i32,
        first: String,
        second: String,
    },
    #[error("fallback Java state {0} is not in the block table")]
    UnknownFallback(u32),
    #[error("custom block override targets unknown block {0}")]
    UnknownBlock(String),
    #[error("custom block override for Bedrock entry {0} names neither a state nor a block")]
    EmptyOverride(u32),
    #[error("block table has more states than fit in a 32-bit id")]
    TooManyStates,
    #[error("malformed mapping data: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Unvalidated mapping data.
#[derive(Debug, Clone, Default)]
pub struct MappingSource {
    pub blocks: BlockMappingSource,
    pub items: ItemMappingSource,
}

impl MappingSource {
    pub fn from_json(blocks: &str, items: &str) -> Result<Self, MappingError> {
        Ok(Self {
            blocks: serde_json::from_str(blocks)?,
            items: serde_json::from_str(items)?,
        })
    }

    pub fn from_paths(blocks: &Path, items: &Path) -> Result<Self, MappingError> {
        let blocks = fs_err::read_to_string(blocks)?;
        let items = fs_err::read_to_string(items)?;
        Self::from_json(&blocks, &items)
    }
}

/// One validated, immutable set of tables.
#[derive(Debug, Clone)]
pub struct Mappings {
    pub blocks: BlockStateTable,
    pub items: ItemMappings,
}

impl Mappings {
    pub fn build(source: MappingSource) -> Result<Self, MappingError> {
        Ok(Self {
            blocks: BlockStateTable::from_source(source.blocks)?,
            items: ItemMappings::from_source(source.items)?,
        })
    }
}

/// Shared handle to the current tables.
#[derive(Debug, Clone)]
pub struct MappingsHandle {
    sender: Arc<watch::Sender<Arc<Mappings>>>,
}

impl MappingsHandle {
    pub fn new(mappings: Mappings) -> Self {
        let (sender, _) = watch::channel(Arc::new(mappings));
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn current(&self) -> Arc<Mappings> {
        Arc::clone(&self.sender.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Mappings>> {
        self.sender.subscribe()
    }

    /// Validates and publishes new tables. On failure the current tables
    /// stay in effect.
    pub fn reload(&self, source: MappingSource) -> Result<(), MappingError> {
        let mappings = Mappings::build(source)?;
        tracing::info!(
            "Reloaded mappings: {} block states, {} items",
            mappings.blocks.len(),
            mappings.items.len()
        );
        self.sender.send_replace(Arc::new(mappings));
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub const BLOCKS_JSON: &str = r#"{ "blocks": [
        { "java_identifier": "minecraft:air", "bedrock_id": 0 },
        { "java_identifier": "minecraft:stone", "bedrock_id": 1 },
        { "java_identifier": "minecraft:water[level=0]", "bedrock_id": 2 },
        { "java_identifier": "minecraft:chest[facing=north,type=single,waterlogged=false]", "bedrock_id": 3, "block_entity": true },
        { "java_identifier": "minecraft:chest[facing=north,type=single,waterlogged=true]", "bedrock_id": 4, "block_entity": true },
        { "java_identifier": "minecraft:anvil[facing=north]", "bedrock_id": 5 }
    ] }"#;

    pub const ITEMS_JSON: &str = r#"{ "items": [
        { "java_id": 1, "java_identifier": "minecraft:stone", "bedrock_id": 1,
          "bedrock_identifier": "minecraft:stone", "block_java_state": 1 },
        { "java_id": 800, "java_identifier": "minecraft:emerald", "bedrock_id": 512,
          "bedrock_identifier": "minecraft:emerald" },
        { "java_id": 801, "java_identifier": "minecraft:bread", "bedrock_id": 261,
          "bedrock_identifier": "minecraft:bread" },
        { "java_id": 802, "java_identifier": "minecraft:iron_sword", "bedrock_id": 307,
          "bedrock_identifier": "minecraft:iron_sword", "stack_size": 1 }
    ] }"#;

    pub fn mappings() -> Mappings {
        Mappings::build(MappingSource::from_json(BLOCKS_JSON, ITEMS_JSON).unwrap()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_reload_keeps_current_tables() {
        let handle = MappingsHandle::new(test_support::mappings());
        let receiver = handle.subscribe();
        let before = handle.current();

        let mut broken = MappingSource::from_json(
            test_support::BLOCKS_JSON,
            test_support::ITEMS_JSON,
        )
        .unwrap();
        broken.blocks.fallback_java_id = 1000;
        assert!(handle.reload(broken).is_err());
        assert!(Arc::ptr_eq(&before, &handle.current()));
        assert!(!receiver.has_changed().unwrap());
    }

    #[test]
    fn successful_reload_is_observed() {
        let handle = MappingsHandle::new(test_support::mappings());
        let mut receiver = handle.subscribe();
        let source = MappingSource::from_json(
            r#"{ "blocks": [ { "java_identifier": "minecraft:air", "bedrock_id": 9 } ] }"#,
            r#"{ "items": [] }"#,
        )
        .unwrap();
        handle.reload(source).unwrap();
        assert!(receiver.has_changed().unwrap());
        assert_eq!(receiver.borrow_and_update().blocks.bedrock_id(0), 9);
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            MappingSource::from_json("{", "{}"),
            Err(MappingError::Json(_))
        ));
    }
}
