//! Java block state ⇄ Bedrock block palette mapping.

use crate::mappings::MappingError;
use ahash::AHashMap;
use bitflags::bitflags;
use serde::Deserialize;

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct BlockFlags: u8 {
        /// The Java state holds water; Bedrock needs water on layer 1.
        const WATERLOGGED = 1;
        /// The block carries a block entity on Java.
        const BLOCK_ENTITY = 1 << 1;
    }
}

/// One Java block state and its Bedrock palette entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStateEntry {
    pub java_id: u32,
    /// Full state string, e.g. `minecraft:oak_stairs[facing=east,...]`.
    pub java_identifier: String,
    pub bedrock_id: u32,
    pub flags: BlockFlags,
    pub hardness: f32,
    pub pick_item: Option<String>,
}

impl BlockStateEntry {
    /// The block identifier without state properties.
    pub fn block_identifier(&self) -> &str {
        block_identifier(&self.java_identifier)
    }

    pub fn is_waterlogged(&self) -> bool {
        self.flags.contains(BlockFlags::WATERLOGGED)
    }
}

fn block_identifier(state: &str) -> &str {
    state.split_once('[').map_or(state, |(block, _)| block)
}

/// Serialized block mapping data, in Java state order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockMappingSource {
    pub blocks: Vec<BlockStateRecord>,
    /// Java state used when a lookup misses. Defaults to state 0 (air).
    #[serde(default)]
    pub fallback_java_id: u32,
    /// Custom block registrations, applied as one override layer.
    #[serde(default)]
    pub custom_blocks: Vec<CustomBlockRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockStateRecord {
    /// Defaults to the record's position in the source.
    #[serde(default)]
    pub java_id: Option<u32>,
    pub java_identifier: String,
    pub bedrock_id: u32,
    #[serde(default)]
    pub waterlogged: bool,
    #[serde(default)]
    pub block_entity: bool,
    #[serde(default)]
    pub hardness: f32,
    #[serde(default)]
    pub pick_item: Option<String>,
}

/// Overrides either one Java state or every state of a Java block.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomBlockRecord {
    #[serde(default)]
    pub java_state: Option<u32>,
    #[serde(default)]
    pub java_block: Option<String>,
    pub bedrock_id: u32,
}

/// Custom registrations consulted before the base table.
#[derive(Debug, Clone, Default)]
pub struct OverrideLayer {
    states: AHashMap<u32, u32>,
    blocks: AHashMap<String, u32>,
    reverse: AHashMap<u32, u32>,
}

impl OverrideLayer {
    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.blocks.is_empty()
    }
}

/// Read-only bidirectional block table, shared by all sessions.
#[derive(Debug, Clone)]
pub struct BlockStateTable {
    by_java: AHashMap<u32, BlockStateEntry>,
    by_bedrock: AHashMap<u32, u32>,
    /// Lowest Java state of every block identifier.
    default_states: AHashMap<String, u32>,
    /// Later layers take precedence.
    layers: Vec<OverrideLayer>,
    fallback_java_id: u32,
    fallback_bedrock_id: u32,
    water_bedrock_id: Option<u32>,
}

impl BlockStateTable {
    /// Builds the table, rejecting any source that does not describe a
    /// one-to-one mapping.
    pub fn from_source(source: BlockMappingSource) -> Result<Self, MappingError> {
        let mut by_java: AHashMap<u32, BlockStateEntry> =
            AHashMap::with_capacity(source.blocks.len());
        let mut by_bedrock: AHashMap<u32, u32> = AHashMap::with_capacity(source.blocks.len());
        let mut default_states: AHashMap<String, u32> = AHashMap::new();
        let mut water_bedrock_id = None;

        for (index, record) in source.blocks.into_iter().enumerate() {
            let java_id = match record.java_id {
                Some(id) => id,
                None => u32::try_from(index).map_err(|_| MappingError::TooManyStates)?,
            };

            if let Some(existing) = by_java.get(&java_id) {
                return Err(MappingError::DuplicateJavaState {
                    java_id,
                    first: existing.bedrock_id,
                    second: record.bedrock_id,
                });
            }
            if let Some(&first) = by_bedrock.get(&record.bedrock_id) {
                return Err(MappingError::DuplicateBedrockState {
                    bedrock_id: record.bedrock_id,
                    first,
                    second: java_id,
                });
            }

            let mut flags = BlockFlags::empty();
            flags.set(
                BlockFlags::WATERLOGGED,
                record.waterlogged || record.java_identifier.contains("waterlogged=true"),
            );
            flags.set(BlockFlags::BLOCK_ENTITY, record.block_entity);

            if record.java_identifier == "minecraft:water[level=0]" {
                water_bedrock_id = Some(record.bedrock_id);
            }

            let entry = BlockStateEntry {
                java_id,
                java_identifier: record.java_identifier,
                bedrock_id: record.bedrock_id,
                flags,
                hardness: record.hardness,
                pick_item: record.pick_item,
            };
            default_states
                .entry(entry.block_identifier().to_owned())
                .and_modify(|state| *state = (*state).min(java_id))
                .or_insert(java_id);
            by_bedrock.insert(entry.bedrock_id, java_id);
            by_java.insert(java_id, entry);
        }

        let fallback_bedrock_id = by_java
            .get(&source.fallback_java_id)
            .map(|entry| entry.bedrock_id)
            .ok_or(MappingError::UnknownFallback(source.fallback_java_id))?;

        let mut table = Self {
            by_java,
            by_bedrock,
            default_states,
            layers: Vec::new(),
            fallback_java_id: source.fallback_java_id,
            fallback_bedrock_id,
            water_bedrock_id,
        };

        if !source.custom_blocks.is_empty() {
            let layer = table.build_layer(&source.custom_blocks)?;
            table.layers.push(layer);
        }
        Ok(table)
    }

    /// Builds an override layer against this table's base states.
    pub fn build_layer(&self, records: &[CustomBlockRecord]) -> Result<OverrideLayer, MappingError> {
        let mut layer = OverrideLayer::default();
        for record in records {
            let java_state = match (&record.java_state, &record.java_block) {
                (Some(state), _) => {
                    if let Some(previous) = layer.states.insert(*state, record.bedrock_id) {
                        return Err(MappingError::DuplicateJavaState {
                            java_id: *state,
                            first: previous,
                            second: record.bedrock_id,
                        });
                    }
                    *state
                }
                (None, Some(block)) => {
                    let default_state = self
                        .default_states
                        .get(block)
                        .copied()
                        .ok_or_else(|| MappingError::UnknownBlock(block.clone()))?;
                    if let Some(previous) = layer.blocks.insert(block.clone(), record.bedrock_id)
                    {
                        return Err(MappingError::DuplicateJavaState {
                            java_id: default_state,
                            first: previous,
                            second: record.bedrock_id,
                        });
                    }
                    default_state
                }
                (None, None) => return Err(MappingError::EmptyOverride(record.bedrock_id)),
            };

            if let Some(&base) = self.by_bedrock.get(&record.bedrock_id) {
                // A block override may reuse the palette entry of one of its own states.
                let same_block = record.java_block.as_deref().is_some_and(|block| {
                    self.by_java
                        .get(&base)
                        .is_some_and(|entry| entry.block_identifier() == block)
                });
                if base != java_state && !same_block {
                    return Err(MappingError::DuplicateBedrockState {
                        bedrock_id: record.bedrock_id,
                        first: base,
                        second: java_state,
                    });
                }
            }
            if let Some(first) = layer.reverse.insert(record.bedrock_id, java_state) {
                return Err(MappingError::DuplicateBedrockState {
                    bedrock_id: record.bedrock_id,
                    first,
                    second: java_state,
                });
            }
        }
        Ok(layer)
    }

    /// Adds an override layer on top of the existing ones.
    pub fn push_layer(&mut self, layer: OverrideLayer) {
        self.layers.push(layer);
    }

    /// Resolves a Java state: custom state match, custom block match,
    /// base table, then the fallback.
    pub fn bedrock_id(&self, java_id: u32) -> u32 {
        let block = self.by_java.get(&java_id).map(BlockStateEntry::block_identifier);
        for layer in self.layers.iter().rev() {
            if let Some(&bedrock_id) = layer.states.get(&java_id) {
                return bedrock_id;
            }
            if let Some(&bedrock_id) = block.and_then(|block| layer.blocks.get(block)) {
                return bedrock_id;
            }
        }
        match self.by_java.get(&java_id) {
            Some(entry) => entry.bedrock_id,
            None => {
                tracing::debug!("No Bedrock block for Java state {java_id}, using fallback");
                self.fallback_bedrock_id
            }
        }
    }

    pub fn java_id(&self, bedrock_id: u32) -> u32 {
        for layer in self.layers.iter().rev() {
            if let Some(&java_id) = layer.reverse.get(&bedrock_id) {
                return java_id;
            }
        }
        self.by_bedrock
            .get(&bedrock_id)
            .copied()
            .unwrap_or(self.fallback_java_id)
    }

    pub fn entry(&self, java_id: u32) -> Option<&BlockStateEntry> {
        self.by_java.get(&java_id)
    }

    pub fn is_waterlogged(&self, java_id: u32) -> bool {
        self.entry(java_id).is_some_and(BlockStateEntry::is_waterlogged)
    }

    /// Bedrock runtime id of still water, if the table contains it.
    pub fn water_bedrock_id(&self) -> Option<u32> {
        self.water_bedrock_id
    }

    pub fn fallback_java_id(&self) -> u32 {
        self.fallback_java_id
    }

    /// Default Java state of a block, e.g. `minecraft:chest`.
    pub fn default_state(&self, block: &str) -> Option<u32> {
        self.default_states.get(block).copied()
    }

    pub fn len(&self) -> usize {
        self.by_java.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_java.is_empty()
    }
}
