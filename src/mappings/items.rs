//! Java item ⇄ Bedrock item mapping.

use crate::{
    mappings::{blocks::BlockStateTable, MappingError},
    protocol::{
        bedrock::{ItemData, ItemTag},
        java::{ItemComponents, ItemStack},
    },
};
use ahash::AHashMap;
use serde::Deserialize;

/// Stack size of items whose record does not say otherwise.
pub const DEFAULT_STACK_SIZE: u8 = 64;

fn default_stack_size() -> u8 {
    DEFAULT_STACK_SIZE
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemMappingSource {
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemRecord {
    pub java_id: i32,
    pub java_identifier: String,
    pub bedrock_id: i32,
    pub bedrock_identifier: String,
    /// Bedrock data value distinguishing variants sharing one id.
    #[serde(default)]
    pub bedrock_data: u16,
    /// Java block state placed by this item, if any.
    #[serde(default)]
    pub block_java_state: Option<u32>,
    #[serde(default = "default_stack_size")]
    pub stack_size: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMapping {
    pub java_id: i32,
    pub java_identifier: String,
    pub bedrock_id: i32,
    pub bedrock_identifier: String,
    pub bedrock_data: u16,
    pub block_java_state: Option<u32>,
    pub stack_size: u8,
}

#[derive(Debug, Clone, Default)]
pub struct ItemMappings {
    by_java: AHashMap<i32, ItemMapping>,
    /// Several Java items may share a Bedrock item; the first one wins.
    by_bedrock: AHashMap<(i32, u16), i32>,
}

impl ItemMappings {
    pub fn from_source(source: ItemMappingSource) -> Result<Self, MappingError> {
        let mut mappings = Self::default();
        for record in source.items {
            if let Some(existing) = mappings.by_java.get(&record.java_id) {
                return Err(MappingError::DuplicateItem {
                    java_id: record.java_id,
                    first: existing.bedrock_identifier.clone(),
                    second: record.bedrock_identifier,
                });
            }
            mappings
                .by_bedrock
                .entry((record.bedrock_id, record.bedrock_data))
                .or_insert(record.java_id);
            mappings.by_java.insert(
                record.java_id,
                ItemMapping {
                    java_id: record.java_id,
                    java_identifier: record.java_identifier,
                    bedrock_id: record.bedrock_id,
                    bedrock_identifier: record.bedrock_identifier,
                    bedrock_data: record.bedrock_data,
                    block_java_state: record.block_java_state,
                    stack_size: record.stack_size,
                },
            );
        }
        Ok(mappings)
    }

    pub fn mapping(&self, java_id: i32) -> Option<&ItemMapping> {
        self.by_java.get(&java_id)
    }

    /// How many of an item fit in one slot.
    pub fn stack_size(&self, java_id: i32) -> u8 {
        self.by_java
            .get(&java_id)
            .map_or(DEFAULT_STACK_SIZE, |mapping| mapping.stack_size)
    }

    /// Translates a Java slot into a Bedrock item. Items without a mapping
    /// become air.
    pub fn to_bedrock(&self, item: Option<&ItemStack>, blocks: &BlockStateTable) -> ItemData {
        let Some(item) = item else {
            return ItemData::AIR;
        };
        let Some(mapping) = self.by_java.get(&item.item_id) else {
            tracing::debug!("No Bedrock item for Java item {}", item.item_id);
            return ItemData::AIR;
        };

        let components = &item.components;
        let tag = (components.damage.is_some()
            || components.custom_name.is_some()
            || components.enchantment_glint)
            .then(|| ItemTag {
                custom_name: components.custom_name.clone(),
                damage: components.damage,
                enchanted: components.enchantment_glint,
            });

        ItemData {
            network_id: mapping.bedrock_id,
            count: item.count,
            damage: mapping.bedrock_data,
            block_runtime_id: mapping
                .block_java_state
                .map_or(0, |state| blocks.bedrock_id(state)),
            tag,
        }
    }

    /// Inverse of [`Self::to_bedrock`]. Air and unknown items are empty.
    pub fn to_java(&self, item: &ItemData) -> Option<ItemStack> {
        if item.is_air() {
            return None;
        }
        let java_id = self
            .by_bedrock
            .get(&(item.network_id, item.damage))
            .or_else(|| self.by_bedrock.get(&(item.network_id, 0)))
            .copied()?;

        let components = item
            .tag
            .as_ref()
            .map(|tag| ItemComponents {
                damage: tag.damage,
                custom_name: tag.custom_name.clone(),
                enchantment_glint: tag.enchanted,
            })
            .unwrap_or_default();
        Some(ItemStack {
            item_id: java_id,
            count: item.count,
            components,
        })
    }

    pub fn len(&self) -> usize {
        self.by_java.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_java.is_empty()
    }
}
