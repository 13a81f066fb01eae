//! The player's own window (Java window 0).
//!
//! | Java    | Bedrock                |
//! |---------|------------------------|
//! | 0       | crafting output 50     |
//! | 1..=4   | crafting input 28..=31 |
//! | 5..=8   | armor 0..=3            |
//! | 9..=35  | inventory 9..=35       |
//! | 36..=44 | hotbar 0..=8           |
//! | 45      | offhand 0              |

use crate::{
    inventory::{BedrockSlot, SlotTranslation},
    protocol::bedrock::ContainerSlotType,
};

pub const SLOTS: usize = 46;

const CRAFTING_OUTPUT: u8 = 50;
const CRAFTING_INPUT: u8 = 28;

pub fn translate(slot: usize) -> SlotTranslation {
    use ContainerSlotType::*;
    let slot_u8 = slot as u8;
    let mapped = match slot {
        0 => BedrockSlot::new(CraftingOutput, CRAFTING_OUTPUT),
        1..=4 => BedrockSlot::new(CraftingInput, CRAFTING_INPUT + slot_u8 - 1),
        5..=8 => BedrockSlot::new(Armor, slot_u8 - 5),
        9..=35 => BedrockSlot::new(Inventory, slot_u8),
        36..=44 => BedrockSlot::new(Hotbar, slot_u8 - 36),
        45 => BedrockSlot::new(Offhand, 0),
        _ => return SlotTranslation::Unrepresentable,
    };
    SlotTranslation::Mapped(mapped)
}

pub fn java_slot(slot: BedrockSlot) -> Option<usize> {
    use ContainerSlotType::*;
    let index = usize::from(slot.index);
    match (slot.region, index) {
        (CraftingOutput | CreatedOutput, 50) => Some(0),
        (CraftingInput, 28..=31) => Some(index - 27),
        (Armor, 0..=3) => Some(index + 5),
        (Inventory | Hotbar | HotbarAndInventory, 0..=8) => Some(index + 36),
        (Inventory | HotbarAndInventory, 9..=35) => Some(index),
        (Offhand, 0) => Some(45),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hotbar_and_main_inventory_keep_bedrock_numbering() {
        assert_eq!(
            translate(36),
            SlotTranslation::Mapped(BedrockSlot::new(ContainerSlotType::Hotbar, 0))
        );
        assert_eq!(java_slot(BedrockSlot::new(ContainerSlotType::Inventory, 3)), Some(39));
        assert_eq!(java_slot(BedrockSlot::new(ContainerSlotType::Inventory, 20)), Some(20));
        assert_eq!(java_slot(BedrockSlot::new(ContainerSlotType::Hotbar, 9)), None);
    }
}
