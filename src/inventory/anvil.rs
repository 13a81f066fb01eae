//! Anvil windows: an input, a material and the renamed or repaired result.
//!
//! Bedrock keeps all three slots in the UI container and sends the new
//! name as the text of a recipe action rather than a packet of its own.

use crate::{
    inventory::{BedrockSlot, SlotTranslation},
    protocol::{bedrock::ContainerSlotType, java::client::RenameItem},
    session::Session,
};

pub const SLOTS: usize = 3;

/// Longest name the Java server accepts.
const MAX_NAME_LENGTH: usize = 50;

const INPUT: usize = 0;
const MATERIAL: usize = 1;
const RESULT: usize = 2;

fn bedrock_index(slot: usize) -> Option<(ContainerSlotType, u8)> {
    Some(match slot {
        INPUT => (ContainerSlotType::AnvilInput, 1),
        MATERIAL => (ContainerSlotType::AnvilMaterial, 2),
        RESULT => (ContainerSlotType::AnvilResult, 50),
        _ => return None,
    })
}

pub fn translate(slot: usize) -> SlotTranslation {
    match bedrock_index(slot) {
        Some((region, index)) => SlotTranslation::Mapped(BedrockSlot::new(region, index)),
        None => SlotTranslation::Unrepresentable,
    }
}

pub fn java_slot(slot: BedrockSlot) -> Option<usize> {
    let java = match slot.region {
        ContainerSlotType::AnvilInput => INPUT,
        ContainerSlotType::AnvilMaterial => MATERIAL,
        // Taking the result is sometimes addressed as created output.
        ContainerSlotType::AnvilResult | ContainerSlotType::CreatedOutput => RESULT,
        _ => return None,
    };
    let (_, index) = bedrock_index(java)?;
    (slot.index == index).then_some(java)
}

/// Applies a name typed into the open anvil. Returns false if no anvil is
/// open.
pub fn rename(session: &mut Session, name: &str) -> bool {
    let Some(state) = session
        .inventory
        .open
        .as_mut()
        .and_then(|open| open.anvil.as_mut())
    else {
        tracing::debug!("Rename without an open anvil; discarding");
        return false;
    };
    let name: String = name.chars().take(MAX_NAME_LENGTH).collect();
    if state.rename.as_deref() == Some(name.as_str()) {
        return true;
    }
    state.rename = Some(name.clone());
    session.send_java(RenameItem { name });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        inventory::{self, ContainerDescriptor, ContainerKind, SlotLayout},
        protocol::{
            bedrock::{container_id, server::Packet as BedrockPacket, ContainerType},
            java::client::Packet as JavaPacket,
        },
        session::tests::playing_session,
    };

    #[test]
    fn slots_map_into_the_ui_container() {
        let layout = SlotLayout::new(ContainerKind::Anvil, 0);
        assert_eq!(layout.size(), 3);
        assert_eq!(layout.total_slots(), 39);
        let expected = [
            (ContainerSlotType::AnvilInput, 1),
            (ContainerSlotType::AnvilMaterial, 2),
            (ContainerSlotType::AnvilResult, 50),
        ];
        for (slot, (region, index)) in expected.into_iter().enumerate() {
            let target = BedrockSlot::new(region, index);
            assert_eq!(layout.translate_slot(slot), Ok(SlotTranslation::Mapped(target)));
            assert_eq!(layout.java_slot(target), Some(slot));
            assert_eq!(target.container_id(7), container_id::UI);
        }
        assert!(layout.translate_slot(3).is_err());
    }

    #[test]
    fn result_is_also_reachable_as_created_output() {
        let layout = SlotLayout::new(ContainerKind::Anvil, 0);
        assert_eq!(
            layout.java_slot(BedrockSlot::new(ContainerSlotType::CreatedOutput, 50)),
            Some(2)
        );
        assert_eq!(
            layout.java_slot(BedrockSlot::new(ContainerSlotType::AnvilInput, 2)),
            None
        );
    }

    #[test]
    fn opens_on_a_temporary_anvil() {
        let mut session = playing_session();
        let descriptor =
            ContainerDescriptor::new(2, 2, SlotLayout::new(ContainerKind::Anvil, 0), "Repair");
        inventory::open_container(&mut session, descriptor);

        let sent = session.take_bedrock_packets();
        assert!(sent
            .iter()
            .any(|p| matches!(p, BedrockPacket::UpdateBlock(update) if update.runtime_id == 5)));
        assert!(sent.iter().any(|p| matches!(
            p,
            BedrockPacket::ContainerOpen(open) if open.container_type == ContainerType::Anvil
        )));
        assert!(!sent.iter().any(|p| matches!(p, BedrockPacket::BlockEntityData(_))));
    }

    #[test]
    fn renames_are_sent_once_and_truncated() {
        let mut session = playing_session();
        assert!(!rename(&mut session, "Sword"));

        let descriptor =
            ContainerDescriptor::new(2, 2, SlotLayout::new(ContainerKind::Anvil, 0), "Repair");
        inventory::open_container(&mut session, descriptor);
        session.take_java_packets();

        let long = "x".repeat(80);
        assert!(rename(&mut session, &long));
        assert!(rename(&mut session, &long));
        let renames: Vec<_> = session
            .take_java_packets()
            .into_iter()
            .filter_map(|p| match p {
                JavaPacket::RenameItem(rename) => Some(rename.name),
                _ => None,
            })
            .collect();
        assert_eq!(renames, vec!["x".repeat(50)]);
        let open = session.inventory.open.as_ref().unwrap();
        assert_eq!(open.anvil.as_ref().and_then(|a| a.rename.as_deref()).map(str::len), Some(50));
    }
}
