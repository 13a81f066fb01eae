//! Block-held containers: chests, dispensers, hoppers, shulker boxes,
//! anvils and the furnace family.
//!
//! Bedrock only opens these windows on a block of the right type, so the
//! gateway places a temporary holder block next to the player and restores
//! the real block when the window closes.

use crate::{
    inventory::{
        self, BedrockSlot, ContainerDescriptor, ContainerFamily, ContainerKind, Holder,
        SlotTranslation,
    },
    position::BlockPosition,
    protocol::bedrock::{
        server::{BlockEntityData, BlockEntityTag, ContainerOpen, UpdateBlock},
        ContainerSlotType,
    },
    scheduler::TaskKey,
    session::Session,
};
use std::ops::ControlFlow;

/// Slots of a single Bedrock chest.
const SINGLE_CHEST_SLOTS: usize = 27;

pub fn translate(slot: usize) -> SlotTranslation {
    SlotTranslation::Mapped(BedrockSlot::new(ContainerSlotType::LevelEntity, slot as u8))
}

/// Slots past `size` are padding of the Bedrock window and have no Java
/// counterpart.
pub fn java_slot(size: usize, slot: BedrockSlot) -> Option<usize> {
    match slot.region {
        ContainerSlotType::LevelEntity | ContainerSlotType::Container => {
            Some(usize::from(slot.index)).filter(|&index| index < size)
        }
        _ => None,
    }
}

pub fn is_double_chest(kind: ContainerKind) -> bool {
    matches!(kind, ContainerKind::Generic { rows } if usize::from(rows) * 9 > SINGLE_CHEST_SLOTS)
}

/// Slot count of the Bedrock window presenting `descriptor`.
pub fn bedrock_capacity(descriptor: &ContainerDescriptor) -> usize {
    match descriptor.kind() {
        ContainerKind::Generic { .. } if is_double_chest(descriptor.kind()) => {
            SINGLE_CHEST_SLOTS * 2
        }
        ContainerKind::Generic { .. } | ContainerKind::ShulkerBox => SINGLE_CHEST_SLOTS,
        ContainerKind::Generic3x3 => 9,
        ContainerKind::Hopper => 5,
        ContainerKind::Furnace | ContainerKind::BlastFurnace | ContainerKind::Smoker => 3,
        // Anvil slots live in the UI container.
        ContainerKind::Anvil => 0,
        ContainerKind::Horse | ContainerKind::ChestedHorse | ContainerKind::Llama => {
            descriptor.layout.size()
        }
        ContainerKind::Merchant | ContainerKind::Player => 0,
    }
}

fn holder_block(kind: ContainerKind) -> &'static str {
    match kind {
        ContainerKind::Generic3x3 => "minecraft:dispenser",
        ContainerKind::Hopper => "minecraft:hopper",
        ContainerKind::ShulkerBox => "minecraft:shulker_box",
        ContainerKind::Furnace => "minecraft:furnace",
        ContainerKind::BlastFurnace => "minecraft:blast_furnace",
        ContainerKind::Smoker => "minecraft:smoker",
        ContainerKind::Anvil => "minecraft:anvil",
        _ => "minecraft:chest",
    }
}

pub fn open(session: &mut Session, descriptor: &mut ContainerDescriptor) -> ControlFlow<()> {
    let kind = descriptor.kind();
    debug_assert!(matches!(
        kind.family(),
        ContainerFamily::Generic | ContainerFamily::Furnace | ContainerFamily::Anvil
    ));

    let origin = session.player.position.block() + BlockPosition::UP;
    let positions = if is_double_chest(kind) {
        vec![origin, origin + BlockPosition::UNIT_X]
    } else {
        vec![origin]
    };

    let mappings = session.mappings();
    let blocks = &mappings.blocks;
    let holder_state = blocks
        .default_state(holder_block(kind))
        .unwrap_or_else(|| blocks.fallback_java_id());
    let runtime_id = blocks.bedrock_id(holder_state);

    for &position in &positions {
        session.send_bedrock(UpdateBlock {
            position,
            runtime_id,
            layer: 0,
            priority: true,
        });
    }
    if matches!(kind, ContainerKind::Generic { .. }) {
        for (i, &position) in positions.iter().enumerate() {
            let pair = (positions.len() > 1).then(|| positions[1 - i]);
            session.send_bedrock(BlockEntityData {
                position,
                data: BlockEntityTag::Chest {
                    custom_name: descriptor.title.clone(),
                    pair,
                },
            });
        }
    }
    descriptor.holder = Holder::Blocks(positions);

    if is_double_chest(kind) {
        // Bedrock ignores the open request until the paired chest has rendered.
        let java_id = descriptor.java_id;
        let delay = session.config().double_chest_open_delay;
        let phase = session.phase();
        if !session
            .scheduler
            .schedule_keyed(TaskKey::DoubleChestOpen, phase, delay, move |session| {
                show_open(session, java_id)
            })
        {
            return ControlFlow::Break(());
        }
    } else {
        show(session, descriptor);
    }
    ControlFlow::Continue(())
}

/// Shows the window if `java_id` is still the open one.
fn show_open(session: &mut Session, java_id: i32) {
    let Some(open) = session
        .inventory
        .open
        .as_mut()
        .filter(|open| open.java_id == java_id)
    else {
        tracing::debug!("Window {java_id} closed before it could be shown");
        return;
    };
    open.visible = true;
    let mut snapshot = open.clone();
    show(session, &mut snapshot);
}

fn show(session: &mut Session, descriptor: &mut ContainerDescriptor) {
    descriptor.visible = true;
    let position = match &descriptor.holder {
        Holder::Blocks(positions) => positions.first().copied(),
        _ => None,
    }
    .unwrap_or_else(|| session.player.position.block());
    session.send_bedrock(ContainerOpen {
        container_id: descriptor.bedrock_id,
        container_type: descriptor.kind().bedrock_type(),
        position,
        unique_entity_id: -1,
    });
    inventory::send_contents(session, descriptor);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        inventory::{SlotError, SlotLayout},
        protocol::bedrock::server::Packet as BedrockPacket,
        session::tests::playing_session,
    };
    use std::time::Duration;

    #[test]
    fn last_slot_of_a_single_chest_maps_and_the_next_is_rejected() {
        let layout = SlotLayout::new(ContainerKind::Generic { rows: 3 }, 0);
        assert_eq!(
            layout.translate_slot(26),
            Ok(SlotTranslation::Mapped(BedrockSlot::new(
                ContainerSlotType::LevelEntity,
                26
            )))
        );
        assert!(matches!(
            layout.translate_slot(27),
            Err(SlotError::OutOfRange { slot: 27, slots: 27, .. })
        ));
        assert_eq!(
            layout.java_slot(BedrockSlot::new(ContainerSlotType::LevelEntity, 27)),
            None
        );
    }

    #[test]
    fn padding_of_a_one_row_chest_is_rejected() {
        let layout = SlotLayout::new(ContainerKind::Generic { rows: 1 }, 0);
        assert_eq!(
            layout.java_slot(BedrockSlot::new(ContainerSlotType::LevelEntity, 8)),
            Some(8)
        );
        for padding in 9..27 {
            assert_eq!(
                layout.java_slot(BedrockSlot::new(ContainerSlotType::LevelEntity, padding)),
                None
            );
        }
    }

    #[test]
    fn player_slots_follow_the_container() {
        let layout = SlotLayout::new(ContainerKind::Generic { rows: 3 }, 0);
        assert_eq!(
            layout.translate_window_slot(27),
            Ok(SlotTranslation::Mapped(BedrockSlot::new(
                ContainerSlotType::Inventory,
                9
            )))
        );
        assert_eq!(
            layout.translate_window_slot(62),
            Ok(SlotTranslation::Mapped(BedrockSlot::new(
                ContainerSlotType::Hotbar,
                8
            )))
        );
        assert!(layout.translate_window_slot(63).is_err());
    }

    #[tokio::test]
    async fn single_chest_opens_immediately() {
        let mut session = playing_session();
        let descriptor = ContainerDescriptor::new(
            3,
            3,
            SlotLayout::new(ContainerKind::Generic { rows: 3 }, 0),
            "Chest",
        );
        inventory::open_container(&mut session, descriptor);

        let sent = session.take_bedrock_packets();
        assert!(sent
            .iter()
            .any(|p| matches!(p, BedrockPacket::ContainerOpen(open) if open.container_id == 3)));
        assert!(session.inventory.open.as_ref().is_some_and(|open| open.visible));
    }

    #[tokio::test(start_paused = true)]
    async fn double_chest_opens_after_delay() {
        let mut session = playing_session();
        let descriptor = ContainerDescriptor::new(
            4,
            4,
            SlotLayout::new(ContainerKind::Generic { rows: 6 }, 0),
            "Large Chest",
        );
        inventory::open_container(&mut session, descriptor);

        let sent = session.take_bedrock_packets();
        let holders = sent
            .iter()
            .filter(|p| matches!(p, BedrockPacket::UpdateBlock(_)))
            .count();
        assert_eq!(holders, 2);
        assert!(!sent.iter().any(|p| matches!(p, BedrockPacket::ContainerOpen(_))));

        let start = tokio::time::Instant::now();
        let task = session.scheduler.expired().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(200));
        task.run(&mut session);
        let sent = session.take_bedrock_packets();
        assert!(sent
            .iter()
            .any(|p| matches!(p, BedrockPacket::ContainerOpen(open) if open.container_id == 4)));
    }

    #[tokio::test(start_paused = true)]
    async fn double_chest_closed_before_delay_never_opens() {
        let mut session = playing_session();
        let descriptor = ContainerDescriptor::new(
            4,
            4,
            SlotLayout::new(ContainerKind::Generic { rows: 6 }, 0),
            "Large Chest",
        );
        inventory::open_container(&mut session, descriptor);
        inventory::close_open_container(&mut session, inventory::CloseOrigin::Server);
        assert!(session.scheduler.is_empty());

        let sent = session.take_bedrock_packets();
        assert!(!sent.iter().any(|p| matches!(p, BedrockPacket::ContainerOpen(_))));
        let restored = sent
            .iter()
            .filter(|p| matches!(p, BedrockPacket::UpdateBlock(_)))
            .count();
        assert_eq!(restored, 4);
    }
}
