//! Windows held by a rideable entity: horses, donkeys, mules and llamas.
//!
//! The Java window starts with two equipment slots (saddle, body armor)
//! followed by the optional chest. Donkeys and mules cannot wear armor
//! and llamas take a carpet in the armor slot instead of a saddle.

use crate::{
    entity_id::{BedrockEntityId, JavaEntityId},
    inventory::{
        self, bedrock_window_id, BedrockSlot, ContainerDescriptor, ContainerKind, Holder,
        SlotLayout, SlotTranslation,
    },
    protocol::{
        bedrock::{
            server::{ContainerOpen, EquipSlot, UpdateEquip},
            ContainerSlotType, ContainerType,
        },
        java::EntityType,
    },
    session::Session,
};
use std::ops::ControlFlow;

const SADDLE: usize = 0;
const BODY_ARMOR: usize = 1;
const FIRST_CHEST_SLOT: usize = 2;

const HORSE_ARMOR: [&str; 4] = [
    "minecraft:horsearmorleather",
    "minecraft:horsearmoriron",
    "minecraft:horsearmorgold",
    "minecraft:horsearmordiamond",
];

pub fn kind_for_entity(kind: &EntityType) -> ContainerKind {
    match kind.as_str() {
        "minecraft:llama" | "minecraft:trader_llama" => ContainerKind::Llama,
        "minecraft:donkey" | "minecraft:mule" => ContainerKind::ChestedHorse,
        _ => ContainerKind::Horse,
    }
}

fn has_saddle_slot(kind: ContainerKind) -> bool {
    kind != ContainerKind::Llama
}

fn has_armor_slot(kind: ContainerKind) -> bool {
    kind != ContainerKind::ChestedHorse
}

pub fn translate(kind: ContainerKind, slot: usize) -> SlotTranslation {
    match slot {
        SADDLE if has_saddle_slot(kind) => {
            SlotTranslation::Mapped(BedrockSlot::new(ContainerSlotType::HorseEquip, 0))
        }
        BODY_ARMOR if has_armor_slot(kind) => {
            SlotTranslation::Mapped(BedrockSlot::new(ContainerSlotType::HorseEquip, 1))
        }
        SADDLE | BODY_ARMOR => SlotTranslation::Unrepresentable,
        // Bedrock keeps slot 0 of the chest region for the equipment.
        chest => SlotTranslation::Mapped(BedrockSlot::new(
            ContainerSlotType::LevelEntity,
            (chest - 1) as u8,
        )),
    }
}

pub fn java_slot(kind: ContainerKind, size: usize, slot: BedrockSlot) -> Option<usize> {
    let index = usize::from(slot.index);
    match slot.region {
        ContainerSlotType::HorseEquip => match index {
            0 if has_saddle_slot(kind) => Some(SADDLE),
            1 if has_armor_slot(kind) => Some(BODY_ARMOR),
            _ => None,
        },
        ContainerSlotType::LevelEntity if index + 1 >= FIRST_CHEST_SLOT => {
            Some(index + 1).filter(|&java| java < size)
        }
        _ => None,
    }
}

fn equip_slots(kind: ContainerKind) -> Vec<EquipSlot> {
    let saddle = EquipSlot {
        slot_number: 0,
        accepted_items: vec!["minecraft:saddle".to_owned()],
    };
    match kind {
        ContainerKind::Llama => vec![EquipSlot {
            slot_number: 1,
            accepted_items: vec!["minecraft:carpet".to_owned()],
        }],
        ContainerKind::ChestedHorse => vec![saddle],
        _ => vec![
            saddle,
            EquipSlot {
                slot_number: 1,
                accepted_items: HORSE_ARMOR.iter().map(|&id| id.to_owned()).collect(),
            },
        ],
    }
}

/// Builds the window for a Java horse screen. The holder must be an
/// entity the session knows about.
pub fn descriptor_for(
    session: &Session,
    java_id: i32,
    slot_count: i32,
    entity: JavaEntityId,
) -> Option<ContainerDescriptor> {
    let Some(entry) = session.entities.entry(entity) else {
        tracing::warn!("Horse window {java_id} for unknown entity {entity}; discarding");
        return None;
    };
    let Some(bedrock_id) = bedrock_window_id(java_id) else {
        tracing::warn!("Window id {java_id} cannot be represented on Bedrock");
        return None;
    };
    let size = usize::try_from(slot_count).unwrap_or(0);
    let kind = kind_for_entity(&entry.kind);
    let mut descriptor =
        ContainerDescriptor::new(java_id, bedrock_id, SlotLayout::new(kind, size), "");
    descriptor.holder = Holder::Entity(entry.bedrock_id);
    Some(descriptor)
}

pub fn open(session: &mut Session, descriptor: &mut ContainerDescriptor) -> ControlFlow<()> {
    let Holder::Entity(entity) = descriptor.holder else {
        tracing::warn!("Horse window {} has no holder entity", descriptor.java_id);
        return ControlFlow::Break(());
    };
    send_open(session, descriptor, entity);
    ControlFlow::Continue(())
}

fn send_open(session: &mut Session, descriptor: &mut ContainerDescriptor, entity: BedrockEntityId) {
    let kind = descriptor.kind();
    session.send_bedrock(UpdateEquip {
        container_id: descriptor.bedrock_id,
        container_type: ContainerType::Horse,
        size: descriptor.layout.size() as u32,
        unique_entity_id: entity.unique_id(),
        slots: equip_slots(kind),
    });
    session.send_bedrock(ContainerOpen {
        container_id: descriptor.bedrock_id,
        container_type: ContainerType::Horse,
        position: session.player.position.block(),
        unique_entity_id: entity.unique_id(),
    });
    descriptor.visible = true;
    inventory::send_contents(session, descriptor);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::bedrock::server::Packet as BedrockPacket;
    use crate::session::tests::playing_session;

    #[test]
    fn llama_saddle_is_unrepresentable() {
        let layout = SlotLayout::new(ContainerKind::Llama, 17);
        assert_eq!(layout.translate_slot(0), Ok(SlotTranslation::Unrepresentable));
        assert_eq!(
            layout.translate_slot(1),
            Ok(SlotTranslation::Mapped(BedrockSlot::new(
                ContainerSlotType::HorseEquip,
                1
            )))
        );
        assert_eq!(
            layout.java_slot(BedrockSlot::new(ContainerSlotType::HorseEquip, 0)),
            None
        );
    }

    #[test]
    fn donkey_chest_follows_the_saddle() {
        let layout = SlotLayout::new(ContainerKind::ChestedHorse, 17);
        assert_eq!(layout.translate_slot(1), Ok(SlotTranslation::Unrepresentable));
        assert_eq!(
            layout.translate_slot(2),
            Ok(SlotTranslation::Mapped(BedrockSlot::new(
                ContainerSlotType::LevelEntity,
                1
            )))
        );
        assert_eq!(
            layout.java_slot(BedrockSlot::new(ContainerSlotType::LevelEntity, 15)),
            Some(16)
        );
        assert_eq!(
            layout.java_slot(BedrockSlot::new(ContainerSlotType::LevelEntity, 16)),
            None
        );
    }

    #[test]
    fn unknown_holder_is_discarded() {
        let session = playing_session();
        assert!(descriptor_for(&session, 1, 2, JavaEntityId::new(404)).is_none());
    }

    #[test]
    fn known_holder_opens_equipment_window() {
        let mut session = playing_session();
        let (horse, _) = session.entities.map_entity(
            JavaEntityId::new(12),
            None,
            EntityType::new("minecraft:horse"),
        );
        let descriptor = descriptor_for(&session, 1, 2, JavaEntityId::new(12)).unwrap();
        inventory::open_container(&mut session, descriptor);

        let sent = session.take_bedrock_packets();
        let equip = sent.iter().find_map(|p| match p {
            BedrockPacket::UpdateEquip(equip) => Some(equip),
            _ => None,
        });
        let equip = equip.unwrap();
        assert_eq!(equip.unique_entity_id, horse.unique_id());
        assert_eq!(equip.slots.len(), 2);
    }
}
