use crate::{
    inventory::{BedrockSlot, ContainerFamily, ContainerKind, SlotTranslation},
    protocol::bedrock::{server::ContainerSetData, ContainerSlotType},
    session::Session,
};

const INGREDIENT: usize = 0;
const FUEL: usize = 1;
const RESULT: usize = 2;

fn ingredient_region(kind: ContainerKind) -> ContainerSlotType {
    match kind {
        ContainerKind::BlastFurnace => ContainerSlotType::BlastFurnaceIngredient,
        ContainerKind::Smoker => ContainerSlotType::SmokerIngredient,
        _ => ContainerSlotType::FurnaceIngredient,
    }
}

pub fn translate(kind: ContainerKind, slot: usize) -> SlotTranslation {
    let region = match slot {
        INGREDIENT => ingredient_region(kind),
        FUEL => ContainerSlotType::FurnaceFuel,
        RESULT => ContainerSlotType::FurnaceResult,
        _ => return SlotTranslation::Unrepresentable,
    };
    SlotTranslation::Mapped(BedrockSlot::new(region, slot as u8))
}

pub fn java_slot(kind: ContainerKind, slot: BedrockSlot) -> Option<usize> {
    let java = match slot.region {
        region if region == ingredient_region(kind) => INGREDIENT,
        ContainerSlotType::FurnaceFuel => FUEL,
        ContainerSlotType::FurnaceResult => RESULT,
        _ => return None,
    };
    (usize::from(slot.index) == java).then_some(java)
}

/// Java furnace properties are lit time, lit duration, cook progress and
/// cook duration. Bedrock numbers the first three differently and derives
/// the cook duration itself.
pub fn bedrock_property(java_property: i16) -> Option<i32> {
    match java_property {
        0 => Some(1),
        1 => Some(2),
        2 => Some(0),
        _ => None,
    }
}

pub fn on_property(session: &mut Session, java_id: i32, property: i16, value: i16) {
    let Some(window) = session.inventory.window(java_id) else {
        tracing::warn!("Property for window {java_id}, which is not open; discarding");
        return;
    };
    if window.kind().family() != ContainerFamily::Furnace {
        tracing::trace!("Ignoring property {property} of {:?} window", window.kind());
        return;
    }
    let Some(bedrock_property) = bedrock_property(property) else {
        return;
    };
    let container_id = window.bedrock_id;
    session.send_bedrock(ContainerSetData {
        container_id,
        property: bedrock_property,
        value: i32::from(value),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        inventory::{self, ContainerDescriptor, SlotLayout},
        protocol::bedrock::server::Packet as BedrockPacket,
        session::tests::playing_session,
    };

    #[test]
    fn regions_follow_the_furnace_kind() {
        let smoker = SlotLayout::new(ContainerKind::Smoker, 0);
        assert_eq!(
            smoker.translate_slot(0),
            Ok(SlotTranslation::Mapped(BedrockSlot::new(
                ContainerSlotType::SmokerIngredient,
                0
            )))
        );
        assert_eq!(
            smoker.java_slot(BedrockSlot::new(ContainerSlotType::FurnaceIngredient, 0)),
            None
        );
        assert_eq!(
            smoker.java_slot(BedrockSlot::new(ContainerSlotType::FurnaceResult, 2)),
            Some(2)
        );
        assert!(smoker.translate_slot(3).is_err());
    }

    #[test]
    fn properties_are_renumbered_and_cook_duration_dropped() {
        let mut session = playing_session();
        let descriptor =
            ContainerDescriptor::new(2, 2, SlotLayout::new(ContainerKind::Furnace, 0), "Furnace");
        inventory::open_container(&mut session, descriptor);
        session.take_bedrock_packets();

        on_property(&mut session, 2, 2, 57);
        on_property(&mut session, 2, 3, 200);
        let sent = session.take_bedrock_packets();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            BedrockPacket::ContainerSetData(data) => {
                assert_eq!((data.container_id, data.property, data.value), (2, 0, 57));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn properties_of_other_windows_are_ignored() {
        let mut session = playing_session();
        on_property(&mut session, 9, 0, 1);
        assert!(session.take_bedrock_packets().is_empty());
    }
}
