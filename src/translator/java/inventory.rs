use crate::{
    entity_id::JavaEntityId,
    inventory::{
        self, bedrock_window_id, furnace, horse, merchant, CloseOrigin, ContainerDescriptor,
        ContainerKind, SlotLayout,
    },
    phase::Phase,
    protocol::java::{client, server},
    session::Session,
    translator::{in_phase, Translator},
};

fn refuse(session: &mut Session, container_id: i32) {
    session.send_java(client::CloseContainer { container_id });
}

pub struct OpenScreenTranslator;

impl Translator for OpenScreenTranslator {
    type Source = server::Packet;
    type Packet = server::OpenScreen;

    fn translate(&self, session: &mut Session, packet: &server::OpenScreen) {
        if !in_phase(session, &[Phase::Play], "open screen") {
            return;
        }
        let Some(kind) = ContainerKind::from_menu_type(packet.menu_type) else {
            tracing::warn!(
                "Menu type {} has no Bedrock counterpart; closing window {}",
                packet.menu_type,
                packet.container_id
            );
            refuse(session, packet.container_id);
            return;
        };
        let Some(bedrock_id) = bedrock_window_id(packet.container_id) else {
            tracing::warn!(
                "Window id {} cannot be represented on Bedrock",
                packet.container_id
            );
            refuse(session, packet.container_id);
            return;
        };
        let size = kind.fixed_size().unwrap_or_default();
        let descriptor = ContainerDescriptor::new(
            packet.container_id,
            bedrock_id,
            SlotLayout::new(kind, size),
            packet.title.clone(),
        );
        inventory::open_container(session, descriptor);
    }
}

pub struct OpenHorseScreenTranslator;

impl Translator for OpenHorseScreenTranslator {
    type Source = server::Packet;
    type Packet = server::OpenHorseScreen;

    fn translate(&self, session: &mut Session, packet: &server::OpenHorseScreen) {
        if !in_phase(session, &[Phase::Play], "open horse screen") {
            return;
        }
        match horse::descriptor_for(
            session,
            packet.container_id,
            packet.slot_count,
            JavaEntityId::new(packet.entity_id),
        ) {
            Some(descriptor) => inventory::open_container(session, descriptor),
            None => refuse(session, packet.container_id),
        }
    }
}

pub struct SetContainerContentTranslator;

impl Translator for SetContainerContentTranslator {
    type Source = server::Packet;
    type Packet = server::SetContainerContent;

    fn translate(&self, session: &mut Session, packet: &server::SetContainerContent) {
        inventory::on_content(
            session,
            packet.container_id,
            packet.state_id,
            &packet.items,
            packet.carried.as_ref(),
        );
    }
}

pub struct SetContainerSlotTranslator;

impl Translator for SetContainerSlotTranslator {
    type Source = server::Packet;
    type Packet = server::SetContainerSlot;

    fn translate(&self, session: &mut Session, packet: &server::SetContainerSlot) {
        if let Err(e) = inventory::on_slot_update(
            session,
            packet.container_id,
            packet.state_id,
            packet.slot,
            packet.item.as_ref(),
        ) {
            tracing::warn!("Discarding slot update: {e}");
        }
    }
}

pub struct SetContainerPropertyTranslator;

impl Translator for SetContainerPropertyTranslator {
    type Source = server::Packet;
    type Packet = server::SetContainerProperty;

    fn translate(&self, session: &mut Session, packet: &server::SetContainerProperty) {
        furnace::on_property(session, packet.container_id, packet.property, packet.value);
    }
}

pub struct CloseContainerTranslator;

impl Translator for CloseContainerTranslator {
    type Source = server::Packet;
    type Packet = server::CloseContainer;

    fn translate(&self, session: &mut Session, packet: &server::CloseContainer) {
        let open = session
            .inventory()
            .open
            .as_ref()
            .map(|open| open.java_id);
        if open == Some(packet.container_id) {
            inventory::close_open_container(session, CloseOrigin::Server);
        } else {
            tracing::debug!(
                "Server closed window {}, which is not open",
                packet.container_id
            );
        }
    }
}

pub struct MerchantOffersTranslator;

impl Translator for MerchantOffersTranslator {
    type Source = server::Packet;
    type Packet = server::MerchantOffers;

    fn translate(&self, session: &mut Session, packet: &server::MerchantOffers) {
        merchant::on_offers(session, packet);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        protocol::{bedrock::server::Packet as BedrockPacket, java::ItemStack},
        session::tests::playing_session,
    };

    fn open_chest(session: &mut Session) {
        OpenScreenTranslator.translate(
            session,
            &server::OpenScreen {
                container_id: 3,
                menu_type: 2,
                title: "Chest".to_owned(),
            },
        );
    }

    #[test]
    fn unsupported_menus_are_closed() {
        let mut session = playing_session();
        OpenScreenTranslator.translate(
            &mut session,
            &server::OpenScreen {
                container_id: 4,
                menu_type: 7,
                title: "Crafter".to_owned(),
            },
        );
        assert!(session.inventory().open.is_none());
        assert!(matches!(
            &session.take_java_packets()[..],
            [client::Packet::CloseContainer(close)] if close.container_id == 4
        ));
    }

    #[test]
    fn anvil_menus_open() {
        let mut session = playing_session();
        OpenScreenTranslator.translate(
            &mut session,
            &server::OpenScreen {
                container_id: 4,
                menu_type: 8,
                title: "Repair & Name".to_owned(),
            },
        );
        let open = session.inventory().open.as_ref().unwrap();
        assert_eq!(open.kind(), ContainerKind::Anvil);
        assert!(open.anvil.is_some());
        assert!(session.take_java_packets().is_empty());
    }

    #[test]
    fn chest_contents_reach_bedrock() {
        let mut session = playing_session();
        open_chest(&mut session);
        let open = session.inventory().open.as_ref().unwrap();
        assert_eq!(open.layout.size(), 27);
        assert!(open.visible);
        session.take_bedrock_packets();

        let mut items = vec![None; 63];
        items[0] = Some(ItemStack::new(800, 5));
        SetContainerContentTranslator.translate(
            &mut session,
            &server::SetContainerContent {
                container_id: 3,
                state_id: 9,
                items,
                carried: None,
            },
        );
        let sent = session.take_bedrock_packets();
        assert!(sent.iter().any(|packet| matches!(
            packet,
            BedrockPacket::InventoryContent(content)
                if content.container_id == 3 && content.items[0].network_id == 512
        )));
        assert_eq!(session.inventory().window(3).unwrap().state_id, 9);
    }

    #[test]
    fn server_close_of_another_window_is_ignored() {
        let mut session = playing_session();
        open_chest(&mut session);
        CloseContainerTranslator.translate(&mut session, &server::CloseContainer { container_id: 8 });
        assert!(session.inventory().open.is_some());

        CloseContainerTranslator.translate(&mut session, &server::CloseContainer { container_id: 3 });
        assert!(session.inventory().open.is_none());
    }

    #[test]
    fn out_of_range_slot_is_discarded() {
        let mut session = playing_session();
        open_chest(&mut session);
        session.take_bedrock_packets();
        SetContainerSlotTranslator.translate(
            &mut session,
            &server::SetContainerSlot {
                container_id: 3,
                state_id: 1,
                slot: 90,
                item: Some(ItemStack::new(1, 1)),
            },
        );
        assert!(session.take_bedrock_packets().is_empty());
    }
}
