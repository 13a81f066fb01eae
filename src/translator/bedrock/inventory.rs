use crate::{
    inventory::{self, anvil, click, CloseOrigin},
    phase::Phase,
    protocol::bedrock::{client, server},
    session::Session,
    translator::{in_phase, Translator},
};

pub struct ContainerCloseTranslator;

impl Translator for ContainerCloseTranslator {
    type Source = client::Packet;
    type Packet = client::ContainerClose;

    fn translate(&self, session: &mut Session, packet: &client::ContainerClose) {
        let open = session
            .inventory()
            .open
            .as_ref()
            .map(|open| open.bedrock_id);
        if open == Some(packet.container_id) {
            inventory::close_open_container(session, CloseOrigin::Client);
        } else {
            // The player inventory, or a window that is already gone.
            // Bedrock still waits for the close to be echoed.
            session.send_bedrock(server::ContainerClose {
                container_id: packet.container_id,
                server_initiated: false,
            });
        }
    }
}

pub struct ItemStackRequestTranslator;

impl Translator for ItemStackRequestTranslator {
    type Source = client::Packet;
    type Packet = client::ItemStackRequest;

    fn translate(&self, session: &mut Session, packet: &client::ItemStackRequest) {
        if !in_phase(session, &[Phase::Play], "item stack request") {
            return;
        }
        click::on_requests(session, packet);
    }
}

/// Anvil names arrive as the player types them.
pub struct FilterTextTranslator;

impl Translator for FilterTextTranslator {
    type Source = client::Packet;
    type Packet = client::FilterText;

    fn translate(&self, session: &mut Session, packet: &client::FilterText) {
        if packet.from_server || !in_phase(session, &[Phase::Play], "filter text") {
            return;
        }
        anvil::rename(session, &packet.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        inventory::{ContainerDescriptor, ContainerKind, SlotLayout},
        protocol::java,
        session::tests::playing_session,
    };

    #[test]
    fn closing_the_player_inventory_is_echoed() {
        let mut session = playing_session();
        ContainerCloseTranslator.translate(
            &mut session,
            &client::ContainerClose {
                container_id: 0,
                server_initiated: false,
            },
        );
        assert!(session.take_java_packets().is_empty());
        assert!(matches!(
            &session.take_bedrock_packets()[..],
            [server::Packet::ContainerClose(close)] if close.container_id == 0
        ));
    }

    #[test]
    fn closing_an_open_window_tells_the_server() {
        let mut session = playing_session();
        let descriptor = ContainerDescriptor::new(
            2,
            2,
            SlotLayout::new(ContainerKind::Hopper, 5),
            "Hopper",
        );
        inventory::open_container(&mut session, descriptor);
        session.take_java_packets();
        session.take_bedrock_packets();

        ContainerCloseTranslator.translate(
            &mut session,
            &client::ContainerClose {
                container_id: 2,
                server_initiated: false,
            },
        );
        assert!(session.inventory().open.is_none());
        assert!(matches!(
            &session.take_java_packets()[..],
            [java::client::Packet::CloseContainer(close)] if close.container_id == 2
        ));
    }

    #[test]
    fn requests_are_answered_one_to_one() {
        let mut session = playing_session();
        ItemStackRequestTranslator.translate(
            &mut session,
            &client::ItemStackRequest {
                requests: vec![
                    client::StackRequest {
                        request_id: 1,
                        actions: vec![],
                    },
                    client::StackRequest {
                        request_id: 2,
                        actions: vec![],
                    },
                ],
            },
        );
        let sent = session.take_bedrock_packets();
        let [server::Packet::ItemStackResponse(response)] = &sent[..] else {
            panic!("expected one response packet, got {sent:?}");
        };
        let ids: Vec<i32> = response.responses.iter().map(|r| r.request_id).collect();
        assert_eq!(ids, [1, 2]);
    }

    #[test]
    fn typed_anvil_names_reach_the_server() {
        let mut session = playing_session();
        inventory::open_container(
            &mut session,
            ContainerDescriptor::new(2, 2, SlotLayout::new(ContainerKind::Anvil, 0), "Repair"),
        );
        session.take_java_packets();

        FilterTextTranslator.translate(
            &mut session,
            &client::FilterText {
                text: "Sting".to_owned(),
                from_server: false,
            },
        );
        assert!(matches!(
            &session.take_java_packets()[..],
            [java::client::Packet::RenameItem(rename)] if rename.name == "Sting"
        ));
    }
}
