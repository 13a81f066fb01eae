use crate::{
    inventory::Holder,
    phase::Phase,
    protocol::java::server,
    session::Session,
    translator::{in_phase, Translator},
};

pub struct BlockUpdateTranslator;

impl Translator for BlockUpdateTranslator {
    type Source = server::Packet;
    type Packet = server::BlockUpdate;

    fn translate(&self, session: &mut Session, packet: &server::BlockUpdate) {
        if !in_phase(session, &[Phase::Spawning, Phase::Play], "block update") {
            return;
        }
        session.record_block(packet.position, packet.block_state);

        // A temporary container holder stands here; the real block is
        // restored when the window closes.
        let covered = session
            .inventory()
            .open
            .as_ref()
            .is_some_and(|open| match &open.holder {
                Holder::Blocks(positions) => {
                    positions.contains(&packet.position)
                }
                _ => false,
            });
        if !covered {
            session.show_block(packet.position, packet.block_state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        position::BlockPosition,
        protocol::bedrock::server::Packet as BedrockPacket,
        session::tests::playing_session,
    };

    #[test]
    fn block_updates_are_remembered_and_shown() {
        let mut session = playing_session();
        let position = BlockPosition::new(3, 60, 3);
        BlockUpdateTranslator.translate(
            &mut session,
            &server::BlockUpdate {
                position,
                block_state: 1,
            },
        );
        assert_eq!(session.block_at(position), Some(1));
        assert!(matches!(
            &session.take_bedrock_packets()[..],
            [BedrockPacket::UpdateBlock(update)] if update.runtime_id == 1 && update.layer == 0
        ));
    }
}
