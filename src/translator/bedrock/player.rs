use crate::{
    phase::Phase,
    protocol::{bedrock::client, java},
    session::Session,
    translator::{in_phase, java::PLAYER_EYE_HEIGHT, Translator},
};

pub struct SetLocalPlayerAsInitializedTranslator;

impl Translator for SetLocalPlayerAsInitializedTranslator {
    type Source = client::Packet;
    type Packet = client::SetLocalPlayerAsInitialized;

    fn translate(&self, session: &mut Session, _packet: &client::SetLocalPlayerAsInitialized) {
        if !in_phase(session, &[Phase::Spawning], "local player initialized") {
            return;
        }
        session.player.initialized = true;
        session.transition(Phase::Play);
    }
}

pub struct MovePlayerTranslator;

impl Translator for MovePlayerTranslator {
    type Source = client::Packet;
    type Packet = client::MovePlayer;

    fn translate(&self, session: &mut Session, packet: &client::MovePlayer) {
        if !in_phase(session, &[Phase::Play], "move player") {
            return;
        }
        let position = &mut session.player.position;
        position.x = f64::from(packet.position.x);
        position.y = f64::from(packet.position.y - PLAYER_EYE_HEIGHT);
        position.z = f64::from(packet.position.z);
        position.yaw = packet.yaw;
        position.pitch = packet.pitch;

        let position = *position;
        session.send_java(java::client::MovePlayerPosition {
            x: position.x,
            y: position.y,
            z: position.z,
            on_ground: packet.on_ground,
        });
    }
}

pub struct DisconnectTranslator;

impl Translator for DisconnectTranslator {
    type Source = client::Packet;
    type Packet = client::Disconnect;

    fn translate(&self, session: &mut Session, packet: &client::Disconnect) {
        tracing::info!("{} left: {}", session.identity().display_name, packet.reason);
        session.disconnect_silently(packet.reason.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{position::Vec3f, session::tests::playing_session};

    #[test]
    fn movement_is_forwarded_at_feet_level() {
        let mut session = playing_session();
        MovePlayerTranslator.translate(
            &mut session,
            &client::MovePlayer {
                runtime_entity_id: 1,
                position: Vec3f::new(2.0, 65.62, 4.0),
                yaw: 0.0,
                pitch: 0.0,
                on_ground: true,
            },
        );
        let sent = session.take_java_packets();
        let [java::client::Packet::MovePlayerPosition(movement)] = &sent[..] else {
            panic!("expected one movement packet, got {sent:?}");
        };
        assert!((movement.y - 64.0).abs() < 1e-4);
        assert!((session.player().position.x - 2.0).abs() < 1e-9);
    }

    #[test]
    fn client_disconnect_sends_no_notice() {
        let mut session = playing_session();
        DisconnectTranslator.translate(
            &mut session,
            &client::Disconnect {
                reason: "quit".to_owned(),
            },
        );
        assert!(session.is_disconnected());
        assert_eq!(session.disconnect_reason(), Some("quit"));
        assert!(session.take_bedrock_packets().is_empty());
    }
}
