use crate::{
    entity_id::JavaEntityId,
    phase::Phase,
    position::EntityPosition,
    protocol::{
        bedrock::server::{MovePlayer, PlayStatus, PlayStatusKind, StartGame},
        java::{client, server},
    },
    session::Session,
    translator::{in_phase, Translator},
};

/// Bedrock reports player positions at eye level.
pub(crate) const PLAYER_EYE_HEIGHT: f32 = 1.62;

fn dimension_id(dimension: &str) -> i32 {
    match dimension {
        "minecraft:the_nether" => 1,
        "minecraft:the_end" => 2,
        _ => 0,
    }
}

/// Join game.
pub struct LoginTranslator;

impl Translator for LoginTranslator {
    type Source = server::Packet;
    type Packet = server::Login;

    fn translate(&self, session: &mut Session, packet: &server::Login) {
        if !in_phase(session, &[Phase::Spawning], "join game") {
            return;
        }
        session.player.java_id = Some(JavaEntityId::new(packet.entity_id));
        if session.player.spawned {
            // Bedrock keeps its world across a reconfiguration.
            return;
        }

        let bedrock_id = match session.player.bedrock_id {
            Some(id) => id,
            None => {
                let id = session.entities.allocate_local();
                session.player.bedrock_id = Some(id);
                id
            }
        };
        let position = session.player.position.to_bedrock();
        session.send_bedrock(StartGame {
            unique_entity_id: bedrock_id.unique_id(),
            runtime_entity_id: bedrock_id.runtime_id(),
            game_mode: i32::from(packet.game_mode),
            position,
            dimension: dimension_id(&packet.dimension),
        });
    }
}

pub struct PlayerPositionTranslator;

impl Translator for PlayerPositionTranslator {
    type Source = server::Packet;
    type Packet = server::PlayerPosition;

    fn translate(&self, session: &mut Session, packet: &server::PlayerPosition) {
        if !in_phase(session, &[Phase::Spawning, Phase::Play], "player position") {
            return;
        }
        let Some(bedrock_id) = session.player.bedrock_id else {
            tracing::warn!("Player position before join game; discarding");
            return;
        };

        session.player.position =
            EntityPosition::from((packet.x, packet.y, packet.z, packet.pitch, packet.yaw));
        session.send_java(client::AcceptTeleportation {
            teleport_id: packet.teleport_id,
        });

        let mut position = session.player.position.to_bedrock();
        position.y += PLAYER_EYE_HEIGHT;
        session.send_bedrock(MovePlayer {
            runtime_entity_id: bedrock_id.runtime_id(),
            position,
            yaw: packet.yaw,
            pitch: packet.pitch,
            teleport: true,
        });

        if !session.player.spawned {
            session.player.spawned = true;
            session.send_bedrock(PlayStatus {
                status: PlayStatusKind::PlayerSpawn,
            });
        } else if session.phase() == Phase::Spawning && session.player.initialized {
            // Back from a reconfiguration; the client will not report
            // readiness again.
            session.transition(Phase::Play);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{protocol::bedrock::server::Packet as BedrockPacket, session::tests::test_session};

    fn spawning_session() -> Session {
        let mut session = test_session();
        session.start();
        session.transition(Phase::Configuration);
        session.transition(Phase::Spawning);
        session.take_java_packets();
        session
    }

    fn position(teleport_id: i32) -> server::PlayerPosition {
        server::PlayerPosition {
            teleport_id,
            x: 0.5,
            y: 70.0,
            z: 0.5,
            yaw: 90.0,
            pitch: 0.0,
        }
    }

    #[test]
    fn join_game_starts_the_bedrock_game_once() {
        let mut session = spawning_session();
        let join = server::Login {
            entity_id: 77,
            game_mode: 1,
            dimension: "minecraft:the_nether".to_owned(),
        };
        LoginTranslator.translate(&mut session, &join);
        PlayerPositionTranslator.translate(&mut session, &position(3));

        let sent = session.take_bedrock_packets();
        assert!(matches!(
            &sent[..],
            [
                BedrockPacket::StartGame(start),
                BedrockPacket::MovePlayer(_),
                BedrockPacket::PlayStatus(PlayStatus { status: PlayStatusKind::PlayerSpawn }),
            ] if start.dimension == 1 && start.runtime_entity_id == 1
        ));
        assert!(matches!(
            &session.take_java_packets()[..],
            [client::Packet::AcceptTeleportation(accept)] if accept.teleport_id == 3
        ));
        assert_eq!(session.player.java_id, Some(JavaEntityId::new(77)));
    }

    #[test]
    fn reconfigured_player_returns_to_play_on_position() {
        let mut session = spawning_session();
        LoginTranslator.translate(
            &mut session,
            &server::Login {
                entity_id: 1,
                game_mode: 0,
                dimension: "minecraft:overworld".to_owned(),
            },
        );
        PlayerPositionTranslator.translate(&mut session, &position(1));
        session.player.initialized = true;
        session.transition(Phase::Play);
        session.reconfigure();
        session.transition(Phase::Spawning);
        session.take_bedrock_packets();

        LoginTranslator.translate(
            &mut session,
            &server::Login {
                entity_id: 2,
                game_mode: 0,
                dimension: "minecraft:overworld".to_owned(),
            },
        );
        PlayerPositionTranslator.translate(&mut session, &position(2));
        assert_eq!(session.phase(), Phase::Play);
        assert!(!session
            .take_bedrock_packets()
            .iter()
            .any(|p| matches!(p, BedrockPacket::StartGame(_))));
    }
}
