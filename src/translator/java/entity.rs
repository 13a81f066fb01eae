use crate::{
    entity_id::JavaEntityId,
    hooks::EntitySpawn,
    position::EntityPosition,
    protocol::{
        bedrock::server::{AddEntity, MoveEntityAbsolute, RemoveEntity},
        java::server,
    },
    session::Session,
    translator::Translator,
};

/// Java entity identifiers whose Bedrock name differs.
fn bedrock_identifier(java: &str) -> &str {
    match java {
        "minecraft:experience_orb" => "minecraft:xp_orb",
        "minecraft:end_crystal" => "minecraft:ender_crystal",
        "minecraft:eye_of_ender" => "minecraft:eye_of_ender_signal",
        "minecraft:firework_rocket" => "minecraft:fireworks_rocket",
        other => other,
    }
}

pub struct SpawnEntityTranslator;

impl Translator for SpawnEntityTranslator {
    type Source = server::Packet;
    type Packet = server::SpawnEntity;

    fn translate(&self, session: &mut Session, packet: &server::SpawnEntity) {
        let java_id = JavaEntityId::new(packet.entity_id);
        let position =
            EntityPosition::from((packet.x, packet.y, packet.z, packet.pitch, packet.yaw));
        let uuid = (!packet.uuid.is_nil()).then_some(packet.uuid);

        let hooks = session.hooks();
        let spawn = EntitySpawn {
            java_id,
            uuid,
            kind: &packet.kind,
            position,
        };
        if hooks.pre_entity_spawn(session, &spawn).is_break() {
            tracing::trace!("Spawn of {java_id} cancelled by hook");
            return;
        }

        let (bedrock_id, stale) = session
            .entities
            .map_entity(java_id, uuid, packet.kind.clone());
        if let Some(stale) = stale {
            session.send_bedrock(RemoveEntity {
                unique_entity_id: stale.bedrock_id.unique_id(),
            });
        }
        session.send_bedrock(AddEntity {
            unique_entity_id: bedrock_id.unique_id(),
            runtime_entity_id: bedrock_id.runtime_id(),
            identifier: bedrock_identifier(packet.kind.as_str()).to_owned(),
            position: position.to_bedrock(),
            pitch: packet.pitch,
            yaw: packet.yaw,
            scale: 1.0,
        });
        if let Some(entry) = session.entities.entry(java_id) {
            hooks.post_entity_spawn(session, entry);
        }
    }
}

pub struct RemoveEntitiesTranslator;

impl Translator for RemoveEntitiesTranslator {
    type Source = server::Packet;
    type Packet = server::RemoveEntities;

    fn translate(&self, session: &mut Session, packet: &server::RemoveEntities) {
        for &id in &packet.entities {
            let Some(entry) = session.entities.release(JavaEntityId::new(id)) else {
                tracing::debug!("Removing unknown entity java#{id}");
                continue;
            };
            session.send_bedrock(RemoveEntity {
                unique_entity_id: entry.bedrock_id.unique_id(),
            });
        }
    }
}

pub struct TeleportEntityTranslator;

impl Translator for TeleportEntityTranslator {
    type Source = server::Packet;
    type Packet = server::TeleportEntity;

    fn translate(&self, session: &mut Session, packet: &server::TeleportEntity) {
        let java_id = JavaEntityId::new(packet.entity_id);
        let Some(bedrock_id) = session.entities.internal_id(java_id) else {
            tracing::debug!("Teleport for unknown entity {java_id}; discarding");
            return;
        };
        let position =
            EntityPosition::from((packet.x, packet.y, packet.z, packet.pitch, packet.yaw));
        session.send_bedrock(MoveEntityAbsolute {
            runtime_entity_id: bedrock_id.runtime_id(),
            position: position.to_bedrock(),
            pitch: packet.pitch,
            yaw: packet.yaw,
            on_ground: packet.on_ground,
            teleported: true,
        });
    }
}
