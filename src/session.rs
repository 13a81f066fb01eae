//! Per-connection translation state.

use crate::{
    config::GatewayConfig,
    entity_id::{BedrockEntityId, JavaEntityId},
    hooks::SessionHooks,
    identity::IdentityRegistry,
    inventory::{self, CloseOrigin, InventoryState},
    mappings::Mappings,
    phase::Phase,
    position::{BlockPosition, EntityPosition},
    protocol::{bedrock, java},
    scheduler::Scheduler,
};
use ahash::AHashMap;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

const RECONFIGURE_REFUSED: &str = "Unable to follow the server into configuration";

/// The authenticated Bedrock player behind a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub display_name: String,
    pub uuid: Uuid,
    pub xuid: String,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    pub java_id: Option<JavaEntityId>,
    pub bedrock_id: Option<BedrockEntityId>,
    pub position: EntityPosition,
    /// Whether Bedrock has been told the player spawned.
    pub spawned: bool,
    /// Whether the client has reported it is ready to play.
    pub initialized: bool,
}

/// All translation state of one player connection.
///
/// A session is owned by exactly one task, which runs every translator
/// and deferred action for it in turn. Nothing in here is shared.
pub struct Session {
    id: u64,
    identity: AuthIdentity,
    phase: Phase,
    pub(crate) entities: IdentityRegistry,
    pub(crate) inventory: InventoryState,
    pub(crate) scheduler: Scheduler,
    pub(crate) player: PlayerState,
    /// Block states seen in block updates, to restore blocks the gateway
    /// temporarily replaced.
    blocks: AHashMap<BlockPosition, u32>,
    mappings: Arc<Mappings>,
    mappings_rx: watch::Receiver<Arc<Mappings>>,
    config: Arc<GatewayConfig>,
    hooks: Arc<dyn SessionHooks>,
    to_java: Vec<java::client::Packet>,
    to_bedrock: Vec<bedrock::server::Packet>,
    disconnect_reason: Option<String>,
}

impl Session {
    pub fn new(
        id: u64,
        identity: AuthIdentity,
        mut mappings_rx: watch::Receiver<Arc<Mappings>>,
        config: Arc<GatewayConfig>,
        hooks: Arc<dyn SessionHooks>,
    ) -> Self {
        let mappings = Arc::clone(&mappings_rx.borrow_and_update());
        Self {
            id,
            identity,
            phase: Phase::Handshake,
            entities: IdentityRegistry::new(),
            inventory: InventoryState::default(),
            scheduler: Scheduler::new(),
            player: PlayerState::default(),
            blocks: AHashMap::new(),
            mappings,
            mappings_rx,
            config,
            hooks,
            to_java: Vec::new(),
            to_bedrock: Vec::new(),
            disconnect_reason: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn identity(&self) -> &AuthIdentity {
        &self.identity
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_disconnected(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn disconnect_reason(&self) -> Option<&str> {
        self.disconnect_reason.as_deref()
    }

    pub fn entities(&self) -> &IdentityRegistry {
        &self.entities
    }

    pub fn inventory(&self) -> &InventoryState {
        &self.inventory
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    /// Number of deferred actions waiting to run.
    pub fn pending_deferred(&self) -> usize {
        self.scheduler.len()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn hooks(&self) -> Arc<dyn SessionHooks> {
        Arc::clone(&self.hooks)
    }

    pub fn mappings(&self) -> Arc<Mappings> {
        Arc::clone(&self.mappings)
    }

    /// Picks up tables published since the last call. Returns whether
    /// they changed.
    pub fn refresh_mappings(&mut self) -> bool {
        match self.mappings_rx.has_changed() {
            Ok(true) => {
                self.mappings = Arc::clone(&self.mappings_rx.borrow_and_update());
                tracing::debug!("Session {} switched to reloaded mappings", self.id);
                true
            }
            _ => false,
        }
    }

    pub fn send_java(&mut self, packet: impl Into<java::client::Packet>) {
        self.to_java.push(packet.into());
    }

    pub fn send_bedrock(&mut self, packet: impl Into<bedrock::server::Packet>) {
        self.to_bedrock.push(packet.into());
    }

    pub fn take_java_packets(&mut self) -> Vec<java::client::Packet> {
        std::mem::take(&mut self.to_java)
    }

    pub fn take_bedrock_packets(&mut self) -> Vec<bedrock::server::Packet> {
        std::mem::take(&mut self.to_bedrock)
    }

    /// Begins the Java login on behalf of the player.
    pub fn start(&mut self) {
        let handshake = java::client::Handshake {
            protocol_version: self.config.protocol_version,
            server_address: self.config.remote_address.clone(),
            server_port: self.config.remote_port,
            next_state: java::client::NextState::Login,
        };
        let login = java::client::LoginStart {
            username: self.identity.display_name.clone(),
            uuid: self.identity.uuid,
        };
        self.send_java(handshake);
        self.send_java(login);
        self.transition(Phase::Login);
    }

    /// Moves to `to` if the transition is legal and no hook objects.
    pub fn transition(&mut self, to: Phase) -> bool {
        let from = self.phase;
        if !from.can_transition_to(to) {
            tracing::warn!("Refusing phase transition {from:?} -> {to:?}");
            return false;
        }
        let hooks = self.hooks();
        if !to.is_terminal() && hooks.pre_phase_change(self, from, to).is_break() {
            tracing::debug!("Phase transition {from:?} -> {to:?} cancelled by hook");
            return false;
        }

        self.phase = to;
        if to.is_terminal() {
            self.shut_down();
        }
        tracing::info!("{} entered {}", self.identity.display_name, to.as_ref());
        hooks.post_phase_change(self, from, to);
        true
    }

    /// Ends the session, telling the client why.
    pub fn disconnect(&mut self, reason: impl Into<String>) {
        if self.is_disconnected() {
            return;
        }
        let reason = reason.into();
        self.send_bedrock(bedrock::server::Disconnect {
            message: reason.clone(),
        });
        self.disconnect_reason = Some(reason);
        self.transition(Phase::Disconnected);
    }

    /// Marks the session disconnected without notifying the client, e.g.
    /// because the client is the one that left.
    pub fn disconnect_silently(&mut self, reason: impl Into<String>) {
        if self.is_disconnected() {
            return;
        }
        self.disconnect_reason = Some(reason.into());
        self.transition(Phase::Disconnected);
    }

    fn shut_down(&mut self) {
        self.scheduler.close();
        self.inventory.open = None;
        let released = self.entities.clear();
        tracing::debug!(
            "Session {} released {} entities",
            self.id,
            released.len()
        );
    }

    /// Handles the server moving the player back into configuration:
    /// play state is discarded before the new configuration begins.
    ///
    /// The server has already left play when this runs, so a session that
    /// cannot follow it is disconnected.
    pub fn reconfigure(&mut self) -> bool {
        if !self.transition(Phase::Transferring) {
            self.disconnect(RECONFIGURE_REFUSED);
            return false;
        }
        let cancelled = self.scheduler.cancel_phase(Phase::Play);
        if cancelled > 0 {
            tracing::debug!("Cancelled {cancelled} deferred actions for reconfiguration");
        }
        inventory::close_open_container(self, CloseOrigin::Server);
        self.clear_entities();
        self.blocks.clear();
        if !self.transition(Phase::Configuration) {
            self.disconnect(RECONFIGURE_REFUSED);
            return false;
        }
        self.send_java(java::client::ConfigurationAcknowledged);
        true
    }

    /// Despawns every mapped entity on the Bedrock side.
    pub fn clear_entities(&mut self) {
        for entry in self.entities.clear() {
            self.send_bedrock(bedrock::server::RemoveEntity {
                unique_entity_id: entry.bedrock_id.unique_id(),
            });
        }
    }

    pub fn record_block(&mut self, position: BlockPosition, java_state: u32) {
        self.blocks.insert(position, java_state);
    }

    /// The last Java state seen at `position`, if any.
    pub fn block_at(&self, position: BlockPosition) -> Option<u32> {
        self.blocks.get(&position).copied()
    }

    /// Shows `java_state` at `position` on the Bedrock side.
    pub fn show_block(&mut self, position: BlockPosition, java_state: u32) {
        let mappings = self.mappings();
        let blocks = &mappings.blocks;
        self.send_bedrock(bedrock::server::UpdateBlock {
            position,
            runtime_id: blocks.bedrock_id(java_state),
            layer: 0,
            priority: true,
        });
        if blocks.is_waterlogged(java_state) {
            if let Some(water) = blocks.water_bedrock_id() {
                self.send_bedrock(bedrock::server::UpdateBlock {
                    position,
                    runtime_id: water,
                    layer: 1,
                    priority: true,
                });
            }
        }
    }

    /// Puts back the block a temporary holder replaced.
    pub fn restore_block(&mut self, position: BlockPosition) {
        let java_state = self
            .block_at(position)
            .unwrap_or_else(|| self.mappings.blocks.fallback_java_id());
        self.show_block(position, java_state);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        hooks::NoHooks,
        mappings::{test_support, MappingsHandle},
        scheduler::TaskKey,
    };
    use std::{ops::ControlFlow, time::Duration};

    pub fn identity() -> AuthIdentity {
        AuthIdentity {
            display_name: "Steve".to_owned(),
            uuid: Uuid::from_u128(0x5713),
            xuid: "2535400000000000".to_owned(),
        }
    }

    pub fn session_with(hooks: Arc<dyn SessionHooks>) -> (Session, MappingsHandle) {
        let handle = MappingsHandle::new(test_support::mappings());
        let session = Session::new(
            1,
            identity(),
            handle.subscribe(),
            Arc::new(GatewayConfig::default()),
            hooks,
        );
        (session, handle)
    }

    pub fn test_session() -> Session {
        session_with(Arc::new(NoHooks)).0
    }

    /// A session that has spawned and is in play.
    pub fn playing_session() -> Session {
        playing_session_with(Arc::new(NoHooks))
    }

    pub fn playing_session_with(hooks: Arc<dyn SessionHooks>) -> Session {
        let (mut session, _handle) = session_with(hooks);
        session.start();
        for phase in [Phase::Configuration, Phase::Spawning, Phase::Play] {
            assert!(session.transition(phase));
        }
        session.player.java_id = Some(JavaEntityId::new(100));
        session.player.bedrock_id = Some(session.entities.allocate_local());
        session.player.position = EntityPosition {
            x: 10.5,
            y: 64.0,
            z: -3.5,
            ..Default::default()
        };
        session.player.spawned = true;
        session.player.initialized = true;
        session.take_java_packets();
        session.take_bedrock_packets();
        session
    }

    #[test]
    fn start_sends_handshake_and_login() {
        let mut session = test_session();
        session.start();
        assert_eq!(session.phase(), Phase::Login);
        let sent = session.take_java_packets();
        assert!(matches!(
            &sent[..],
            [java::client::Packet::Handshake(_), java::client::Packet::LoginStart(login)]
                if login.username == "Steve"
        ));
    }

    #[test]
    fn illegal_transition_keeps_phase() {
        let mut session = test_session();
        session.start();
        assert!(!session.transition(Phase::Play));
        assert_eq!(session.phase(), Phase::Login);
    }

    #[tokio::test]
    async fn disconnect_releases_everything() {
        let mut session = playing_session();
        session.entities.map_entity(
            JavaEntityId::new(5),
            None,
            java::EntityType::new("minecraft:pig"),
        );
        session
            .scheduler
            .schedule(Phase::Play, Duration::from_secs(1), |_| {});

        session.disconnect("Server closed");
        assert!(session.is_disconnected());
        assert!(session.entities.is_empty());
        assert!(session.scheduler.is_empty());
        assert!(!session
            .scheduler
            .schedule_keyed(TaskKey::TradeCommit, Phase::Play, Duration::ZERO, |_| {}));
        assert!(matches!(
            &session.take_bedrock_packets()[..],
            [bedrock::server::Packet::Disconnect(notice)] if notice.message == "Server closed"
        ));
        assert!(!session.transition(Phase::Login));
    }

    #[tokio::test]
    async fn reconfiguration_cancels_play_work() {
        let mut session = playing_session();
        session
            .scheduler
            .schedule_keyed(TaskKey::TradeCommit, Phase::Play, Duration::from_secs(1), |_| {});
        session.entities.map_entity(
            JavaEntityId::new(42),
            None,
            java::EntityType::new("minecraft:villager"),
        );

        assert!(session.reconfigure());
        assert_eq!(session.phase(), Phase::Configuration);
        assert!(session.scheduler.is_empty());
        assert!(session.entities.is_empty());
        assert!(session
            .take_java_packets()
            .iter()
            .any(|p| matches!(p, java::client::Packet::ConfigurationAcknowledged(_))));
        assert!(session
            .take_bedrock_packets()
            .iter()
            .any(|p| matches!(p, bedrock::server::Packet::RemoveEntity(_))));
    }

    struct StayInLogin;

    impl SessionHooks for StayInLogin {
        fn pre_phase_change(&self, _session: &Session, from: Phase, _to: Phase) -> ControlFlow<()> {
            if from == Phase::Login {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }
    }

    #[test]
    fn hooks_cancel_transitions_but_not_disconnects() {
        let (mut session, _handle) = session_with(Arc::new(StayInLogin));
        session.start();
        assert!(!session.transition(Phase::Configuration));
        assert_eq!(session.phase(), Phase::Login);
        session.disconnect_silently("gone");
        assert!(session.is_disconnected());
        assert_eq!(session.disconnect_reason(), Some("gone"));
    }

    struct StayInTransfer;

    impl SessionHooks for StayInTransfer {
        fn pre_phase_change(&self, _session: &Session, from: Phase, _to: Phase) -> ControlFlow<()> {
            if from == Phase::Transferring {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }
    }

    #[tokio::test]
    async fn refused_reconfiguration_disconnects_without_acknowledging() {
        let (mut session, _handle) = session_with(Arc::new(StayInTransfer));
        session.start();
        for phase in [Phase::Configuration, Phase::Spawning, Phase::Play] {
            assert!(session.transition(phase));
        }
        session.take_java_packets();

        assert!(!session.reconfigure());
        assert!(session.is_disconnected());
        assert!(!session
            .take_java_packets()
            .iter()
            .any(|p| matches!(p, java::client::Packet::ConfigurationAcknowledged(_))));
        assert!(session
            .take_bedrock_packets()
            .iter()
            .any(|p| matches!(p, bedrock::server::Packet::Disconnect(_))));
    }

    #[test]
    fn reloaded_mappings_are_picked_up_on_refresh() {
        let (mut session, handle) = session_with(Arc::new(NoHooks));
        assert!(!session.refresh_mappings());
        let source = crate::mappings::MappingSource::from_json(
            r#"{ "blocks": [ { "java_identifier": "minecraft:air", "bedrock_id": 77 } ] }"#,
            r#"{ "items": [] }"#,
        )
        .unwrap();
        handle.reload(source).unwrap();
        assert_eq!(session.mappings().blocks.bedrock_id(0), 0);
        assert!(session.refresh_mappings());
        assert_eq!(session.mappings().blocks.bedrock_id(0), 77);
    }

    #[test]
    fn waterlogged_blocks_get_water_on_layer_one() {
        let mut session = playing_session();
        let position = BlockPosition::new(1, 2, 3);
        session.show_block(position, 4);
        let layers: Vec<u32> = session
            .take_bedrock_packets()
            .into_iter()
            .filter_map(|p| match p {
                bedrock::server::Packet::UpdateBlock(update) => Some(update.layer),
                _ => None,
            })
            .collect();
        assert_eq!(layers, vec![0, 1]);
    }
}
