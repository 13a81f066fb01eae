//! Owns the shared tables and runs one task per connected player.
//!
//! Each session task pulls packets from both codecs, the control queue and
//! the deferred work queue, one at a time, so translators never race each
//! other for the session.

use crate::{
    config::GatewayConfig,
    directory::{SessionCommand, SessionDirectory, SessionHandle},
    hooks::{NoHooks, SessionHooks},
    mappings::{MappingError, MappingSource, Mappings, MappingsHandle},
    protocol::{bedrock, java},
    proxy::PacketIo,
    scheduler::ScheduledTask,
    session::{AuthIdentity, Session},
    translator::{self, BedrockRegistry, JavaRegistry},
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::{select, task::JoinHandle};
use tracing::Instrument;

/// Bedrock side of a session, as seen by the gateway.
pub trait BedrockIo: PacketIo<bedrock::server::Packet, bedrock::client::Packet> {}

impl<T> BedrockIo for T where T: PacketIo<bedrock::server::Packet, bedrock::client::Packet> {}

/// Java side of a session, as seen by the gateway.
pub trait JavaIo: PacketIo<java::client::Packet, java::server::Packet> {}

impl<T> JavaIo for T where T: PacketIo<java::client::Packet, java::server::Packet> {}

pub struct Gateway {
    java_registry: Arc<JavaRegistry>,
    bedrock_registry: Arc<BedrockRegistry>,
    mappings: MappingsHandle,
    directory: Arc<SessionDirectory>,
    hooks: Arc<dyn SessionHooks>,
    config: Arc<GatewayConfig>,
    next_session_id: AtomicU64,
}

impl Gateway {
    pub fn new(config: GatewayConfig, mappings: Mappings) -> Self {
        Self::with_hooks(config, mappings, Arc::new(NoHooks))
    }

    pub fn with_hooks(
        config: GatewayConfig,
        mappings: Mappings,
        hooks: Arc<dyn SessionHooks>,
    ) -> Self {
        Self {
            java_registry: Arc::new(translator::java_registry()),
            bedrock_registry: Arc::new(translator::bedrock_registry()),
            mappings: MappingsHandle::new(mappings),
            directory: Arc::new(SessionDirectory::new()),
            hooks,
            config: Arc::new(config),
            next_session_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn mappings(&self) -> &MappingsHandle {
        &self.mappings
    }

    pub fn directory(&self) -> &SessionDirectory {
        &self.directory
    }

    pub fn java_registry(&self) -> &JavaRegistry {
        &self.java_registry
    }

    pub fn bedrock_registry(&self) -> &BedrockRegistry {
        &self.bedrock_registry
    }

    /// Creates the session for an authenticated Bedrock player and begins
    /// the Java login. A session the same player still has elsewhere is
    /// told to disconnect.
    pub fn on_session_connected(&self, identity: AuthIdentity) -> Session {
        if let Some(existing) = self.directory.get(identity.uuid) {
            tracing::info!(
                "{} connected again; ending session {}",
                identity.display_name,
                existing.id
            );
            existing.disconnect("Logged in from another location");
        }

        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let mut session = Session::new(
            id,
            identity,
            self.mappings.subscribe(),
            Arc::clone(&self.config),
            Arc::clone(&self.hooks),
        );
        session.start();
        session
    }

    /// Runs `session` on its own task until either side goes away. The
    /// task yields the session back when it ends.
    pub fn spawn_session<B, J>(
        &self,
        session: Session,
        bedrock_io: B,
        java_io: J,
    ) -> (SessionHandle, JoinHandle<Session>)
    where
        B: BedrockIo + Send + Sync + 'static,
        J: JavaIo + Send + Sync + 'static,
    {
        let (control, commands) = flume::bounded(self.config.control_queue_capacity);
        let handle = SessionHandle {
            id: session.id(),
            uuid: session.identity().uuid,
            display_name: session.identity().display_name.clone(),
            control,
        };
        if let Some(displaced) = self.directory.insert(handle.clone()) {
            displaced.disconnect("Logged in from another location");
        }

        let span = tracing::info_span!(
            "session",
            id = session.id(),
            name = %session.identity().display_name
        );
        let driver = SessionDriver {
            session,
            bedrock_io,
            java_io,
            commands,
            java_registry: Arc::clone(&self.java_registry),
            bedrock_registry: Arc::clone(&self.bedrock_registry),
            directory: Arc::clone(&self.directory),
        };
        let task = tokio::spawn(driver.run().instrument(span));
        (handle, task)
    }

    /// Tells a running session to disconnect.
    pub fn on_session_disconnected(&self, handle: &SessionHandle, reason: &str) {
        if !handle.disconnect(reason) {
            tracing::debug!("Session {} already ended", handle.id);
        }
    }

    /// Validates and publishes new mapping tables. Running sessions pick
    /// them up before their next packet.
    pub fn reload(&self, source: MappingSource) -> Result<(), MappingError> {
        self.mappings.reload(source)
    }
}

enum Event {
    Java(anyhow::Result<java::server::Packet>),
    Bedrock(anyhow::Result<bedrock::client::Packet>),
    Deferred(ScheduledTask),
    Command(SessionCommand),
    ControlClosed,
}

struct SessionDriver<B, J> {
    session: Session,
    bedrock_io: B,
    java_io: J,
    commands: flume::Receiver<SessionCommand>,
    java_registry: Arc<JavaRegistry>,
    bedrock_registry: Arc<BedrockRegistry>,
    directory: Arc<SessionDirectory>,
}

impl<B, J> SessionDriver<B, J>
where
    B: BedrockIo + Send + Sync + 'static,
    J: JavaIo + Send + Sync + 'static,
{
    async fn run(mut self) -> Session {
        let mut commands_open = true;
        loop {
            if let Err(e) = self.flush().await {
                self.session
                    .disconnect_silently(format!("Connection lost: {e}"));
            }
            if self.session.is_disconnected() {
                break;
            }

            let event = select! {
                packet = self.java_io.recv_packet() => Event::Java(packet),
                packet = self.bedrock_io.recv_packet() => Event::Bedrock(packet),
                Some(task) = self.session.scheduler.expired(), if !self.session.scheduler.is_empty() => {
                    Event::Deferred(task)
                }
                command = self.commands.recv_async(), if commands_open => match command {
                    Ok(command) => Event::Command(command),
                    Err(_) => Event::ControlClosed,
                },
            };

            if self.session.refresh_mappings() {
                tracing::debug!("Session picked up new mappings");
            }
            let session = &mut self.session;
            match event {
                Event::Java(Ok(packet)) => {
                    self.java_registry.dispatch(session, &packet);
                }
                Event::Java(Err(e)) => {
                    tracing::info!("Java connection closed: {e:#}");
                    session.disconnect("Lost connection to the server");
                }
                Event::Bedrock(Ok(packet)) => {
                    self.bedrock_registry.dispatch(session, &packet);
                }
                Event::Bedrock(Err(e)) => {
                    tracing::info!("Bedrock connection closed: {e:#}");
                    session.disconnect_silently("Client disconnected");
                }
                Event::Deferred(task) => {
                    tracing::trace!("Running deferred {:?}", task.key);
                    task.run(session);
                }
                Event::Command(SessionCommand::Disconnect(reason)) => session.disconnect(reason),
                Event::ControlClosed => commands_open = false,
            }
        }

        // Best effort: the disconnect notice may not make it if the
        // client is already gone.
        if let Err(e) = self.flush().await {
            tracing::debug!("Could not deliver final packets: {e:#}");
        }
        self.directory
            .remove(self.session.identity().uuid, self.session.id());
        tracing::info!(
            "Session ended: {}",
            self.session.disconnect_reason().unwrap_or("unknown reason")
        );
        self.session
    }

    async fn flush(&mut self) -> anyhow::Result<()> {
        for packet in self.session.take_java_packets() {
            self.java_io.send_packet(packet).await?;
        }
        for packet in self.session.take_bedrock_packets() {
            self.bedrock_io.send_packet(packet).await?;
        }
        Ok(())
    }
}
