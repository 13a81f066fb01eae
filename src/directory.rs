//! Lookup of live sessions by player UUID.
//!
//! This is the only state shared between session tasks.

use dashmap::DashMap;
use uuid::Uuid;

/// Requests delivered to a session task from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// End the session, showing `reason` to the player.
    Disconnect(String),
}

/// Handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: u64,
    pub uuid: Uuid,
    pub display_name: String,
    pub(crate) control: flume::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Asks the session to disconnect. Returns `false` if it has already
    /// ended or its control queue is full.
    pub fn disconnect(&self, reason: impl Into<String>) -> bool {
        self.control
            .try_send(SessionCommand::Disconnect(reason.into()))
            .is_ok()
    }

    pub fn is_running(&self) -> bool {
        !self.control.is_disconnected()
    }
}

#[derive(Debug, Default)]
pub struct SessionDirectory {
    sessions: DashMap<Uuid, SessionHandle>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session, returning the one it displaced for the same player.
    pub fn insert(&self, handle: SessionHandle) -> Option<SessionHandle> {
        self.sessions.insert(handle.uuid, handle)
    }

    pub fn get(&self, uuid: Uuid) -> Option<SessionHandle> {
        self.sessions.get(&uuid).map(|entry| entry.value().clone())
    }

    /// Removes the player's entry if it still belongs to session `id`.
    pub fn remove(&self, uuid: Uuid, id: u64) -> Option<SessionHandle> {
        self.sessions
            .remove_if(&uuid, |_, handle| handle.id == id)
            .map(|(_, handle)| handle)
    }

    pub fn handles(&self) -> Vec<SessionHandle> {
        self.sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
