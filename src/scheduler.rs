//! Deferred actions that run on the session's own task.

use crate::{phase::Phase, session::Session};
use ahash::AHashMap;
use std::{
    future::poll_fn,
    task::{Context, Poll},
    time::Duration,
};
use tokio_util::time::{delay_queue, DelayQueue};

pub type DeferredAction = Box<dyn FnOnce(&mut Session) + Send>;

/// Identifies a deferred action that may be pending at most once.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TaskKey {
    DoubleChestOpen,
    TradeCommit,
}

pub struct ScheduledTask {
    pub phase: Phase,
    pub key: Option<TaskKey>,
    action: DeferredAction,
}

impl ScheduledTask {
    /// Runs the action unless the session has already disconnected.
    pub fn run(self, session: &mut Session) {
        if session.phase().is_terminal() {
            tracing::trace!("Dropping deferred {:?} after disconnect", self.key);
            return;
        }
        (self.action)(session);
    }
}

#[derive(Default)]
pub struct Scheduler {
    queue: DelayQueue<ScheduledTask>,
    phases: AHashMap<delay_queue::Key, Phase>,
    keyed: AHashMap<TaskKey, delay_queue::Key>,
    closing: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` to run after `delay`. Returns `false` if the
    /// scheduler is closing.
    pub fn schedule(
        &mut self,
        phase: Phase,
        delay: Duration,
        action: impl FnOnce(&mut Session) + Send + 'static,
    ) -> bool {
        self.insert(None, phase, delay, Box::new(action))
    }

    /// Like [`Self::schedule`], replacing any pending action with the same key.
    pub fn schedule_keyed(
        &mut self,
        key: TaskKey,
        phase: Phase,
        delay: Duration,
        action: impl FnOnce(&mut Session) + Send + 'static,
    ) -> bool {
        if self.closing {
            return self.refuse(Some(key));
        }
        self.cancel(key);
        self.insert(Some(key), phase, delay, Box::new(action))
    }

    fn insert(
        &mut self,
        key: Option<TaskKey>,
        phase: Phase,
        delay: Duration,
        action: DeferredAction,
    ) -> bool {
        if self.closing {
            return self.refuse(key);
        }
        let queue_key = self.queue.insert(ScheduledTask { phase, key, action }, delay);
        self.phases.insert(queue_key, phase);
        if let Some(key) = key {
            self.keyed.insert(key, queue_key);
        }
        true
    }

    fn refuse(&self, key: Option<TaskKey>) -> bool {
        tracing::debug!("Not scheduling {key:?}: session is shutting down");
        false
    }

    pub fn cancel(&mut self, key: TaskKey) -> bool {
        match self.keyed.remove(&key) {
            Some(queue_key) => {
                self.phases.remove(&queue_key);
                self.queue.try_remove(&queue_key).is_some()
            }
            None => false,
        }
    }

    /// Cancels every pending action registered under `phase`.
    pub fn cancel_phase(&mut self, phase: Phase) -> usize {
        let keys: Vec<_> = self
            .phases
            .iter()
            .filter(|(_, p)| **p == phase)
            .map(|(key, _)| *key)
            .collect();
        for key in &keys {
            self.remove(key);
        }
        keys.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.queue.len();
        self.queue.clear();
        self.phases.clear();
        self.keyed.clear();
        cancelled
    }

    /// Cancels everything and refuses new work from now on.
    pub fn close(&mut self) {
        self.closing = true;
        self.cancel_all();
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn is_pending(&self, key: TaskKey) -> bool {
        self.keyed.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn remove(&mut self, queue_key: &delay_queue::Key) {
        self.phases.remove(queue_key);
        if let Some(expired) = self.queue.try_remove(queue_key) {
            if let Some(key) = expired.into_inner().key {
                self.keyed.remove(&key);
            }
        }
    }

    pub fn poll_expired(&mut self, cx: &mut Context<'_>) -> Poll<Option<ScheduledTask>> {
        match self.queue.poll_expired(cx) {
            Poll::Ready(Some(expired)) => {
                self.phases.remove(&expired.key());
                let task = expired.into_inner();
                if let Some(key) = task.key {
                    self.keyed.remove(&key);
                }
                Poll::Ready(Some(task))
            }
            other => other.map(|_| None),
        }
    }

    /// Waits for the next action to come due. Resolves to `None` at once
    /// when nothing is pending.
    pub async fn expired(&mut self) -> Option<ScheduledTask> {
        poll_fn(|cx| self.poll_expired(cx)).await
    }
}
