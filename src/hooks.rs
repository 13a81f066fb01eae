//! Extension points around session actions.
//!
//! A `pre_*` hook returning [`ControlFlow::Break`] cancels the default
//! action. Transitions into [`Phase::Disconnected`] are not cancellable.

use crate::{
    entity_id::JavaEntityId,
    identity::IdentityEntry,
    inventory::ContainerDescriptor,
    phase::Phase,
    position::EntityPosition,
    protocol::java::EntityType,
    session::Session,
};
use std::ops::ControlFlow;
use uuid::Uuid;

/// An entity about to be spawned on the Bedrock side.
#[derive(Debug, Clone, Copy)]
pub struct EntitySpawn<'a> {
    pub java_id: JavaEntityId,
    pub uuid: Option<Uuid>,
    pub kind: &'a EntityType,
    pub position: EntityPosition,
}

pub trait SessionHooks: Send + Sync + 'static {
    fn pre_entity_spawn(&self, _session: &Session, _entity: &EntitySpawn) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn post_entity_spawn(&self, _session: &Session, _entry: &IdentityEntry) {}

    fn pre_container_open(
        &self,
        _session: &Session,
        _container: &ContainerDescriptor,
    ) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn post_container_open(&self, _session: &Session, _container: &ContainerDescriptor) {}

    fn pre_phase_change(&self, _session: &Session, _from: Phase, _to: Phase) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn post_phase_change(&self, _session: &Session, _from: Phase, _to: Phase) {}
}

/// Hooks that never intervene.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl SessionHooks for NoHooks {}
