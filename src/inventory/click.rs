//! Bedrock item stack requests to Java container clicks.
//!
//! Bedrock describes an inventory change as "move N items from slot A to
//! slot B" and predicts the outcome. Java only knows mouse clicks, so each
//! action is replayed as the click sequence a Java player would perform,
//! simulated against the last known window contents so every click can
//! carry its predicted slot changes. Requests that touch a slot with no
//! Java counterpart, or that the simulation cannot reproduce, are answered
//! with an error so the client rolls its prediction back.

use crate::{
    inventory::{anvil, merchant, BedrockSlot, SlotError},
    mappings::Mappings,
    protocol::{
        bedrock::{
            client::{ItemStackRequest, StackRequest, StackRequestAction, StackRequestSlot},
            server::{ItemStackResponse, StackResponse, StackResponseContainer, StackResponseStatus},
            ContainerSlotType,
        },
        java::{client::ContainerClick, ClickMode, ItemStack},
    },
    session::Session,
};
use std::sync::Arc;

/// Slot number Java uses for clicks outside the window.
const OUTSIDE: i16 = -999;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Slot(#[from] SlotError),
    #[error("request moves {requested} items but only {available} are there")]
    NotEnoughItems { requested: u8, available: u8 },
    #[error("request needs an empty cursor")]
    CursorBusy,
    #[error("destination holds a different item")]
    Incompatible,
    #[error("destination has room for {room} more items, not {requested}")]
    NoRoom { requested: u8, room: u8 },
    #[error("unsupported action")]
    Unsupported,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Endpoint {
    Cursor,
    Slot(usize),
}

#[derive(Debug, Clone, PartialEq)]
struct Click {
    slot: i16,
    button: i8,
    mode: ClickMode,
    changed: Vec<(i16, Option<ItemStack>)>,
    carried: Option<ItemStack>,
}

/// Working copy of a window that clicks are applied to.
#[derive(Debug, Clone)]
struct Simulation {
    items: Vec<Option<ItemStack>>,
    cursor: Option<ItemStack>,
    clicks: Vec<Click>,
    mappings: Arc<Mappings>,
}

fn stackable(a: &ItemStack, b: &ItemStack) -> bool {
    a.item_id == b.item_id && a.components == b.components
}

fn with_count(item: &ItemStack, count: u8) -> Option<ItemStack> {
    (count > 0).then(|| ItemStack {
        count,
        ..item.clone()
    })
}

impl Simulation {
    fn stack_size(&self, item: &ItemStack) -> u8 {
        self.mappings.items.stack_size(item.item_id)
    }

    fn count(&self, endpoint: Endpoint) -> u8 {
        let item = match endpoint {
            Endpoint::Cursor => self.cursor.as_ref(),
            Endpoint::Slot(slot) => self.items[slot].as_ref(),
        };
        item.map_or(0, |item| item.count)
    }

    fn record(&mut self, slot: usize, button: i8, mode: ClickMode) {
        self.clicks.push(Click {
            slot: slot as i16,
            button,
            mode,
            changed: vec![(slot as i16, self.items[slot].clone())],
            carried: self.cursor.clone(),
        });
    }

    /// Left click: pick up, put down, merge or swap the whole stack.
    fn left(&mut self, slot: usize) {
        let limit = self.items[slot].as_ref().map_or(0, |held| self.stack_size(held));
        let target = &mut self.items[slot];
        match (self.cursor.take(), target.take()) {
            (None, held) => self.cursor = held,
            (Some(carried), None) => *target = Some(carried),
            (Some(carried), Some(held)) if stackable(&carried, &held) => {
                let moved = carried.count.min(limit.saturating_sub(held.count));
                *target = with_count(&held, held.count + moved);
                self.cursor = with_count(&carried, carried.count - moved);
            }
            (Some(carried), Some(held)) => {
                *target = Some(carried);
                self.cursor = Some(held);
            }
        }
        self.record(slot, 0, ClickMode::Pickup);
    }

    /// Right click: take half (rounded up) or put one down.
    fn right(&mut self, slot: usize) {
        let limit = self.items[slot].as_ref().map_or(0, |held| self.stack_size(held));
        let target = &mut self.items[slot];
        match (self.cursor.take(), target.take()) {
            (None, None) => {}
            (None, Some(held)) => {
                let taken = held.count.div_ceil(2);
                self.cursor = with_count(&held, taken);
                *target = with_count(&held, held.count - taken);
            }
            (Some(carried), None) => {
                *target = with_count(&carried, 1);
                self.cursor = with_count(&carried, carried.count - 1);
            }
            (Some(carried), Some(held)) if stackable(&carried, &held) => {
                // Java leaves a full stack and the cursor untouched.
                if held.count < limit {
                    *target = with_count(&held, held.count + 1);
                    self.cursor = with_count(&carried, carried.count - 1);
                } else {
                    *target = Some(held);
                    self.cursor = Some(carried);
                }
            }
            (Some(carried), Some(held)) => {
                *target = Some(carried);
                self.cursor = Some(held);
            }
        }
        self.record(slot, 1, ClickMode::Pickup);
    }

    fn drop_cursor(&mut self, all: bool) {
        self.cursor = match (self.cursor.take(), all) {
            (Some(carried), false) => with_count(&carried, carried.count - 1),
            _ => None,
        };
        self.clicks.push(Click {
            slot: OUTSIDE,
            button: if all { 0 } else { 1 },
            mode: ClickMode::Pickup,
            changed: Vec::new(),
            carried: self.cursor.clone(),
        });
    }

    fn throw(&mut self, slot: usize, all: bool) {
        let target = &mut self.items[slot];
        *target = match (target.take(), all) {
            (Some(held), false) => with_count(&held, held.count - 1),
            _ => None,
        };
        self.record(slot, if all { 1 } else { 0 }, ClickMode::Throw);
    }

    fn require(&self, endpoint: Endpoint, count: u8) -> Result<(), RequestError> {
        let available = self.count(endpoint);
        if count == 0 || count > available {
            return Err(RequestError::NotEnoughItems {
                requested: count,
                available,
            });
        }
        Ok(())
    }

    fn require_empty_cursor(&self) -> Result<(), RequestError> {
        match self.cursor {
            Some(_) => Err(RequestError::CursorBusy),
            None => Ok(()),
        }
    }

    fn accepts(&self, slot: usize, item: Option<&ItemStack>, count: u8) -> Result<(), RequestError> {
        let Some(item) = item else {
            return Ok(());
        };
        let (held, limit) = match &self.items[slot] {
            Some(held) if !stackable(held, item) => return Err(RequestError::Incompatible),
            Some(held) => (held.count, self.stack_size(held)),
            None => (0, self.stack_size(item)),
        };
        let room = limit.saturating_sub(held);
        if count > room {
            return Err(RequestError::NoRoom {
                requested: count,
                room,
            });
        }
        Ok(())
    }

    fn transfer(&mut self, count: u8, from: Endpoint, to: Endpoint) -> Result<(), RequestError> {
        self.require(from, count)?;
        match (from, to) {
            (Endpoint::Cursor, Endpoint::Cursor) => {}
            (Endpoint::Cursor, Endpoint::Slot(slot)) => {
                self.accepts(slot, self.cursor.as_ref(), count)?;
                if count == self.count(Endpoint::Cursor) {
                    self.left(slot);
                } else {
                    (0..count).for_each(|_| self.right(slot));
                }
            }
            (Endpoint::Slot(slot), Endpoint::Cursor) => {
                self.require_empty_cursor()?;
                let held = self.count(from);
                if count == held {
                    self.left(slot);
                } else if count == held.div_ceil(2) {
                    self.right(slot);
                } else {
                    self.left(slot);
                    (0..held - count).for_each(|_| self.right(slot));
                }
            }
            (Endpoint::Slot(source), Endpoint::Slot(destination)) => {
                self.require_empty_cursor()?;
                self.accepts(destination, self.items[source].as_ref(), count)?;
                let held = self.count(from);
                self.left(source);
                if count == held {
                    self.left(destination);
                } else {
                    (0..count).for_each(|_| self.right(destination));
                }
                if self.cursor.is_some() {
                    self.left(source);
                }
            }
        }
        Ok(())
    }

    fn swap(&mut self, a: Endpoint, b: Endpoint) -> Result<(), RequestError> {
        let (Endpoint::Slot(a), Endpoint::Slot(b)) = (a, b) else {
            return Err(RequestError::Unsupported);
        };
        self.require_empty_cursor()?;
        self.left(a);
        self.left(b);
        self.left(a);
        Ok(())
    }

    fn discard(&mut self, count: u8, from: Endpoint) -> Result<(), RequestError> {
        self.require(from, count)?;
        let all = count == self.count(from);
        let repeats = if all { 1 } else { count };
        for _ in 0..repeats {
            match from {
                Endpoint::Cursor => self.drop_cursor(all),
                Endpoint::Slot(slot) => self.throw(slot, all),
            }
        }
        Ok(())
    }
}

fn resolve(session: &Session, slot: StackRequestSlot) -> Result<Endpoint, RequestError> {
    if slot.container == ContainerSlotType::Cursor {
        return Ok(Endpoint::Cursor);
    }
    let layout = session.inventory.active().layout;
    Ok(Endpoint::Slot(
        layout.require_java_slot(BedrockSlot::new(slot.container, slot.slot))?,
    ))
}

fn touched(action: &StackRequestAction) -> Vec<StackRequestSlot> {
    match action {
        StackRequestAction::Take {
            source,
            destination,
            ..
        }
        | StackRequestAction::Place {
            source,
            destination,
            ..
        }
        | StackRequestAction::Swap {
            source,
            destination,
        } => vec![*source, *destination],
        StackRequestAction::Drop { source, .. } => vec![*source],
        StackRequestAction::CraftRecipe { .. } | StackRequestAction::CraftRecipeOptional { .. } => {
            Vec::new()
        }
    }
}

fn simulate(session: &Session, request: &StackRequest) -> Result<Simulation, RequestError> {
    let window = session.inventory.active();
    let mut simulation = Simulation {
        items: window.items.clone(),
        cursor: session.inventory.cursor.clone(),
        clicks: Vec::new(),
        mappings: session.mappings(),
    };
    for action in &request.actions {
        match action {
            StackRequestAction::Take {
                count,
                source,
                destination,
            }
            | StackRequestAction::Place {
                count,
                source,
                destination,
            } => {
                let from = resolve(session, *source)?;
                let to = resolve(session, *destination)?;
                simulation.transfer(*count, from, to)?;
            }
            StackRequestAction::Swap {
                source,
                destination,
            } => {
                let a = resolve(session, *source)?;
                let b = resolve(session, *destination)?;
                simulation.swap(a, b)?;
            }
            StackRequestAction::Drop { count, source } => {
                let from = resolve(session, *source)?;
                simulation.discard(*count, from)?;
            }
            // The anvil result is already in the window; only the name matters.
            StackRequestAction::CraftRecipeOptional { .. } if window.anvil.is_some() => {}
            StackRequestAction::CraftRecipe { .. } | StackRequestAction::CraftRecipeOptional { .. } => {
                return Err(RequestError::Unsupported)
            }
        }
    }
    Ok(simulation)
}

fn response(request_id: i32, status: StackResponseStatus, slots: &[StackRequestSlot]) -> StackResponse {
    let mut containers: Vec<StackResponseContainer> = Vec::new();
    if status == StackResponseStatus::Ok {
        for slot in slots {
            match containers.iter_mut().find(|c| c.container == slot.container) {
                Some(container) if container.slots.contains(&slot.slot) => {}
                Some(container) => container.slots.push(slot.slot),
                None => containers.push(StackResponseContainer {
                    container: slot.container,
                    slots: vec![slot.slot],
                }),
            }
        }
    }
    StackResponse {
        request_id,
        status,
        containers,
    }
}

/// Handles one request and returns the response Bedrock waits for.
pub fn on_request(session: &mut Session, request: &StackRequest) -> StackResponse {
    let selection = request.actions.iter().find_map(|action| match action {
        StackRequestAction::CraftRecipe { recipe_network_id } => Some(*recipe_network_id),
        _ => None,
    });
    if let Some(recipe_network_id) = selection {
        // Trade windows reuse the crafting action to pick an offer.
        let status = if merchant::select_offer(session, recipe_network_id) {
            StackResponseStatus::Ok
        } else {
            StackResponseStatus::Error
        };
        return response(request.request_id, status, &[]);
    }

    let simulation = match simulate(session, request) {
        Ok(simulation) => simulation,
        Err(e) => {
            tracing::debug!("Rejecting stack request {}: {e}", request.request_id);
            return response(request.request_id, StackResponseStatus::Error, &[]);
        }
    };

    let Simulation {
        items,
        cursor,
        clicks,
        ..
    } = simulation;
    let window = session.inventory.active_mut();
    window.items = items;
    if let Some(trade) = &mut window.trade {
        trade.selected = None;
    }
    let container_id = window.java_id;
    let state_id = window.state_id;
    session.inventory.cursor = cursor;

    let rename = request.actions.iter().find_map(|action| match action {
        StackRequestAction::CraftRecipeOptional {
            filter_string: Some(name),
            ..
        } => Some(name.as_str()),
        _ => None,
    });
    if let Some(name) = rename {
        anvil::rename(session, name);
    }

    for click in clicks {
        session.inventory.next_transaction();
        session.send_java(ContainerClick {
            container_id,
            state_id,
            slot: click.slot,
            button: click.button,
            mode: click.mode,
            changed_slots: click.changed,
            carried: click.carried,
        });
    }

    let slots: Vec<StackRequestSlot> = request.actions.iter().flat_map(touched).collect();
    response(request.request_id, StackResponseStatus::Ok, &slots)
}

pub fn on_requests(session: &mut Session, packet: &ItemStackRequest) {
    let responses = packet
        .requests
        .iter()
        .map(|request| on_request(session, request))
        .collect();
    session.send_bedrock(ItemStackResponse { responses });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        inventory::{self, ContainerDescriptor, ContainerKind, SlotLayout},
        protocol::java::client::Packet as JavaPacket,
        session::tests::playing_session,
    };

    fn slot(container: ContainerSlotType, slot: u8) -> StackRequestSlot {
        StackRequestSlot { container, slot }
    }

    fn chest_session() -> Session {
        let mut session = playing_session();
        let mut descriptor = ContainerDescriptor::new(
            5,
            5,
            SlotLayout::new(ContainerKind::Generic { rows: 3 }, 0),
            "Chest",
        );
        descriptor.items[0] = Some(ItemStack::new(1, 10));
        inventory::open_container(&mut session, descriptor);
        session.take_bedrock_packets();
        session
    }

    fn clicks(session: &mut Session) -> Vec<ContainerClick> {
        session
            .take_java_packets()
            .into_iter()
            .filter_map(|p| match p {
                JavaPacket::ContainerClick(click) => Some(click),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn taking_a_whole_stack_is_one_left_click() {
        let mut session = chest_session();
        let request = StackRequest {
            request_id: 1,
            actions: vec![StackRequestAction::Take {
                count: 10,
                source: slot(ContainerSlotType::LevelEntity, 0),
                destination: slot(ContainerSlotType::Cursor, 0),
            }],
        };
        let response = on_request(&mut session, &request);
        assert_eq!(response.status, StackResponseStatus::Ok);

        let clicks = clicks(&mut session);
        assert_eq!(clicks.len(), 1);
        assert_eq!((clicks[0].slot, clicks[0].button), (0, 0));
        assert_eq!(clicks[0].carried, Some(ItemStack::new(1, 10)));
        assert_eq!(clicks[0].changed_slots, vec![(0, None)]);
        assert_eq!(session.inventory.transaction, 1);
    }

    #[test]
    fn partial_move_into_player_inventory() {
        let mut session = chest_session();
        // 4 of 10 from the chest to main inventory slot 9 (Java 27).
        let request = StackRequest {
            request_id: 2,
            actions: vec![StackRequestAction::Place {
                count: 4,
                source: slot(ContainerSlotType::LevelEntity, 0),
                destination: slot(ContainerSlotType::Inventory, 9),
            }],
        };
        assert_eq!(on_request(&mut session, &request).status, StackResponseStatus::Ok);
        let window = session.inventory.active();
        assert_eq!(window.item(0).map(|i| i.count), Some(6));
        assert_eq!(window.item(27).map(|i| i.count), Some(4));
        assert!(session.inventory.cursor.is_none());
        // pick up, four right clicks, put back
        assert_eq!(clicks(&mut session).len(), 6);
    }

    #[test]
    fn padding_slot_is_rejected_without_side_effects() {
        let mut session = playing_session();
        let descriptor = ContainerDescriptor::new(
            5,
            5,
            SlotLayout::new(ContainerKind::Generic { rows: 1 }, 0),
            "Small",
        );
        inventory::open_container(&mut session, descriptor);
        session.take_java_packets();

        let request = StackRequest {
            request_id: 3,
            actions: vec![StackRequestAction::Place {
                count: 1,
                source: slot(ContainerSlotType::Cursor, 0),
                destination: slot(ContainerSlotType::LevelEntity, 12),
            }],
        };
        let response = on_request(&mut session, &request);
        assert_eq!(response.status, StackResponseStatus::Error);
        assert!(response.containers.is_empty());
        assert!(session.take_java_packets().is_empty());
        assert_eq!(session.inventory.transaction, 0);
    }

    #[test]
    fn moving_more_than_available_is_rejected() {
        let mut session = chest_session();
        let request = StackRequest {
            request_id: 4,
            actions: vec![StackRequestAction::Take {
                count: 11,
                source: slot(ContainerSlotType::LevelEntity, 0),
                destination: slot(ContainerSlotType::Cursor, 0),
            }],
        };
        assert_eq!(on_request(&mut session, &request).status, StackResponseStatus::Error);
        assert_eq!(session.inventory.active().item(0).map(|i| i.count), Some(10));
    }

    #[test]
    fn swap_uses_three_clicks() {
        let mut session = chest_session();
        session.inventory.active_mut().items[1] = Some(ItemStack::new(801, 2));
        let request = StackRequest {
            request_id: 5,
            actions: vec![StackRequestAction::Swap {
                source: slot(ContainerSlotType::LevelEntity, 0),
                destination: slot(ContainerSlotType::LevelEntity, 1),
            }],
        };
        let response = on_request(&mut session, &request);
        assert_eq!(response.status, StackResponseStatus::Ok);
        assert_eq!(response.containers.len(), 1);
        assert_eq!(response.containers[0].slots, vec![0, 1]);

        let window = session.inventory.active();
        assert_eq!(window.item(0).map(|i| i.item_id), Some(801));
        assert_eq!(window.item(1).map(|i| i.item_id), Some(1));
        assert_eq!(clicks(&mut session).len(), 3);
    }

    #[test]
    fn dropping_part_of_a_stack_throws_one_at_a_time() {
        let mut session = chest_session();
        let request = StackRequest {
            request_id: 6,
            actions: vec![StackRequestAction::Drop {
                count: 3,
                source: slot(ContainerSlotType::LevelEntity, 0),
            }],
        };
        assert_eq!(on_request(&mut session, &request).status, StackResponseStatus::Ok);
        let clicks = clicks(&mut session);
        assert_eq!(clicks.len(), 3);
        assert!(clicks.iter().all(|c| c.mode == ClickMode::Throw && c.button == 0));
        assert_eq!(session.inventory.active().item(0).map(|i| i.count), Some(7));
    }

    #[test]
    fn right_click_on_a_full_matching_stack_changes_nothing() {
        let session = playing_session();
        let mut simulation = Simulation {
            items: vec![Some(ItemStack::new(1, 64))],
            cursor: Some(ItemStack::new(1, 5)),
            clicks: Vec::new(),
            mappings: session.mappings(),
        };
        simulation.right(0);
        assert_eq!(simulation.items[0], Some(ItemStack::new(1, 64)));
        assert_eq!(simulation.cursor, Some(ItemStack::new(1, 5)));
        assert_eq!(simulation.clicks.len(), 1);
        assert_eq!(simulation.clicks[0].carried, Some(ItemStack::new(1, 5)));
    }

    #[test]
    fn placing_onto_a_full_stack_is_rejected() {
        let mut session = chest_session();
        session.inventory.active_mut().items[1] = Some(ItemStack::new(1, 64));
        session.inventory.cursor = Some(ItemStack::new(1, 3));
        let request = StackRequest {
            request_id: 7,
            actions: vec![StackRequestAction::Place {
                count: 1,
                source: slot(ContainerSlotType::Cursor, 0),
                destination: slot(ContainerSlotType::LevelEntity, 1),
            }],
        };
        assert_eq!(on_request(&mut session, &request).status, StackResponseStatus::Error);
        assert!(clicks(&mut session).is_empty());
    }

    #[test]
    fn stack_size_comes_from_the_item_mappings() {
        let mut session = chest_session();
        let window = session.inventory.active_mut();
        window.items[1] = Some(ItemStack::new(802, 1));
        window.items[2] = Some(ItemStack::new(802, 1));
        let request = StackRequest {
            request_id: 8,
            actions: vec![StackRequestAction::Place {
                count: 1,
                source: slot(ContainerSlotType::LevelEntity, 2),
                destination: slot(ContainerSlotType::LevelEntity, 1),
            }],
        };
        assert_eq!(on_request(&mut session, &request).status, StackResponseStatus::Error);
        assert_eq!(session.inventory.active().item(2).map(|i| i.count), Some(1));

        // Stone stacks to 64, so ten more fit on top of the first slot.
        session.inventory.active_mut().items[3] = Some(ItemStack::new(1, 10));
        let request = StackRequest {
            request_id: 9,
            actions: vec![StackRequestAction::Place {
                count: 10,
                source: slot(ContainerSlotType::LevelEntity, 3),
                destination: slot(ContainerSlotType::LevelEntity, 0),
            }],
        };
        assert_eq!(on_request(&mut session, &request).status, StackResponseStatus::Ok);
        assert_eq!(session.inventory.active().item(0).map(|i| i.count), Some(20));
        assert_eq!(session.inventory.active().item(3), None);
    }
}
