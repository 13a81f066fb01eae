//! Container translation.
//!
//! Java addresses a window as one linear slot array: the container's own
//! slots followed by the 27 main inventory and 9 hotbar slots. Bedrock
//! splits the same window into named regions. A [`SlotLayout`] converts
//! between the two and is a pure function of kind and size; the family
//! modules supply the per-kind parts.

pub mod anvil;
pub mod click;
pub mod furnace;
pub mod generic;
pub mod horse;
pub mod merchant;
pub mod player;

use crate::{
    entity_id::BedrockEntityId,
    position::BlockPosition,
    protocol::{
        bedrock::{self, container_id, ContainerSlotType, ContainerType, ItemData},
        java::{self, ItemStack, MerchantOffer},
    },
    session::Session,
};
use std::ops::ControlFlow;

/// Slots of the player's main inventory and hotbar appended to every
/// Java container window.
pub const PLAYER_SECTION_SLOTS: usize = 36;

/// Container kinds the gateway can present to a Bedrock client.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Chest-like container with 1 to 6 rows of 9.
    Generic { rows: u8 },
    Generic3x3,
    Hopper,
    ShulkerBox,
    Furnace,
    BlastFurnace,
    Smoker,
    Anvil,
    Horse,
    /// Donkey or mule.
    ChestedHorse,
    Llama,
    Merchant,
    /// The player's own inventory, Java window 0.
    Player,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContainerFamily {
    Generic,
    Furnace,
    Anvil,
    PairedEntity,
    Trade,
    Player,
}

impl ContainerKind {
    /// Resolves a Java menu type registry id. Menus the gateway cannot
    /// present resolve to `None`.
    pub fn from_menu_type(menu_type: i32) -> Option<Self> {
        Some(match menu_type {
            0..=5 => ContainerKind::Generic {
                rows: (menu_type + 1) as u8,
            },
            6 => ContainerKind::Generic3x3,
            8 => ContainerKind::Anvil,
            10 => ContainerKind::BlastFurnace,
            14 => ContainerKind::Furnace,
            16 => ContainerKind::Hopper,
            19 => ContainerKind::Merchant,
            20 => ContainerKind::ShulkerBox,
            22 => ContainerKind::Smoker,
            _ => return None,
        })
    }

    pub fn family(self) -> ContainerFamily {
        match self {
            ContainerKind::Generic { .. }
            | ContainerKind::Generic3x3
            | ContainerKind::Hopper
            | ContainerKind::ShulkerBox => ContainerFamily::Generic,
            ContainerKind::Furnace | ContainerKind::BlastFurnace | ContainerKind::Smoker => {
                ContainerFamily::Furnace
            }
            ContainerKind::Anvil => ContainerFamily::Anvil,
            ContainerKind::Horse | ContainerKind::ChestedHorse | ContainerKind::Llama => {
                ContainerFamily::PairedEntity
            }
            ContainerKind::Merchant => ContainerFamily::Trade,
            ContainerKind::Player => ContainerFamily::Player,
        }
    }

    /// Java container slot count, for kinds whose size is fixed.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            ContainerKind::Generic { rows } => Some(usize::from(rows) * 9),
            ContainerKind::Generic3x3 => Some(9),
            ContainerKind::Hopper => Some(5),
            ContainerKind::ShulkerBox => Some(27),
            ContainerKind::Furnace | ContainerKind::BlastFurnace | ContainerKind::Smoker => Some(3),
            ContainerKind::Anvil => Some(anvil::SLOTS),
            ContainerKind::Merchant => Some(3),
            ContainerKind::Player => Some(player::SLOTS),
            ContainerKind::Horse | ContainerKind::ChestedHorse | ContainerKind::Llama => None,
        }
    }

    pub fn bedrock_type(self) -> ContainerType {
        match self {
            ContainerKind::Generic { .. } | ContainerKind::ShulkerBox => ContainerType::Container,
            ContainerKind::Generic3x3 => ContainerType::Dispenser,
            ContainerKind::Hopper => ContainerType::Hopper,
            ContainerKind::Furnace => ContainerType::Furnace,
            ContainerKind::BlastFurnace => ContainerType::BlastFurnace,
            ContainerKind::Smoker => ContainerType::Smoker,
            ContainerKind::Anvil => ContainerType::Anvil,
            ContainerKind::Horse | ContainerKind::ChestedHorse | ContainerKind::Llama => {
                ContainerType::Horse
            }
            ContainerKind::Merchant => ContainerType::Trade,
            ContainerKind::Player => ContainerType::Inventory,
        }
    }
}

/// A slot in Bedrock's region addressing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BedrockSlot {
    pub region: ContainerSlotType,
    pub index: u8,
}

impl BedrockSlot {
    pub fn new(region: ContainerSlotType, index: u8) -> Self {
        Self { region, index }
    }

    /// The Bedrock container id that holds this slot, given the id of the
    /// open window.
    pub fn container_id(self, window: u8) -> u32 {
        use ContainerSlotType::*;
        match self.region {
            Inventory | Hotbar | HotbarAndInventory => container_id::INVENTORY,
            Armor => container_id::ARMOR,
            Offhand => container_id::OFFHAND,
            Trade2Ingredient1 | Trade2Ingredient2 | Trade2Result | CraftingInput
            | CraftingOutput | CreatedOutput | Cursor | AnvilInput | AnvilMaterial
            | AnvilResult => container_id::UI,
            _ => u32::from(window),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SlotTranslation {
    Mapped(BedrockSlot),
    /// A valid Java slot Bedrock has no place for.
    Unrepresentable,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("slot {slot} is out of range for a {slots}-slot {kind:?} window")]
    OutOfRange {
        kind: ContainerKind,
        slot: usize,
        slots: usize,
    },
    #[error("Bedrock slot {region:?}:{index} has no Java counterpart in a {kind:?} window")]
    NoJavaSlot {
        kind: ContainerKind,
        region: ContainerSlotType,
        index: u8,
    },
}

/// The slot correspondence of one window.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SlotLayout {
    kind: ContainerKind,
    size: usize,
}

impl SlotLayout {
    /// `size` is the Java container's own slot count. It is ignored for
    /// kinds with a fixed size.
    pub fn new(kind: ContainerKind, size: usize) -> Self {
        Self {
            kind,
            size: kind.fixed_size().unwrap_or(size),
        }
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Container slots, excluding the appended player inventory.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Length of the Java window's slot array.
    pub fn total_slots(&self) -> usize {
        match self.kind.family() {
            ContainerFamily::Player => self.size,
            _ => self.size + PLAYER_SECTION_SLOTS,
        }
    }

    /// Translates an index into the container's own slots.
    pub fn translate_slot(&self, slot: usize) -> Result<SlotTranslation, SlotError> {
        if slot >= self.size {
            return Err(SlotError::OutOfRange {
                kind: self.kind,
                slot,
                slots: self.size,
            });
        }
        self.translate_window_slot(slot)
    }

    /// Translates an index into the whole Java window, player slots
    /// included.
    pub fn translate_window_slot(&self, slot: usize) -> Result<SlotTranslation, SlotError> {
        if slot >= self.total_slots() {
            return Err(SlotError::OutOfRange {
                kind: self.kind,
                slot,
                slots: self.total_slots(),
            });
        }
        Ok(match self.kind.family() {
            ContainerFamily::Player => player::translate(slot),
            _ if slot >= self.size => SlotTranslation::Mapped(player_section(slot - self.size)),
            ContainerFamily::Generic => generic::translate(slot),
            ContainerFamily::Furnace => furnace::translate(self.kind, slot),
            ContainerFamily::Anvil => anvil::translate(slot),
            ContainerFamily::PairedEntity => horse::translate(self.kind, slot),
            ContainerFamily::Trade => merchant::translate(slot),
        })
    }

    pub fn java_slot(&self, slot: BedrockSlot) -> Option<usize> {
        use ContainerSlotType::*;
        let family = self.kind.family();
        if family == ContainerFamily::Player {
            return player::java_slot(slot);
        }
        let java = match slot.region {
            Inventory | Hotbar | HotbarAndInventory => {
                player_section_slot(slot).map(|index| self.size + index)
            }
            _ => match family {
                ContainerFamily::Generic => generic::java_slot(self.size, slot),
                ContainerFamily::Furnace => furnace::java_slot(self.kind, slot),
                ContainerFamily::Anvil => anvil::java_slot(slot),
                ContainerFamily::PairedEntity => horse::java_slot(self.kind, self.size, slot),
                ContainerFamily::Trade => merchant::java_slot(slot),
                ContainerFamily::Player => None,
            },
        };
        java.filter(|&java| java < self.total_slots())
    }

    /// Like [`Self::java_slot`], as an error for request validation.
    pub fn require_java_slot(&self, slot: BedrockSlot) -> Result<usize, SlotError> {
        self.java_slot(slot).ok_or(SlotError::NoJavaSlot {
            kind: self.kind,
            region: slot.region,
            index: slot.index,
        })
    }
}

/// Maps an index into the 36 trailing player slots: 27 main inventory
/// slots, then the hotbar.
fn player_section(index: usize) -> BedrockSlot {
    if index < 27 {
        BedrockSlot::new(ContainerSlotType::Inventory, (index + 9) as u8)
    } else {
        BedrockSlot::new(ContainerSlotType::Hotbar, (index - 27) as u8)
    }
}

fn player_section_slot(slot: BedrockSlot) -> Option<usize> {
    let index = usize::from(slot.index);
    match (slot.region, index) {
        (_, 0..=8) => Some(27 + index),
        (ContainerSlotType::Hotbar, _) => None,
        (_, 9..=35) => Some(index - 9),
        _ => None,
    }
}

/// What stands in for the container on the Bedrock side.
#[derive(Debug, Clone, PartialEq)]
pub enum Holder {
    None,
    /// Temporary blocks placed near the player.
    Blocks(Vec<BlockPosition>),
    /// A Java entity the player interacted with.
    Entity(BedrockEntityId),
    /// An entity the gateway spawned for this window.
    Synthetic(BedrockEntityId),
}

/// Text typed into an anvil window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnvilState {
    /// Last name sent to the server, if the player renamed the item.
    pub rename: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeState {
    pub offers: Vec<MerchantOffer>,
    pub selected: Option<usize>,
}

/// The live state of one open window.
#[derive(Debug, Clone)]
pub struct ContainerDescriptor {
    pub java_id: i32,
    pub bedrock_id: u8,
    pub layout: SlotLayout,
    pub title: String,
    pub holder: Holder,
    /// Last known Java contents, indexed by Java slot.
    pub items: Vec<Option<ItemStack>>,
    pub state_id: i32,
    /// Whether Bedrock has been told to open the window yet.
    pub visible: bool,
    pub trade: Option<TradeState>,
    pub anvil: Option<AnvilState>,
}

impl ContainerDescriptor {
    pub fn new(java_id: i32, bedrock_id: u8, layout: SlotLayout, title: impl Into<String>) -> Self {
        let family = layout.kind().family();
        let trade = (family == ContainerFamily::Trade).then(TradeState::default);
        let anvil = (family == ContainerFamily::Anvil).then(AnvilState::default);
        Self {
            java_id,
            bedrock_id,
            layout,
            title: title.into(),
            holder: Holder::None,
            items: vec![None; layout.total_slots()],
            state_id: 0,
            visible: false,
            trade,
            anvil,
        }
    }

    pub fn player() -> Self {
        let mut descriptor = Self::new(
            java::PLAYER_CONTAINER_ID,
            container_id::INVENTORY as u8,
            SlotLayout::new(ContainerKind::Player, player::SLOTS),
            "",
        );
        descriptor.visible = true;
        descriptor
    }

    pub fn kind(&self) -> ContainerKind {
        self.layout.kind()
    }

    pub fn item(&self, slot: usize) -> Option<&ItemStack> {
        self.items.get(slot).and_then(Option::as_ref)
    }
}

/// Per-session inventory state.
#[derive(Debug, Clone)]
pub struct InventoryState {
    pub player: ContainerDescriptor,
    pub open: Option<ContainerDescriptor>,
    /// Item held on the cursor, as last reported by the server.
    pub cursor: Option<ItemStack>,
    /// Counts transactions sent to the server. Deferred work compares it
    /// to detect intervening changes.
    pub transaction: u32,
}

impl Default for InventoryState {
    fn default() -> Self {
        Self {
            player: ContainerDescriptor::player(),
            open: None,
            cursor: None,
            transaction: 0,
        }
    }
}

impl InventoryState {
    /// The window a Java container id refers to, if it is open.
    pub fn window(&self, java_id: i32) -> Option<&ContainerDescriptor> {
        if java_id == java::PLAYER_CONTAINER_ID {
            return Some(&self.player);
        }
        self.open.as_ref().filter(|open| open.java_id == java_id)
    }

    pub fn window_mut(&mut self, java_id: i32) -> Option<&mut ContainerDescriptor> {
        if java_id == java::PLAYER_CONTAINER_ID {
            return Some(&mut self.player);
        }
        self.open.as_mut().filter(|open| open.java_id == java_id)
    }

    /// The window Bedrock stack requests currently address.
    pub fn active(&self) -> &ContainerDescriptor {
        self.open.as_ref().unwrap_or(&self.player)
    }

    pub fn active_mut(&mut self) -> &mut ContainerDescriptor {
        self.open.as_mut().unwrap_or(&mut self.player)
    }

    pub fn next_transaction(&mut self) -> u32 {
        self.transaction = self.transaction.wrapping_add(1);
        self.transaction
    }
}

/// Converts a Java window id to the Bedrock one, which is a single byte.
pub fn bedrock_window_id(java_id: i32) -> Option<u8> {
    u8::try_from(java_id)
        .ok()
        .filter(|&id| u32::from(id) < container_id::OFFHAND)
}

/// Opens `descriptor` on the Bedrock side, closing any open window first.
pub fn open_container(session: &mut Session, mut descriptor: ContainerDescriptor) {
    // The server replaced its window whether or not this one is shown.
    if session.inventory.open.is_some() {
        close_open_container(session, CloseOrigin::Replaced);
    }

    let hooks = session.hooks();
    if hooks.pre_container_open(session, &descriptor).is_break() {
        tracing::debug!(
            "Opening {:?} window {} cancelled by hook",
            descriptor.kind(),
            descriptor.java_id
        );
        session.send_java(java::client::CloseContainer {
            container_id: descriptor.java_id,
        });
        return;
    }

    let opened = match descriptor.kind().family() {
        ContainerFamily::Generic | ContainerFamily::Furnace | ContainerFamily::Anvil => {
            generic::open(session, &mut descriptor)
        }
        ContainerFamily::PairedEntity => horse::open(session, &mut descriptor),
        ContainerFamily::Trade => merchant::open(session, &mut descriptor),
        ContainerFamily::Player => ControlFlow::Break(()),
    };
    if opened.is_break() {
        remove_holder(session, &descriptor.holder);
        session.send_java(java::client::CloseContainer {
            container_id: descriptor.java_id,
        });
        return;
    }

    tracing::debug!(
        "Opened {:?} window {} as Bedrock window {}",
        descriptor.kind(),
        descriptor.java_id,
        descriptor.bedrock_id
    );
    session.inventory.open = Some(descriptor);
    if let Some(open) = &session.inventory.open {
        hooks.post_container_open(session, open);
    }
}

/// Who closed a window.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CloseOrigin {
    /// The Java server closed it.
    Server,
    /// The Bedrock client closed it.
    Client,
    /// Another window is about to open.
    Replaced,
    /// The session is leaving play.
    Teardown,
}

/// Closes the open window, if any, and removes whatever was standing in
/// for it on the Bedrock side.
pub fn close_open_container(session: &mut Session, origin: CloseOrigin) {
    let Some(descriptor) = session.inventory.open.take() else {
        return;
    };
    session.scheduler.cancel(crate::scheduler::TaskKey::DoubleChestOpen);
    session.scheduler.cancel(crate::scheduler::TaskKey::TradeCommit);

    match origin {
        CloseOrigin::Client => {
            session.send_java(java::client::CloseContainer {
                container_id: descriptor.java_id,
            });
            session.send_bedrock(bedrock::server::ContainerClose {
                container_id: descriptor.bedrock_id,
                server_initiated: false,
            });
        }
        CloseOrigin::Server | CloseOrigin::Replaced => {
            if descriptor.visible {
                session.send_bedrock(bedrock::server::ContainerClose {
                    container_id: descriptor.bedrock_id,
                    server_initiated: true,
                });
            }
        }
        CloseOrigin::Teardown => {}
    }

    remove_holder(session, &descriptor.holder);
    tracing::debug!("Closed window {} ({origin:?})", descriptor.java_id);
}

/// Puts back whatever a window's holder replaced on the Bedrock side.
fn remove_holder(session: &mut Session, holder: &Holder) {
    match holder {
        Holder::Blocks(positions) => {
            for &position in positions {
                session.restore_block(position);
            }
        }
        Holder::Synthetic(entity) => {
            session.send_bedrock(bedrock::server::RemoveEntity {
                unique_entity_id: entity.unique_id(),
            });
        }
        Holder::Entity(_) | Holder::None => {}
    }
}

/// Sends the whole known contents of a window to Bedrock.
pub fn send_contents(session: &mut Session, descriptor: &ContainerDescriptor) {
    let mappings = session.mappings();
    let items = &mappings.items;
    let blocks = &mappings.blocks;

    let mut window: Vec<ItemData> = Vec::new();
    let mut inventory = vec![ItemData::AIR; PLAYER_SECTION_SLOTS];
    let mut armor = vec![ItemData::AIR; 4];
    let mut offhand = vec![ItemData::AIR; 1];
    let mut singles = Vec::new();

    for (slot, item) in descriptor.items.iter().enumerate() {
        let Ok(SlotTranslation::Mapped(target)) = descriptor.layout.translate_window_slot(slot) else {
            continue;
        };
        let data = items.to_bedrock(item.as_ref(), blocks);
        let index = usize::from(target.index);
        let container = target.container_id(descriptor.bedrock_id);
        let buffer = match container {
            container_id::INVENTORY => &mut inventory,
            container_id::ARMOR => &mut armor,
            container_id::OFFHAND => &mut offhand,
            container_id::UI => {
                singles.push(bedrock::server::InventorySlot {
                    container_id: container,
                    slot: u32::from(target.index),
                    item: data,
                });
                continue;
            }
            _ => &mut window,
        };
        if buffer.len() <= index {
            buffer.resize(index + 1, ItemData::AIR);
        }
        buffer[index] = data;
    }

    if descriptor.kind() != ContainerKind::Player {
        window.resize(window.len().max(generic::bedrock_capacity(descriptor)), ItemData::AIR);
        if !window.is_empty() {
            session.send_bedrock(bedrock::server::InventoryContent {
                container_id: u32::from(descriptor.bedrock_id),
                items: window,
            });
        }
    } else {
        session.send_bedrock(bedrock::server::InventoryContent {
            container_id: container_id::ARMOR,
            items: armor,
        });
        session.send_bedrock(bedrock::server::InventoryContent {
            container_id: container_id::OFFHAND,
            items: offhand,
        });
    }
    session.send_bedrock(bedrock::server::InventoryContent {
        container_id: container_id::INVENTORY,
        items: inventory,
    });
    for single in singles {
        session.send_bedrock(single);
    }
}

/// Replaces a window's contents from the server.
pub fn on_content(
    session: &mut Session,
    java_id: i32,
    state_id: i32,
    items: &[Option<ItemStack>],
    carried: Option<&ItemStack>,
) {
    session.inventory.cursor = carried.cloned();
    let Some(window) = session.inventory.window_mut(java_id) else {
        tracing::warn!("Contents for window {java_id}, which is not open; discarding");
        return;
    };
    if items.len() != window.items.len() {
        tracing::debug!(
            "Window {java_id} has {} slots but the server sent {}",
            window.items.len(),
            items.len()
        );
    }
    for (slot, item) in window.items.iter_mut().zip(items) {
        slot.clone_from(item);
    }
    window.state_id = state_id;
    if let Some(trade) = &mut window.trade {
        trade.selected = None;
    }

    if window.visible {
        let snapshot = window.clone();
        send_contents(session, &snapshot);
    }
}

/// Applies one slot update from the server.
pub fn on_slot_update(
    session: &mut Session,
    java_id: i32,
    state_id: i32,
    slot: i16,
    item: Option<&ItemStack>,
) -> Result<(), SlotError> {
    if java_id == java::CURSOR_CONTAINER_ID {
        session.inventory.cursor = item.cloned();
        return Ok(());
    }
    let Some(window) = session.inventory.window_mut(java_id) else {
        tracing::warn!("Slot update for window {java_id}, which is not open; discarding");
        return Ok(());
    };

    let index = usize::try_from(slot).unwrap_or(usize::MAX);
    let translation = window.layout.translate_window_slot(index)?;
    window.items[index] = item.cloned();
    window.state_id = state_id;
    if let Some(trade) = &mut window.trade {
        trade.selected = None;
    }
    // A new input item resets the name field on Bedrock.
    if let Some(anvil) = window.anvil.as_mut().filter(|_| index == 0) {
        anvil.rename = None;
    }

    let bedrock_window = window.bedrock_id;
    let visible = window.visible;
    let SlotTranslation::Mapped(target) = translation else {
        return Ok(());
    };
    if !visible {
        return Ok(());
    }

    let mappings = session.mappings();
    let data = mappings.items.to_bedrock(item, &mappings.blocks);
    session.send_bedrock(bedrock::server::InventorySlot {
        container_id: target.container_id(bedrock_window),
        slot: u32::from(target.index),
        item: data,
    });
    Ok(())
}
