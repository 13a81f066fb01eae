//! Villager and wandering trader windows.
//!
//! Bedrock only opens a trade window on an entity, so the gateway spawns
//! an invisible villager riding along with the player for as long as the
//! window is open. Offers arrive separately in a merchant offers packet.

use crate::{
    inventory::{BedrockSlot, ContainerDescriptor, Holder, SlotTranslation},
    protocol::{
        bedrock::{
            server::{AddEntity, EntityLinkKind, SetEntityLink, TradeOffer, UpdateTrade},
            ContainerSlotType, ContainerType, ItemData,
        },
        java::{self, MerchantOffer},
    },
    scheduler::TaskKey,
    session::Session,
};
use std::ops::ControlFlow;

/// Java trade slots and their fixed Bedrock UI positions.
const SLOTS: [(ContainerSlotType, u8); 3] = [
    (ContainerSlotType::Trade2Ingredient1, 4),
    (ContainerSlotType::Trade2Ingredient2, 5),
    (ContainerSlotType::Trade2Result, 50),
];

/// Experience needed to reach each villager level.
const TIER_EXP_REQUIREMENTS: [i32; 5] = [0, 10, 70, 150, 250];

const MAX_VILLAGER_LEVEL: i32 = 5;

pub fn translate(slot: usize) -> SlotTranslation {
    match SLOTS.get(slot) {
        Some(&(region, index)) => SlotTranslation::Mapped(BedrockSlot::new(region, index)),
        None => SlotTranslation::Unrepresentable,
    }
}

pub fn java_slot(slot: BedrockSlot) -> Option<usize> {
    if slot.region == ContainerSlotType::CreatedOutput {
        return Some(2);
    }
    SLOTS
        .iter()
        .position(|&(region, index)| region == slot.region && index == slot.index)
}

pub fn open(session: &mut Session, descriptor: &mut ContainerDescriptor) -> ControlFlow<()> {
    let Some(player) = session.player.bedrock_id else {
        tracing::warn!("Trade window {} before the player spawned", descriptor.java_id);
        return ControlFlow::Break(());
    };
    let villager = session.entities.allocate_local();
    let mut position = session.player.position.to_bedrock();
    position.y -= 3.0;

    session.send_bedrock(AddEntity {
        unique_entity_id: villager.unique_id(),
        runtime_entity_id: villager.runtime_id(),
        identifier: "minecraft:villager_v2".to_owned(),
        position,
        pitch: 0.0,
        yaw: 0.0,
        scale: 0.0,
    });
    session.send_bedrock(SetEntityLink {
        from_unique_entity_id: player.unique_id(),
        to_unique_entity_id: villager.unique_id(),
        link: EntityLinkKind::Passenger,
        immediate: true,
    });
    descriptor.holder = Holder::Synthetic(villager);
    ControlFlow::Continue(())
}

fn bedrock_offer(
    session: &Session,
    index: usize,
    offer: &MerchantOffer,
) -> TradeOffer {
    let mappings = session.mappings();
    let item = |stack: &java::ItemStack| mappings.items.to_bedrock(Some(stack), &mappings.blocks);
    TradeOffer {
        net_id: index as u32 + 1,
        buy_a: item(&offer.first_input),
        buy_b: offer.second_input.as_ref().map(item),
        sell: item(&offer.output),
        uses: if offer.disabled {
            offer.max_uses
        } else {
            offer.uses
        },
        max_uses: offer.max_uses,
        tier: 0,
        trader_exp: offer.xp,
        demand: offer.demand,
        price_multiplier: offer.price_multiplier,
    }
}

/// Presents the merchant's offers, which also opens the window.
pub fn on_offers(session: &mut Session, packet: &java::server::MerchantOffers) {
    let Some(window) = session
        .inventory
        .open
        .as_ref()
        .filter(|open| open.java_id == packet.container_id)
    else {
        tracing::warn!(
            "Offers for window {}, which is not open; discarding",
            packet.container_id
        );
        return;
    };
    let Holder::Synthetic(villager) = window.holder else {
        tracing::warn!("Offers for non-merchant window {}", packet.container_id);
        return;
    };
    let Some(player) = session.player.bedrock_id else {
        return;
    };

    let mut offers: Vec<TradeOffer> = packet
        .offers
        .iter()
        .enumerate()
        .map(|(i, offer)| bedrock_offer(session, i, offer))
        .collect();
    if packet.regular_villager && packet.villager_level < MAX_VILLAGER_LEVEL {
        // Locked placeholder so Bedrock shows progress towards the next level.
        offers.push(TradeOffer {
            net_id: offers.len() as u32 + 1,
            buy_a: ItemData::AIR,
            buy_b: None,
            sell: ItemData::AIR,
            uses: 0,
            max_uses: 0,
            tier: packet.villager_level,
            trader_exp: 0,
            demand: 0,
            price_multiplier: 0.0,
        });
    }

    let update = UpdateTrade {
        container_id: window.bedrock_id,
        container_type: ContainerType::Trade,
        trade_tier: (packet.villager_level - 1).max(0),
        display_name: window.title.clone(),
        trader_unique_entity_id: villager.unique_id(),
        player_unique_entity_id: player.unique_id(),
        offers,
        tier_exp_requirements: TIER_EXP_REQUIREMENTS.to_vec(),
        new_trading_ui: true,
    };
    session.send_bedrock(update);

    if let Some(window) = session.inventory.open.as_mut() {
        window.visible = true;
        if let Some(trade) = &mut window.trade {
            trade.offers = packet.offers.clone();
            trade.selected = None;
        }
    }
}

/// Handles the client picking an offer. The choice is forwarded after a
/// short delay, since Bedrock reports a selection before moving items.
pub fn select_offer(session: &mut Session, recipe_network_id: u32) -> bool {
    let transaction = session.inventory.transaction;
    let delay = session.config().trade_commit_delay;
    let phase = session.phase();
    let Some(window) = session.inventory.open.as_mut() else {
        return false;
    };
    let java_id = window.java_id;
    let Some(trade) = &mut window.trade else {
        return false;
    };
    let Some(index) = (recipe_network_id as usize)
        .checked_sub(1)
        .filter(|&index| index < trade.offers.len())
    else {
        tracing::debug!("Selection of unknown trade {recipe_network_id}");
        return false;
    };
    trade.selected = Some(index);

    session
        .scheduler
        .schedule_keyed(TaskKey::TradeCommit, phase, delay, move |session| {
            commit_trade(session, java_id, transaction, index)
        })
}

fn commit_trade(session: &mut Session, java_id: i32, transaction: u32, index: usize) {
    let selected = session
        .inventory
        .open
        .as_ref()
        .filter(|open| open.java_id == java_id)
        .and_then(|open| open.trade.as_ref())
        .and_then(|trade| trade.selected);
    if selected != Some(index) || session.inventory.transaction != transaction {
        tracing::debug!("Trade selection {index} in window {java_id} went stale");
        return;
    }
    session.send_java(java::client::SelectTrade {
        offer_index: index as i32,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        inventory::{self, ContainerKind, SlotLayout},
        protocol::{
            bedrock::server::Packet as BedrockPacket,
            java::{client::Packet as JavaPacket, ItemStack},
        },
        session::tests::playing_session,
    };

    fn offer(input: i32, output: i32) -> MerchantOffer {
        MerchantOffer {
            first_input: ItemStack::new(input, 1),
            second_input: None,
            output: ItemStack::new(output, 1),
            disabled: false,
            uses: 0,
            max_uses: 12,
            xp: 2,
            special_price: 0,
            price_multiplier: 0.05,
            demand: 0,
        }
    }

    fn open_merchant(session: &mut Session) {
        let descriptor = ContainerDescriptor::new(
            7,
            7,
            SlotLayout::new(ContainerKind::Merchant, 0),
            "Farmer",
        );
        inventory::open_container(session, descriptor);
        on_offers(
            session,
            &java::server::MerchantOffers {
                container_id: 7,
                offers: vec![offer(800, 801), offer(801, 800)],
                villager_level: 2,
                experience: 12,
                regular_villager: true,
                can_restock: true,
            },
        );
    }

    #[test]
    fn offers_get_one_based_ids_and_a_locked_placeholder() {
        let mut session = playing_session();
        open_merchant(&mut session);
        let sent = session.take_bedrock_packets();

        assert!(sent
            .iter()
            .any(|p| matches!(p, BedrockPacket::AddEntity(add) if add.scale == 0.0)));
        let trade = sent
            .iter()
            .find_map(|p| match p {
                BedrockPacket::UpdateTrade(trade) => Some(trade),
                _ => None,
            })
            .unwrap();
        let ids: Vec<u32> = trade.offers.iter().map(|o| o.net_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(trade.trade_tier, 1);
        assert_eq!(trade.offers[0].buy_a.network_id, 512);
    }

    #[tokio::test(start_paused = true)]
    async fn selection_commits_after_delay() {
        let mut session = playing_session();
        open_merchant(&mut session);
        assert!(select_offer(&mut session, 2));

        let task = session.scheduler.expired().await.unwrap();
        task.run(&mut session);
        let sent = session.take_java_packets();
        assert!(sent
            .iter()
            .any(|p| matches!(p, JavaPacket::SelectTrade(select) if select.offer_index == 1)));
    }

    #[tokio::test(start_paused = true)]
    async fn intervening_transaction_cancels_commit() {
        let mut session = playing_session();
        open_merchant(&mut session);
        assert!(select_offer(&mut session, 1));
        session.inventory.next_transaction();

        session.scheduler.expired().await.unwrap().run(&mut session);
        assert!(!session
            .take_java_packets()
            .iter()
            .any(|p| matches!(p, JavaPacket::SelectTrade(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn server_slot_change_clears_the_selection() {
        let mut session = playing_session();
        open_merchant(&mut session);
        assert!(select_offer(&mut session, 1));
        inventory::on_slot_update(&mut session, 7, 3, 0, Some(&ItemStack::new(800, 2))).unwrap();
        assert_eq!(
            session.inventory.open.as_ref().unwrap().trade.as_ref().unwrap().selected,
            None
        );

        session.scheduler.expired().await.unwrap().run(&mut session);
        assert!(!session
            .take_java_packets()
            .iter()
            .any(|p| matches!(p, JavaPacket::SelectTrade(_))));
    }

    #[tokio::test]
    async fn placeholder_and_unknown_offers_are_not_selectable() {
        let mut session = playing_session();
        open_merchant(&mut session);
        assert!(!select_offer(&mut session, 3));
        assert!(!select_offer(&mut session, 0));
        assert!(session.scheduler.is_empty());
    }

    #[test]
    fn closing_despawns_the_villager() {
        let mut session = playing_session();
        open_merchant(&mut session);
        session.take_bedrock_packets();
        inventory::close_open_container(&mut session, inventory::CloseOrigin::Client);
        let sent = session.take_bedrock_packets();
        assert!(sent.iter().any(|p| matches!(p, BedrockPacket::RemoveEntity(_))));
    }
}
