//! Pending trade-offer bookkeeping.
//!
//! Peer offers sit in the [`TradeLedger`] until another player accepts them
//! or the sender's own next turn starts, at which point they expire. Bank
//! trades never enter the ledger - the engine settles them immediately.

use crate::board::Resource;
use crate::player::PlayerId;
use serde::{Deserialize, Serialize};

/// Identifier handed out by the ledger when an offer is opened.
pub type OfferId = u32;

/// A trade offer: the sender gives `give` in exchange for `want`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOffer {
    pub id: OfferId,
    pub sender: PlayerId,
    /// What the sender hands over: (kind, amount)
    pub give: (Resource, u32),
    /// What the sender asks for: (kind, amount)
    pub want: (Resource, u32),
    /// True for the immediate 4:1 exchange with the bank
    pub is_bank_trade: bool,
    pub accepted: bool,
    pub accepted_by: Option<PlayerId>,
}

impl TradeOffer {
    /// Mark the offer as accepted by a player
    pub fn accept(&mut self, accepter: PlayerId) {
        self.accepted = true;
        self.accepted_by = Some(accepter);
    }

    /// An offer expires when its sender's own turn comes around again
    pub fn is_expired(&self, current_turn_player: PlayerId) -> bool {
        self.sender == current_turn_player
    }
}

/// The set of open peer offers, visible to every player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeLedger {
    offers: Vec<TradeOffer>,
    next_id: OfferId,
}

impl TradeLedger {
    /// An empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a peer offer and return a copy carrying its assigned ID
    pub fn open(
        &mut self,
        sender: PlayerId,
        give: (Resource, u32),
        want: (Resource, u32),
    ) -> TradeOffer {
        let offer = TradeOffer {
            id: self.next_id,
            sender,
            give,
            want,
            is_bank_trade: false,
            accepted: false,
            accepted_by: None,
        };
        self.next_id += 1;
        self.offers.push(offer);
        offer
    }

    /// Look up an open offer
    pub fn get(&self, id: OfferId) -> Option<&TradeOffer> {
        self.offers.iter().find(|o| o.id == id)
    }

    /// Remove and return an open offer
    pub fn take(&mut self, id: OfferId) -> Option<TradeOffer> {
        let index = self.offers.iter().position(|o| o.id == id)?;
        Some(self.offers.remove(index))
    }

    /// All open offers, oldest first
    pub fn pending(&self) -> &[TradeOffer] {
        &self.offers
    }

    /// Drop every offer whose sender is the player whose turn now starts;
    /// returns the expired offer IDs.
    pub fn expire_for_sender(&mut self, current_turn_player: PlayerId) -> Vec<OfferId> {
        let expired: Vec<OfferId> = self
            .offers
            .iter()
            .filter(|o| o.is_expired(current_turn_player))
            .map(|o| o.id)
            .collect();
        self.offers.retain(|o| !o.is_expired(current_turn_player));
        expired
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }
}
