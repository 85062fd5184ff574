//! Game actions that players can take.
//!
//! This module defines all possible actions in the game and the events
//! that result from those actions. The view layer forwards user intents
//! as `GameAction`s and renders the returned `GameEvent`s.

use crate::board::{NodeId, Resource};
use crate::hex::HexCoord;
use crate::player::PlayerId;
use crate::trade::{OfferId, TradeOffer};
use serde::{Deserialize, Serialize};

/// All possible actions a player can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Roll the dice (once at the start of each turn)
    RollDice,

    /// Move the robber to a tile (required after rolling a 7)
    PlaceRobber(HexCoord),

    /// Build a settlement on a node
    BuildSettlement(NodeId),

    /// Build a road between two adjacent nodes
    BuildRoad(NodeId, NodeId),

    /// Offer a trade: with the bank (settled immediately at 4:1) or as an
    /// open offer to the other players
    OfferTrade {
        give: (Resource, u32),
        want: (Resource, u32),
        with_bank: bool,
    },

    /// Accept another player's open offer
    AcceptTrade(OfferId),

    /// End the turn
    EndTurn,
}

/// Events that occur as a result of actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Dice were rolled
    DiceRolled {
        player: PlayerId,
        dice: (u8, u8),
        sum: u8,
        /// True when the roll triggered the robber
        seven: bool,
    },

    /// Resources paid out of the bank after a roll
    ResourcesProduced {
        payouts: Vec<(PlayerId, Resource, u32)>,
    },

    /// A card was stolen on a rolled 7
    ResourceStolen {
        thief: PlayerId,
        victim: PlayerId,
        resource: Resource,
    },

    /// The robber was placed on a tile
    RobberPlaced { player: PlayerId, tile: HexCoord },

    /// A settlement was built
    SettlementBuilt { player: PlayerId, node: NodeId },

    /// A road was built
    RoadBuilt {
        player: PlayerId,
        nodes: (NodeId, NodeId),
    },

    /// A peer offer was added to the ledger
    TradeOpened { offer: TradeOffer },

    /// A 4:1 exchange with the bank went through
    BankTradeSettled {
        player: PlayerId,
        give: (Resource, u32),
        want: (Resource, u32),
    },

    /// A peer offer was accepted and settled
    TradeAccepted { offer: TradeOffer },

    /// Offers expired because their sender's turn came around again
    TradeOffersExpired {
        sender: PlayerId,
        offers: Vec<OfferId>,
    },

    /// Turn ended
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },

    /// A player reached the victory-point target
    GameWon {
        player: PlayerId,
        victory_points: u32,
    },
}
