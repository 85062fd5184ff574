//! Core game state machine.
//!
//! `GameState` owns every piece of mutable game state - board, bank, player
//! hands and buildings, trade ledger - and is the only thing that mutates
//! them. External callers submit `GameAction`s one at a time through
//! [`GameState::apply_action`]; every action either succeeds (returning the
//! resulting `GameEvent`s) or is rejected with a `GameError` that leaves all
//! observable state exactly as it was.

use crate::actions::{GameAction, GameEvent};
use crate::board::{BoardGraph, NodeId, Resource};
use crate::hex::HexCoord;
use crate::player::{
    costs, Bank, BuildingPlacement, Player, PlayerColor, PlayerId, ResourceHand,
    MAX_ROADS_PER_PLAYER, MAX_SETTLEMENTS_PER_PLAYER,
};
use crate::trade::{OfferId, TradeLedger, TradeOffer};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Victory points needed to win
const DEFAULT_VICTORY_TARGET: u32 = 5;

/// Board radius of a standard game
const DEFAULT_BOARD_RADIUS: u32 = 3;

/// A bank trade always gives exactly this many cards of one kind
const BANK_TRADE_GIVE: u32 = 4;

/// Resources each player starts with
const STARTING_HAND: [(Resource, u32); 4] = [
    (Resource::Wood, 4),
    (Resource::Brick, 4),
    (Resource::Wheat, 2),
    (Resource::Sheep, 2),
];

/// Where the current turn stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Start of a turn: the current player must roll
    AwaitingRoll,
    /// A 7 was rolled: the robber must be placed before anything else
    RobberPending,
    /// Dice resolved: the current player may build, trade, or end the turn
    AwaitingAction,
    /// A player reached the victory target; mutating actions are refused
    GameOver { winner: PlayerId },
}

/// How settlement proximity is enforced.
///
/// `AdjacentOnly` blocks a placed node and its direct neighbors, which is
/// weaker than the official two-road-edge radius in some topologies; both
/// are available so the difference stays a policy choice rather than a
/// silent behavior change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpacingPolicy {
    /// No proximity blocking at all
    None,
    /// Block the placed node and its direct neighbors
    AdjacentOnly,
    /// Block everything within two road edges of the placed node
    TwoEdges,
}

/// Per-game options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Hex rings from the center outward
    pub board_radius: u32,
    /// Settlement proximity enforcement
    pub spacing: SpacingPolicy,
    /// Victory points needed to win
    pub victory_target: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_radius: DEFAULT_BOARD_RADIUS,
            spacing: SpacingPolicy::AdjacentOnly,
            victory_target: DEFAULT_VICTORY_TARGET,
        }
    }
}

/// Errors that can occur when applying actions.
///
/// None of these is fatal: a rejected action changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("a game needs two to four players")]
    InvalidPlayerCount,

    #[error("player colors must be distinct")]
    DuplicateColor,

    #[error("board radius must be at least 1")]
    InvalidRadius,

    #[error("unknown player")]
    UnknownPlayer,

    #[error("the game is over")]
    GameOver,

    #[error("not this player's turn")]
    NotYourTurn,

    #[error("dice already rolled this turn")]
    AlreadyRolled,

    #[error("dice must be rolled first")]
    RollRequired,

    #[error("the robber must be placed first")]
    RobberPending,

    #[error("no robber placement is pending")]
    RobberNotPending,

    #[error("dice values must be between 1 and 6")]
    InvalidDice,

    #[error("no such board location")]
    InvalidLocation,

    #[error("location already occupied")]
    Occupied,

    #[error("too close to an existing settlement")]
    SpacingViolation,

    #[error("no building pieces remaining")]
    NoPiecesRemaining,

    #[error("not enough resources")]
    CannotAfford,

    #[error("the bank cannot cover that")]
    BankShortfall,

    #[error("invalid trade")]
    InvalidTrade,

    #[error("no such trade offer")]
    NoSuchOffer,
}

/// The complete state of one game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    board: BoardGraph,
    players: Vec<Player>,
    bank: Bank,
    trades: TradeLedger,
    current_player: PlayerId,
    phase: TurnPhase,
    last_roll: Option<(u8, u8)>,
    /// Nodes closed to settlement by the spacing policy
    blocked_nodes: HashSet<NodeId>,
    spacing: SpacingPolicy,
    victory_target: u32,
    turn_number: u32,
}

impl GameState {
    /// Start a game with the given seating order and board radius.
    pub fn new(colors: Vec<PlayerColor>, board_radius: u32) -> Result<Self, GameError> {
        Self::with_config(
            colors,
            GameConfig {
                board_radius,
                ..GameConfig::default()
            },
        )
    }

    /// Start a game with full per-game options.
    pub fn with_config(colors: Vec<PlayerColor>, config: GameConfig) -> Result<Self, GameError> {
        Self::with_config_and_rng(colors, config, &mut rand::thread_rng())
    }

    /// Start a game with a caller-provided RNG for a deterministic board.
    pub fn with_config_and_rng<R: Rng>(
        colors: Vec<PlayerColor>,
        config: GameConfig,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if !(2..=4).contains(&colors.len()) {
            return Err(GameError::InvalidPlayerCount);
        }
        let distinct: HashSet<PlayerColor> = colors.iter().copied().collect();
        if distinct.len() != colors.len() {
            return Err(GameError::DuplicateColor);
        }
        if config.board_radius == 0 {
            return Err(GameError::InvalidRadius);
        }

        let board = BoardGraph::build_with_rng(config.board_radius, rng);
        let mut bank = Bank::new();
        let mut players: Vec<Player> = colors.into_iter().map(Player::new).collect();

        // Starting hands come out of the bank so the per-kind totals stay
        // constant for the whole game
        for player in &mut players {
            for (kind, amount) in STARTING_HAND {
                if bank.take_resource(kind, amount) {
                    player.hand.add(kind, amount);
                }
            }
        }

        Ok(Self {
            board,
            players,
            bank,
            trades: TradeLedger::new(),
            current_player: 0,
            phase: TurnPhase::AwaitingRoll,
            last_roll: None,
            blocked_nodes: HashSet::new(),
            spacing: config.spacing,
            victory_target: config.victory_target,
            turn_number: 1,
        })
    }

    // ==================== Query Methods ====================

    /// The board (read-only)
    pub fn board(&self) -> &BoardGraph {
        &self.board
    }

    /// The bank (read-only)
    pub fn bank(&self) -> &Bank {
        &self.bank
    }

    /// Number of players at the table
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Whose turn it is
    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    /// Current phase of the turn state machine
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// The last dice roll of the current turn, if any
    pub fn last_roll(&self) -> Option<(u8, u8)> {
        self.last_roll
    }

    /// Turns played so far, starting at 1
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// Color of a player
    pub fn player_color(&self, player: PlayerId) -> Option<PlayerColor> {
        self.players.get(player as usize).map(|p| p.color)
    }

    /// Defensive copy of a player's hand
    pub fn hand_snapshot(&self, player: PlayerId) -> Option<ResourceHand> {
        self.players.get(player as usize).map(Player::hand_snapshot)
    }

    /// A player's placed buildings
    pub fn buildings(&self, player: PlayerId) -> Option<&[BuildingPlacement]> {
        self.players.get(player as usize).map(|p| p.buildings.as_slice())
    }

    /// A player's victory points
    pub fn victory_points(&self, player: PlayerId) -> Option<u32> {
        self.players.get(player as usize).map(Player::victory_points)
    }

    /// Open peer trade offers
    pub fn pending_trades(&self) -> &[TradeOffer] {
        self.trades.pending()
    }

    /// Coordinate of the robber-blocked tile, if placed
    pub fn blocked_tile(&self) -> Option<HexCoord> {
        self.board.blocked_tile()
    }

    /// Nodes currently closed to settlement by the spacing policy
    pub fn blocked_nodes(&self) -> &HashSet<NodeId> {
        &self.blocked_nodes
    }

    /// The winner, once a player has reached the victory target
    pub fn winner(&self) -> Option<PlayerId> {
        match self.phase {
            TurnPhase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    // ==================== Action Entry Points ====================

    /// Apply an action for a player.
    ///
    /// Actions are processed strictly one at a time; a rejection leaves
    /// every observable piece of state untouched.
    pub fn apply_action(
        &mut self,
        player: PlayerId,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, GameError> {
        if (player as usize) >= self.players.len() {
            return Err(GameError::UnknownPlayer);
        }
        if matches!(self.phase, TurnPhase::GameOver { .. }) {
            return Err(GameError::GameOver);
        }

        match action {
            GameAction::RollDice => {
                let mut rng = rand::thread_rng();
                let die1 = rng.gen_range(1..=6u8);
                let die2 = rng.gen_range(1..=6u8);
                self.apply_roll(player, die1, die2)
            }
            GameAction::PlaceRobber(coord) => self.place_robber(player, coord),
            GameAction::BuildSettlement(node) => self.build_settlement(player, node),
            GameAction::BuildRoad(a, b) => self.build_road(player, a, b),
            GameAction::OfferTrade {
                give,
                want,
                with_bank,
            } => self.offer_trade(player, give, want, with_bank),
            GameAction::AcceptTrade(offer_id) => self.accept_trade(player, offer_id),
            GameAction::EndTurn => self.end_turn(player),
        }
    }

    /// Resolve a known dice roll.
    ///
    /// This is the deterministic seam behind [`GameAction::RollDice`]; it
    /// exists so replays and tests can drive exact rolls. Die values
    /// outside 1..=6 are rejected.
    pub fn apply_roll(
        &mut self,
        player: PlayerId,
        die1: u8,
        die2: u8,
    ) -> Result<Vec<GameEvent>, GameError> {
        if (player as usize) >= self.players.len() {
            return Err(GameError::UnknownPlayer);
        }
        self.ensure_current(player)?;
        match self.phase {
            TurnPhase::AwaitingRoll => {}
            TurnPhase::RobberPending => return Err(GameError::RobberPending),
            TurnPhase::AwaitingAction => return Err(GameError::AlreadyRolled),
            TurnPhase::GameOver { .. } => return Err(GameError::GameOver),
        }
        if !(1..=6).contains(&die1) || !(1..=6).contains(&die2) {
            return Err(GameError::InvalidDice);
        }
        Ok(self.resolve_roll(player, die1, die2, &mut rand::thread_rng()))
    }

    // ==================== Dice Resolution ====================

    fn resolve_roll<R: Rng>(
        &mut self,
        player: PlayerId,
        die1: u8,
        die2: u8,
        rng: &mut R,
    ) -> Vec<GameEvent> {
        let sum = die1 + die2;
        self.last_roll = Some((die1, die2));

        let mut events = vec![GameEvent::DiceRolled {
            player,
            dice: (die1, die2),
            sum,
            seven: sum == 7,
        }];

        if sum == 7 {
            // The steal happens now, before the robber tile is chosen
            events.extend(self.steal_on_seven(player, rng));
            self.phase = TurnPhase::RobberPending;
        } else {
            let payouts = self.distribute_production(sum);
            if !payouts.is_empty() {
                events.push(GameEvent::ResourcesProduced { payouts });
            }
            self.phase = TurnPhase::AwaitingAction;
        }

        events
    }

    /// Pay every settlement on an unblocked tile matching the roll, as far
    /// as bank stock reaches. Shortfalls are silent: no partial IOUs.
    fn distribute_production(&mut self, sum: u8) -> Vec<(PlayerId, Resource, u32)> {
        let mut payouts = Vec::new();
        for tile in self.board.tiles() {
            if tile.blocked || tile.dice_number != sum {
                continue;
            }
            let resource = match tile.resource() {
                Some(r) => r,
                None => continue,
            };
            for &corner in &tile.corners {
                for (idx, player) in self.players.iter_mut().enumerate() {
                    if player.owns_settlement_at(corner) && self.bank.take_resource(resource, 1) {
                        player.hand.add(resource, 1);
                        payouts.push((idx as PlayerId, resource, 1));
                    }
                }
            }
        }
        payouts
    }

    /// Steal one card for the thief from a victim chosen uniformly among
    /// the other players holding at least one card.
    fn steal_on_seven<R: Rng>(&mut self, thief: PlayerId, rng: &mut R) -> Option<GameEvent> {
        let victims: Vec<PlayerId> = self
            .players
            .iter()
            .enumerate()
            .filter(|(idx, p)| *idx != thief as usize && !p.hand.is_empty())
            .map(|(idx, _)| idx as PlayerId)
            .collect();
        let &victim = victims.choose(rng)?;
        let resource = self.players[victim as usize].hand.steal_random(rng)?;
        self.players[thief as usize].hand.add(resource, 1);
        Some(GameEvent::ResourceStolen {
            thief,
            victim,
            resource,
        })
    }

    // ==================== Robber ====================

    fn place_robber(
        &mut self,
        player: PlayerId,
        coord: HexCoord,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_current(player)?;
        if self.phase != TurnPhase::RobberPending {
            return Err(GameError::RobberNotPending);
        }
        if !self.board.place_robber(coord) {
            return Err(GameError::InvalidLocation);
        }
        self.phase = TurnPhase::AwaitingAction;
        Ok(vec![GameEvent::RobberPlaced {
            player,
            tile: coord,
        }])
    }

    // ==================== Building ====================

    fn build_settlement(
        &mut self,
        player: PlayerId,
        node: NodeId,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_current(player)?;
        self.ensure_action_phase()?;
        if !self.board.contains_node(node) {
            return Err(GameError::InvalidLocation);
        }
        if self.players.iter().any(|p| p.owns_settlement_at(node)) {
            return Err(GameError::Occupied);
        }
        if self.blocked_nodes.contains(&node) {
            return Err(GameError::SpacingViolation);
        }
        if !self.bank.has_settlement_piece() {
            return Err(GameError::NoPiecesRemaining);
        }
        let idx = player as usize;
        if self.players[idx].settlement_count() >= MAX_SETTLEMENTS_PER_PLAYER {
            return Err(GameError::NoPiecesRemaining);
        }
        if !self.players[idx].hand.can_afford(&costs::settlement()) {
            return Err(GameError::CannotAfford);
        }

        // All checks passed; none of the debits below can fail
        self.players[idx].place_settlement(node);
        self.bank.use_settlement_piece();
        for (kind, amount) in costs::settlement().amounts() {
            self.bank.give_resource(kind, amount);
        }
        self.block_around(node);

        let mut events = vec![GameEvent::SettlementBuilt { player, node }];
        let points = self.players[idx].victory_points();
        if points >= self.victory_target {
            self.phase = TurnPhase::GameOver { winner: player };
            events.push(GameEvent::GameWon {
                player,
                victory_points: points,
            });
        }
        Ok(events)
    }

    fn build_road(
        &mut self,
        player: PlayerId,
        node_a: NodeId,
        node_b: NodeId,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_current(player)?;
        self.ensure_action_phase()?;
        if node_a == node_b || !self.board.nodes_adjacent(node_a, node_b) {
            return Err(GameError::InvalidLocation);
        }
        if self
            .players
            .iter()
            .any(|p| p.owns_street_between(node_a, node_b))
        {
            return Err(GameError::Occupied);
        }
        if !self.bank.has_road_piece() {
            return Err(GameError::NoPiecesRemaining);
        }
        let idx = player as usize;
        if self.players[idx].road_count() >= MAX_ROADS_PER_PLAYER {
            return Err(GameError::NoPiecesRemaining);
        }
        if !self.players[idx].hand.can_afford(&costs::road()) {
            return Err(GameError::CannotAfford);
        }

        self.players[idx].place_street(node_a, node_b);
        self.bank.use_road_piece();
        for (kind, amount) in costs::road().amounts() {
            self.bank.give_resource(kind, amount);
        }

        Ok(vec![GameEvent::RoadBuilt {
            player,
            nodes: (node_a, node_b),
        }])
    }

    /// Extend the blocked-node set around a fresh settlement per the
    /// configured spacing policy.
    fn block_around(&mut self, node: NodeId) {
        match self.spacing {
            SpacingPolicy::None => {}
            SpacingPolicy::AdjacentOnly => {
                self.blocked_nodes.insert(node);
                self.blocked_nodes.extend(self.board.neighbors_of(node));
            }
            SpacingPolicy::TwoEdges => {
                self.blocked_nodes.insert(node);
                for neighbor in self.board.neighbors_of(node) {
                    self.blocked_nodes.insert(neighbor);
                    self.blocked_nodes.extend(self.board.neighbors_of(neighbor));
                }
            }
        }
    }

    // ==================== Trading ====================

    fn offer_trade(
        &mut self,
        player: PlayerId,
        give: (Resource, u32),
        want: (Resource, u32),
        with_bank: bool,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_current(player)?;
        self.ensure_action_phase()?;
        let (give_kind, give_amount) = give;
        let (want_kind, want_amount) = want;
        if give_kind == want_kind || give_amount == 0 || want_amount == 0 {
            return Err(GameError::InvalidTrade);
        }
        let idx = player as usize;

        if with_bank {
            if give_amount != BANK_TRADE_GIVE || want_amount != 1 {
                return Err(GameError::InvalidTrade);
            }
            if self.players[idx].hand.get(give_kind) < give_amount {
                return Err(GameError::CannotAfford);
            }
            if self.bank.stock_of(want_kind) < want_amount {
                return Err(GameError::BankShortfall);
            }

            self.players[idx].hand.remove(give_kind, give_amount);
            self.bank.give_resource(give_kind, give_amount);
            self.bank.take_resource(want_kind, want_amount);
            self.players[idx].hand.add(want_kind, want_amount);

            return Ok(vec![GameEvent::BankTradeSettled { player, give, want }]);
        }

        if self.players[idx].hand.get(give_kind) < give_amount {
            return Err(GameError::CannotAfford);
        }
        let offer = self.trades.open(player, give, want);
        Ok(vec![GameEvent::TradeOpened { offer }])
    }

    /// Accept an open offer. Any player but the sender may accept; both
    /// sides' holdings are re-validated at acceptance time since they may
    /// have changed since the offer was made.
    fn accept_trade(
        &mut self,
        player: PlayerId,
        offer_id: OfferId,
    ) -> Result<Vec<GameEvent>, GameError> {
        let offer = *self.trades.get(offer_id).ok_or(GameError::NoSuchOffer)?;
        if offer.sender == player {
            return Err(GameError::InvalidTrade);
        }
        let (give_kind, give_amount) = offer.give;
        let (want_kind, want_amount) = offer.want;
        let sender_idx = offer.sender as usize;
        let accepter_idx = player as usize;

        if self.players[accepter_idx].hand.get(want_kind) < want_amount {
            return Err(GameError::CannotAfford);
        }
        if self.players[sender_idx].hand.get(give_kind) < give_amount {
            return Err(GameError::CannotAfford);
        }

        self.players[sender_idx].hand.remove(give_kind, give_amount);
        self.players[sender_idx].hand.add(want_kind, want_amount);
        self.players[accepter_idx].hand.remove(want_kind, want_amount);
        self.players[accepter_idx].hand.add(give_kind, give_amount);

        let mut settled = self.trades.take(offer_id).unwrap_or(offer);
        settled.accept(player);
        Ok(vec![GameEvent::TradeAccepted { offer: settled }])
    }

    // ==================== Turn Management ====================

    fn end_turn(&mut self, player: PlayerId) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_current(player)?;
        self.ensure_action_phase()?;

        let next = ((player as usize + 1) % self.players.len()) as PlayerId;
        let mut events = Vec::new();

        // Offers from the incoming player have been open for a full round
        let expired = self.trades.expire_for_sender(next);
        if !expired.is_empty() {
            events.push(GameEvent::TradeOffersExpired {
                sender: next,
                offers: expired,
            });
        }

        self.current_player = next;
        self.last_roll = None;
        self.phase = TurnPhase::AwaitingRoll;
        self.turn_number += 1;

        events.push(GameEvent::TurnEnded {
            player,
            next_player: next,
        });
        Ok(events)
    }

    // ==================== Helpers ====================

    fn ensure_current(&self, player: PlayerId) -> Result<(), GameError> {
        if player != self.current_player {
            return Err(GameError::NotYourTurn);
        }
        Ok(())
    }

    fn ensure_action_phase(&self) -> Result<(), GameError> {
        match self.phase {
            TurnPhase::AwaitingAction => Ok(()),
            TurnPhase::AwaitingRoll => Err(GameError::RollRequired),
            TurnPhase::RobberPending => Err(GameError::RobberPending),
            TurnPhase::GameOver { .. } => Err(GameError::GameOver),
        }
    }
}
