//! Player state and resource management.
//!
//! This module contains:
//! - `ResourceHand` for per-kind resource counts
//! - Building costs
//! - `Player` with its color, hand and placed buildings
//! - The `Bank`: the shared finite pool of resource cards and building pieces

use crate::board::{NodeId, Resource};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Player identifier: the index into the game's rotation order.
pub type PlayerId = u8;

/// Settlements a single player may place over the whole game
pub const MAX_SETTLEMENTS_PER_PLAYER: u32 = 5;

/// Roads a single player may place over the whole game
pub const MAX_ROADS_PER_PLAYER: u32 = 15;

/// Bank stock of each resource kind at game start
pub const BANK_STOCK_PER_RESOURCE: u32 = 19;

/// Road pieces shared by the whole table (15 per seat, 4 seats)
pub const TOTAL_ROAD_PIECES: u32 = 15 * 4;

/// Settlement pieces shared by the whole table (5 per seat, 4 seats)
pub const TOTAL_SETTLEMENT_PIECES: u32 = 5 * 4;

/// Player color, doubling as the player's identity for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    Blue,
    Yellow,
    White,
}

impl PlayerColor {
    /// All colors in seating order
    pub const ALL: [PlayerColor; 4] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Yellow,
        PlayerColor::White,
    ];

    /// Display name for the view layer
    pub fn display_name(&self) -> &'static str {
        match self {
            PlayerColor::Red => "Red",
            PlayerColor::Blue => "Blue",
            PlayerColor::Yellow => "Yellow",
            PlayerColor::White => "White",
        }
    }
}

/// A hand of resources (also used for the bank's stock).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub wood: u32,
    pub sheep: u32,
    pub wheat: u32,
    pub brick: u32,
    pub stone: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(wood: u32, sheep: u32, wheat: u32, brick: u32, stone: u32) -> Self {
        Self {
            wood,
            sheep,
            wheat,
            brick,
            stone,
        }
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.wood + self.sheep + self.wheat + self.brick + self.stone
    }

    /// Check if the hand is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get the count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Sheep => self.sheep,
            Resource::Wheat => self.wheat,
            Resource::Brick => self.brick,
            Resource::Stone => self.stone,
        }
    }

    /// Add resources; zero amounts are no-ops
    pub fn add(&mut self, resource: Resource, amount: u32) {
        match resource {
            Resource::Wood => self.wood += amount,
            Resource::Sheep => self.sheep += amount,
            Resource::Wheat => self.wheat += amount,
            Resource::Brick => self.brick += amount,
            Resource::Stone => self.stone += amount,
        }
    }

    /// Remove resources, all or nothing.
    ///
    /// Returns false and leaves the hand untouched if fewer than `amount`
    /// are held. Zero amounts always succeed.
    pub fn remove(&mut self, resource: Resource, amount: u32) -> bool {
        if self.get(resource) < amount {
            return false;
        }
        match resource {
            Resource::Wood => self.wood -= amount,
            Resource::Sheep => self.sheep -= amount,
            Resource::Wheat => self.wheat -= amount,
            Resource::Brick => self.brick -= amount,
            Resource::Stone => self.stone -= amount,
        }
        true
    }

    /// Check whether every component of `cost` is covered
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        self.wood >= cost.wood
            && self.sheep >= cost.sheep
            && self.wheat >= cost.wheat
            && self.brick >= cost.brick
            && self.stone >= cost.stone
    }

    /// Subtract a whole cost, all or nothing
    pub fn try_subtract(&mut self, cost: &ResourceHand) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.wood -= cost.wood;
        self.sheep -= cost.sheep;
        self.wheat -= cost.wheat;
        self.brick -= cost.brick;
        self.stone -= cost.stone;
        true
    }

    /// Per-kind view of the hand
    pub fn amounts(&self) -> [(Resource, u32); 5] {
        [
            (Resource::Wood, self.wood),
            (Resource::Sheep, self.sheep),
            (Resource::Wheat, self.wheat),
            (Resource::Brick, self.brick),
            (Resource::Stone, self.stone),
        ]
    }

    /// Kinds currently held with at least one card
    pub fn held_kinds(&self) -> Vec<Resource> {
        self.amounts()
            .into_iter()
            .filter_map(|(kind, count)| (count > 0).then_some(kind))
            .collect()
    }

    /// Remove one card of a kind chosen uniformly among the held kinds
    /// (robber stealing). Returns `None` for an empty hand.
    pub fn steal_random<R: Rng>(&mut self, rng: &mut R) -> Option<Resource> {
        let kind = *self.held_kinds().choose(rng)?;
        self.remove(kind, 1);
        Some(kind)
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost of a road: 1 wood, 1 brick
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 0, 0, 1, 0)
    }

    /// Cost of a settlement: 1 wood, 1 sheep, 1 wheat, 1 brick
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 1, 1, 0)
    }
}

/// The kind of a placed building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingKind {
    Settlement,
    Road,
}

/// A building a player has placed: settlements sit on one node, roads span
/// two. The owning player's list of placements is append-only and is the
/// source of truth for ownership queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingPlacement {
    pub kind: BuildingKind,
    pub node_a: NodeId,
    pub node_b: Option<NodeId>,
}

/// A single player's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Color identity
    pub color: PlayerColor,
    /// Current resources
    pub hand: ResourceHand,
    /// Placed buildings, in placement order
    pub buildings: Vec<BuildingPlacement>,
}

impl Player {
    /// Create a player with an empty hand
    pub fn new(color: PlayerColor) -> Self {
        Self {
            color,
            hand: ResourceHand::new(),
            buildings: Vec::new(),
        }
    }

    /// Victory points: one per placed settlement
    pub fn victory_points(&self) -> u32 {
        self.settlement_count()
    }

    /// Number of settlements this player has placed
    pub fn settlement_count(&self) -> u32 {
        self.buildings
            .iter()
            .filter(|b| b.kind == BuildingKind::Settlement)
            .count() as u32
    }

    /// Number of roads this player has placed
    pub fn road_count(&self) -> u32 {
        self.buildings
            .iter()
            .filter(|b| b.kind == BuildingKind::Road)
            .count() as u32
    }

    /// Place a settlement at the node: checks the per-player cap and debits
    /// the full cost, or changes nothing and returns false.
    ///
    /// Board-level legality (occupancy, spacing, bank pieces) is the
    /// engine's job, not the player's.
    pub fn place_settlement(&mut self, node: NodeId) -> bool {
        if self.settlement_count() >= MAX_SETTLEMENTS_PER_PLAYER {
            return false;
        }
        if !self.hand.try_subtract(&costs::settlement()) {
            return false;
        }
        self.buildings.push(BuildingPlacement {
            kind: BuildingKind::Settlement,
            node_a: node,
            node_b: None,
        });
        true
    }

    /// Place a road between two nodes; same contract as [`Self::place_settlement`].
    pub fn place_street(&mut self, node_a: NodeId, node_b: NodeId) -> bool {
        if self.road_count() >= MAX_ROADS_PER_PLAYER {
            return false;
        }
        if !self.hand.try_subtract(&costs::road()) {
            return false;
        }
        self.buildings.push(BuildingPlacement {
            kind: BuildingKind::Road,
            node_a,
            node_b: Some(node_b),
        });
        true
    }

    /// Whether this player has a settlement on the node
    pub fn owns_settlement_at(&self, node: NodeId) -> bool {
        self.buildings
            .iter()
            .any(|b| b.kind == BuildingKind::Settlement && b.node_a == node)
    }

    /// Whether this player has a road between the two nodes (either order)
    pub fn owns_street_between(&self, node_a: NodeId, node_b: NodeId) -> bool {
        self.buildings.iter().any(|b| {
            b.kind == BuildingKind::Road
                && ((b.node_a == node_a && b.node_b == Some(node_b))
                    || (b.node_a == node_b && b.node_b == Some(node_a)))
        })
    }

    /// Defensive copy of the hand for the view layer
    pub fn hand_snapshot(&self) -> ResourceHand {
        self.hand.clone()
    }
}

/// The shared bank: resource stock plus the finite building-piece pools.
///
/// One bank exists per game, owned by the game state. The piece pools cap
/// the table-wide building totals, on top of the per-player caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    stock: ResourceHand,
    remaining_roads: u32,
    pub(crate) remaining_settlements: u32,
}

impl Bank {
    /// A full bank: 19 of each resource, all building pieces available
    pub fn new() -> Self {
        Self {
            stock: ResourceHand::with_amounts(
                BANK_STOCK_PER_RESOURCE,
                BANK_STOCK_PER_RESOURCE,
                BANK_STOCK_PER_RESOURCE,
                BANK_STOCK_PER_RESOURCE,
                BANK_STOCK_PER_RESOURCE,
            ),
            remaining_roads: TOTAL_ROAD_PIECES,
            remaining_settlements: TOTAL_SETTLEMENT_PIECES,
        }
    }

    /// Current stock of a resource kind
    pub fn stock_of(&self, resource: Resource) -> u32 {
        self.stock.get(resource)
    }

    /// Take resources from stock: succeeds and debits iff the stock covers
    /// the full amount, otherwise a no-op returning false.
    pub fn take_resource(&mut self, resource: Resource, amount: u32) -> bool {
        self.stock.remove(resource, amount)
    }

    /// Return resources to stock; always succeeds
    pub fn give_resource(&mut self, resource: Resource, amount: u32) {
        self.stock.add(resource, amount);
    }

    /// Consume one settlement piece if any remain
    pub fn use_settlement_piece(&mut self) -> bool {
        if self.remaining_settlements == 0 {
            return false;
        }
        self.remaining_settlements -= 1;
        true
    }

    /// Consume one road piece if any remain
    pub fn use_road_piece(&mut self) -> bool {
        if self.remaining_roads == 0 {
            return false;
        }
        self.remaining_roads -= 1;
        true
    }

    /// Non-consuming settlement-piece check
    pub fn has_settlement_piece(&self) -> bool {
        self.remaining_settlements > 0
    }

    /// Non-consuming road-piece check
    pub fn has_road_piece(&self) -> bool {
        self.remaining_roads > 0
    }

    /// Settlement pieces left table-wide
    pub fn remaining_settlement_pieces(&self) -> u32 {
        self.remaining_settlements
    }

    /// Road pieces left table-wide
    pub fn remaining_road_pieces(&self) -> u32 {
        self.remaining_roads
    }
}

impl Default for Bank {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hand_total_and_get() {
        let hand = ResourceHand::with_amounts(1, 2, 3, 4, 5);
        assert_eq!(hand.total(), 15);
        assert_eq!(hand.get(Resource::Wood), 1);
        assert_eq!(hand.get(Resource::Stone), 5);
    }

    #[test]
    fn test_hand_remove_is_all_or_nothing() {
        let mut hand = ResourceHand::with_amounts(2, 0, 0, 0, 0);
        assert!(!hand.remove(Resource::Wood, 3));
        assert_eq!(hand.wood, 2);
        assert!(hand.remove(Resource::Wood, 2));
        assert_eq!(hand.wood, 0);
    }

    #[test]
    fn test_hand_zero_amount_is_noop_success() {
        let mut hand = ResourceHand::new();
        assert!(hand.remove(Resource::Sheep, 0));
        hand.add(Resource::Sheep, 0);
        assert!(hand.is_empty());
    }

    #[test]
    fn test_try_subtract_leaves_hand_on_failure() {
        let mut hand = ResourceHand::with_amounts(1, 1, 0, 1, 0);
        let before = hand.clone();
        assert!(!hand.try_subtract(&costs::settlement()));
        assert_eq!(hand, before);
    }

    #[test]
    fn test_steal_random_single_kind_is_deterministic() {
        let mut hand = ResourceHand::with_amounts(0, 0, 1, 0, 0);
        let stolen = hand.steal_random(&mut rand::thread_rng());
        assert_eq!(stolen, Some(Resource::Wheat));
        assert!(hand.is_empty());
    }

    #[test]
    fn test_steal_random_empty_hand() {
        let mut hand = ResourceHand::new();
        assert_eq!(hand.steal_random(&mut rand::thread_rng()), None);
    }

    #[test]
    fn test_place_settlement_debits_exact_cost_once() {
        let mut player = Player::new(PlayerColor::Red);
        player.hand = ResourceHand::with_amounts(1, 1, 1, 1, 0);

        assert!(player.place_settlement(11));
        assert!(player.hand.is_empty());
        assert_eq!(player.buildings.len(), 1);
        assert!(player.owns_settlement_at(11));

        // Second attempt with an empty hand: no debit, no placement
        assert!(!player.place_settlement(12));
        assert_eq!(player.buildings.len(), 1);
    }

    #[test]
    fn test_settlement_cap_blocks_sixth() {
        let mut player = Player::new(PlayerColor::Blue);
        player.hand = ResourceHand::with_amounts(10, 10, 10, 10, 0);
        for node in 0..5 {
            assert!(player.place_settlement(node));
        }
        let hand_before = player.hand.clone();
        assert!(!player.place_settlement(5));
        assert_eq!(player.hand, hand_before);
        assert_eq!(player.victory_points(), 5);
    }

    #[test]
    fn test_street_ownership_is_unordered() {
        let mut player = Player::new(PlayerColor::Yellow);
        player.hand = ResourceHand::with_amounts(1, 0, 0, 1, 0);
        assert!(player.place_street(3, 8));
        assert!(player.owns_street_between(3, 8));
        assert!(player.owns_street_between(8, 3));
        assert!(!player.owns_street_between(3, 9));
    }

    #[test]
    fn test_road_cap() {
        let mut player = Player::new(PlayerColor::White);
        player.hand = ResourceHand::with_amounts(20, 0, 0, 20, 0);
        for i in 0..15 {
            assert!(player.place_street(i, i + 1));
        }
        assert!(!player.place_street(20, 21));
        assert_eq!(player.road_count(), 15);
    }

    #[test]
    fn test_bank_take_give_round_trip() {
        let mut bank = Bank::new();
        assert!(bank.take_resource(Resource::Wood, 5));
        bank.give_resource(Resource::Wood, 5);
        assert_eq!(bank.stock_of(Resource::Wood), BANK_STOCK_PER_RESOURCE);
    }

    #[test]
    fn test_bank_take_fails_on_empty_stock() {
        let mut bank = Bank::new();
        assert!(bank.take_resource(Resource::Wood, BANK_STOCK_PER_RESOURCE));
        assert!(!bank.take_resource(Resource::Wood, 1));
        assert_eq!(bank.stock_of(Resource::Wood), 0);
    }

    #[test]
    fn test_bank_piece_pools_run_dry() {
        let mut bank = Bank::new();
        for _ in 0..TOTAL_SETTLEMENT_PIECES {
            assert!(bank.use_settlement_piece());
        }
        assert!(!bank.use_settlement_piece());
        assert!(!bank.has_settlement_piece());
        assert!(bank.has_road_piece());
    }
}
