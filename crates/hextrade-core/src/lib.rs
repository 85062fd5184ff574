//! hextrade - a hex-grid resource-trading board game engine
//!
//! This crate provides the core rules of hextrade:
//! - Axial hex coordinates for the game board
//! - Board generation with deduplicated corner nodes and road-slot edges
//! - Bank and player resource ledgers with finite building-piece pools
//! - A turn state machine enforcing roll, build, robber and trade rules
//!
//! # Architecture
//!
//! The engine is a pure state machine: external callers (a GUI, a game
//! server, a test harness) submit one [`GameAction`] at a time through
//! [`GameState::apply_action`] and render the returned [`GameEvent`]s.
//! All shared mutable state - the bank, every player's hand and building
//! list, the robber's tile, the trade ledger - is owned by [`GameState`],
//! which is its sole mutator; readers get defensive snapshots.
//!
//! # Modules
//!
//! - [`hex`]: axial coordinates and neighbor directions
//! - [`board`]: board graph generation and queries
//! - [`player`]: hands, building placements, the bank
//! - [`trade`]: pending trade-offer bookkeeping
//! - [`actions`]: the action/event vocabulary
//! - [`game`]: the turn state machine

pub mod actions;
pub mod board;
pub mod game;
pub mod hex;
pub mod player;
pub mod trade;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent};
pub use board::{BoardGraph, NodeId, Resource, Terrain, Tile};
pub use game::{GameConfig, GameError, GameState, SpacingPolicy, TurnPhase};
pub use hex::{Direction, HexCoord};
pub use player::{
    Bank, BuildingKind, BuildingPlacement, Player, PlayerColor, PlayerId, ResourceHand,
};
pub use trade::{OfferId, TradeLedger, TradeOffer};
