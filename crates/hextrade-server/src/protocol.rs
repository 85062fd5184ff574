//! WebSocket protocol messages.
//!
//! Actions travel as typed [`GameAction`]s; the engine's action vocabulary
//! is closed, so clients get schema errors at deserialization time instead
//! of engine rejections for malformed payloads. Responses carry the
//! engine's events plus a read-only snapshot of the table.

use hextrade_core::{
    GameAction, GameEvent, HexCoord, PlayerColor, ResourceHand, Tile, TradeOffer, TurnPhase,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Create a new game room
    CreateRoom {
        player_name: String,
        max_players: u8,
        /// Hex rings from the center outward; clamped server-side
        board_radius: u32,
    },

    /// Join an existing room
    JoinRoom { room_id: Uuid, player_name: String },

    /// Leave current room
    LeaveRoom,

    /// Start the game (host only)
    StartGame,

    /// Submit a game action for the seat this connection holds
    Action { action: GameAction },

    /// Send a chat message to the room
    Chat { message: String },

    /// Request the list of rooms waiting for players
    ListRooms,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with the assigned connection ID
    Welcome { player_id: Uuid },

    /// Room created successfully
    RoomCreated { room_id: Uuid },

    /// Joined room successfully
    JoinedRoom { room: RoomInfo },

    /// Left room successfully
    LeftRoom,

    /// Room roster changed (player joined/left/disconnected)
    RoomUpdated { room: RoomInfo },

    /// Game started; the board layout is sent once here
    GameStarted {
        board: BoardSnapshot,
        table: TableSnapshot,
    },

    /// An action was applied; everyone gets the events and fresh state
    ActionApplied {
        events: Vec<GameEvent>,
        table: TableSnapshot,
    },

    /// The submitted action was rejected; only the sender sees this
    ActionRejected { reason: String },

    /// Chat message relayed to the room
    ChatMessage { player_name: String, message: String },

    /// List of rooms waiting for players
    RoomList { rooms: Vec<RoomInfo> },

    /// Protocol-level error (bad room, not host, ...)
    Error { message: String },

    /// Pong response
    Pong,

    /// A player reached the victory target
    GameOver {
        winner: PlayerColor,
        winner_name: String,
    },
}

/// The board layout, shipped once at game start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub tiles: Vec<Tile>,
    pub node_count: usize,
    pub adjacency: Vec<Vec<bool>>,
}

/// Defensive copy of everything that changes during play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub current_player: PlayerColor,
    pub phase: TurnPhase,
    pub last_roll: Option<(u8, u8)>,
    pub turn_number: u32,
    /// Hand and victory points per seat, in rotation order
    pub seats: Vec<SeatSnapshot>,
    pub pending_trades: Vec<TradeOffer>,
    pub blocked_tile: Option<HexCoord>,
}

/// One seat's public state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatSnapshot {
    pub color: PlayerColor,
    pub name: String,
    pub hand: ResourceHand,
    pub victory_points: u32,
}

/// Room information for clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: Uuid,
    pub name: String,
    pub players: Vec<PlayerInfo>,
    pub max_players: u8,
    pub board_radius: u32,
    pub host_id: Uuid,
    pub status: RoomStatus,
}

/// Player information in a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: Uuid,
    pub name: String,
    pub color: Option<PlayerColor>,
    pub connected: bool,
}

/// Room status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    Waiting,
    InGame,
    Finished,
}
