//! Game room management.
//!
//! A room gathers 2-4 connections, assigns seat colors in join order when
//! the host starts the game, and from then on forwards actions into one
//! `GameState`. The room never mutates game state itself.

use hextrade_core::{GameAction, GameEvent, GameState, PlayerColor, PlayerId, TurnPhase};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::protocol::{
    BoardSnapshot, PlayerInfo, RoomInfo, RoomStatus, SeatSnapshot, TableSnapshot,
};

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Room is full")]
    RoomFull,

    #[error("Player not in room")]
    PlayerNotInRoom,

    #[error("Not the host")]
    NotHost,

    #[error("Game already started")]
    GameAlreadyStarted,

    #[error("Not enough players")]
    NotEnoughPlayers,

    #[error("Game not started")]
    GameNotStarted,

    #[error("Rejected: {0}")]
    Rejected(String),
}

/// A player in a game room.
#[derive(Debug, Clone)]
pub struct RoomPlayer {
    pub id: Uuid,
    pub name: String,
    pub connected: bool,
    /// Seat in rotation order, assigned when the game starts
    pub seat: Option<PlayerId>,
}

impl RoomPlayer {
    pub fn new(id: Uuid, name: String) -> Self {
        Self {
            id,
            name,
            connected: true,
            seat: None,
        }
    }

    pub fn color(&self) -> Option<PlayerColor> {
        self.seat.map(|s| PlayerColor::ALL[s as usize])
    }

    pub fn to_info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id,
            name: self.name.clone(),
            color: self.color(),
            connected: self.connected,
        }
    }
}

/// A game room that can hold multiple players.
pub struct GameRoom {
    pub id: Uuid,
    pub name: String,
    pub max_players: u8,
    pub board_radius: u32,
    pub host_id: Uuid,
    pub status: RoomStatus,
    pub players: HashMap<Uuid, RoomPlayer>,
    /// Join order; becomes the seat rotation when the game starts
    pub player_order: Vec<Uuid>,
    /// The game state (once started)
    pub game: Option<GameState>,
}

impl GameRoom {
    pub fn new(
        id: Uuid,
        host_id: Uuid,
        host_name: String,
        max_players: u8,
        board_radius: u32,
    ) -> Self {
        let mut players = HashMap::new();
        players.insert(host_id, RoomPlayer::new(host_id, host_name.clone()));

        Self {
            id,
            name: format!("{}'s Game", host_name),
            max_players: max_players.clamp(2, 4),
            board_radius: board_radius.clamp(1, 6),
            host_id,
            status: RoomStatus::Waiting,
            players,
            player_order: vec![host_id],
            game: None,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players as usize
    }

    pub fn add_player(&mut self, player_id: Uuid, name: String) -> Result<(), RoomError> {
        if self.status != RoomStatus::Waiting {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.is_full() {
            return Err(RoomError::RoomFull);
        }

        self.players
            .insert(player_id, RoomPlayer::new(player_id, name));
        self.player_order.push(player_id);
        Ok(())
    }

    /// Remove a player; returns true when the room is now empty.
    pub fn remove_player(&mut self, player_id: Uuid) -> Result<bool, RoomError> {
        if !self.players.contains_key(&player_id) {
            return Err(RoomError::PlayerNotInRoom);
        }

        self.players.remove(&player_id);
        self.player_order.retain(|&id| id != player_id);

        if player_id == self.host_id && !self.player_order.is_empty() {
            self.host_id = self.player_order[0];
        }

        Ok(self.players.is_empty())
    }

    pub fn set_player_connected(&mut self, player_id: Uuid, connected: bool) {
        if let Some(player) = self.players.get_mut(&player_id) {
            player.connected = connected;
        }
    }

    /// Assign seats in join order and build the game.
    pub fn start_game(&mut self, requester_id: Uuid) -> Result<(), RoomError> {
        if requester_id != self.host_id {
            return Err(RoomError::NotHost);
        }
        if self.status != RoomStatus::Waiting {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.players.len() < 2 {
            return Err(RoomError::NotEnoughPlayers);
        }

        let mut colors = Vec::with_capacity(self.player_order.len());
        for (seat, &player_id) in self.player_order.iter().enumerate() {
            if let Some(player) = self.players.get_mut(&player_id) {
                player.seat = Some(seat as PlayerId);
                colors.push(PlayerColor::ALL[seat]);
            }
        }

        let game = GameState::new(colors, self.board_radius)
            .map_err(|e| RoomError::Rejected(e.to_string()))?;
        self.game = Some(game);
        self.status = RoomStatus::InGame;

        Ok(())
    }

    /// Forward an action to the engine for the seat this connection holds.
    pub fn apply_action(
        &mut self,
        player_id: Uuid,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, RoomError> {
        let seat = self
            .players
            .get(&player_id)
            .ok_or(RoomError::PlayerNotInRoom)?
            .seat
            .ok_or(RoomError::GameNotStarted)?;
        let game = self.game.as_mut().ok_or(RoomError::GameNotStarted)?;

        let events = game
            .apply_action(seat, action)
            .map_err(|e| RoomError::Rejected(e.to_string()))?;

        if game.winner().is_some() {
            self.status = RoomStatus::Finished;
        }

        Ok(events)
    }

    /// One-time board layout for clients.
    pub fn board_snapshot(&self) -> Option<BoardSnapshot> {
        let game = self.game.as_ref()?;
        Some(BoardSnapshot {
            tiles: game.board().tiles().to_vec(),
            node_count: game.board().node_count(),
            adjacency: game.board().adjacency_matrix().to_vec(),
        })
    }

    /// Defensive copy of the mutable table state for clients.
    pub fn table_snapshot(&self) -> Option<TableSnapshot> {
        let game = self.game.as_ref()?;
        let seats = (0..game.player_count())
            .map(|seat| {
                let seat = seat as PlayerId;
                SeatSnapshot {
                    color: game.player_color(seat).unwrap_or(PlayerColor::ALL[0]),
                    name: self.seat_name(seat),
                    hand: game.hand_snapshot(seat).unwrap_or_default(),
                    victory_points: game.victory_points(seat).unwrap_or(0),
                }
            })
            .collect();

        Some(TableSnapshot {
            current_player: game
                .player_color(game.current_player())
                .unwrap_or(PlayerColor::ALL[0]),
            phase: game.phase(),
            last_roll: game.last_roll(),
            turn_number: game.turn_number(),
            seats,
            pending_trades: game.pending_trades().to_vec(),
            blocked_tile: game.blocked_tile(),
        })
    }

    fn seat_name(&self, seat: PlayerId) -> String {
        self.player_order
            .get(seat as usize)
            .and_then(|id| self.players.get(id))
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "Open Seat".to_string())
    }

    /// The winner's color and display name, once the game is finished.
    pub fn winner(&self) -> Option<(PlayerColor, String)> {
        let game = self.game.as_ref()?;
        let seat = match game.phase() {
            TurnPhase::GameOver { winner } => winner,
            _ => return None,
        };
        let color = game.player_color(seat)?;
        Some((color, self.seat_name(seat)))
    }

    pub fn to_info(&self) -> RoomInfo {
        RoomInfo {
            id: self.id,
            name: self.name.clone(),
            players: self
                .player_order
                .iter()
                .filter_map(|id| self.players.get(id).map(|p| p.to_info()))
                .collect(),
            max_players: self.max_players,
            board_radius: self.board_radius,
            host_id: self.host_id,
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hextrade_core::Resource;

    fn room_with_two() -> (GameRoom, Uuid, Uuid) {
        let host = Uuid::new_v4();
        let mut room = GameRoom::new(Uuid::new_v4(), host, "Host".to_string(), 4, 3);
        let guest = Uuid::new_v4();
        room.add_player(guest, "Guest".to_string()).unwrap();
        (room, host, guest)
    }

    #[test]
    fn test_create_room_clamps_options() {
        let host = Uuid::new_v4();
        let room = GameRoom::new(Uuid::new_v4(), host, "Host".to_string(), 9, 0);
        assert_eq!(room.max_players, 4);
        assert_eq!(room.board_radius, 1);
        assert_eq!(room.status, RoomStatus::Waiting);
    }

    #[test]
    fn test_add_remove_players() {
        let host = Uuid::new_v4();
        let mut room = GameRoom::new(Uuid::new_v4(), host, "Host".to_string(), 2, 3);

        let guest = Uuid::new_v4();
        room.add_player(guest, "Guest".to_string()).unwrap();
        assert!(room.is_full());
        assert!(room
            .add_player(Uuid::new_v4(), "Late".to_string())
            .is_err());

        let empty = room.remove_player(guest).unwrap();
        assert!(!empty);
        assert_eq!(room.player_count(), 1);
    }

    #[test]
    fn test_start_game_assigns_seat_colors_in_join_order() {
        let (mut room, host, guest) = room_with_two();

        assert!(room.start_game(guest).is_err(), "only the host may start");
        room.start_game(host).unwrap();

        assert_eq!(room.status, RoomStatus::InGame);
        assert_eq!(room.players[&host].color(), Some(PlayerColor::Red));
        assert_eq!(room.players[&guest].color(), Some(PlayerColor::Blue));
        assert!(room.game.is_some());
    }

    #[test]
    fn test_apply_action_maps_connection_to_seat() {
        let (mut room, host, guest) = room_with_two();
        room.start_game(host).unwrap();

        // The guest holds seat 1 and it is seat 0's turn
        let err = room.apply_action(guest, GameAction::RollDice).unwrap_err();
        assert!(matches!(err, RoomError::Rejected(_)));

        let events = room.apply_action(host, GameAction::RollDice).unwrap();
        assert!(!events.is_empty());
    }

    #[test]
    fn test_snapshots_reflect_engine_state() {
        let (mut room, host, _guest) = room_with_two();
        assert!(room.table_snapshot().is_none());
        room.start_game(host).unwrap();

        let board = room.board_snapshot().unwrap();
        assert_eq!(board.tiles.len(), 19);
        assert_eq!(board.node_count, 54);

        let table = room.table_snapshot().unwrap();
        assert_eq!(table.current_player, PlayerColor::Red);
        assert_eq!(table.seats.len(), 2);
        assert_eq!(table.seats[0].hand.get(Resource::Wood), 4);
        assert!(table.pending_trades.is_empty());
    }
}
