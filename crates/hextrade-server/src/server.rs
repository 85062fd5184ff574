//! WebSocket server and connection handling.
//!
//! One task per connection; room state lives in `DashMap`s shared across
//! tasks. After every applied action the whole room receives the engine's
//! events plus a fresh table snapshot - clients never hold live references
//! into game state.

use crate::protocol::{ClientMessage, RoomStatus, ServerMessage};
use crate::room::GameRoom;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    /// All active rooms
    pub rooms: DashMap<Uuid, GameRoom>,
    /// Mapping from connection ID to its room
    pub player_rooms: DashMap<Uuid, Uuid>,
    /// Mapping from connection ID to its outgoing message channel
    pub player_senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            player_rooms: DashMap::new(),
            player_senders: DashMap::new(),
        }
    }

    /// Send a message to a specific connection.
    pub fn send_to_player(&self, player_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.player_senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    /// Broadcast a message to every connection in a room.
    pub fn broadcast_to_room(&self, room_id: Uuid, msg: ServerMessage) {
        if let Some(room) = self.rooms.get(&room_id) {
            for player_id in room.players.keys() {
                self.send_to_player(*player_id, msg.clone());
            }
        }
    }

    /// Rooms still waiting for players.
    pub fn waiting_rooms(&self) -> Vec<crate::protocol::RoomInfo> {
        self.rooms
            .iter()
            .filter(|r| r.status == RoomStatus::Waiting)
            .map(|r| r.to_info())
            .collect()
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("hextrade server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection for its whole lifetime.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    let player_id = Uuid::new_v4();
    info!("connection {} opened from {}", player_id, addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.player_senders.insert(player_id, tx);

    let welcome = serde_json::to_string(&ServerMessage::Welcome { player_id })?;
    ws_sender.send(Message::Text(welcome.into())).await?;

    // Forward queued outgoing messages onto the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(player_id, client_msg, &state),
                Err(e) => {
                    warn!("bad message from {}: {}", player_id, e);
                    state.send_to_player(
                        player_id,
                        ServerMessage::Error {
                            message: format!("malformed message: {}", e),
                        },
                    );
                }
            },
            Ok(Message::Close(_)) => {
                debug!("connection {} closing", player_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                state.send_to_player(player_id, ServerMessage::Pong);
            }
            Err(e) => {
                error!("websocket error from {}: {}", player_id, e);
                break;
            }
            _ => {}
        }
    }

    handle_disconnect(player_id, &state);
    state.player_senders.remove(&player_id);
    send_task.abort();

    info!("connection {} closed", player_id);
    Ok(())
}

/// Dispatch one parsed client message.
fn handle_message(player_id: Uuid, msg: ClientMessage, state: &Arc<ServerState>) {
    match msg {
        ClientMessage::CreateRoom {
            player_name,
            max_players,
            board_radius,
        } => {
            let room_id = Uuid::new_v4();
            let room = GameRoom::new(room_id, player_id, player_name, max_players, board_radius);
            let room_info = room.to_info();

            state.rooms.insert(room_id, room);
            state.player_rooms.insert(player_id, room_id);

            info!("room {} created by {}", room_id, player_id);
            state.send_to_player(player_id, ServerMessage::RoomCreated { room_id });
            state.send_to_player(player_id, ServerMessage::JoinedRoom { room: room_info });
        }

        ClientMessage::JoinRoom {
            room_id,
            player_name,
        } => {
            let Some(mut room) = state.rooms.get_mut(&room_id) else {
                state.send_to_player(
                    player_id,
                    ServerMessage::Error {
                        message: "Room not found".to_string(),
                    },
                );
                return;
            };
            match room.add_player(player_id, player_name) {
                Ok(()) => {
                    let room_info = room.to_info();
                    drop(room);
                    state.player_rooms.insert(player_id, room_id);
                    state.send_to_player(
                        player_id,
                        ServerMessage::JoinedRoom {
                            room: room_info.clone(),
                        },
                    );
                    state.broadcast_to_room(room_id, ServerMessage::RoomUpdated { room: room_info });
                }
                Err(e) => {
                    drop(room);
                    state.send_to_player(
                        player_id,
                        ServerMessage::Error {
                            message: e.to_string(),
                        },
                    );
                }
            }
        }

        ClientMessage::LeaveRoom => {
            if let Some((_, room_id)) = state.player_rooms.remove(&player_id) {
                let emptied = {
                    let Some(mut room) = state.rooms.get_mut(&room_id) else {
                        return;
                    };
                    let emptied = room.remove_player(player_id).unwrap_or(false);
                    if !emptied {
                        let room_info = room.to_info();
                        drop(room);
                        state.broadcast_to_room(
                            room_id,
                            ServerMessage::RoomUpdated { room: room_info },
                        );
                    }
                    emptied
                };
                if emptied {
                    state.rooms.remove(&room_id);
                }
                state.send_to_player(player_id, ServerMessage::LeftRoom);
            }
        }

        ClientMessage::StartGame => {
            let Some(room_id) = state.player_rooms.get(&player_id).map(|r| *r) else {
                return;
            };
            let Some(mut room) = state.rooms.get_mut(&room_id) else {
                return;
            };
            match room.start_game(player_id) {
                Ok(()) => {
                    let board = room.board_snapshot();
                    let table = room.table_snapshot();
                    drop(room);
                    if let (Some(board), Some(table)) = (board, table) {
                        info!("game started in room {}", room_id);
                        state.broadcast_to_room(
                            room_id,
                            ServerMessage::GameStarted { board, table },
                        );
                    }
                }
                Err(e) => {
                    drop(room);
                    state.send_to_player(
                        player_id,
                        ServerMessage::Error {
                            message: e.to_string(),
                        },
                    );
                }
            }
        }

        ClientMessage::Action { action } => {
            let Some(room_id) = state.player_rooms.get(&player_id).map(|r| *r) else {
                return;
            };
            let Some(mut room) = state.rooms.get_mut(&room_id) else {
                return;
            };
            match room.apply_action(player_id, action) {
                Ok(events) => {
                    let table = room.table_snapshot();
                    let winner = room.winner();
                    drop(room);

                    debug!("action applied in room {}: {} events", room_id, events.len());
                    if let Some(table) = table {
                        state.broadcast_to_room(
                            room_id,
                            ServerMessage::ActionApplied { events, table },
                        );
                    }
                    if let Some((winner, winner_name)) = winner {
                        state.broadcast_to_room(
                            room_id,
                            ServerMessage::GameOver {
                                winner,
                                winner_name,
                            },
                        );
                    }
                }
                Err(e) => {
                    drop(room);
                    debug!("action rejected in room {}: {}", room_id, e);
                    state.send_to_player(
                        player_id,
                        ServerMessage::ActionRejected {
                            reason: e.to_string(),
                        },
                    );
                }
            }
        }

        ClientMessage::Chat { message } => {
            if let Some(room_id) = state.player_rooms.get(&player_id).map(|r| *r) {
                let player_name = state
                    .rooms
                    .get(&room_id)
                    .and_then(|r| r.players.get(&player_id).map(|p| p.name.clone()))
                    .unwrap_or_else(|| "Unknown".to_string());

                state.broadcast_to_room(
                    room_id,
                    ServerMessage::ChatMessage {
                        player_name,
                        message,
                    },
                );
            }
        }

        ClientMessage::ListRooms => {
            let rooms = state.waiting_rooms();
            state.send_to_player(player_id, ServerMessage::RoomList { rooms });
        }

        ClientMessage::Ping => {
            state.send_to_player(player_id, ServerMessage::Pong);
        }
    }
}

/// Handle a dropped connection: mark in-game players disconnected, remove
/// waiting players outright.
fn handle_disconnect(player_id: Uuid, state: &Arc<ServerState>) {
    let Some((_, room_id)) = state.player_rooms.remove(&player_id) else {
        return;
    };
    let Some(mut room) = state.rooms.get_mut(&room_id) else {
        return;
    };

    if room.status == RoomStatus::InGame {
        room.set_player_connected(player_id, false);
        let room_info = room.to_info();
        drop(room);
        state.broadcast_to_room(room_id, ServerMessage::RoomUpdated { room: room_info });
    } else {
        let emptied = room.remove_player(player_id).unwrap_or(false);
        if emptied {
            drop(room);
            state.rooms.remove(&room_id);
        } else {
            let room_info = room.to_info();
            drop(room);
            state.broadcast_to_room(room_id, ServerMessage::RoomUpdated { room: room_info });
        }
    }
}
