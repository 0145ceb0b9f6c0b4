//! Push channels to connected clients
//!
//! Each game has a room channel every connection in that game listens to.
//! Each connection also has a direct channel for private messages.

use crate::protocol::ServerMessage;
use crate::types::{ConnectionId, GameId};
use std::collections::HashMap;
use tokio::sync::{broadcast, mpsc, RwLock};

const ROOM_CAPACITY: usize = 100;

#[derive(Default)]
pub struct Notifier {
    rooms: RwLock<HashMap<GameId, broadcast::Sender<ServerMessage>>>,
    connections: RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<ServerMessage>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the direct channel of a connection
    pub async fn register(&self, connection_id: &str) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections
            .write()
            .await
            .insert(connection_id.to_string(), tx);
        rx
    }

    pub async fn unregister(&self, connection_id: &str) {
        self.connections.write().await.remove(connection_id);
    }

    /// Listen to everything sent to a game's room, creating the room if needed
    pub async fn subscribe(&self, game_id: &str) -> broadcast::Receiver<ServerMessage> {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(game_id.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .subscribe()
    }

    pub async fn to_room(&self, game_id: &str, msg: ServerMessage) {
        if let Some(tx) = self.rooms.read().await.get(game_id) {
            // No listeners is fine
            let _ = tx.send(msg);
        }
    }

    /// Returns false if the connection is gone
    pub async fn to_connection(&self, connection_id: &str, msg: ServerMessage) -> bool {
        match self.connections.read().await.get(connection_id) {
            Some(tx) => tx.send(msg).is_ok(),
            None => {
                tracing::debug!("Dropping message for unknown connection {}", connection_id);
                false
            }
        }
    }

    /// Close a room; its listeners see the channel end
    pub async fn drop_room(&self, game_id: &str) {
        self.rooms.write().await.remove(game_id);
    }
}
