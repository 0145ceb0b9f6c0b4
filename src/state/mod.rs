mod day;
mod lobby;
mod night;
mod notify;

pub use night::NightCommand;

use crate::broadcast::Notifier;
use crate::error::{GameError, GameResult};
use crate::game::Events;
use crate::store::{GameStore, MemoryStore};
use crate::types::*;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn GameStore>,
    pub notifier: Notifier,
    /// Actions run one at a time, from fetch through notification
    action_lock: Mutex<()>,
}

impl AppState {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self {
            store,
            notifier: Notifier::new(),
            action_lock: Mutex::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub async fn get_game(&self, game_id: &str) -> Option<Game> {
        self.store.get_game(game_id).await
    }

    /// Apply `op` to a fresh copy of the game. The copy is persisted and its
    /// events published only if `op` succeeds.
    async fn apply<T>(
        &self,
        game_id: &str,
        op: impl FnOnce(&mut Game) -> GameResult<(T, Events)>,
    ) -> GameResult<T> {
        let _guard = self.action_lock.lock().await;

        let mut game = self
            .store
            .get_game(game_id)
            .await
            .ok_or_else(|| GameError::NotFound(format!("game {}", game_id)))?;
        let (out, events) = op(&mut game)?;
        self.store.update_game(game.clone()).await?;

        self.publish(&game, &events).await;
        Ok(out)
    }

    /// Like `apply`, for an operation performed by the player on `connection_id`
    async fn apply_as_player(
        &self,
        game_id: &str,
        connection_id: &str,
        op: impl FnOnce(&mut Game, &PlayerId) -> GameResult<Events>,
    ) -> GameResult<()> {
        self.apply(game_id, |game| {
            let actor = game.player_by_connection(connection_id)?.player_uuid.clone();
            Ok(((), op(game, &actor)?))
        })
        .await
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory()
    }
}
