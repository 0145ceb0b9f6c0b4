//! Session storage for running games

use crate::error::{GameError, GameResult};
use crate::types::{Game, GameId};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Everything the server needs from a game store.
/// Callers always fetch a fresh copy before mutating and write it back with
/// `update_game`; a read after a write for the same id must observe it.
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn create_game(&self, game: Game) -> GameResult<()>;
    async fn get_game(&self, game_id: &str) -> Option<Game>;
    async fn update_game(&self, game: Game) -> GameResult<()>;
    /// Returns whether a game was removed
    async fn delete_game(&self, game_id: &str) -> bool;
    async fn contains_game(&self, game_id: &str) -> bool;
}

/// In-process store, lost on restart
#[derive(Default)]
pub struct MemoryStore {
    games: RwLock<HashMap<GameId, Game>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn create_game(&self, game: Game) -> GameResult<()> {
        let mut games = self.games.write().await;
        if games.contains_key(&game.game_id) {
            return Err(GameError::InvariantViolation(format!(
                "game {} already exists",
                game.game_id
            )));
        }
        games.insert(game.game_id.clone(), game);
        Ok(())
    }

    async fn get_game(&self, game_id: &str) -> Option<Game> {
        self.games.read().await.get(game_id).cloned()
    }

    async fn update_game(&self, game: Game) -> GameResult<()> {
        let mut games = self.games.write().await;
        match games.get_mut(&game.game_id) {
            Some(stored) => {
                *stored = game;
                Ok(())
            }
            None => Err(GameError::NotFound(format!("game {}", game.game_id))),
        }
    }

    async fn delete_game(&self, game_id: &str) -> bool {
        self.games.write().await.remove(game_id).is_some()
    }

    async fn contains_game(&self, game_id: &str) -> bool {
        self.games.read().await.contains_key(game_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Phase;

    #[tokio::test]
    async fn test_read_your_writes() {
        let store = MemoryStore::new();
        store.create_game(Game::new("ABCD".to_string())).await.unwrap();

        let mut game = store.get_game("ABCD").await.unwrap();
        game.phase = Phase::RoleSelection;
        store.update_game(game).await.unwrap();

        assert_eq!(
            store.get_game("ABCD").await.unwrap().phase,
            Phase::RoleSelection
        );
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected() {
        let store = MemoryStore::new();
        store.create_game(Game::new("ABCD".to_string())).await.unwrap();

        let err = store
            .create_game(Game::new("ABCD".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVARIANT_VIOLATION");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_game() {
        let store = MemoryStore::new();

        let err = store
            .update_game(Game::new("ZZZZ".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(!store.delete_game("ZZZZ").await);
        assert!(!store.contains_game("ZZZZ").await);
    }

    #[tokio::test]
    async fn test_delete_game() {
        let store = MemoryStore::new();
        store.create_game(Game::new("ABCD".to_string())).await.unwrap();

        assert!(store.delete_game("ABCD").await);
        assert!(store.get_game("ABCD").await.is_none());
    }
}
