use super::AppState;
use crate::error::{GameError, GameResult};
use crate::protocol::ServerMessage;
use crate::types::*;
use rand::Rng;

/// Safe character set for short codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 4;
const MAX_CODE_ATTEMPTS: usize = 32;

/// Generate a random game code (4 characters)
fn generate_game_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

impl AppState {
    /// Create an empty game in the lobby and return its code
    pub async fn create_game(&self) -> GameResult<GameId> {
        let _guard = self.action_lock.lock().await;

        let game_id = self.unique_game_code(generate_game_code).await?;
        self.store.create_game(Game::new(game_id.clone())).await?;
        tracing::info!("Game {} was created", game_id);
        Ok(game_id)
    }

    /// Draw codes from `generate` until one is not taken
    pub(crate) async fn unique_game_code(
        &self,
        mut generate: impl FnMut() -> String,
    ) -> GameResult<GameId> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate();
            if !self.store.contains_game(&code).await {
                return Ok(code);
            }
            tracing::debug!("Game code {} is taken, drawing another", code);
        }
        Err(GameError::InvariantViolation(format!(
            "no free game code after {} attempts",
            MAX_CODE_ATTEMPTS
        )))
    }

    /// Join `game_id` from `connection_id`.
    ///
    /// A known `player_uuid` reattaches that player to the connection. A
    /// connection that already plays in the game keeps its player. Anyone
    /// else becomes a new player, which only works in the lobby.
    pub async fn join_game(
        &self,
        connection_id: &str,
        game_id: &str,
        player_uuid: Option<PlayerId>,
    ) -> GameResult<PlayerId> {
        self.apply(game_id, |game| {
            let current = game
                .player_by_connection(connection_id)
                .ok()
                .map(|p| p.player_uuid.clone());
            let known = player_uuid
                .as_deref()
                .filter(|uuid| game.player(uuid).is_ok())
                .or(current.as_deref())
                .map(str::to_string);

            match (known, player_uuid.as_deref()) {
                (Some(uuid), _) => {
                    let events = game.reconnect(&uuid, connection_id.to_string())?;
                    tracing::info!("Player {} rejoined game {}", uuid, game.game_id);
                    Ok((uuid, events))
                }
                (None, Some(uuid)) if game.phase != Phase::Lobby => Err(GameError::NotFound(
                    format!("player {} in game {}", uuid, game.game_id),
                )),
                _ => {
                    let uuid = ulid::Ulid::new().to_string();
                    let events = game.add_player(uuid.clone(), connection_id.to_string())?;
                    tracing::info!("Player {} joined game {}", uuid, game.game_id);
                    Ok((uuid, events))
                }
            }
        })
        .await
    }

    pub async fn change_name(
        &self,
        connection_id: &str,
        game_id: &str,
        display_name: &str,
    ) -> GameResult<()> {
        self.apply_as_player(game_id, connection_id, |game, actor| {
            game.change_name(actor, display_name)
        })
        .await
    }

    /// Detach the connection from its player; the player stays in the game
    pub async fn disconnect(&self, connection_id: &str, game_id: &str) {
        let result = self
            .apply(game_id, |game| {
                if let Some(uuid) = game.disconnect(connection_id) {
                    tracing::info!("Player {} left game {}", uuid, game.game_id);
                }
                Ok(((), Vec::new()))
            })
            .await;
        if let Err(e) = result {
            tracing::debug!("Disconnect from game {} ignored: {}", game_id, e);
        }
    }

    pub async fn close_joining(&self, game_id: &str) -> GameResult<()> {
        self.apply(game_id, |game| Ok(((), game.close_joining()?)))
            .await
    }

    pub async fn start_distribution(&self, game_id: &str, roles: &[RoleCount]) -> GameResult<()> {
        self.apply(game_id, |game| {
            let mut rng = rand::rng();
            Ok(((), game.start_distribution(roles, &mut rng)?))
        })
        .await
    }

    pub async fn start_game(&self, game_id: &str) -> GameResult<()> {
        self.apply(game_id, |game| Ok(((), game.start_game()?)))
            .await
    }

    pub async fn set_sheriff(&self, game_id: &str, player_uuid: &str) -> GameResult<()> {
        self.apply(game_id, |game| Ok(((), game.set_sheriff(player_uuid)?)))
            .await
    }

    /// Remove a game and close its room
    pub async fn delete_game(&self, game_id: &str) -> GameResult<()> {
        let _guard = self.action_lock.lock().await;

        if !self.store.delete_game(game_id).await {
            return Err(GameError::NotFound(format!("game {}", game_id)));
        }
        self.notifier
            .to_room(
                game_id,
                ServerMessage::GameDeleted {
                    game_id: game_id.to_string(),
                },
            )
            .await;
        self.notifier.drop_room(game_id).await;
        tracing::info!("Game {} was deleted", game_id);
        Ok(())
    }
}
