//! Handlers that change which game a connection belongs to

use super::handlers::{error_message, Session};
use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::types::{GameId, PlayerId};
use std::sync::Arc;

pub async fn handle_create_game(
    state: &Arc<AppState>,
    session: &mut Session,
) -> Option<ServerMessage> {
    match state.create_game().await {
        Ok(game_id) => {
            leave_current(state, session).await;
            session.game_id = Some(game_id.clone());
            Some(ServerMessage::GameCreated { game_id })
        }
        Err(e) => Some(error_message(e)),
    }
}

/// Join or rejoin; the joined player hears back through its direct channel
pub async fn handle_join_game(
    state: &Arc<AppState>,
    session: &mut Session,
    game_id: GameId,
    player_uuid: Option<PlayerId>,
) -> Option<ServerMessage> {
    let game_id = game_id.trim().to_uppercase();

    match state
        .join_game(&session.connection_id, &game_id, player_uuid)
        .await
    {
        Ok(_) => {
            if session.game_id.as_deref() != Some(game_id.as_str()) {
                leave_current(state, session).await;
            }
            session.game_id = Some(game_id);
            None
        }
        Err(e) => Some(error_message(e)),
    }
}

pub async fn handle_leave(state: &Arc<AppState>, session: &mut Session) -> Option<ServerMessage> {
    leave_current(state, session).await;
    None
}

pub async fn handle_delete_game(
    state: &Arc<AppState>,
    session: &mut Session,
) -> Option<ServerMessage> {
    let Some(game_id) = session.game_id.take() else {
        return Some(ServerMessage::Error {
            code: "NO_GAME".to_string(),
            msg: "Create or join a game first".to_string(),
        });
    };
    match state.delete_game(&game_id).await {
        Ok(()) => None,
        Err(e) => Some(error_message(e)),
    }
}

async fn leave_current(state: &Arc<AppState>, session: &mut Session) {
    if let Some(game_id) = session.game_id.take() {
        state.disconnect(&session.connection_id, &game_id).await;
    }
}
