//! WebSocket message dispatch
//!
//! Commands are routed to the game this connection joined. Failures are
//! turned into an `Error` reply for the sender only.

use crate::error::{GameError, GameResult};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{AppState, NightCommand};
use crate::types::{ConnectionId, GameId};
use std::sync::Arc;

use super::lobby;

/// Per-connection bookkeeping owned by the socket loop
#[derive(Debug, Clone)]
pub struct Session {
    pub connection_id: ConnectionId,
    /// The game whose room this connection listens to
    pub game_id: Option<GameId>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            connection_id: ulid::Ulid::new().to_string(),
            game_id: None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Return early with an error if the connection has not joined a game yet
macro_rules! require_game {
    ($session:expr) => {
        match &$session.game_id {
            Some(game_id) => game_id.clone(),
            None => {
                return Some(ServerMessage::Error {
                    code: "NO_GAME".to_string(),
                    msg: "Create or join a game first".to_string(),
                });
            }
        }
    };
}

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    session: &mut Session,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    let connection_id = session.connection_id.clone();

    match msg {
        ClientMessage::CreateGame => lobby::handle_create_game(state, session).await,

        ClientMessage::JoinGame {
            game_id,
            player_uuid,
        } => lobby::handle_join_game(state, session, game_id, player_uuid).await,

        ClientMessage::Leave => lobby::handle_leave(state, session).await,

        ClientMessage::ChangeName { display_name } => {
            let game_id = require_game!(session);
            reply(state.change_name(&connection_id, &game_id, &display_name).await)
        }

        ClientMessage::CloseJoining => {
            let game_id = require_game!(session);
            reply(state.close_joining(&game_id).await)
        }

        ClientMessage::StartDistribution { roles } => {
            let game_id = require_game!(session);
            reply(state.start_distribution(&game_id, &roles).await)
        }

        ClientMessage::StartGame => {
            let game_id = require_game!(session);
            reply(state.start_game(&game_id).await)
        }

        ClientMessage::SetSheriff { player_uuid } => {
            let game_id = require_game!(session);
            reply(state.set_sheriff(&game_id, &player_uuid).await)
        }

        ClientMessage::DeleteGame => lobby::handle_delete_game(state, session).await,

        ClientMessage::WerewolfVote { target_uuid } => {
            night(state, session, NightCommand::WerewolfVote { target_uuid }).await
        }

        ClientMessage::Sleepover { sleepover_uuid } => {
            night(state, session, NightCommand::Sleepover { sleepover_uuid }).await
        }

        ClientMessage::RevealRole { reveal_uuid } => {
            night(state, session, NightCommand::RevealRole { reveal_uuid }).await
        }

        ClientMessage::SeerConfirmed => night(state, session, NightCommand::SeerConfirmed).await,

        ClientMessage::BindLovers {
            first_uuid,
            second_uuid,
        } => {
            night(
                state,
                session,
                NightCommand::BindLovers {
                    first_uuid,
                    second_uuid,
                },
            )
            .await
        }

        ClientMessage::ConfirmLoverBond => {
            night(state, session, NightCommand::ConfirmLoverBond).await
        }

        ClientMessage::UsePotion { heal, kill_uuid } => {
            night(state, session, NightCommand::UsePotion { heal, kill_uuid }).await
        }

        ClientMessage::WitchConfirms => night(state, session, NightCommand::WitchConfirms).await,

        ClientMessage::Vote { target_uuid } => {
            let game_id = require_game!(session);
            reply(state.vote(&connection_id, &game_id, &target_uuid).await)
        }

        ClientMessage::ReadyForNight => {
            let game_id = require_game!(session);
            reply(state.ready_for_night(&connection_id, &game_id).await)
        }
    }
}

async fn night(
    state: &Arc<AppState>,
    session: &Session,
    command: NightCommand,
) -> Option<ServerMessage> {
    let game_id = require_game!(session);
    reply(
        state
            .night_action(&session.connection_id, &game_id, command)
            .await,
    )
}

/// Successful commands answer through notifications, failures answer directly
pub(super) fn reply(result: GameResult<()>) -> Option<ServerMessage> {
    result.err().map(error_message)
}

pub(super) fn error_message(err: GameError) -> ServerMessage {
    match &err {
        GameError::InvariantViolation(_) => tracing::error!("Invariant violated: {}", err),
        _ => tracing::warn!("Rejected command: {}", err),
    }
    ServerMessage::Error {
        code: err.code().to_string(),
        msg: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_commands_need_a_game() {
        let state = Arc::new(AppState::in_memory());
        let mut session = Session::new();

        let response = handle_message(ClientMessage::StartGame, &mut session, &state).await;
        match response {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "NO_GAME"),
            other => panic!("Expected Error, got {:?}", other),
        }

        let response = handle_message(ClientMessage::WitchConfirms, &mut session, &state).await;
        assert!(matches!(response, Some(ServerMessage::Error { .. })));
    }

    #[test]
    fn test_error_message_carries_code() {
        match error_message(GameError::NotAlive("p1".to_string())) {
            ServerMessage::Error { code, msg } => {
                assert_eq!(code, "NOT_ALIVE");
                assert_eq!(msg, "player p1 is not alive");
            }
            other => panic!("Expected Error, got {:?}", other),
        }
        assert!(reply(Ok(())).is_none());
    }
}
