use super::AppState;
use crate::error::GameResult;

impl AppState {
    pub async fn vote(&self, connection_id: &str, game_id: &str, target_uuid: &str) -> GameResult<()> {
        self.apply_as_player(game_id, connection_id, |game, actor| {
            game.cast_vote(actor, target_uuid)
        })
        .await
    }

    pub async fn ready_for_night(&self, connection_id: &str, game_id: &str) -> GameResult<()> {
        self.apply_as_player(game_id, connection_id, |game, actor| {
            game.ready_for_night(actor)
        })
        .await
    }
}
