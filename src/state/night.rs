use super::AppState;
use crate::error::GameResult;
use crate::types::PlayerId;

/// A night action submitted by a connection
#[derive(Debug, Clone, PartialEq)]
pub enum NightCommand {
    WerewolfVote { target_uuid: PlayerId },
    Sleepover { sleepover_uuid: PlayerId },
    RevealRole { reveal_uuid: PlayerId },
    SeerConfirmed,
    BindLovers { first_uuid: PlayerId, second_uuid: PlayerId },
    ConfirmLoverBond,
    UsePotion { heal: bool, kill_uuid: Option<PlayerId> },
    WitchConfirms,
}

impl AppState {
    pub async fn night_action(
        &self,
        connection_id: &str,
        game_id: &str,
        command: NightCommand,
    ) -> GameResult<()> {
        tracing::debug!("Game {}: {} sends {:?}", game_id, connection_id, command);
        self.apply_as_player(game_id, connection_id, |game, actor| match &command {
            NightCommand::WerewolfVote { target_uuid } => game.werewolf_vote(actor, target_uuid),
            NightCommand::Sleepover { sleepover_uuid } => game.sleepover(actor, sleepover_uuid),
            NightCommand::RevealRole { reveal_uuid } => game.seer_reveal(actor, reveal_uuid),
            NightCommand::SeerConfirmed => game.seer_confirm(actor),
            NightCommand::BindLovers {
                first_uuid,
                second_uuid,
            } => game.bind_lovers(actor, first_uuid, second_uuid),
            NightCommand::ConfirmLoverBond => game.confirm_bond(actor),
            NightCommand::UsePotion { heal, kill_uuid } => {
                game.use_potion(actor, *heal, kill_uuid.as_deref())
            }
            NightCommand::WitchConfirms => game.witch_confirm(actor),
        })
        .await
    }
}
