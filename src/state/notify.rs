use super::AppState;
use crate::game::GameEvent;
use crate::protocol::{GameSnapshot, PlayerInfo, ServerMessage};
use crate::roles::Role;
use crate::types::*;

impl AppState {
    /// Tell everyone concerned about `events`, then send every connected
    /// player a fresh snapshot of their own view
    pub(super) async fn publish(&self, game: &Game, events: &[GameEvent]) {
        if events.is_empty() {
            return;
        }

        for event in events {
            self.publish_event(game, event).await;
        }
        self.sync_players(game).await;
    }

    async fn publish_event(&self, game: &Game, event: &GameEvent) {
        let game_id = &game.game_id;
        match event {
            GameEvent::PlayerJoined { player_uuid } => {
                let is_manager = game.manager_uuid.as_ref() == Some(player_uuid);
                self.to_player(
                    game,
                    player_uuid,
                    ServerMessage::JoinedGame {
                        game_id: game_id.clone(),
                        player_uuid: player_uuid.clone(),
                        is_manager,
                        active_night_role: game.active_night_role,
                    },
                )
                .await;
                self.push_player_list(game).await;
            }
            GameEvent::PlayerRenamed { .. } | GameEvent::SheriffAppointed { .. } => {
                self.push_player_list(game).await;
            }
            GameEvent::PhaseChanged { phase } => {
                self.notifier
                    .to_room(
                        game_id,
                        ServerMessage::Phase {
                            phase: *phase,
                            round: game.round,
                        },
                    )
                    .await;
                self.push_player_list(game).await;
            }
            GameEvent::RolesAssigned => {
                for player in &game.players {
                    if let Some(role) = player.role {
                        self.to_player(game, &player.player_uuid, ServerMessage::RoleAssigned { role })
                            .await;
                    }
                }
            }
            GameEvent::NextNightRole { role } => {
                self.notifier
                    .to_room(game_id, ServerMessage::NextActiveRole { role: *role })
                    .await;
            }
            GameEvent::WerewolfVoted {
                voter_uuid,
                target_uuid,
            } => {
                // Wolves see each other's picks; the turn may already be over
                for wolf in game.living_with_role(Role::Werewolf) {
                    self.to_player(
                        game,
                        &wolf.player_uuid,
                        ServerMessage::WerewolfVote {
                            voter_uuid: voter_uuid.clone(),
                            target_uuid: target_uuid.clone(),
                        },
                    )
                    .await;
                }
            }
            GameEvent::SeerRevealed {
                seer_uuid,
                reveal_uuid,
                role,
            } => {
                self.to_player(
                    game,
                    seer_uuid,
                    ServerMessage::SeerResult {
                        reveal_uuid: reveal_uuid.clone(),
                        role: *role,
                    },
                )
                .await;
            }
            GameEvent::LoversBound {
                first_uuid,
                second_uuid,
            } => {
                for (lover, partner) in [(first_uuid, second_uuid), (second_uuid, first_uuid)] {
                    self.to_player(
                        game,
                        lover,
                        ServerMessage::LovePartner {
                            partner_uuid: partner.clone(),
                        },
                    )
                    .await;
                }
            }
            GameEvent::PotionUsed { witch_uuid } => {
                let action = game
                    .player(witch_uuid)
                    .ok()
                    .and_then(|w| w.night_action.clone());
                if let Some(NightAction::Witch { heal, kill_uuid }) = action {
                    self.to_player(
                        game,
                        witch_uuid,
                        ServerMessage::WitchPotionAccepted { heal, kill_uuid },
                    )
                    .await;
                }
            }
            GameEvent::SleepoverChosen {
                red_lady_uuid,
                sleepover_uuid,
            } => {
                self.to_player(
                    game,
                    red_lady_uuid,
                    ServerMessage::SleepoverAccepted {
                        sleepover_uuid: sleepover_uuid.clone(),
                    },
                )
                .await;
            }
            GameEvent::NightResolved { deaths } => {
                self.notifier
                    .to_room(
                        game_id,
                        ServerMessage::NightResolved {
                            deaths: deaths.clone(),
                        },
                    )
                    .await;
            }
            GameEvent::LynchResolved {
                voted_out_uuid,
                votes,
                ..
            } => {
                self.notifier
                    .to_room(
                        game_id,
                        ServerMessage::VotingResolved {
                            voted_out_uuid: voted_out_uuid.clone(),
                            votes: votes.clone(),
                        },
                    )
                    .await;
                self.push_player_list(game).await;
            }
            GameEvent::BondConfirmed { .. } | GameEvent::VoteCast { .. } | GameEvent::PlayerReady { .. } => {}
        }
    }

    async fn push_player_list(&self, game: &Game) {
        self.notifier
            .to_room(
                &game.game_id,
                ServerMessage::PlayerList {
                    players: PlayerInfo::public_list(game),
                },
            )
            .await;
    }

    async fn sync_players(&self, game: &Game) {
        for player in &game.players {
            let snapshot = GameSnapshot::for_viewer(game, Some(&player.player_uuid));
            self.to_player(game, &player.player_uuid, ServerMessage::SyncState { snapshot })
                .await;
        }
    }

    /// Send to the connection a player is currently attached to, if any
    async fn to_player(&self, game: &Game, player_uuid: &str, msg: ServerMessage) {
        let connection = game
            .player(player_uuid)
            .ok()
            .and_then(|p| p.connection_id.as_deref());
        if let Some(connection_id) = connection {
            self.notifier.to_connection(connection_id, msg).await;
        }
    }
}
