use super::{top_voted, Events, GameEvent};
use crate::error::{GameError, GameResult};
use crate::types::{Game, Phase, PlayerId};
use std::collections::HashMap;

impl Game {
    /// Cast a day vote. The lynch resolves as soon as every living player voted.
    pub fn cast_vote(&mut self, voter_uuid: &str, target_uuid: &str) -> GameResult<Events> {
        self.require_phase(Phase::Day, "vote")?;
        if self.lynch_done {
            return Err(GameError::IllegalPhase {
                action: "vote after today's lynch",
                phase: self.phase,
            });
        }

        let idx = self.player_index(voter_uuid)?;
        let voter = &self.players[idx];
        if !voter.is_alive {
            return Err(GameError::NotAlive(voter_uuid.to_string()));
        }
        if voter.vote_target_uuid.is_some() {
            return Err(GameError::AlreadyActed(format!(
                "player {} already voted today",
                voter_uuid
            )));
        }
        self.living_target(target_uuid)?;

        self.players[idx].vote_target_uuid = Some(target_uuid.to_string());
        let mut events = vec![GameEvent::VoteCast {
            voter_uuid: voter_uuid.to_string(),
        }];

        if self.living().all(|p| p.vote_target_uuid.is_some()) {
            events.push(self.resolve_lynch()?);
        }
        Ok(events)
    }

    fn resolve_lynch(&mut self) -> GameResult<GameEvent> {
        let votes: HashMap<PlayerId, PlayerId> = self
            .living()
            .filter_map(|p| {
                p.vote_target_uuid
                    .clone()
                    .map(|target| (p.player_uuid.clone(), target))
            })
            .collect();

        let tied: Vec<PlayerId> = top_voted(self.living().filter_map(|p| p.vote_target_uuid.as_deref()))
            .into_iter()
            .map(str::to_string)
            .collect();

        let elected = match tied.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            _ => self
                .living()
                .find(|p| p.is_sheriff)
                .and_then(|sheriff| sheriff.vote_target_uuid.clone())
                .filter(|choice| tied.contains(choice)),
        };

        let mut deaths = Vec::new();
        if let Some(elected_uuid) = &elected {
            let idx = self
                .players
                .iter()
                .position(|p| p.is_alive && p.player_uuid == *elected_uuid)
                .ok_or_else(|| {
                    let err = GameError::InvariantViolation(format!(
                        "elected player {} is not among the living in game {}",
                        elected_uuid, self.game_id
                    ));
                    tracing::error!("{}", err);
                    err
                })?;
            self.players[idx].is_alive = false;
            deaths.push(elected_uuid.clone());
            if let Some(partner) = self.kill_love_partner(elected_uuid)? {
                deaths.push(partner);
            }
        }

        for player in &mut self.players {
            player.vote_target_uuid = None;
        }
        self.lynch_done = true;
        self.last_voted_out_uuid = elected.clone();
        self.last_votes = votes.clone();

        tracing::info!(
            "Game {}: lynch of day {} resolved, voted out: {:?}",
            self.game_id,
            self.round,
            elected
        );

        Ok(GameEvent::LynchResolved {
            voted_out_uuid: elected,
            votes,
            deaths,
        })
    }
}
