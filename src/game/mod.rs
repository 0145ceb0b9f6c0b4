//! Game session engine
//!
//! Synchronous operations on the `Game` aggregate. Every operation validates
//! first and mutates afterwards, returning the events it produced so the
//! caller can notify observers. None of this code touches storage or the
//! transport.

mod lynch;
mod night;
mod phase;
mod resolution;
mod scheduler;

pub use resolution::{resolve_night, top_voted, wolf_target, NightOutcome};
pub use scheduler::wake_order;

use crate::error::{GameError, GameResult};
use crate::roles::Role;
use crate::types::*;
use std::collections::HashMap;

/// Something observers may need to hear about
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PlayerJoined {
        player_uuid: PlayerId,
    },
    PlayerRenamed {
        player_uuid: PlayerId,
    },
    PhaseChanged {
        phase: Phase,
    },
    RolesAssigned,
    NextNightRole {
        role: Role,
    },
    WerewolfVoted {
        voter_uuid: PlayerId,
        target_uuid: PlayerId,
    },
    SeerRevealed {
        seer_uuid: PlayerId,
        reveal_uuid: PlayerId,
        role: Role,
    },
    LoversBound {
        first_uuid: PlayerId,
        second_uuid: PlayerId,
    },
    BondConfirmed {
        player_uuid: PlayerId,
    },
    PotionUsed {
        witch_uuid: PlayerId,
    },
    SleepoverChosen {
        red_lady_uuid: PlayerId,
        sleepover_uuid: PlayerId,
    },
    NightResolved {
        deaths: Vec<PlayerId>,
    },
    VoteCast {
        voter_uuid: PlayerId,
    },
    LynchResolved {
        voted_out_uuid: Option<PlayerId>,
        votes: HashMap<PlayerId, PlayerId>,
        deaths: Vec<PlayerId>,
    },
    PlayerReady {
        player_uuid: PlayerId,
    },
    SheriffAppointed {
        player_uuid: PlayerId,
    },
}

pub type Events = Vec<GameEvent>;

impl Game {
    pub fn player(&self, player_uuid: &str) -> GameResult<&Player> {
        self.players
            .iter()
            .find(|p| p.player_uuid == player_uuid)
            .ok_or_else(|| GameError::NotFound(format!("player {}", player_uuid)))
    }

    pub(crate) fn player_index(&self, player_uuid: &str) -> GameResult<usize> {
        self.players
            .iter()
            .position(|p| p.player_uuid == player_uuid)
            .ok_or_else(|| GameError::NotFound(format!("player {}", player_uuid)))
    }

    pub fn player_by_connection(&self, connection_id: &str) -> GameResult<&Player> {
        self.players
            .iter()
            .find(|p| p.connection_id.as_deref() == Some(connection_id))
            .ok_or_else(|| {
                GameError::NotFound(format!(
                    "player for connection {} in game {}",
                    connection_id, self.game_id
                ))
            })
    }

    pub fn living(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive)
    }

    pub fn living_with_role(&self, role: Role) -> impl Iterator<Item = &Player> {
        self.living().filter(move |p| p.has_role(role))
    }

    pub(crate) fn require_phase(&self, phase: Phase, action: &'static str) -> GameResult<()> {
        if self.phase != phase {
            return Err(GameError::IllegalPhase {
                action,
                phase: self.phase,
            });
        }
        Ok(())
    }

    /// Index of a living player that may be targeted by a night action or vote
    pub(crate) fn living_target(&self, target_uuid: &str) -> GameResult<usize> {
        let idx = self.player_index(target_uuid)?;
        if !self.players[idx].is_alive {
            return Err(GameError::InvalidAction(format!(
                "player {} is not alive and cannot be targeted",
                target_uuid
            )));
        }
        Ok(idx)
    }

    /// Append a new player; only possible while the lobby is open.
    /// The first player to join becomes the manager.
    pub fn add_player(
        &mut self,
        player_uuid: PlayerId,
        connection_id: ConnectionId,
    ) -> GameResult<Events> {
        self.require_phase(Phase::Lobby, "join as a new player")?;
        if self.players.iter().any(|p| p.player_uuid == player_uuid) {
            return Err(GameError::InvariantViolation(format!(
                "player {} already exists in game {}",
                player_uuid, self.game_id
            )));
        }
        if let Ok(holder) = self.player_by_connection(&connection_id) {
            return Err(GameError::InvalidAction(format!(
                "connection already plays as {} in game {}",
                holder.player_uuid, self.game_id
            )));
        }

        if self.players.is_empty() {
            self.manager_uuid = Some(player_uuid.clone());
        }
        self.players
            .push(Player::new(player_uuid.clone(), Some(connection_id)));
        Ok(vec![GameEvent::PlayerJoined { player_uuid }])
    }

    /// Re-attach an existing player to a new transport connection.
    /// Any other player still holding that connection loses it.
    pub fn reconnect(&mut self, player_uuid: &str, connection_id: ConnectionId) -> GameResult<Events> {
        let idx = self.player_index(player_uuid)?;
        for player in &mut self.players {
            if player.connection_id.as_deref() == Some(connection_id.as_str()) {
                player.connection_id = None;
            }
        }
        self.players[idx].connection_id = Some(connection_id);
        Ok(vec![GameEvent::PlayerJoined {
            player_uuid: player_uuid.to_string(),
        }])
    }

    /// Detach a connection; returns the player it belonged to, if any
    pub fn disconnect(&mut self, connection_id: &str) -> Option<PlayerId> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.connection_id.as_deref() == Some(connection_id))?;
        player.connection_id = None;
        Some(player.player_uuid.clone())
    }

    pub fn change_name(&mut self, player_uuid: &str, display_name: &str) -> GameResult<Events> {
        self.require_phase(Phase::Lobby, "change names")?;
        let name = display_name.trim();
        if name.is_empty() {
            return Err(GameError::InvalidAction(
                "display name must not be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(GameError::InvalidAction(format!(
                "display name must be at most {} characters",
                MAX_NAME_CHARS
            )));
        }

        let idx = self.player_index(player_uuid)?;
        self.players[idx].display_name = name.to_string();
        Ok(vec![GameEvent::PlayerRenamed {
            player_uuid: player_uuid.to_string(),
        }])
    }

    /// Make a living player the sheriff, replacing any previous one
    pub fn set_sheriff(&mut self, player_uuid: &str) -> GameResult<Events> {
        let idx = self.living_target(player_uuid)?;
        for player in &mut self.players {
            player.is_sheriff = false;
        }
        self.players[idx].is_sheriff = true;
        self.sheriff_uuid = Some(player_uuid.to_string());
        tracing::info!("Game {}: {} is the sheriff", self.game_id, player_uuid);
        Ok(vec![GameEvent::SheriffAppointed {
            player_uuid: player_uuid.to_string(),
        }])
    }

    /// Kill the love partner of `player_uuid`, if it has one that is still alive.
    /// Returns the partner that died.
    pub(crate) fn kill_love_partner(&mut self, player_uuid: &str) -> GameResult<Option<PlayerId>> {
        let partner_uuid = match self.player(player_uuid)?.love_partner.clone() {
            Some(uuid) => uuid,
            None => return Ok(None),
        };
        let idx = self.player_index(&partner_uuid).map_err(|_| {
            GameError::InvariantViolation(format!(
                "love partner {} of {} does not exist",
                partner_uuid, player_uuid
            ))
        })?;
        if !self.players[idx].is_alive {
            return Ok(None);
        }
        self.players[idx].is_alive = false;
        Ok(Some(partner_uuid))
    }
}

const MAX_NAME_CHARS: usize = 24;

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Build a game in the given phase with one player per role, named p0, p1, ...
    pub fn game_with_roles(roles: &[Role]) -> Game {
        let mut game = Game::new("TEST".to_string());
        for (i, role) in roles.iter().enumerate() {
            let mut player = Player::new(format!("p{}", i), Some(format!("c{}", i)));
            player.display_name = format!("Player {}", i);
            player.role = Some(*role);
            game.players.push(player);
        }
        game.manager_uuid = Some("p0".to_string());
        game.phase = Phase::Distribution;
        game
    }

    pub fn uuid_of(game: &Game, role: Role) -> PlayerId {
        game.players
            .iter()
            .find(|p| p.has_role(role))
            .map(|p| p.player_uuid.clone())
            .expect("role present")
    }

    pub fn is_alive(game: &Game, player_uuid: &str) -> bool {
        game.player(player_uuid).expect("player exists").is_alive
    }
}
