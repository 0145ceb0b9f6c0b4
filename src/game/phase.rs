use super::{wake_order, Events, GameEvent};
use crate::error::{GameError, GameResult};
use crate::roles::Role;
use crate::types::{Game, Phase, RoleCount};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

impl Game {
    pub fn close_joining(&mut self) -> GameResult<Events> {
        self.require_phase(Phase::Lobby, "close joining")?;
        self.phase = Phase::RoleSelection;
        tracing::info!(
            "Game {} closed joining with {} players",
            self.game_id,
            self.players.len()
        );
        Ok(vec![GameEvent::PhaseChanged {
            phase: Phase::RoleSelection,
        }])
    }

    /// Deal roles to players.
    ///
    /// Player indices are shuffled once, then each entry of `counts` takes the
    /// next contiguous block of the permutation in input order. Every player
    /// ends up with exactly one role and the requested counts are met exactly.
    pub fn start_distribution<R: Rng + ?Sized>(
        &mut self,
        counts: &[RoleCount],
        rng: &mut R,
    ) -> GameResult<Events> {
        self.require_phase(Phase::RoleSelection, "distribute roles")?;

        // Summed as u64 so that wire counts near u32::MAX cannot wrap
        let requested: u64 = counts.iter().map(|c| u64::from(c.count)).sum();
        if requested != self.players.len() as u64 {
            return Err(GameError::RoleCountMismatch {
                requested,
                players: self.players.len(),
            });
        }

        let mut per_role: BTreeMap<Role, u64> = BTreeMap::new();
        for entry in counts {
            *per_role.entry(entry.role).or_insert(0) += u64::from(entry.count);
        }
        for (role, total) in per_role {
            if let Some(max) = role.def().max_amount {
                if total > u64::from(max) {
                    return Err(GameError::RoleLimitExceeded {
                        role,
                        max,
                        requested: total,
                    });
                }
            }
        }

        let mut order: Vec<usize> = (0..self.players.len()).collect();
        order.shuffle(rng);

        let mut slots = order.into_iter();
        for entry in counts {
            for idx in slots.by_ref().take(entry.count as usize) {
                self.players[idx].role = Some(entry.role);
            }
        }

        self.phase = Phase::Distribution;
        tracing::info!("Game {} distributed roles: {:?}", self.game_id, counts);

        Ok(vec![
            GameEvent::RolesAssigned,
            GameEvent::PhaseChanged {
                phase: Phase::Distribution,
            },
        ])
    }

    pub fn start_game(&mut self) -> GameResult<Events> {
        self.require_phase(Phase::Distribution, "start the game")?;
        self.begin_night(0)
    }

    /// Mark a living player ready to sleep. Once every living player is
    /// ready, the next night begins.
    pub fn ready_for_night(&mut self, player_uuid: &str) -> GameResult<Events> {
        self.require_phase(Phase::Day, "get ready for the night")?;
        if !self.lynch_done {
            return Err(GameError::IllegalPhase {
                action: "get ready for the night before the lynch",
                phase: self.phase,
            });
        }

        let idx = self.player_index(player_uuid)?;
        if !self.players[idx].is_alive {
            return Err(GameError::NotAlive(player_uuid.to_string()));
        }
        if self.players[idx].ready_for_night {
            return Ok(Vec::new());
        }

        let everyone_ready = self
            .living()
            .all(|p| p.ready_for_night || p.player_uuid == player_uuid);
        let next_round = self.round + 1;
        if everyone_ready && wake_order(self, next_round).is_empty() {
            let err = GameError::InvariantViolation(format!(
                "no role wakes up in night {} of game {}",
                next_round, self.game_id
            ));
            tracing::error!("{}", err);
            return Err(err);
        }

        self.players[idx].ready_for_night = true;
        let mut events = vec![GameEvent::PlayerReady {
            player_uuid: player_uuid.to_string(),
        }];
        if !everyone_ready {
            return Ok(events);
        }

        for player in &mut self.players {
            player.ready_for_night = false;
        }
        events.extend(self.begin_night(next_round)?);
        Ok(events)
    }
}
