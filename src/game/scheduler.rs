use super::{resolve_night, Events, GameEvent};
use crate::error::{GameError, GameResult};
use crate::roles::Role;
use crate::types::{Game, Phase};
use std::collections::HashSet;

/// Roles that act during the night of `round`, in waking order.
///
/// Only roles held by living players count, non-waking roles are skipped and
/// first-night-only roles are dropped after round 0.
pub fn wake_order(game: &Game, round: u32) -> Vec<Role> {
    let present: HashSet<Role> = game.living().filter_map(|p| p.role).collect();

    let mut order: Vec<Role> = Role::ALL
        .into_iter()
        .filter(|role| present.contains(role))
        .filter(|role| role.def().wakes_up)
        .filter(|role| round == 0 || !role.def().only_first_night)
        .collect();
    order.sort_by_key(|role| role.def().night_order);
    order
}

impl Game {
    /// Enter the night of `round` with its first waking role.
    /// Nothing is mutated when no role would wake.
    pub(crate) fn begin_night(&mut self, round: u32) -> GameResult<Events> {
        let first = wake_order(self, round).into_iter().next().ok_or_else(|| {
            GameError::InvariantViolation(format!(
                "no role wakes up in night {} of game {}",
                round, self.game_id
            ))
        })?;

        self.round = round;
        self.phase = Phase::Night;
        self.active_night_role = Some(first);
        tracing::info!(
            "Game {} enters night {}, {:?} wakes first",
            self.game_id,
            round,
            first
        );

        Ok(vec![
            GameEvent::PhaseChanged {
                phase: Phase::Night,
            },
            GameEvent::NextNightRole { role: first },
        ])
    }

    /// Hand the turn to the role after the active one, or end the night
    pub(crate) fn advance_night(&mut self) -> GameResult<Events> {
        let current = self.active_night_role.ok_or_else(|| {
            GameError::InvariantViolation(format!(
                "game {} has no active night role to advance from",
                self.game_id
            ))
        })?;
        let current_order = current.def().night_order;

        let next = wake_order(self, self.round)
            .into_iter()
            .find(|role| role.def().night_order > current_order);

        match next {
            Some(role) => {
                tracing::debug!("Game {}: {:?} done, {:?} wakes", self.game_id, current, role);
                self.active_night_role = Some(role);
                Ok(vec![GameEvent::NextNightRole { role }])
            }
            None => self.end_night(),
        }
    }

    /// Resolve the night's actions, then flip to day with fresh per-day state
    fn end_night(&mut self) -> GameResult<Events> {
        let outcome = resolve_night(self);

        for victim in &outcome.deaths {
            let idx = self.player_index(victim).map_err(|_| {
                GameError::InvariantViolation(format!("night victim {} does not exist", victim))
            })?;
            self.players[idx].is_alive = false;
        }

        for player in &mut self.players {
            player.night_action = None;
            player.love_partner_confirmed = false;
            player.vote_target_uuid = None;
            player.ready_for_night = false;
        }
        self.active_night_role = None;
        self.phase = Phase::Day;
        self.lynch_done = false;
        self.last_voted_out_uuid = None;
        self.last_votes.clear();

        tracing::info!(
            "Game {}: night {} resolved, deaths: {:?}",
            self.game_id,
            self.round,
            outcome.deaths
        );

        Ok(vec![
            GameEvent::NightResolved {
                deaths: outcome.deaths,
            },
            GameEvent::PhaseChanged { phase: Phase::Day },
        ])
    }
}
