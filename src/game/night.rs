use super::{wolf_target, Events, GameEvent};
use crate::error::{GameError, GameResult};
use crate::roles::Role;
use crate::types::{Game, NightAction, Phase, Potion};

impl Game {
    /// Index of a living player who may act for `role` right now
    fn night_actor(&self, actor: &str, role: Role) -> GameResult<usize> {
        if self.phase != Phase::Night {
            return Err(GameError::WrongRoleOrPhase(format!(
                "{} can only act at night",
                role
            )));
        }
        let idx = self.player_index(actor)?;
        let player = &self.players[idx];
        if !player.is_alive {
            return Err(GameError::NotAlive(actor.to_string()));
        }
        if !player.has_role(role) || !role.wakes_up() {
            return Err(GameError::WrongRoleOrPhase(format!(
                "player {} is not the {}",
                actor, role
            )));
        }
        if self.active_night_role != Some(role) {
            return Err(GameError::WrongRoleOrPhase(format!(
                "it is not the {}'s turn",
                role
            )));
        }
        Ok(idx)
    }

    pub fn werewolf_vote(&mut self, actor: &str, target_uuid: &str) -> GameResult<Events> {
        let idx = self.night_actor(actor, Role::Werewolf)?;
        self.living_target(target_uuid)?;

        self.players[idx].night_action = Some(NightAction::Werewolf {
            target_uuid: target_uuid.to_string(),
        });
        let mut events = vec![GameEvent::WerewolfVoted {
            voter_uuid: actor.to_string(),
            target_uuid: target_uuid.to_string(),
        }];

        let all_voted = self
            .living_with_role(Role::Werewolf)
            .all(|wolf| matches!(wolf.night_action, Some(NightAction::Werewolf { .. })));
        if all_voted {
            events.extend(self.advance_night()?);
        }
        Ok(events)
    }

    pub fn seer_reveal(&mut self, actor: &str, reveal_uuid: &str) -> GameResult<Events> {
        let idx = self.night_actor(actor, Role::Seer)?;
        if matches!(self.players[idx].night_action, Some(NightAction::Seer { .. })) {
            return Err(GameError::AlreadyActed(
                "the seer already looked at a role tonight".to_string(),
            ));
        }
        if reveal_uuid == actor {
            return Err(GameError::InvalidAction(
                "the seer cannot look at her own role".to_string(),
            ));
        }
        let target = self.living_target(reveal_uuid)?;
        let role = self.players[target].role.ok_or_else(|| {
            GameError::InvariantViolation(format!("player {} has no role at night", reveal_uuid))
        })?;

        self.players[idx].night_action = Some(NightAction::Seer {
            reveal_uuid: reveal_uuid.to_string(),
            revealed_role: role,
        });
        Ok(vec![GameEvent::SeerRevealed {
            seer_uuid: actor.to_string(),
            reveal_uuid: reveal_uuid.to_string(),
            role,
        }])
    }

    pub fn seer_confirm(&mut self, actor: &str) -> GameResult<Events> {
        self.night_actor(actor, Role::Seer)?;
        self.advance_night()
    }

    pub fn bind_lovers(
        &mut self,
        actor: &str,
        first_uuid: &str,
        second_uuid: &str,
    ) -> GameResult<Events> {
        let idx = self.night_actor(actor, Role::Cupid)?;
        if matches!(self.players[idx].night_action, Some(NightAction::Cupid { .. })) {
            return Err(GameError::AlreadyActed(
                "cupid already bound a couple".to_string(),
            ));
        }
        if first_uuid == second_uuid {
            return Err(GameError::InvalidAction(
                "a player cannot fall in love with themself".to_string(),
            ));
        }
        let first = self.living_target(first_uuid)?;
        let second = self.living_target(second_uuid)?;
        if self.players[first].love_partner.is_some() || self.players[second].love_partner.is_some()
        {
            return Err(GameError::InvalidAction(
                "one of the players is already in love".to_string(),
            ));
        }

        self.players[first].love_partner = Some(second_uuid.to_string());
        self.players[second].love_partner = Some(first_uuid.to_string());
        self.players[idx].night_action = Some(NightAction::Cupid {
            first_uuid: first_uuid.to_string(),
            second_uuid: second_uuid.to_string(),
        });
        tracing::debug!(
            "Game {}: {} and {} are in love",
            self.game_id,
            first_uuid,
            second_uuid
        );

        Ok(vec![GameEvent::LoversBound {
            first_uuid: first_uuid.to_string(),
            second_uuid: second_uuid.to_string(),
        }])
    }

    /// A freshly bound lover acknowledges the bond. Any role may do this
    /// while Cupid's turn is running.
    pub fn confirm_bond(&mut self, actor: &str) -> GameResult<Events> {
        if self.phase != Phase::Night || self.active_night_role != Some(Role::Cupid) {
            return Err(GameError::WrongRoleOrPhase(
                "bonds can only be confirmed during cupid's turn".to_string(),
            ));
        }
        let idx = self.player_index(actor)?;
        if !self.players[idx].is_alive {
            return Err(GameError::NotAlive(actor.to_string()));
        }
        let partner_uuid = self.players[idx].love_partner.clone().ok_or_else(|| {
            GameError::WrongRoleOrPhase(format!("player {} is not in love", actor))
        })?;
        if self.players[idx].love_partner_confirmed {
            return Err(GameError::AlreadyActed(
                "bond already confirmed".to_string(),
            ));
        }

        self.players[idx].love_partner_confirmed = true;
        let mut events = vec![GameEvent::BondConfirmed {
            player_uuid: actor.to_string(),
        }];

        if self.player(&partner_uuid)?.love_partner_confirmed {
            events.extend(self.advance_night()?);
        }
        Ok(events)
    }

    /// Submit one or both potions; repeated calls in the same night merge
    pub fn use_potion(
        &mut self,
        actor: &str,
        heal: bool,
        kill_uuid: Option<&str>,
    ) -> GameResult<Events> {
        let idx = self.night_actor(actor, Role::Witch)?;
        if !heal && kill_uuid.is_none() {
            return Err(GameError::InvalidAction(
                "choose at least one potion".to_string(),
            ));
        }

        let witch = &self.players[idx];
        if heal {
            if witch.used_healing_potion {
                return Err(GameError::PotionAlreadyUsed(Potion::Healing));
            }
            if wolf_target(self).is_none() {
                return Err(GameError::InvalidAction(
                    "nobody was attacked tonight".to_string(),
                ));
            }
        }
        if let Some(kill) = kill_uuid {
            if witch.used_killing_potion {
                return Err(GameError::PotionAlreadyUsed(Potion::Killing));
            }
            self.living_target(kill)?;
        }

        let (healed_before, killed_before) = match &self.players[idx].night_action {
            Some(NightAction::Witch { heal, kill_uuid }) => (*heal, kill_uuid.clone()),
            _ => (false, None),
        };
        let witch = &mut self.players[idx];
        witch.night_action = Some(NightAction::Witch {
            heal: heal || healed_before,
            kill_uuid: kill_uuid.map(str::to_string).or(killed_before),
        });
        if heal {
            witch.used_healing_potion = true;
        }
        if kill_uuid.is_some() {
            witch.used_killing_potion = true;
        }

        Ok(vec![GameEvent::PotionUsed {
            witch_uuid: actor.to_string(),
        }])
    }

    pub fn witch_confirm(&mut self, actor: &str) -> GameResult<Events> {
        self.night_actor(actor, Role::Witch)?;
        self.advance_night()
    }

    pub fn sleepover(&mut self, actor: &str, sleepover_uuid: &str) -> GameResult<Events> {
        let idx = self.night_actor(actor, Role::RedLady)?;
        if sleepover_uuid == actor {
            return Err(GameError::InvalidAction(
                "the red lady has to sleep somewhere else".to_string(),
            ));
        }
        self.living_target(sleepover_uuid)?;

        self.players[idx].night_action = Some(NightAction::RedLady {
            sleepover_uuid: sleepover_uuid.to_string(),
        });
        let mut events = vec![GameEvent::SleepoverChosen {
            red_lady_uuid: actor.to_string(),
            sleepover_uuid: sleepover_uuid.to_string(),
        }];
        events.extend(self.advance_night()?);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::test_support::*;

    fn night(roles: &[Role]) -> Game {
        let mut game = game_with_roles(roles);
        game.start_game().unwrap();
        game
    }

    #[test]
    fn test_werewolf_consensus_required() {
        let mut game = night(&[Role::Werewolf, Role::Werewolf, Role::Villager, Role::Seer]);

        game.werewolf_vote("p0", "p2").unwrap();
        assert_eq!(game.active_night_role, Some(Role::Werewolf));

        // Disagreeing votes still end the wolves' turn
        game.werewolf_vote("p1", "p3").unwrap();
        assert_eq!(game.active_night_role, Some(Role::Seer));
    }

    #[test]
    fn test_werewolf_may_change_vote_before_consensus() {
        let mut game = night(&[Role::Werewolf, Role::Werewolf, Role::Villager, Role::Seer]);

        game.werewolf_vote("p0", "p2").unwrap();
        game.werewolf_vote("p0", "p3").unwrap();
        assert_eq!(
            game.players[0].night_action,
            Some(NightAction::Werewolf {
                target_uuid: "p3".to_string()
            })
        );
    }

    #[test]
    fn test_simple_kill_without_heal() {
        let mut game = night(&[Role::Werewolf, Role::Witch]);

        game.werewolf_vote("p0", "p1").unwrap();
        assert_eq!(game.active_night_role, Some(Role::Witch));
        let events = game.witch_confirm("p1").unwrap();

        assert!(!is_alive(&game, "p1"));
        assert!(is_alive(&game, "p0"));
        assert_eq!(game.phase, Phase::Day);
        assert!(events.contains(&GameEvent::NightResolved {
            deaths: vec!["p1".to_string()]
        }));
    }

    #[test]
    fn test_wrong_role_and_wrong_turn() {
        let mut game = night(&[Role::Werewolf, Role::Seer, Role::Villager]);

        let err = game.werewolf_vote("p2", "p1").unwrap_err();
        assert_eq!(err.code(), "WRONG_ROLE_OR_PHASE");

        // Seer exists but the wolves are still awake
        let err = game.seer_reveal("p1", "p0").unwrap_err();
        assert_eq!(err.code(), "WRONG_ROLE_OR_PHASE");

        let err = game.werewolf_vote("nobody", "p1").unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_night_actions_rejected_during_day() {
        let mut game = game_with_roles(&[Role::Werewolf, Role::Villager]);
        game.phase = Phase::Day;

        let err = game.werewolf_vote("p0", "p1").unwrap_err();
        assert_eq!(err.code(), "WRONG_ROLE_OR_PHASE");
    }

    #[test]
    fn test_cannot_target_dead_player() {
        let mut game = night(&[Role::Werewolf, Role::Villager, Role::Villager]);
        game.players[1].is_alive = false;

        let err = game.werewolf_vote("p0", "p1").unwrap_err();
        assert_eq!(err.code(), "INVALID_ACTION");
        assert!(game.players[0].night_action.is_none());
    }

    #[test]
    fn test_seer_reveal_then_confirm() {
        let mut game = night(&[Role::Seer, Role::Werewolf, Role::Villager]);
        game.werewolf_vote("p1", "p2").unwrap();
        assert_eq!(game.active_night_role, Some(Role::Seer));

        let events = game.seer_reveal("p0", "p1").unwrap();
        assert_eq!(
            events,
            vec![GameEvent::SeerRevealed {
                seer_uuid: "p0".to_string(),
                reveal_uuid: "p1".to_string(),
                role: Role::Werewolf,
            }]
        );
        assert_eq!(game.active_night_role, Some(Role::Seer));

        let err = game.seer_reveal("p0", "p2").unwrap_err();
        assert_eq!(err.code(), "ALREADY_ACTED");

        game.seer_confirm("p0").unwrap();
        assert_eq!(game.phase, Phase::Day);
    }

    #[test]
    fn test_seer_cannot_reveal_herself() {
        let mut game = night(&[Role::Seer, Role::Villager]);

        let err = game.seer_reveal("p0", "p0").unwrap_err();
        assert_eq!(err.code(), "INVALID_ACTION");
    }

    #[test]
    fn test_cupid_binding_and_confirmation() {
        let mut game = night(&[Role::Cupid, Role::Werewolf, Role::Villager, Role::Villager]);
        assert_eq!(game.active_night_role, Some(Role::Cupid));

        game.bind_lovers("p0", "p2", "p3").unwrap();
        assert_eq!(game.players[2].love_partner.as_deref(), Some("p3"));
        assert_eq!(game.players[3].love_partner.as_deref(), Some("p2"));

        let err = game.bind_lovers("p0", "p1", "p0").unwrap_err();
        assert_eq!(err.code(), "ALREADY_ACTED");

        // Cupid is not in love and cannot confirm
        let err = game.confirm_bond("p0").unwrap_err();
        assert_eq!(err.code(), "WRONG_ROLE_OR_PHASE");

        game.confirm_bond("p2").unwrap();
        assert_eq!(game.active_night_role, Some(Role::Cupid));
        let err = game.confirm_bond("p2").unwrap_err();
        assert_eq!(err.code(), "ALREADY_ACTED");

        game.confirm_bond("p3").unwrap();
        assert_eq!(game.active_night_role, Some(Role::Werewolf));
    }

    #[test]
    fn test_cupid_needs_two_distinct_players() {
        let mut game = night(&[Role::Cupid, Role::Villager]);

        let err = game.bind_lovers("p0", "p1", "p1").unwrap_err();
        assert_eq!(err.code(), "INVALID_ACTION");
        assert!(game.players[1].love_partner.is_none());
    }

    #[test]
    fn test_witch_potions_merge_and_are_single_use() {
        let mut game = night(&[Role::Werewolf, Role::Witch, Role::Villager, Role::Villager]);
        game.werewolf_vote("p0", "p2").unwrap();

        game.use_potion("p1", true, None).unwrap();
        game.use_potion("p1", false, Some("p3")).unwrap();
        assert_eq!(
            game.players[1].night_action,
            Some(NightAction::Witch {
                heal: true,
                kill_uuid: Some("p3".to_string())
            })
        );

        assert_eq!(
            game.use_potion("p1", true, None).unwrap_err(),
            GameError::PotionAlreadyUsed(Potion::Healing)
        );
        assert_eq!(
            game.use_potion("p1", false, Some("p0")).unwrap_err(),
            GameError::PotionAlreadyUsed(Potion::Killing)
        );

        game.witch_confirm("p1").unwrap();
        assert!(is_alive(&game, "p2"));
        assert!(!is_alive(&game, "p3"));
        assert!(game.players[1].used_healing_potion);
        assert!(game.players[1].used_killing_potion);
    }

    #[test]
    fn test_witch_empty_potion_call_and_heal_without_victim() {
        let mut game = night(&[Role::Werewolf, Role::Werewolf, Role::Witch, Role::Villager]);
        game.werewolf_vote("p0", "p3").unwrap();
        game.werewolf_vote("p1", "p2").unwrap();

        let err = game.use_potion("p2", false, None).unwrap_err();
        assert_eq!(err.code(), "INVALID_ACTION");

        // Tied wolves mean there is nobody to heal
        let err = game.use_potion("p2", true, None).unwrap_err();
        assert_eq!(err.code(), "INVALID_ACTION");
        assert!(!game.players[2].used_healing_potion);
    }

    #[test]
    fn test_red_lady_sleepover_advances_immediately() {
        let mut game = night(&[Role::RedLady, Role::Werewolf, Role::Villager]);

        let err = game.sleepover("p0", "p0").unwrap_err();
        assert_eq!(err.code(), "INVALID_ACTION");

        game.sleepover("p0", "p2").unwrap();
        assert_eq!(game.active_night_role, Some(Role::Werewolf));
    }

    #[test]
    fn test_night_actions_do_not_leak_into_next_night() {
        let mut game = night(&[Role::Seer, Role::Werewolf, Role::Villager, Role::Villager]);
        game.werewolf_vote("p1", "p2").unwrap();
        game.seer_reveal("p0", "p1").unwrap();
        game.seer_confirm("p0").unwrap();

        assert!(game.players.iter().all(|p| p.night_action.is_none()));
    }

    #[test]
    fn test_dead_player_cannot_act() {
        let mut game = night(&[Role::Werewolf, Role::Werewolf, Role::Villager]);
        game.players[1].is_alive = false;

        assert_eq!(
            game.werewolf_vote("p1", "p2").unwrap_err(),
            GameError::NotAlive("p1".to_string())
        );
    }
}
