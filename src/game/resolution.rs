use crate::roles::Role;
use crate::types::{Game, NightAction, PlayerId};
use std::collections::BTreeMap;

/// Who dies when the night ends, and whom the wolves picked
#[derive(Debug, Clone, PartialEq)]
pub struct NightOutcome {
    pub wolf_target: Option<PlayerId>,
    pub deaths: Vec<PlayerId>,
}

/// All candidates tied at the highest vote count, in a stable order
pub fn top_voted<'a>(votes: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut tally: BTreeMap<&str, u32> = BTreeMap::new();
    for vote in votes {
        *tally.entry(vote).or_insert(0) += 1;
    }

    let max = match tally.values().max() {
        Some(max) => *max,
        None => return Vec::new(),
    };
    tally
        .into_iter()
        .filter(|(_, count)| *count == max)
        .map(|(candidate, _)| candidate)
        .collect()
}

/// Plurality target of the living werewolves; a tie means no target
pub fn wolf_target(game: &Game) -> Option<PlayerId> {
    let votes = game
        .living_with_role(Role::Werewolf)
        .filter_map(|wolf| match &wolf.night_action {
            Some(NightAction::Werewolf { target_uuid }) if !target_uuid.is_empty() => {
                Some(target_uuid.as_str())
            }
            _ => None,
        });

    match top_voted(votes).as_slice() {
        [single] => Some(single.to_string()),
        _ => None,
    }
}

/// Compute the night's deaths from the accumulated night actions.
///
/// Order of rules: wolf kill unless healed, independent witch kill, Red Lady
/// immunity and collateral, then a single level of couple propagation.
/// A Red Lady who visits her own love partner dies with a killed partner
/// through the collateral rule; couple propagation would add her anyway.
pub fn resolve_night(game: &Game) -> NightOutcome {
    let wolf_target = wolf_target(game);

    let (heal, witch_kill) = game
        .players
        .iter()
        .find_map(|p| match &p.night_action {
            Some(NightAction::Witch { heal, kill_uuid }) => Some((*heal, kill_uuid.clone())),
            _ => None,
        })
        .unwrap_or((false, None));

    let mut deaths: Vec<PlayerId> = Vec::new();
    if let Some(target) = &wolf_target {
        if !heal {
            deaths.push(target.clone());
        }
    }
    if let Some(kill) = witch_kill {
        if !deaths.contains(&kill) {
            deaths.push(kill);
        }
    }

    if let Some(red_lady) = game.living_with_role(Role::RedLady).next() {
        deaths.retain(|victim| *victim != red_lady.player_uuid);

        let host = match &red_lady.night_action {
            Some(NightAction::RedLady { sleepover_uuid }) => Some(sleepover_uuid),
            _ => None,
        };
        if let Some(host) = host {
            if deaths.contains(host) {
                deaths.push(red_lady.player_uuid.clone());
            }
        }
    }

    let partners: Vec<PlayerId> = deaths
        .iter()
        .filter_map(|victim| game.player(victim).ok())
        .filter_map(|victim| victim.love_partner.clone())
        .collect();
    for partner in partners {
        if !deaths.contains(&partner) {
            deaths.push(partner);
        }
    }

    // Already-dead players stay dead but are not reported again
    deaths.retain(|victim| game.player(victim).map(|p| p.is_alive).unwrap_or(false));

    NightOutcome {
        wolf_target,
        deaths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::test_support::*;

    fn act(game: &mut Game, player_uuid: &str, action: NightAction) {
        let idx = game.player_index(player_uuid).unwrap();
        game.players[idx].night_action = Some(action);
    }

    fn wolf_vote(game: &mut Game, wolf: &str, target: &str) {
        act(
            game,
            wolf,
            NightAction::Werewolf {
                target_uuid: target.to_string(),
            },
        );
    }

    fn bind(game: &mut Game, a: &str, b: &str) {
        let ia = game.player_index(a).unwrap();
        let ib = game.player_index(b).unwrap();
        game.players[ia].love_partner = Some(b.to_string());
        game.players[ib].love_partner = Some(a.to_string());
    }

    #[test]
    fn test_top_voted() {
        assert_eq!(top_voted(["a", "b", "a"]), vec!["a"]);
        assert_eq!(top_voted(["a", "b"]), vec!["a", "b"]);
        assert!(top_voted(Vec::<&str>::new()).is_empty());
    }

    #[test]
    fn test_wolf_tie_means_no_target() {
        let mut game = game_with_roles(&[Role::Werewolf, Role::Werewolf, Role::Villager, Role::Seer]);
        wolf_vote(&mut game, "p0", "p2");
        wolf_vote(&mut game, "p1", "p3");

        let outcome = resolve_night(&game);
        assert_eq!(outcome.wolf_target, None);
        assert!(outcome.deaths.is_empty());
    }

    #[test]
    fn test_dead_wolf_votes_are_ignored() {
        let mut game = game_with_roles(&[Role::Werewolf, Role::Werewolf, Role::Villager, Role::Seer]);
        wolf_vote(&mut game, "p0", "p2");
        wolf_vote(&mut game, "p1", "p3");
        game.players[1].is_alive = false;

        assert_eq!(wolf_target(&game).as_deref(), Some("p2"));
    }

    #[test]
    fn test_heal_cancels_wolf_kill_but_not_witch_kill() {
        let mut game = game_with_roles(&[Role::Werewolf, Role::Witch, Role::Villager, Role::Seer]);
        wolf_vote(&mut game, "p0", "p2");
        act(
            &mut game,
            "p1",
            NightAction::Witch {
                heal: true,
                kill_uuid: Some("p3".to_string()),
            },
        );

        let outcome = resolve_night(&game);
        assert_eq!(outcome.wolf_target.as_deref(), Some("p2"));
        assert_eq!(outcome.deaths, vec!["p3".to_string()]);
    }

    #[test]
    fn test_witch_kill_on_wolf_target_is_deduplicated() {
        let mut game = game_with_roles(&[Role::Werewolf, Role::Witch, Role::Villager]);
        wolf_vote(&mut game, "p0", "p2");
        act(
            &mut game,
            "p1",
            NightAction::Witch {
                heal: false,
                kill_uuid: Some("p2".to_string()),
            },
        );

        assert_eq!(resolve_night(&game).deaths, vec!["p2".to_string()]);
    }

    #[test]
    fn test_red_lady_survives_direct_attack() {
        let mut game = game_with_roles(&[Role::RedLady, Role::Werewolf, Role::Villager]);
        act(
            &mut game,
            "p0",
            NightAction::RedLady {
                sleepover_uuid: "p2".to_string(),
            },
        );
        wolf_vote(&mut game, "p1", "p0");

        assert!(resolve_night(&game).deaths.is_empty());
    }

    #[test]
    fn test_red_lady_dies_with_her_host() {
        let mut game = game_with_roles(&[Role::RedLady, Role::Werewolf, Role::Villager]);
        act(
            &mut game,
            "p0",
            NightAction::RedLady {
                sleepover_uuid: "p2".to_string(),
            },
        );
        wolf_vote(&mut game, "p1", "p2");

        assert_eq!(
            resolve_night(&game).deaths,
            vec!["p2".to_string(), "p0".to_string()]
        );
    }

    #[test]
    fn test_red_lady_at_wolf_den_with_witch_kill() {
        let mut game = game_with_roles(&[
            Role::RedLady,
            Role::Witch,
            Role::Werewolf,
            Role::Seer,
            Role::Villager,
        ]);
        act(
            &mut game,
            "p0",
            NightAction::RedLady {
                sleepover_uuid: "p2".to_string(),
            },
        );
        wolf_vote(&mut game, "p2", "p0");
        act(
            &mut game,
            "p1",
            NightAction::Witch {
                heal: false,
                kill_uuid: Some("p3".to_string()),
            },
        );

        let outcome = resolve_night(&game);
        assert_eq!(outcome.wolf_target.as_deref(), Some("p0"));
        assert_eq!(outcome.deaths, vec!["p3".to_string()]);
    }

    #[test]
    fn test_already_dead_players_are_not_reported() {
        let mut game = game_with_roles(&[Role::Werewolf, Role::Witch, Role::Villager]);
        game.players[2].is_alive = false;
        act(
            &mut game,
            "p1",
            NightAction::Witch {
                heal: false,
                kill_uuid: Some("p2".to_string()),
            },
        );

        assert!(resolve_night(&game).deaths.is_empty());
    }

    #[test]
    fn test_couple_dies_together_single_level() {
        let mut game = game_with_roles(&[Role::Werewolf, Role::Villager, Role::Villager, Role::Seer]);
        bind(&mut game, "p1", "p2");
        wolf_vote(&mut game, "p0", "p1");

        let outcome = resolve_night(&game);
        assert_eq!(outcome.deaths, vec!["p1".to_string(), "p2".to_string()]);
        assert!(!outcome.deaths.contains(&"p3".to_string()));
    }

    #[test]
    fn test_red_lady_visiting_attacked_partner_dies_once() {
        let mut game = game_with_roles(&[Role::RedLady, Role::Werewolf, Role::Villager]);
        bind(&mut game, "p0", "p2");
        act(
            &mut game,
            "p0",
            NightAction::RedLady {
                sleepover_uuid: "p2".to_string(),
            },
        );
        wolf_vote(&mut game, "p1", "p2");

        assert_eq!(
            resolve_night(&game).deaths,
            vec!["p2".to_string(), "p0".to_string()]
        );
    }

    #[test]
    fn test_red_lady_attacked_while_visiting_partner_nobody_dies() {
        let mut game = game_with_roles(&[Role::RedLady, Role::Werewolf, Role::Villager]);
        bind(&mut game, "p0", "p2");
        act(
            &mut game,
            "p0",
            NightAction::RedLady {
                sleepover_uuid: "p2".to_string(),
            },
        );
        wolf_vote(&mut game, "p1", "p0");

        assert!(resolve_night(&game).deaths.is_empty());
    }

    #[test]
    fn test_red_lady_dies_of_grief_despite_immunity() {
        let mut game = game_with_roles(&[Role::RedLady, Role::Werewolf, Role::Villager, Role::Seer]);
        bind(&mut game, "p0", "p2");
        act(
            &mut game,
            "p0",
            NightAction::RedLady {
                sleepover_uuid: "p3".to_string(),
            },
        );
        wolf_vote(&mut game, "p1", "p2");

        assert_eq!(
            resolve_night(&game).deaths,
            vec!["p2".to_string(), "p0".to_string()]
        );
    }

    #[test]
    fn test_collateral_red_lady_takes_her_partner() {
        let mut game = game_with_roles(&[
            Role::RedLady,
            Role::Werewolf,
            Role::Villager,
            Role::Seer,
        ]);
        bind(&mut game, "p0", "p3");
        act(
            &mut game,
            "p0",
            NightAction::RedLady {
                sleepover_uuid: "p2".to_string(),
            },
        );
        wolf_vote(&mut game, "p1", "p2");

        assert_eq!(
            resolve_night(&game).deaths,
            vec!["p2".to_string(), "p0".to_string(), "p3".to_string()]
        );
    }
}
