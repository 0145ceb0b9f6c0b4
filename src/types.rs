use crate::roles::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque ID types for readability
pub type GameId = String;
pub type PlayerId = String;
pub type ConnectionId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Lobby,
    RoleSelection,
    Distribution,
    Night,
    Day,
    /// Reserved; no win detection moves a game here yet
    GameOver,
}

/// A player's pending submission for the current night, one case per waking role
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NightAction {
    Werewolf {
        target_uuid: PlayerId,
    },
    Seer {
        reveal_uuid: PlayerId,
        revealed_role: Role,
    },
    Cupid {
        first_uuid: PlayerId,
        second_uuid: PlayerId,
    },
    Witch {
        heal: bool,
        kill_uuid: Option<PlayerId>,
    },
    RedLady {
        sleepover_uuid: PlayerId,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Potion {
    Healing,
    Killing,
}

/// One entry of a role distribution request; order of entries decides block order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleCount {
    pub role: Role,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub player_uuid: PlayerId,
    /// Transport identity, replaced on reconnect and cleared on disconnect
    pub connection_id: Option<ConnectionId>,
    pub display_name: String,
    pub role: Option<Role>,
    pub is_alive: bool,
    pub is_sheriff: bool,
    pub night_action: Option<NightAction>,
    pub love_partner: Option<PlayerId>,
    pub love_partner_confirmed: bool,
    pub used_healing_potion: bool,
    pub used_killing_potion: bool,
    pub vote_target_uuid: Option<PlayerId>,
    pub ready_for_night: bool,
}

impl Player {
    pub fn new(player_uuid: PlayerId, connection_id: Option<ConnectionId>) -> Self {
        Self {
            player_uuid,
            connection_id,
            display_name: String::new(),
            role: None,
            is_alive: true,
            is_sheriff: false,
            night_action: None,
            love_partner: None,
            love_partner_confirmed: false,
            used_healing_potion: false,
            used_killing_potion: false,
            vote_target_uuid: None,
            ready_for_night: false,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub game_id: GameId,
    pub manager_uuid: Option<PlayerId>,
    /// Join order
    pub players: Vec<Player>,
    pub round: u32,
    pub phase: Phase,
    pub active_night_role: Option<Role>,
    pub sheriff_uuid: Option<PlayerId>,
    pub lynch_done: bool,
    pub last_voted_out_uuid: Option<PlayerId>,
    /// Voter -> target of the most recent lynch, kept for the results screen
    pub last_votes: HashMap<PlayerId, PlayerId>,
    pub created_at: String,
}

impl Game {
    pub fn new(game_id: GameId) -> Self {
        Self {
            game_id,
            manager_uuid: None,
            players: Vec::new(),
            round: 0,
            phase: Phase::Lobby,
            active_night_role: None,
            sheriff_uuid: None,
            lynch_done: false,
            last_voted_out_uuid: None,
            last_votes: HashMap::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
