use crate::game::wolf_target;
use crate::roles::Role;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateGame,
    /// Join as a new player, or rejoin with a known `player_uuid`
    JoinGame {
        game_id: GameId,
        player_uuid: Option<PlayerId>,
    },
    ChangeName {
        display_name: String,
    },
    Leave,
    // Manager commands
    CloseJoining,
    StartDistribution {
        roles: Vec<RoleCount>,
    },
    StartGame,
    SetSheriff {
        player_uuid: PlayerId,
    },
    DeleteGame,
    // Night
    WerewolfVote {
        target_uuid: PlayerId,
    },
    Sleepover {
        sleepover_uuid: PlayerId,
    },
    RevealRole {
        reveal_uuid: PlayerId,
    },
    SeerConfirmed,
    BindLovers {
        first_uuid: PlayerId,
        second_uuid: PlayerId,
    },
    ConfirmLoverBond,
    UsePotion {
        heal: bool,
        kill_uuid: Option<PlayerId>,
    },
    WitchConfirms,
    // Day
    Vote {
        target_uuid: PlayerId,
    },
    ReadyForNight,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    GameCreated {
        game_id: GameId,
    },
    JoinedGame {
        game_id: GameId,
        player_uuid: PlayerId,
        is_manager: bool,
        active_night_role: Option<Role>,
    },
    PlayerList {
        players: Vec<PlayerInfo>,
    },
    SyncState {
        snapshot: GameSnapshot,
    },
    RoleAssigned {
        role: Role,
    },
    Phase {
        phase: Phase,
        round: u32,
    },
    NextActiveRole {
        role: Role,
    },
    WerewolfVote {
        voter_uuid: PlayerId,
        target_uuid: PlayerId,
    },
    SeerResult {
        reveal_uuid: PlayerId,
        role: Role,
    },
    LovePartner {
        partner_uuid: PlayerId,
    },
    WitchPotionAccepted {
        heal: bool,
        kill_uuid: Option<PlayerId>,
    },
    SleepoverAccepted {
        sleepover_uuid: PlayerId,
    },
    NightResolved {
        deaths: Vec<PlayerId>,
    },
    VotingResolved {
        voted_out_uuid: Option<PlayerId>,
        votes: HashMap<PlayerId, PlayerId>,
    },
    GameDeleted {
        game_id: GameId,
    },
    Error {
        code: String,
        msg: String,
    },
}

/// Public view of a player. `role` is only filled in for dead players and
/// for the viewer themself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub player_uuid: PlayerId,
    pub display_name: String,
    pub is_alive: bool,
    pub is_sheriff: bool,
    pub has_voted: bool,
    pub ready_for_night: bool,
    pub role: Option<Role>,
}

/// What the witch needs to decide on her potions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WitchData {
    pub victim_uuid: Option<PlayerId>,
    pub used_healing_potion: bool,
    pub used_killing_potion: bool,
}

/// The recipient's private state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnView {
    pub player_uuid: PlayerId,
    pub role: Option<Role>,
    pub is_manager: bool,
    pub love_partner: Option<PlayerId>,
    pub love_partner_confirmed: bool,
    pub night_action: Option<NightAction>,
    pub vote_target_uuid: Option<PlayerId>,
    pub ready_for_night: bool,
    pub witch_data: Option<WitchData>,
}

/// A game as seen by one recipient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub phase: Phase,
    pub round: u32,
    pub active_night_role: Option<Role>,
    pub manager_uuid: Option<PlayerId>,
    pub sheriff_uuid: Option<PlayerId>,
    pub lynch_done: bool,
    pub last_voted_out_uuid: Option<PlayerId>,
    pub last_votes: HashMap<PlayerId, PlayerId>,
    pub players: Vec<PlayerInfo>,
    pub me: Option<OwnView>,
    pub server_now: String,
}

impl PlayerInfo {
    pub fn for_viewer(player: &Player, viewer: Option<&str>) -> Self {
        let visible = !player.is_alive || viewer == Some(player.player_uuid.as_str());
        Self {
            player_uuid: player.player_uuid.clone(),
            display_name: player.display_name.clone(),
            is_alive: player.is_alive,
            is_sheriff: player.is_sheriff,
            has_voted: player.vote_target_uuid.is_some(),
            ready_for_night: player.ready_for_night,
            role: if visible { player.role } else { None },
        }
    }

    /// The list everybody in the room may see
    pub fn public_list(game: &Game) -> Vec<Self> {
        game.players
            .iter()
            .map(|p| Self::for_viewer(p, None))
            .collect()
    }
}

impl GameSnapshot {
    pub fn for_viewer(game: &Game, viewer: Option<&str>) -> Self {
        let me = viewer
            .and_then(|uuid| game.player(uuid).ok())
            .map(|player| OwnView {
                player_uuid: player.player_uuid.clone(),
                role: player.role,
                is_manager: game.manager_uuid.as_deref() == Some(player.player_uuid.as_str()),
                love_partner: player.love_partner.clone(),
                love_partner_confirmed: player.love_partner_confirmed,
                night_action: player.night_action.clone(),
                vote_target_uuid: player.vote_target_uuid.clone(),
                ready_for_night: player.ready_for_night,
                witch_data: witch_data(game, player),
            });

        Self {
            game_id: game.game_id.clone(),
            phase: game.phase,
            round: game.round,
            active_night_role: game.active_night_role,
            manager_uuid: game.manager_uuid.clone(),
            sheriff_uuid: game.sheriff_uuid.clone(),
            lynch_done: game.lynch_done,
            last_voted_out_uuid: game.last_voted_out_uuid.clone(),
            last_votes: game.last_votes.clone(),
            players: game
                .players
                .iter()
                .map(|p| PlayerInfo::for_viewer(p, viewer))
                .collect(),
            me,
            server_now: chrono::Utc::now().to_rfc3339(),
        }
    }
}

fn witch_data(game: &Game, player: &Player) -> Option<WitchData> {
    let witch_awake = game.phase == Phase::Night && game.active_night_role == Some(Role::Witch);
    if !witch_awake || !player.has_role(Role::Witch) || !player.is_alive {
        return None;
    }
    Some(WitchData {
        victim_uuid: wolf_target(game),
        used_healing_potion: player.used_healing_potion,
        used_killing_potion: player.used_killing_potion,
    })
}
