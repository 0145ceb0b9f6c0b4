//! Static role catalog
//!
//! Pure lookup table describing every role: whether it wakes at night, in
//! which order, whether only on the first night, how many may be dealt and
//! which team it plays for.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Villager,
    Werewolf,
    Seer,
    Cupid,
    Witch,
    RedLady,
    LittleGirl,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Team {
    Village,
    Wolf,
}

#[derive(Debug)]
pub struct RoleDef {
    pub role: Role,
    pub display_name: &'static str,
    pub plural_name: &'static str,
    pub description: &'static str,
    pub wakes_up: bool,
    /// Lower wakes first; -1 for roles that never wake
    pub night_order: i32,
    pub only_first_night: bool,
    pub max_amount: Option<u32>,
    pub team: Team,
}

static CUPID: RoleDef = RoleDef {
    role: Role::Cupid,
    display_name: "Cupid",
    plural_name: "Cupids",
    description: "On the first night, you can choose two players to fall in love. If one lover dies, the other dies as well.",
    wakes_up: true,
    night_order: 1,
    only_first_night: true,
    max_amount: Some(1),
    team: Team::Village,
};

static RED_LADY: RoleDef = RoleDef {
    role: Role::RedLady,
    display_name: "Red Lady",
    plural_name: "Red Ladies",
    description: "Each night, choose one player to visit. If you are attacked while visiting, you survive. But if your host is attacked that night, you die too.",
    wakes_up: true,
    night_order: 2,
    only_first_night: false,
    max_amount: Some(1),
    team: Team::Village,
};

static WEREWOLF: RoleDef = RoleDef {
    role: Role::Werewolf,
    display_name: "Werewolf",
    plural_name: "Werewolves",
    description: "Each night, you wake up to collectively choose one player to eliminate from the game.",
    wakes_up: true,
    night_order: 3,
    only_first_night: false,
    max_amount: None,
    team: Team::Wolf,
};

static SEER: RoleDef = RoleDef {
    role: Role::Seer,
    display_name: "Seer",
    plural_name: "Seers",
    description: "Each night, you can look at the card of one other player to learn their true identity.",
    wakes_up: true,
    night_order: 4,
    only_first_night: false,
    max_amount: Some(1),
    team: Team::Village,
};

static WITCH: RoleDef = RoleDef {
    role: Role::Witch,
    display_name: "Witch",
    plural_name: "Witches",
    description: "You have two potions: one healing, one killing. You are shown the victim of the Werewolves and can heal them, kill someone else, or do nothing.",
    wakes_up: true,
    night_order: 5,
    only_first_night: false,
    max_amount: Some(1),
    team: Team::Village,
};

static VILLAGER: RoleDef = RoleDef {
    role: Role::Villager,
    display_name: "Villager",
    plural_name: "Villagers",
    description: "You have no special ability. Nonetheless you can help to lynch the Werewolves during the day.",
    wakes_up: false,
    night_order: -1,
    only_first_night: false,
    max_amount: None,
    team: Team::Village,
};

static LITTLE_GIRL: RoleDef = RoleDef {
    role: Role::LittleGirl,
    display_name: "Little Girl",
    plural_name: "Little Girls",
    description: "You have the power to peek while the Werewolves are choosing their victim.",
    wakes_up: false,
    night_order: -1,
    only_first_night: false,
    max_amount: Some(1),
    team: Team::Village,
};

/// Every role in night order, non-waking roles last
pub static ROLES: [&RoleDef; 7] = [
    &CUPID,
    &RED_LADY,
    &WEREWOLF,
    &SEER,
    &WITCH,
    &VILLAGER,
    &LITTLE_GIRL,
];

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Villager,
        Role::Werewolf,
        Role::Seer,
        Role::Cupid,
        Role::Witch,
        Role::RedLady,
        Role::LittleGirl,
    ];

    pub fn def(self) -> &'static RoleDef {
        match self {
            Role::Villager => &VILLAGER,
            Role::Werewolf => &WEREWOLF,
            Role::Seer => &SEER,
            Role::Cupid => &CUPID,
            Role::Witch => &WITCH,
            Role::RedLady => &RED_LADY,
            Role::LittleGirl => &LITTLE_GIRL,
        }
    }

    pub fn wakes_up(self) -> bool {
        self.def().wakes_up
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.def().display_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_role_has_a_catalog_entry() {
        for role in Role::ALL {
            assert_eq!(role.def().role, role);
            assert!(ROLES.iter().any(|def| std::ptr::eq(*def, role.def())));
        }
        assert_eq!(ROLES.len(), Role::ALL.len());
    }

    #[test]
    fn test_waking_roles_have_distinct_night_order() {
        let mut orders: Vec<i32> = ROLES
            .iter()
            .filter(|def| def.wakes_up)
            .map(|def| def.night_order)
            .collect();
        let count = orders.len();
        orders.sort();
        orders.dedup();
        assert_eq!(orders.len(), count);
        assert!(orders.iter().all(|order| *order > 0));
    }

    #[test]
    fn test_only_cupid_is_first_night_only() {
        let first_night: Vec<Role> = ROLES
            .iter()
            .filter(|def| def.only_first_night)
            .map(|def| def.role)
            .collect();
        assert_eq!(first_night, vec![Role::Cupid]);
    }

    #[test]
    fn test_role_serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::RedLady).unwrap(),
            "\"RED_LADY\""
        );
        assert_eq!(Role::LittleGirl.to_string(), "Little Girl");
    }
}
