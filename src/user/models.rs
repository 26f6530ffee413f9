use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Combat role a governor plays in rallies and battles
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
pub enum Role {
    #[default]
    Rally,
    Garrison,
    Field,
}

/// Ark of Osiris team assignment
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
pub enum AooTeam {
    #[default]
    None,
    #[serde(rename = "Team 1")]
    #[strum(serialize = "Team 1")]
    Team1,
    #[serde(rename = "Team 2")]
    #[strum(serialize = "Team 2")]
    Team2,
}

/// A registered guild member, identified by their in-game governor id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub governor_id: String,
    pub role: Role,
    pub aoo_team: AooTeam,
}

impl User {
    pub fn new(governor_id: impl Into<String>, role: Role, aoo_team: AooTeam) -> Self {
        Self {
            governor_id: governor_id.into(),
            role,
            aoo_team,
        }
    }
}
