use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Each league gets its own pair of team/player tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum League {
    Nhl,
    #[default]
    Ncaa,
}

impl League {
    pub fn table_prefix(self) -> &'static str {
        match self {
            League::Nhl => "",
            League::Ncaa => "NCAA_",
        }
    }

    pub fn teams_table(self) -> String {
        format!("{}Teams", self.table_prefix())
    }

    pub fn players_table(self) -> String {
        format!("{}Players", self.table_prefix())
    }

    pub fn all() -> [League; 2] {
        [League::Nhl, League::Ncaa]
    }
}

impl std::fmt::Display for League {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            League::Nhl => write!(f, "NHL"),
            League::Ncaa => write!(f, "NCAA"),
        }
    }
}
