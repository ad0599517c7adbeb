mod league;
mod player;
mod team;

pub use league::League;
pub use player::{ApiSkater, PlayerRecord, PlayerRow};
pub use team::{team_name_from_url, Team, TeamAggregate};
