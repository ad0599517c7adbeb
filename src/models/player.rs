use serde::{Deserialize, Serialize};

/// A roster line scraped from a season page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub team: String,
    pub name: String,
    pub position: String,
    pub games: u32,
    pub goals: u32,
    pub assists: u32,
    pub points: u32,
    pub penalty_min: u32,
}

/// A stored player, as read back for reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRow {
    pub id: i64,
    pub name: String,
    pub team_id: i64,
    pub games: i64,
    pub points: i64,
    pub penalty_min: i64,
    pub goals: i64,
    pub assists: i64,
    pub salary: Option<i64>,
}

/// One entry of the stats API `data` array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSkater {
    pub player_id: i64,
    pub skater_full_name: String,
    #[serde(default)]
    pub team_abbrevs: Option<String>,
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub penalty_minutes: u32,
    #[serde(default)]
    pub plus_minus: i32,
    #[serde(default)]
    pub shooting_pct: Option<f64>,
    #[serde(default)]
    pub time_on_ice_per_game: Option<f64>,
}

impl ApiSkater {
    /// Traded players come back as "TOR,BOS"; the last club is the current one.
    pub fn current_team(&self) -> String {
        self.team_abbrevs
            .as_deref()
            .and_then(|t| t.rsplit(',').map(str::trim).find(|s| !s.is_empty()))
            .unwrap_or("UNK")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skater_deserializes_from_api_shape() {
        let skater: ApiSkater = serde_json::from_str(
            r#"{
                "playerId": 8478402,
                "skaterFullName": "Connor McDavid",
                "teamAbbrevs": "EDM",
                "gamesPlayed": 76,
                "goals": 32,
                "assists": 100,
                "points": 132,
                "penaltyMinutes": 30,
                "plusMinus": 35,
                "shootingPct": 0.1584,
                "timeOnIcePerGame": 1287.3
            }"#,
        )
        .unwrap();

        assert_eq!(skater.player_id, 8478402);
        assert_eq!(skater.points, 132);
        assert_eq!(skater.current_team(), "EDM");
    }

    #[test]
    fn traded_player_takes_last_team() {
        let skater: ApiSkater = serde_json::from_str(
            r#"{"playerId": 1, "skaterFullName": "X", "teamAbbrevs": "TOR,BOS", "shootingPct": null}"#,
        )
        .unwrap();
        assert_eq!(skater.current_team(), "BOS");
        assert_eq!(skater.games_played, 0);
    }
}
