mod fit;

use std::path::Path;

use crate::error::Result;
use crate::models::{PlayerRow, TeamAggregate};

use fit::LinearFit;

/// Players called out by name next to the points/penalty scatter.
pub const OUTLIER_PENALTY_MIN: i64 = 130;
pub const OUTLIER_POINTS: i64 = 105;

/// Write one row per team with a header: team, goals, penalty_min, salary,
/// goals_per_million, penalties_per_million.
pub fn write_team_csv(path: &Path, aggregates: &[TeamAggregate]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for aggregate in aggregates {
        writer.serialize(aggregate)?;
    }
    writer.flush()?;
    Ok(())
}

/// Dump stored players, one row each, with a header.
pub fn write_players_csv(path: &Path, players: &[PlayerRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for player in players {
        writer.serialize(player)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_team_csv(path: &Path) -> Result<Vec<TeamAggregate>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<TeamAggregate>, _>>()?;
    Ok(rows)
}

/// Highest first; ties keep their input order.
pub fn ranked_by(
    aggregates: &[TeamAggregate],
    key: impl Fn(&TeamAggregate) -> f64,
) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = aggregates
        .iter()
        .map(|a| (a.team.clone(), key(a)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

/// Penalties-per-million regressed on goals-per-million across teams.
pub fn penalties_vs_goals_fit(aggregates: &[TeamAggregate]) -> Option<LinearFit> {
    let goals: Vec<f64> = aggregates.iter().map(|a| a.goals_per_million).collect();
    let penalties: Vec<f64> = aggregates.iter().map(|a| a.penalties_per_million).collect();
    LinearFit::fit(&goals, &penalties)
}

/// Points regressed on penalty minutes across players.
pub fn points_vs_penalties_fit(players: &[PlayerRow]) -> Option<LinearFit> {
    let penalties: Vec<f64> = players.iter().map(|p| p.penalty_min as f64).collect();
    let points: Vec<f64> = players.iter().map(|p| p.points as f64).collect();
    LinearFit::fit(&penalties, &points)
}

pub fn outliers(players: &[PlayerRow]) -> Vec<&PlayerRow> {
    players
        .iter()
        .filter(|p| p.penalty_min >= OUTLIER_PENALTY_MIN || p.points >= OUTLIER_POINTS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str, points: i64, penalty_min: i64) -> PlayerRow {
        PlayerRow {
            id: 0,
            name: name.to_string(),
            team_id: 1,
            games: 82,
            points,
            penalty_min,
            goals: 0,
            assists: 0,
            salary: None,
        }
    }

    #[test]
    fn team_csv_keeps_column_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("NHL_teams.csv");
        let aggregates = vec![
            TeamAggregate::new("BOS".to_string(), 260, 650, 80_000_000),
            TeamAggregate::new("TOR".to_string(), 300, 500, 100_000_000),
        ];

        write_team_csv(&path, &aggregates).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("team,goals,penalty_min,salary,goals_per_million,penalties_per_million")
        );
        assert!(lines.next().unwrap().starts_with("BOS,260,650,80000000,3.25,8.125"));

        assert_eq!(read_team_csv(&path).unwrap(), aggregates);
    }

    #[test]
    fn player_csv_leaves_missing_salary_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.csv");
        let mut paid = player("Paid", 50, 10);
        paid.salary = Some(950_000);

        write_players_csv(&path, &[player("Unpaid", 10, 4), paid]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "id,name,team_id,games,points,penalty_min,goals,assists,salary"
        );
        assert_eq!(lines[1], "0,Unpaid,1,82,10,4,0,0,");
        assert_eq!(lines[2], "0,Paid,1,82,50,10,0,0,950000");
    }

    #[test]
    fn ranking_is_descending() {
        let aggregates = vec![
            TeamAggregate::new("BOS".to_string(), 260, 650, 80_000_000),
            TeamAggregate::new("TOR".to_string(), 300, 500, 100_000_000),
            TeamAggregate::new("EDM".to_string(), 290, 600, 80_000_000),
        ];

        let ranked = ranked_by(&aggregates, |a| a.goals_per_million);
        let order: Vec<&str> = ranked.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(order, vec!["EDM", "BOS", "TOR"]);
    }

    #[test]
    fn outliers_use_either_threshold() {
        let players = vec![
            player("Scorer", 132, 30),
            player("Enforcer", 8, 150),
            player("Depth", 20, 20),
        ];
        let names: Vec<&str> = outliers(&players).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Scorer", "Enforcer"]);
        assert!(points_vs_penalties_fit(&players).is_some());
    }
}
