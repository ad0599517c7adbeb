use std::collections::HashMap;

use rusqlite::{params, OptionalExtension, Row, Transaction};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{ApiSkater, League, PlayerRecord, PlayerRow, Team, TeamAggregate};

use super::schema::schema;

/// What a batch write actually changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub teams_created: usize,
    pub players_inserted: usize,
}

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            conn.execute_batch(&schema())?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Scraped rosters

    /// Resolve or create each record's team, then insert the player unless
    /// (name, team) is already present. Safe to call repeatedly with the
    /// same records.
    pub async fn upsert_teams_and_players(
        &self,
        league: League,
        records: Vec<PlayerRecord>,
    ) -> Result<UpsertOutcome> {
        let outcome = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut outcome = UpsertOutcome::default();
                let mut team_ids: HashMap<String, i64> = HashMap::new();
                let insert_sql = format!(
                    "INSERT OR IGNORE INTO {} (name, team_id, position, games, points, penalty_min, goals, assists)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    league.players_table()
                );

                for record in &records {
                    let team_id = match team_ids.get(&record.team) {
                        Some(id) => *id,
                        None => {
                            let (id, created) = resolve_team(&tx, league, &record.team)?;
                            if created {
                                outcome.teams_created += 1;
                            }
                            team_ids.insert(record.team.clone(), id);
                            id
                        }
                    };

                    outcome.players_inserted += tx.execute(
                        &insert_sql,
                        params![
                            record.name,
                            team_id,
                            record.position,
                            record.games,
                            record.points,
                            record.penalty_min,
                            record.goals,
                            record.assists,
                        ],
                    )?;
                }

                tx.commit()?;
                Ok(outcome)
            })
            .await?;
        Ok(outcome)
    }

    // Stats API

    /// Store API skaters in the NHL tables, keeping the API's player id as the
    /// row id so salaries can be joined on it later.
    pub async fn upsert_api_skaters(&self, skaters: Vec<ApiSkater>) -> Result<UpsertOutcome> {
        let outcome = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut outcome = UpsertOutcome::default();
                let insert_sql = format!(
                    "INSERT OR IGNORE INTO {} (player_id, name, team_id, games, points, penalty_min, goals, assists, plus_minus, shooting_pct, avg_icetime)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    League::Nhl.players_table()
                );

                for skater in &skaters {
                    let (team_id, created) =
                        resolve_team(&tx, League::Nhl, &skater.current_team())?;
                    if created {
                        outcome.teams_created += 1;
                    }

                    outcome.players_inserted += tx.execute(
                        &insert_sql,
                        params![
                            skater.player_id,
                            skater.skater_full_name,
                            team_id,
                            skater.games_played,
                            skater.points,
                            skater.penalty_minutes,
                            skater.goals,
                            skater.assists,
                            skater.plus_minus,
                            skater.shooting_pct,
                            skater.time_on_ice_per_game,
                        ],
                    )?;
                }

                tx.commit()?;
                Ok(outcome)
            })
            .await?;
        Ok(outcome)
    }

    /// Set salaries by NHL player id. Returns how many stored players matched.
    pub async fn apply_salaries(&self, salaries: Vec<(i64, i64)>) -> Result<usize> {
        let updated = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let sql = format!(
                    "UPDATE {} SET salary = ?1 WHERE player_id = ?2",
                    League::Nhl.players_table()
                );
                let mut updated = 0;
                for (player_id, cap_hit) in &salaries {
                    updated += tx.execute(&sql, params![cap_hit, player_id])?;
                }
                tx.commit()?;
                Ok(updated)
            })
            .await?;
        Ok(updated)
    }

    // Reads

    pub async fn get_teams(&self, league: League) -> Result<Vec<Team>> {
        let teams = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT team_id, name FROM {} ORDER BY team_id",
                    league.teams_table()
                ))?;
                let teams = stmt
                    .query_map([], |row| {
                        Ok(Team {
                            id: row.get(0)?,
                            name: row.get(1)?,
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(teams)
            })
            .await?;
        Ok(teams)
    }

    pub async fn get_players(&self, league: League) -> Result<Vec<PlayerRow>> {
        let players = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {PLAYER_COLUMNS} FROM {} ORDER BY player_id",
                    league.players_table()
                ))?;
                let players = stmt
                    .query_map([], player_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(players)
            })
            .await?;
        Ok(players)
    }

    /// Players passing `games >= min_gp AND points >= min_pts OR penalty_min >= min_pen`.
    /// Enforcers with enough penalty minutes get in regardless of games played.
    pub async fn filtered_players(
        &self,
        league: League,
        min_gp: i64,
        min_pts: i64,
        min_pen: i64,
    ) -> Result<Vec<PlayerRow>> {
        let players = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {PLAYER_COLUMNS} FROM {}
                     WHERE games >= ?1 AND points >= ?2 OR penalty_min >= ?3
                     ORDER BY player_id",
                    league.players_table()
                ))?;
                let players = stmt
                    .query_map(params![min_gp, min_pts, min_pen], player_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(players)
            })
            .await?;
        Ok(players)
    }

    pub async fn team_aggregates(&self, league: League) -> Result<Vec<TeamAggregate>> {
        let aggregates = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    r#"SELECT t.name,
                              COALESCE(SUM(p.goals), 0),
                              COALESCE(SUM(p.penalty_min), 0),
                              COALESCE(SUM(p.salary), 0)
                       FROM {teams} t
                       JOIN {players} p ON p.team_id = t.team_id
                       GROUP BY t.team_id
                       ORDER BY t.name"#,
                    teams = league.teams_table(),
                    players = league.players_table()
                ))?;
                let aggregates = stmt
                    .query_map([], |row| {
                        Ok(TeamAggregate::new(
                            row.get(0)?,
                            row.get(1)?,
                            row.get(2)?,
                            row.get(3)?,
                        ))
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(aggregates)
            })
            .await?;
        Ok(aggregates)
    }

    pub async fn count_teams(&self, league: League) -> Result<i64> {
        self.count(league.teams_table()).await
    }

    pub async fn count_players(&self, league: League) -> Result<i64> {
        self.count(league.players_table()).await
    }

    async fn count(&self, table: String) -> Result<i64> {
        let count = self
            .conn
            .call(move |conn| {
                let count: i64 =
                    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                        row.get(0)
                    })?;
                Ok(count)
            })
            .await?;
        Ok(count)
    }
}

const PLAYER_COLUMNS: &str =
    "player_id, name, team_id, games, points, penalty_min, goals, assists, salary";

/// Look a team up by name, inserting it with the next id after the current
/// maximum when absent. Existing ids are never renumbered.
fn resolve_team(
    tx: &Transaction<'_>,
    league: League,
    name: &str,
) -> rusqlite::Result<(i64, bool)> {
    let table = league.teams_table();
    let existing: Option<i64> = tx
        .query_row(
            &format!("SELECT team_id FROM {} WHERE name = ?1", table),
            params![name],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok((id, false));
    }

    let next_id: i64 = tx.query_row(
        &format!("SELECT COALESCE(MAX(team_id), 0) + 1 FROM {}", table),
        [],
        |row| row.get(0),
    )?;
    tx.execute(
        &format!("INSERT INTO {} (team_id, name) VALUES (?1, ?2)", table),
        params![next_id, name],
    )?;
    Ok((next_id, true))
}

fn player_from_row(row: &Row) -> rusqlite::Result<PlayerRow> {
    Ok(PlayerRow {
        id: row.get(0)?,
        name: row.get(1)?,
        team_id: row.get(2)?,
        games: row.get(3)?,
        points: row.get(4)?,
        penalty_min: row.get(5)?,
        goals: row.get(6)?,
        assists: row.get(7)?,
        salary: row.get(8)?,
    })
}
