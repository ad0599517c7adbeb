use crate::models::League;

/// DDL for one league's team/player table pair.
///
/// Player rows are unique on (name, team_id): two skaters sharing a name on
/// different clubs are both kept, the same skater seen twice for one club is
/// not.
pub fn league_schema(league: League) -> String {
    let teams = league.teams_table();
    let players = league.players_table();
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {teams} (
    team_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS {players} (
    player_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    team_id INTEGER NOT NULL REFERENCES {teams}(team_id),
    position TEXT,
    games INTEGER NOT NULL DEFAULT 0,
    points INTEGER NOT NULL DEFAULT 0,
    penalty_min INTEGER NOT NULL DEFAULT 0,
    goals INTEGER NOT NULL DEFAULT 0,
    assists INTEGER NOT NULL DEFAULT 0,
    plus_minus INTEGER,
    shooting_pct REAL,
    avg_icetime REAL,
    salary INTEGER,
    UNIQUE(name, team_id)
);

CREATE INDEX IF NOT EXISTS idx_{players}_team_id ON {players}(team_id);
"#
    )
}

pub fn schema() -> String {
    League::all().into_iter().map(league_schema).collect()
}
