use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};

use crate::models::PlayerRecord;

use super::fetcher::{Page, PageSource};

/// Rows with fewer cells than this are footers or spacer rows.
pub const MIN_COLUMNS: usize = 8;

/// How roster columns are located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnMode {
    /// Fixed positions: number, name, position, GP, G, A, PTS, PIM.
    #[default]
    Positional,
    /// Read the header row once and look columns up by label, falling back to
    /// the fixed position for any label that isn't there.
    Header,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    name: usize,
    position: usize,
    games: usize,
    goals: usize,
    assists: usize,
    points: usize,
    penalty_min: usize,
}

const POSITIONAL: Columns = Columns {
    name: 1,
    position: 2,
    games: 3,
    goals: 4,
    assists: 5,
    points: 6,
    penalty_min: 7,
};

impl Columns {
    fn from_header(labels: &[String]) -> Self {
        let find = |names: &[&str], fallback: usize| {
            labels
                .iter()
                .position(|l| names.iter().any(|n| l.eq_ignore_ascii_case(n)))
                .unwrap_or(fallback)
        };

        Self {
            name: find(&["player", "name", "player name"], POSITIONAL.name),
            position: find(&["pos", "position"], POSITIONAL.position),
            games: find(&["gp", "games"], POSITIONAL.games),
            goals: find(&["g", "goals"], POSITIONAL.goals),
            assists: find(&["a", "assists"], POSITIONAL.assists),
            points: find(&["pts", "p", "points"], POSITIONAL.points),
            penalty_min: find(&["pim", "penalty minutes"], POSITIONAL.penalty_min),
        }
    }
}

pub async fn extract_roster<S: PageSource>(
    source: &S,
    season_url: &str,
    team_name: &str,
    mode: ColumnMode,
) -> Vec<PlayerRecord> {
    let Some(page) = source.fetch(season_url).await else {
        return Vec::new();
    };

    let players = parse_roster(&page, team_name, mode);
    tracing::debug!("Parsed {} players for {} from {}", players.len(), team_name, season_url);
    players
}

/// Parse the first table on the page. The first row is the header; any other
/// row that is short or has a non-numeric stat is skipped on its own.
pub fn parse_roster(page: &Page, team_name: &str, mode: ColumnMode) -> Vec<PlayerRecord> {
    let (Ok(table_sel), Ok(row_sel), Ok(cell_sel), Ok(header_sel)) = (
        Selector::parse("table"),
        Selector::parse("tr"),
        Selector::parse("td"),
        Selector::parse("th, td"),
    ) else {
        return Vec::new();
    };

    let document = page.document();
    let Some(table) = document.select(&table_sel).next() else {
        tracing::info!("No stats table found at {}", page.url);
        return Vec::new();
    };

    let mut rows = table.select(&row_sel);
    let Some(header) = rows.next() else {
        return Vec::new();
    };

    let columns = match mode {
        ColumnMode::Positional => POSITIONAL,
        ColumnMode::Header => {
            let labels: Vec<String> = header.select(&header_sel).map(cell_text).collect();
            Columns::from_header(&labels)
        }
    };

    rows.filter_map(|row| {
        let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
        parse_row(&cells, &columns, team_name)
    })
    .collect()
}

fn parse_row(cells: &[String], columns: &Columns, team_name: &str) -> Option<PlayerRecord> {
    if cells.len() < MIN_COLUMNS {
        return None;
    }

    let count = |idx: usize| cells.get(idx).and_then(|c| parse_count(c));

    Some(PlayerRecord {
        team: team_name.to_string(),
        name: cells.get(columns.name)?.clone(),
        position: cells.get(columns.position)?.clone(),
        games: count(columns.games)?,
        goals: count(columns.goals)?,
        assists: count(columns.assists)?,
        points: count(columns.points)?,
        penalty_min: count(columns.penalty_min)?,
    })
}

/// Blank cells count as zero.
fn parse_count(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0);
    }
    text.parse().ok()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
