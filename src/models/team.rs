use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
}

/// One row of the per-team salary efficiency report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAggregate {
    pub team: String,
    pub goals: i64,
    pub penalty_min: i64,
    /// Summed cap hit, in dollars
    pub salary: i64,
    pub goals_per_million: f64,
    pub penalties_per_million: f64,
}

impl TeamAggregate {
    pub fn new(team: String, goals: i64, penalty_min: i64, salary: i64) -> Self {
        let millions = salary as f64 / 1_000_000.0;
        let per_million = |n: i64| {
            if millions > 0.0 {
                n as f64 / millions
            } else {
                0.0
            }
        };

        Self {
            goals_per_million: per_million(goals),
            penalties_per_million: per_million(penalty_min),
            team,
            goals,
            penalty_min,
            salary,
        }
    }
}

/// Derive a display name from a team page URL: last path segment, extension
/// dropped, `-`/`_` turned into spaces, then title-cased.
pub fn team_name_from_url(team_url: &str) -> String {
    let path = url::Url::parse(team_url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| team_url.to_string());

    let segment = path
        .split('/')
        .filter(|s| !s.is_empty())
        .next_back()
        .unwrap_or_default();

    let stem = segment
        .rsplit_once('.')
        .filter(|(_, ext)| ext.chars().all(|c| c.is_ascii_alphabetic()))
        .map(|(stem, _)| stem)
        .unwrap_or(segment);

    title_case(&stem.replace(['-', '_'], " "))
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
