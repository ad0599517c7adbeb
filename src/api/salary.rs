use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Deserialize)]
struct SalaryDocument {
    #[serde(default)]
    data: Vec<SalaryEntry>,
}

#[derive(Debug, Deserialize)]
struct SalaryEntry {
    nhl_id: Option<i64>,
    #[serde(default)]
    current: Vec<Contract>,
}

#[derive(Debug, Deserialize)]
struct Contract {
    current_season_cap_hit: Option<CapHit>,
}

/// Cap hits show up both as plain numbers and as "$1,250,000" strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CapHit {
    Number(f64),
    Text(String),
}

impl CapHit {
    fn dollars(&self) -> Option<i64> {
        match self {
            CapHit::Number(n) if n.is_finite() && *n >= 0.0 => Some(n.round() as i64),
            CapHit::Number(_) => None,
            CapHit::Text(s) => {
                static NOT_AMOUNT: OnceLock<Option<Regex>> = OnceLock::new();
                let re = NOT_AMOUNT.get_or_init(|| Regex::new(r"[^0-9.]").ok()).as_ref()?;
                let cleaned = re.replace_all(s, "");
                cleaned.parse::<f64>().ok().map(|n| n.round() as i64)
            }
        }
    }
}

pub struct SalaryClient {
    client: Client,
}

impl SalaryClient {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch `(nhl_id, cap_hit)` pairs from the salary document.
    pub async fn fetch_cap_hits(&self, url: &str) -> Result<Vec<(i64, i64)>> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Salary request failed: HTTP {}", response.status()).into());
        }

        let body = response.text().await?;
        parse_cap_hits(&body)
    }
}

/// Entries without an id or a readable current cap hit are skipped.
pub fn parse_cap_hits(body: &str) -> Result<Vec<(i64, i64)>> {
    let document: SalaryDocument = serde_json::from_str(body)?;

    let hits: Vec<(i64, i64)> = document
        .data
        .iter()
        .filter_map(|entry| {
            let id = entry.nhl_id?;
            let cap_hit = entry
                .current
                .first()?
                .current_season_cap_hit
                .as_ref()?
                .dollars()?;
            Some((id, cap_hit))
        })
        .collect();

    if hits.len() < document.data.len() {
        tracing::debug!(
            "Skipped {} salary entries without an id or cap hit",
            document.data.len() - hits.len()
        );
    }
    Ok(hits)
}
