use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::ApiSkater;

#[derive(Debug, Deserialize)]
struct StatsPage<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

/// Client for the league's paginated skater summary report.
pub struct StatsClient {
    client: Client,
    base_url: String,
    season_id: String,
    page_size: u32,
}

impl StatsClient {
    pub fn new(base_url: &str, season_id: &str, page_size: u32, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            season_id: season_id.to_string(),
            page_size,
        })
    }

    /// Regular-season skater totals for the configured season, all pages.
    pub async fn fetch_all_skaters(&self) -> Result<Vec<ApiSkater>> {
        let skaters = collect_pages(self.page_size, |start| self.fetch_page(start)).await?;
        tracing::info!("Fetched {} skaters for season {}", skaters.len(), self.season_id);
        Ok(skaters)
    }

    async fn fetch_page(&self, start: u32) -> Result<Vec<ApiSkater>> {
        let url = self.page_url(start)?;
        tracing::debug!("Fetching stats page {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::StatsApi(format!(
                "HTTP {} at offset {}",
                response.status(),
                start
            )));
        }

        let page: StatsPage<ApiSkater> = response.json().await?;
        Ok(page.data)
    }

    fn page_url(&self, start: u32) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Config(format!("stats_api_url: {}", e)))?;
        let season = &self.season_id;
        url.query_pairs_mut()
            .append_pair("isAggregate", "true")
            .append_pair("isGame", "false")
            .append_pair("start", &start.to_string())
            .append_pair("limit", &self.page_size.to_string())
            .append_pair(
                "cayenneExp",
                &format!("gameTypeId=2 and seasonId<={season} and seasonId>={season}"),
            );
        Ok(url)
    }
}

/// Request pages at offsets 0, size, 2*size, ... until one comes back empty.
async fn collect_pages<T, F, Fut>(page_size: u32, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut all = Vec::new();
    let mut start = 0;
    loop {
        let page = fetch(start).await?;
        if page.is_empty() {
            break;
        }
        all.extend(page);
        start += page_size;
    }
    Ok(all)
}
