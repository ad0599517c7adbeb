use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use scraper::Html;

use crate::error::Result;

/// A fetched page: the final URL (after redirects) and its markup.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub body: String,
}

impl Page {
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Anything that can hand back a page for a URL. `None` means "no data for
/// this unit of work"; implementations log the reason themselves.
pub trait PageSource {
    fn fetch(&self, url: &str) -> impl Future<Output = Option<Page>>;
}

pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        // Some sites turn away default client identifiers, so present as a browser.
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<Option<Page>> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            tracing::warn!("Request failed for {}: HTTP {}", url, response.status());
            return Ok(None);
        }

        let final_url = response.url().to_string();
        let body = response.text().await?;

        Ok(Some(Page {
            url: final_url,
            body,
        }))
    }
}

impl PageSource for PageFetcher {
    async fn fetch(&self, url: &str) -> Option<Page> {
        match self.get(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Request failed for {}: {}", url, e);
                None
            }
        }
    }
}
