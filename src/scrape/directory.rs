use std::collections::HashSet;

use scraper::Selector;
use url::Url;

use crate::models::team_name_from_url;

use super::fetcher::{Page, PageSource};

/// A team found on the directory page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamLink {
    pub name: String,
    pub url: String,
}

/// Fetch the directory and list its teams. A failed fetch yields an empty
/// list; deciding whether that ends the run is up to the caller.
pub async fn list_teams<S: PageSource>(
    source: &S,
    directory_url: &str,
    cell_class: &str,
) -> Vec<TeamLink> {
    let Some(page) = source.fetch(directory_url).await else {
        return Vec::new();
    };

    let teams = parse_team_directory(&page, cell_class);
    tracing::info!("Found {} teams at {}", teams.len(), directory_url);
    teams
}

/// Collect the first anchor of every `td.<cell_class>` cell. A cell whose
/// first anchor has no href is skipped.
pub fn parse_team_directory(page: &Page, cell_class: &str) -> Vec<TeamLink> {
    let Ok(cell_sel) = Selector::parse(&format!("td.{}", cell_class)) else {
        tracing::warn!("Invalid directory cell class {:?}", cell_class);
        return Vec::new();
    };
    let Ok(link_sel) = Selector::parse("a") else {
        return Vec::new();
    };
    let Ok(base) = Url::parse(&page.url) else {
        tracing::warn!("Directory page has an unusable URL: {}", page.url);
        return Vec::new();
    };

    let document = page.document();
    let mut seen = HashSet::new();

    document
        .select(&cell_sel)
        .filter_map(|cell| cell.select(&link_sel).next())
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| base.join(href.trim()).ok())
        .map(|url| url.to_string())
        .filter(|url| seen.insert(url.clone()))
        .map(|url| TeamLink {
            name: team_name_from_url(&url),
            url,
        })
        .collect()
}
