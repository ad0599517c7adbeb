use scraper::Selector;
use url::Url;

use super::fetcher::{Page, PageSource};

/// Find the stats page link for `season_label` on a team page. Not every team
/// has every season, so `None` is an ordinary answer.
pub async fn find_season_link<S: PageSource>(
    source: &S,
    team_url: &str,
    season_label: &str,
) -> Option<String> {
    let page = source.fetch(team_url).await?;
    let link = parse_season_link(&page, season_label);
    if link.is_none() {
        tracing::info!("No {} season link on {}", season_label, team_url);
    }
    link
}

/// First row whose first linked anchor mentions the label (case-insensitive).
pub fn parse_season_link(page: &Page, season_label: &str) -> Option<String> {
    let row_sel = Selector::parse("tr").ok()?;
    let link_sel = Selector::parse("a[href]").ok()?;
    let base = Url::parse(&page.url).ok()?;
    let label = season_label.to_lowercase();

    let document = page.document();
    let link = document
        .select(&row_sel)
        .filter_map(|row| row.select(&link_sel).next())
        .find(|link| {
            link.text()
                .collect::<String>()
                .to_lowercase()
                .contains(&label)
        })?;

    let href = link.value().attr("href")?;
    base.join(href.trim()).ok().map(|url| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> Page {
        Page {
            url: "https://www.hockeydb.com/stte/maine-7016.html".to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn first_matching_row_wins() {
        let html = r#"<table>
            <tr><th>Season</th></tr>
            <tr><td><a href="/ihdb/stats/leagues/seasons/teams/0009962022.html">2021-22</a></td></tr>
            <tr><td><a href="/ihdb/stats/leagues/seasons/teams/0009962024.html">2023-24 Maine Black Bears</a></td></tr>
            <tr><td><a href="/later.html">2023-24</a></td></tr>
        </table>"#;

        assert_eq!(
            parse_season_link(&page(html), "2023-24").as_deref(),
            Some("https://www.hockeydb.com/ihdb/stats/leagues/seasons/teams/0009962024.html")
        );
    }

    #[test]
    fn label_match_ignores_case() {
        let html = r#"<table><tr><td><a href="/s.html">Season 2023-24 FINAL</a></td></tr></table>"#;
        assert!(parse_season_link(&page(html), "season 2023-24 final").is_some());
    }

    #[test]
    fn missing_season_is_none() {
        let html = r#"<table><tr><td><a href="/s.html">2022-23</a></td></tr></table>"#;
        assert_eq!(parse_season_link(&page(html), "2023-24"), None);
    }

    #[test]
    fn only_first_anchor_of_a_row_counts() {
        let html = r#"<table><tr>
            <td><a href="/league.html">NCAA</a></td>
            <td><a href="/s.html">2023-24</a></td>
        </tr></table>"#;
        assert_eq!(parse_season_link(&page(html), "2023-24"), None);
    }
}
