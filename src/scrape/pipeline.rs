use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::League;

use super::directory::{list_teams, TeamLink};
use super::fetcher::PageSource;
use super::progress::ProgressLog;
use super::roster::{extract_roster, ColumnMode};
use super::season::find_season_link;

#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub league: League,
    pub directory_url: String,
    pub cell_class: String,
    pub season_label: String,
    pub column_mode: ColumnMode,
    pub delay: Duration,
    /// Only look at the first N listed teams
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub teams_listed: usize,
    pub already_done: usize,
    pub without_season: usize,
    pub empty_rosters: usize,
    pub teams_persisted: usize,
    pub players_inserted: usize,
}

/// Walk the directory and store every team roster not yet in the progress log.
///
/// Teams are handled one at a time: fetch, parse, persist, mark, then wait.
/// Only an empty directory stops the run; a team that can't be fetched or has
/// no roster is skipped and retried on the next run.
pub async fn run_scrape<S: PageSource>(
    source: &S,
    repository: &Repository,
    progress: &mut ProgressLog,
    settings: &ScrapeSettings,
) -> Result<RunSummary> {
    let started_at = Utc::now();

    let mut teams = list_teams(source, &settings.directory_url, &settings.cell_class).await;
    if teams.is_empty() {
        return Err(AppError::EmptyDirectory(settings.directory_url.clone()));
    }
    if let Some(limit) = settings.limit {
        teams.truncate(limit);
    }

    let mut summary = RunSummary {
        started_at,
        finished_at: started_at,
        teams_listed: teams.len(),
        already_done: 0,
        without_season: 0,
        empty_rosters: 0,
        teams_persisted: 0,
        players_inserted: 0,
    };

    for team in &teams {
        if progress.is_done(&team.name) {
            tracing::info!("Skipping {} (already scraped)", team.name);
            summary.already_done += 1;
            continue;
        }

        scrape_team(source, repository, progress, settings, team, &mut summary).await?;

        // Every team past this point made at least one request.
        if !settings.delay.is_zero() {
            tokio::time::sleep(settings.delay).await;
        }
    }

    summary.finished_at = Utc::now();
    Ok(summary)
}

async fn scrape_team<S: PageSource>(
    source: &S,
    repository: &Repository,
    progress: &mut ProgressLog,
    settings: &ScrapeSettings,
    team: &TeamLink,
    summary: &mut RunSummary,
) -> Result<()> {
    tracing::info!("Checking team: {}", team.name);
    let Some(season_url) = find_season_link(source, &team.url, &settings.season_label).await else {
        summary.without_season += 1;
        return Ok(());
    };

    let roster = extract_roster(source, &season_url, &team.name, settings.column_mode).await;
    if roster.is_empty() {
        tracing::info!("No player data found for {}", team.name);
        summary.empty_rosters += 1;
        return Ok(());
    }

    let outcome = repository
        .upsert_teams_and_players(settings.league, roster)
        .await?;
    progress.mark_done(&team.name)?;

    tracing::info!(
        "Stored {} new players for {}",
        outcome.players_inserted,
        team.name
    );
    summary.teams_persisted += 1;
    summary.players_inserted += outcome.players_inserted;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::testing::StaticPages;

    const DIRECTORY: &str = "https://hockey.test/ihdb/stats/team_data.php";

    fn settings() -> ScrapeSettings {
        ScrapeSettings {
            league: League::Ncaa,
            directory_url: DIRECTORY.to_string(),
            cell_class: "tp".to_string(),
            season_label: "2023-24".to_string(),
            column_mode: ColumnMode::Positional,
            delay: Duration::ZERO,
            limit: None,
        }
    }

    fn roster_row(cells: &[&str]) -> String {
        let tds: String = cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
        format!("<tr>{}</tr>", tds)
    }

    fn site() -> StaticPages {
        let directory = r#"<table>
            <tr><td class="tp"><a href="/stte/a">A</a></td></tr>
            <tr><td class="tp"><a href="/stte/b">B</a></td></tr>
        </table>"#;
        let team_a = r#"<table><tr><td><a href="/season/a-2024">2023-24</a></td></tr></table>"#;
        let team_b = r#"<table><tr><td><a href="/season/b-2023">2022-23</a></td></tr></table>"#;
        let season_a = format!(
            "<table><tr><th>#</th><th>Player</th></tr>{}{}{}{}</table>",
            roster_row(&["1", "Ann", "F", "30", "10", "5", "15", "2"]),
            roster_row(&["2", "Bea", "D", "30", "2", "12", "14", "20"]),
            roster_row(&["Totals", "", "", "", "", ""]),
            roster_row(&["3", "Cat", "G", "28", "0", "1", "1", ""]),
        );

        StaticPages::new([
            (DIRECTORY, directory.to_string()),
            ("https://hockey.test/stte/a", team_a.to_string()),
            ("https://hockey.test/stte/b", team_b.to_string()),
            ("https://hockey.test/season/a-2024", season_a),
        ])
    }

    async fn fixtures() -> (Repository, ProgressLog, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::new(dir.path().join("players.db").to_str().unwrap())
            .await
            .unwrap();
        let progress = ProgressLog::open(dir.path().join("progress.csv")).unwrap();
        (repo, progress, dir)
    }

    #[tokio::test]
    async fn end_to_end_stores_only_teams_with_a_season() {
        let (repo, mut progress, _dir) = fixtures().await;
        let source = site();

        let summary = run_scrape(&source, &repo, &mut progress, &settings())
            .await
            .unwrap();

        assert_eq!(summary.teams_listed, 2);
        assert_eq!(summary.teams_persisted, 1);
        assert_eq!(summary.without_season, 1);
        assert_eq!(summary.players_inserted, 3);

        let teams = repo.get_teams(League::Ncaa).await.unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].name, "A");

        let players = repo.get_players(League::Ncaa).await.unwrap();
        assert_eq!(players.len(), 3);
        assert!(players.iter().all(|p| p.team_id == teams[0].id));
        assert_eq!(players[2].penalty_min, 0);

        assert!(progress.is_done("A"));
        assert!(!progress.is_done("B"));
        assert_eq!(progress.len(), 1);
    }

    #[tokio::test]
    async fn finished_teams_are_not_fetched_again() {
        let (repo, mut progress, _dir) = fixtures().await;
        let first = site();
        run_scrape(&first, &repo, &mut progress, &settings())
            .await
            .unwrap();

        let second = site();
        let summary = run_scrape(&second, &repo, &mut progress, &settings())
            .await
            .unwrap();

        assert_eq!(summary.already_done, 1);
        assert_eq!(summary.teams_persisted, 0);
        assert_eq!(second.hits_for("https://hockey.test/stte/a"), 0);
        assert_eq!(second.hits_for("https://hockey.test/season/a-2024"), 0);
        // B never got a roster, so it is checked again.
        assert_eq!(second.hits_for("https://hockey.test/stte/b"), 1);
        assert_eq!(repo.count_players(League::Ncaa).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn unreachable_directory_is_fatal() {
        let (repo, mut progress, _dir) = fixtures().await;
        let source = StaticPages::new(std::iter::empty::<(&str, String)>());

        let result = run_scrape(&source, &repo, &mut progress, &settings()).await;
        assert!(matches!(result, Err(AppError::EmptyDirectory(_))));
    }

    #[tokio::test]
    async fn unreachable_team_page_is_skipped() {
        let (repo, mut progress, _dir) = fixtures().await;
        let mut source = site();
        source.remove("https://hockey.test/stte/a");

        let summary = run_scrape(&source, &repo, &mut progress, &settings())
            .await
            .unwrap();
        assert_eq!(summary.without_season, 2);
        assert_eq!(progress.len(), 0);
        assert_eq!(repo.count_teams(League::Ncaa).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn limit_caps_listed_teams() {
        let (repo, mut progress, _dir) = fixtures().await;
        let source = site();
        let settings = ScrapeSettings {
            limit: Some(1),
            ..settings()
        };

        let summary = run_scrape(&source, &repo, &mut progress, &settings)
            .await
            .unwrap();
        assert_eq!(summary.teams_listed, 1);
        assert_eq!(source.hits_for("https://hockey.test/stte/b"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_follows_every_fetched_team() {
        let (repo, mut progress, _dir) = fixtures().await;
        let settings = ScrapeSettings {
            delay: Duration::from_secs(60),
            ..settings()
        };

        // A is stored, B has no season; both were fetched.
        let started = tokio::time::Instant::now();
        run_scrape(&site(), &repo, &mut progress, &settings)
            .await
            .unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(120), "{:?}", elapsed);
        assert!(elapsed < Duration::from_secs(121), "{:?}", elapsed);

        // A is already done now, so only B costs a delay.
        let started = tokio::time::Instant::now();
        run_scrape(&site(), &repo, &mut progress, &settings)
            .await
            .unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(60), "{:?}", elapsed);
        assert!(elapsed < Duration::from_secs(61), "{:?}", elapsed);
    }
}
