use std::path::Path;
use std::time::Duration;

use crate::api::{SalaryClient, StatsClient};
use crate::config::Config;
use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::League;
use crate::report;
use crate::scrape::{run_scrape, PageFetcher, ProgressLog, RunSummary, ScrapeSettings};

/// Holds the database for the length of one command; the connection closes
/// when the `App` is dropped.
pub struct App {
    config: Config,
    repository: Repository,
}

impl App {
    pub async fn new(config: Config) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;
        Ok(Self { config, repository })
    }

    pub async fn scrape(
        &self,
        league: League,
        season: Option<String>,
        limit: Option<usize>,
    ) -> Result<RunSummary> {
        let fetcher = PageFetcher::new(&self.config.user_agent)?;
        let mut progress = ProgressLog::open(&self.config.progress_path)?;

        let settings = ScrapeSettings {
            league,
            directory_url: self.config.directory_url.clone(),
            cell_class: self.config.directory_cell_class.clone(),
            season_label: season.unwrap_or_else(|| self.config.season_label.clone()),
            column_mode: self.config.column_mode,
            delay: Duration::from_secs(self.config.request_delay_secs),
            limit,
        };

        let summary = run_scrape(&fetcher, &self.repository, &mut progress, &settings).await?;
        tracing::info!(
            "Scrape finished in {}s: {} teams listed, {} stored, {} already done, {} without a {} season",
            (summary.finished_at - summary.started_at).num_seconds(),
            summary.teams_listed,
            summary.teams_persisted,
            summary.already_done,
            summary.without_season,
            settings.season_label,
        );
        Ok(summary)
    }

    pub async fn import_stats(&self) -> Result<usize> {
        let client = StatsClient::new(
            &self.config.stats_api_url,
            &self.config.stats_season_id,
            self.config.stats_page_size,
            &self.config.user_agent,
        )?;

        let skaters = client.fetch_all_skaters().await?;
        let outcome = self.repository.upsert_api_skaters(skaters).await?;
        tracing::info!(
            "Imported {} new skaters ({} new teams)",
            outcome.players_inserted,
            outcome.teams_created
        );
        Ok(outcome.players_inserted)
    }

    pub async fn import_salaries(&self) -> Result<usize> {
        let url = self
            .config
            .salary_api_url
            .as_deref()
            .ok_or_else(|| AppError::Config("salary_api_url is not set".to_string()))?;

        let client = SalaryClient::new(&self.config.user_agent)?;
        let cap_hits = client.fetch_cap_hits(url).await?;
        let fetched = cap_hits.len();
        let updated = self.repository.apply_salaries(cap_hits).await?;
        tracing::info!("Matched {} of {} salaries to stored players", updated, fetched);
        Ok(updated)
    }

    /// Rank teams by salary efficiency. Reads a previously written CSV when
    /// `from` is given, otherwise aggregates the store and writes `out`.
    pub async fn team_report(&self, league: League, out: &Path, from: Option<&Path>) -> Result<()> {
        let aggregates = match from {
            Some(path) => report::read_team_csv(path)?,
            None => {
                let aggregates = self.repository.team_aggregates(league).await?;
                report::write_team_csv(out, &aggregates)?;
                tracing::info!("Wrote {} teams to {}", aggregates.len(), out.display());
                aggregates
            }
        };

        for (team, value) in report::ranked_by(&aggregates, |a| a.goals_per_million) {
            println!("{:<24} {:>8.2} goals per $1M", team, value);
        }
        println!();
        for (team, value) in report::ranked_by(&aggregates, |a| a.penalties_per_million) {
            println!("{:<24} {:>8.2} penalty min per $1M", team, value);
        }

        match report::penalties_vs_goals_fit(&aggregates) {
            Some(fit) => println!("\n{}", fit.label("Pens", "Goals")),
            None => tracing::warn!("Not enough salaried teams to fit a line"),
        }
        Ok(())
    }

    pub async fn player_fit(
        &self,
        league: League,
        min_gp: i64,
        min_pts: i64,
        min_pen: i64,
    ) -> Result<()> {
        let players = self
            .repository
            .filtered_players(league, min_gp, min_pts, min_pen)
            .await?;
        tracing::info!("{} players pass the filter", players.len());

        for player in report::outliers(&players) {
            println!(
                "{:<28} {:>4} pts {:>4} pim",
                player.name, player.points, player.penalty_min
            );
        }

        match report::points_vs_penalties_fit(&players) {
            Some(fit) => println!("\n{}", fit.label("Points", "Penalty Minutes")),
            None => tracing::warn!("Not enough players to fit a line"),
        }
        Ok(())
    }

    pub async fn export_players(&self, league: League, out: &Path) -> Result<usize> {
        let players = self.repository.get_players(league).await?;
        report::write_players_csv(out, &players)?;
        tracing::info!("Wrote {} {} players to {}", players.len(), league, out.display());
        Ok(players.len())
    }

    pub async fn status(&self, list_done: bool) -> Result<()> {
        for league in League::all() {
            println!(
                "{:<5} {:>5} teams {:>6} players",
                league.to_string(),
                self.repository.count_teams(league).await?,
                self.repository.count_players(league).await?,
            );
        }

        let progress = ProgressLog::read(&self.config.progress_path)?;
        println!("{} teams in {}", progress.len(), self.config.progress_path);
        if list_done {
            let mut done: Vec<&str> = progress.teams().collect();
            done.sort_unstable();
            for team in done {
                println!("  {}", team);
            }
        }
        Ok(())
    }
}
