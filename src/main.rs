use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod api;
mod app;
mod config;
mod db;
mod error;
mod models;
mod report;
mod scrape;

use app::App;
use config::Config;
use error::Result;
use models::League;

#[derive(Parser)]
#[command(name = "rink-ledger")]
#[command(about = "Scrape hockey rosters and stats into SQLite and summarize them")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape team rosters from the directory site, skipping finished teams
    Scrape {
        #[arg(long, value_enum, default_value = "ncaa")]
        league: League,
        /// Season label to look for on team pages (e.g. 2023-24)
        #[arg(long)]
        season: Option<String>,
        /// Only process the first N listed teams
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Page through the stats API into the NHL tables
    ImportStats,

    /// Apply cap hits from the salary API to stored NHL players
    ImportSalaries,

    /// Per-team goals and penalty minutes per salary million
    TeamReport {
        #[arg(long, value_enum, default_value = "nhl")]
        league: League,
        #[arg(long, default_value = "NHL_teams.csv")]
        out: PathBuf,
        /// Report from an existing CSV instead of the database
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Fit points against penalty minutes for qualifying players
    PlayerFit {
        #[arg(long, value_enum, default_value = "nhl")]
        league: League,
        #[arg(long, default_value = "41")]
        min_gp: i64,
        #[arg(long, default_value = "30")]
        min_pts: i64,
        #[arg(long, default_value = "40")]
        min_pen: i64,
    },

    /// Write every stored player of a league to CSV
    ExportPlayers {
        #[arg(long, value_enum, default_value = "ncaa")]
        league: League,
        #[arg(long, default_value = "players.csv")]
        out: PathBuf,
    },

    /// Show stored row counts and scrape progress
    Status {
        /// Also list every finished team
        #[arg(long)]
        list: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "rink_ledger=debug"
    } else {
        "rink_ledger=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let app = App::new(config).await?;

    match cli.command {
        Commands::Scrape {
            league,
            season,
            limit,
        } => {
            let summary = app.scrape(league, season, limit).await?;
            println!(
                "Stored {} players from {} teams",
                summary.players_inserted, summary.teams_persisted
            );
        }
        Commands::ImportStats => {
            let inserted = app.import_stats().await?;
            println!("Imported {} skaters", inserted);
        }
        Commands::ImportSalaries => {
            let updated = app.import_salaries().await?;
            println!("Updated {} salaries", updated);
        }
        Commands::TeamReport { league, out, from } => {
            app.team_report(league, &out, from.as_deref()).await?;
        }
        Commands::PlayerFit {
            league,
            min_gp,
            min_pts,
            min_pen,
        } => {
            app.player_fit(league, min_gp, min_pts, min_pen).await?;
        }
        Commands::ExportPlayers { league, out } => {
            let written = app.export_players(league, &out).await?;
            println!("Exported {} players to {}", written, out.display());
        }
        Commands::Status { list } => {
            app.status(list).await?;
        }
    }

    Ok(())
}
