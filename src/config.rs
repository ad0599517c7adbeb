use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::scrape::ColumnMode;

const APP_DIR: &str = "rink-ledger";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_progress_path")]
    pub progress_path: String,

    #[serde(default = "default_directory_url")]
    pub directory_url: String,

    /// Class of the table cells that hold team links on the directory page
    #[serde(default = "default_directory_cell_class")]
    pub directory_cell_class: String,

    #[serde(default = "default_season_label")]
    pub season_label: String,

    /// Pause between teams so the site doesn't block us
    #[serde(default = "default_request_delay")]
    pub request_delay_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub column_mode: ColumnMode,

    #[serde(default = "default_stats_api_url")]
    pub stats_api_url: String,

    #[serde(default = "default_stats_season_id")]
    pub stats_season_id: String,

    #[serde(default = "default_stats_page_size")]
    pub stats_page_size: u32,

    pub salary_api_url: Option<String>,
}

fn data_dir() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);
    std::fs::create_dir_all(&data_dir).ok();
    data_dir
}

fn default_db_path() -> String {
    data_dir().join("players2324.db").to_string_lossy().to_string()
}

fn default_progress_path() -> String {
    data_dir()
        .join("scraped_teams.csv")
        .to_string_lossy()
        .to_string()
}

fn default_directory_url() -> String {
    "https://www.hockeydb.com/ihdb/stats/team_data.php?x=99&y=16&tname=&tcity=&tstate=&tleague=NCAA&y1=2023&y2=2024&college=on".to_string()
}

fn default_directory_cell_class() -> String {
    "tp".to_string()
}

fn default_season_label() -> String {
    "2023-24".to_string()
}

fn default_request_delay() -> u64 {
    5
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_stats_api_url() -> String {
    "https://api.nhle.com/stats/rest/en/skater/summary".to_string()
}

fn default_stats_season_id() -> String {
    "20232024".to_string()
}

fn default_stats_page_size() -> u32 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            progress_path: default_progress_path(),
            directory_url: default_directory_url(),
            directory_cell_class: default_directory_cell_class(),
            season_label: default_season_label(),
            request_delay_secs: default_request_delay(),
            user_agent: default_user_agent(),
            column_mode: ColumnMode::default(),
            stats_api_url: default_stats_api_url(),
            stats_season_id: default_stats_season_id(),
            stats_page_size: default_stats_page_size(),
            salary_api_url: None,
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `path` is `None`.
    /// A missing file is created with defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_path);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.season_label.trim().is_empty() {
            return Err(AppError::Config("season_label must not be empty".to_string()));
        }
        if self.stats_page_size == 0 {
            return Err(AppError::Config("stats_page_size must be positive".to_string()));
        }
        url::Url::parse(&self.directory_url)
            .map_err(|e| AppError::Config(format!("directory_url: {}", e)))?;
        Ok(())
    }
}
