//! User configuration at ~/.config/taskcal/config.toml

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{TaskCalError, TaskCalResult};
use crate::occurrence::{DEFAULT_DAILY_HORIZON_DAYS, DEFAULT_WEEKLY_HORIZON_WEEKS, Horizon};

static DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
static DEFAULT_BIND: &str = "127.0.0.1:5000";
static ENV_PREFIX: &str = "TASKCAL";

/// Upper bounds on the expansion horizons, about ten years each.
pub const MAX_DAILY_HORIZON_DAYS: u32 = 3660;
pub const MAX_WEEKLY_HORIZON_WEEKS: u32 = 520;

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_database() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("taskcal").join("tasks.db"))
        .unwrap_or_else(|| PathBuf::from("tasks.db"))
}

fn default_daily_horizon_days() -> u32 {
    DEFAULT_DAILY_HORIZON_DAYS
}

fn default_weekly_horizon_weeks() -> u32 {
    DEFAULT_WEEKLY_HORIZON_WEEKS
}

/// Settings shared by the server and the CLI.
///
/// Every key is optional; `TASKCAL_*` environment variables override the file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TaskcalConfig {
    /// Where the CLI reaches the server.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Address the server listens on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// SQLite database file; `~` is expanded.
    #[serde(default = "default_database")]
    pub database: PathBuf,

    #[serde(default = "default_daily_horizon_days")]
    pub daily_horizon_days: u32,

    #[serde(default = "default_weekly_horizon_weeks")]
    pub weekly_horizon_weeks: u32,
}

impl Default for TaskcalConfig {
    fn default() -> Self {
        TaskcalConfig {
            server_url: default_server_url(),
            bind: default_bind(),
            database: default_database(),
            daily_horizon_days: default_daily_horizon_days(),
            weekly_horizon_weeks: default_weekly_horizon_weeks(),
        }
    }
}

impl TaskcalConfig {
    pub fn config_path() -> TaskCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TaskCalError::Config("Could not determine config directory".into()))?
            .join("taskcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file, writing a commented-out default first if none exists.
    pub fn load() -> TaskCalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> TaskCalResult<Self> {
        let config: Self = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| TaskCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| TaskCalError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject horizons that would expand to no occurrences or to an unbounded number.
    pub fn validate(&self) -> TaskCalResult<()> {
        if !(1..=MAX_DAILY_HORIZON_DAYS).contains(&self.daily_horizon_days) {
            return Err(TaskCalError::Config(format!(
                "daily_horizon_days must be between 1 and {MAX_DAILY_HORIZON_DAYS}, got {}",
                self.daily_horizon_days
            )));
        }
        if !(1..=MAX_WEEKLY_HORIZON_WEEKS).contains(&self.weekly_horizon_weeks) {
            return Err(TaskCalError::Config(format!(
                "weekly_horizon_weeks must be between 1 and {MAX_WEEKLY_HORIZON_WEEKS}, got {}",
                self.weekly_horizon_weeks
            )));
        }
        Ok(())
    }

    pub fn horizon(&self) -> Horizon {
        Horizon {
            daily_days: self.daily_horizon_days,
            weekly_weeks: self.weekly_horizon_weeks,
        }
    }

    pub fn database_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.database.to_string_lossy()).into_owned();
        PathBuf::from(expanded)
    }

    /// Save the current config, replacing any comments in the file.
    pub fn save(&self, path: &Path) -> TaskCalResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| TaskCalError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| TaskCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> TaskCalResult<()> {
        let contents = format!(
            "\
# taskcal configuration

# Where the taskcal CLI reaches the server:
# server_url = \"{DEFAULT_SERVER_URL}\"

# Address taskcal-server listens on:
# bind = \"{DEFAULT_BIND}\"

# Task database used by taskcal-server:
# database = \"~/.local/share/taskcal/tasks.db\"

# How far ahead recurring tasks appear on the calendar:
# daily_horizon_days = {DEFAULT_DAILY_HORIZON_DAYS}
# weekly_horizon_weeks = {DEFAULT_WEEKLY_HORIZON_WEEKS}
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TaskCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| TaskCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
