//! Ingestion configuration
//!
//! Values come from defaults, then `PTG_*` environment variables, then
//! command line flags (applied by the binary through the builder).

use crate::error::{IngestError, Result};
use crate::schedules::calendar::MAX_CALENDAR_ID;
use crate::schedules::ingester::DEFAULT_PROGRESS_INTERVAL;
use ptg_common::env;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_FEED_PATH: &str = "PTG_FEED_PATH";
pub const ENV_DATABASE_PATH: &str = "PTG_DATABASE_PATH";
pub const ENV_CALENDAR_ID_BASE: &str = "PTG_CALENDAR_ID_BASE";
pub const ENV_INIT_SCHEMA: &str = "PTG_INIT_SCHEMA";
pub const ENV_PROGRESS_INTERVAL: &str = "PTG_PROGRESS_INTERVAL";

/// Configuration for one schedule ingestion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Schedule feed, plain JSON or gzipped (`.gz`)
    pub feed_path: PathBuf,
    /// SQLite database receiving the schedule tables
    pub database_path: PathBuf,
    /// First calendar id minted by a run
    pub calendar_id_base: u64,
    /// Create missing tables before ingesting
    pub init_schema: bool,
    /// Route blocks between progress log lines (0 = off)
    pub progress_interval: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            feed_path: PathBuf::from("data/schedules.json"),
            database_path: PathBuf::from("data/ptg.sqlite3"),
            calendar_id_base: 0,
            init_schema: true,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl IngestConfig {
    pub fn builder() -> IngestConfigBuilder {
        IngestConfigBuilder::default()
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_FEED_PATH) {
            config.feed_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_DATABASE_PATH) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(ENV_CALENDAR_ID_BASE) {
            config.calendar_id_base = parse_var(ENV_CALENDAR_ID_BASE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_INIT_SCHEMA) {
            config.init_schema = parse_flag(ENV_INIT_SCHEMA, &raw)?;
        }
        if let Some(raw) = lookup(ENV_PROGRESS_INTERVAL) {
            config.progress_interval = parse_var(ENV_PROGRESS_INTERVAL, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.feed_path.as_os_str().is_empty() {
            return Err(IngestError::Config("feed path must not be empty".to_string()));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(IngestError::Config("database path must not be empty".to_string()));
        }
        if self.calendar_id_base > MAX_CALENDAR_ID {
            return Err(IngestError::Config(format!(
                "calendar id base {} exceeds the largest storable id {MAX_CALENDAR_ID}",
                self.calendar_id_base
            )));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| IngestError::Config(format!("{key} has an invalid value: {raw:?}")))
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool> {
    env::parse_flag(key, raw).map_err(|e| IngestError::Config(e.to_string()))
}

/// Builder for [`IngestConfig`], starting from an existing configuration
#[derive(Debug, Default)]
pub struct IngestConfigBuilder {
    config: IngestConfig,
}

impl IngestConfigBuilder {
    pub fn from_config(config: IngestConfig) -> Self {
        Self { config }
    }

    pub fn feed_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.feed_path = path.into();
        self
    }

    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database_path = path.into();
        self
    }

    pub fn calendar_id_base(mut self, base: u64) -> Self {
        self.config.calendar_id_base = base;
        self
    }

    pub fn init_schema(mut self, init: bool) -> Self {
        self.config.init_schema = init;
        self
    }

    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.config.progress_interval = interval;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<IngestConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
