//! Serializable pipeline configuration.
//!
//! Everything a run needs (credential, output location, series list, worker
//! count) lives in one [`PipelineConfig`] value that is passed explicitly to
//! the pipeline. It can be loaded from TOML; omitted fields take defaults and
//! an omitted series list means the built-in catalog.

use econ_core::data::fred::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use econ_core::{default_catalog, SeriesDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::export::{same_file_name, series_file_name, MERGED_FILE_NAME};

/// Environment variable consulted for the API key.
pub const API_KEY_ENV: &str = "FRED_API_KEY";

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "economic_indicators_data";

/// Default ceiling on in-flight fetches.
pub const DEFAULT_MAX_WORKERS: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no API key: set `api_key`, pass --api-key, or export FRED_API_KEY")]
    MissingApiKey,

    #[error("no series configured")]
    NoSeries,

    #[error("duplicate series display name '{0}'")]
    DuplicateName(String),

    #[error("series display name '{0}' would overwrite the merged output file")]
    ReservedName(String),

    #[error("series display names '{first}' and '{second}' both map to {file}")]
    FileNameClash {
        first: String,
        second: String,
        file: String,
    },

    #[error("max_workers must be at least 1")]
    InvalidWorkers,

    #[error("timeout_secs must be at least 1")]
    InvalidTimeout,
}

/// What to do when no series yields any data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPolicy {
    /// Write a header-only output file and report success.
    #[default]
    WriteEmpty,
    /// Write nothing and fail the run.
    Fail,
}

/// Configuration for one collection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// FRED API key. Usually supplied through the environment instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Directory receiving the merged file and any per-series files.
    pub output_dir: PathBuf,

    /// Observations endpoint.
    pub endpoint: String,

    /// Maximum number of concurrent fetches.
    pub max_workers: usize,

    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,

    /// Persist each fetched series as `<name>.csv` before merging. These files
    /// are removed again once the merged file is written.
    pub write_series_files: bool,

    pub empty_policy: EmptyPolicy,

    /// Series to fetch, in output column order.
    pub series: Vec<SeriesDescriptor>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_workers: DEFAULT_MAX_WORKERS,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            write_series_files: false,
            empty_policy: EmptyPolicy::default(),
            series: default_catalog(),
        }
    }
}

impl PipelineConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize the config to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Take the API key from `value` when it is set and non-blank.
    pub fn override_api_key(&mut self, value: Option<String>) {
        if let Some(key) = value.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    /// Apply [`API_KEY_ENV`] over whatever the file said.
    pub fn apply_env(&mut self) {
        self.override_api_key(std::env::var(API_KEY_ENV).ok());
    }

    /// The API key, or an error when none was configured.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the structural rules: at least one series, unique display
    /// names that map to distinct per-series files other than the merged
    /// output, a usable worker count and a nonzero timeout. The API key is
    /// checked separately because commands like `series` do not need one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.series.is_empty() {
            return Err(ConfigError::NoSeries);
        }
        if self.max_workers == 0 {
            return Err(ConfigError::InvalidWorkers);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        let mut seen = HashSet::new();
        let mut files: HashMap<String, &str> = HashMap::new();
        for s in &self.series {
            if !seen.insert(s.name.as_str()) {
                return Err(ConfigError::DuplicateName(s.name.clone()));
            }
            let file = series_file_name(&s.name);
            if same_file_name(&file, MERGED_FILE_NAME) {
                return Err(ConfigError::ReservedName(s.name.clone()));
            }
            if let Some(first) = files.get(&file) {
                return Err(ConfigError::FileNameClash {
                    first: first.to_string(),
                    second: s.name.clone(),
                    file,
                });
            }
            files.insert(file, &s.name);
        }
        Ok(())
    }
}
