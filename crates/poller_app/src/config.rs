use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use poller_core::RunLimits;
use poller_engine::{FetchSettings, PollSettings, DEFAULT_URL};
use serde::Deserialize;
use thiserror::Error;

use crate::cli::Cli;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Run parameters. Missing fields in the RON file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub url: String,
    pub run_duration_secs: u64,
    pub max_unique: usize,
    pub delay_secs: u64,
    pub output_dir: PathBuf,
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        let limits = RunLimits::default();
        Self {
            url: DEFAULT_URL.to_string(),
            run_duration_secs: limits.run_duration.as_secs(),
            max_unique: limits.max_unique,
            delay_secs: 5,
            output_dir: PathBuf::from("responses"),
            request_timeout_secs: None,
            connect_timeout_secs: None,
        }
    }
}

impl PollerConfig {
    /// Defaults, then the config file if one was given, then CLI flags.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(cli);
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(url) = &cli.url {
            self.url = url.clone();
        }
        if let Some(secs) = cli.duration_secs {
            self.run_duration_secs = secs;
        }
        if let Some(max) = cli.max_unique {
            self.max_unique = max;
        }
        if let Some(secs) = cli.delay_secs {
            self.delay_secs = secs;
        }
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
        if cli.request_timeout_secs.is_some() {
            self.request_timeout_secs = cli.request_timeout_secs;
        }
        if cli.connect_timeout_secs.is_some() {
            self.connect_timeout_secs = cli.connect_timeout_secs;
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            url: self.url.clone(),
            limits: RunLimits {
                run_duration: Duration::from_secs(self.run_duration_secs),
                max_unique: self.max_unique,
            },
            delay: Duration::from_secs(self.delay_secs),
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}
