use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Default chunk interval: 5 minutes.
pub const DEFAULT_INTERVAL_MS: u64 = 300_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: config::ConfigError,
    },

    #[error("failed to write default config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize default config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("intervalMs must be a positive integer, got {0}")]
    InvalidInterval(u64),
}

/// Recording configuration, stored on disk as `{ "intervalMs": <ms> }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingConfig {
    // The config crate normalizes keys to lowercase, so accept that
    // spelling as well as the canonical one.
    #[serde(rename = "intervalMs", alias = "intervalms")]
    pub interval_ms: u64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl RecordingConfig {
    /// A zero interval is a configuration error, never coerced.
    fn validate(self) -> Result<Self, ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::InvalidInterval(self.interval_ms));
        }
        Ok(self)
    }
}

/// Loads the JSON config file, creating it with defaults when absent.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, writing the default file first if none exists.
    /// Re-entrant: calling again re-reads the file (reload on demand).
    pub fn load(&self) -> Result<RecordingConfig, ConfigError> {
        if !self.path.exists() {
            let default = RecordingConfig::default();
            let body = serde_json::to_string_pretty(&default)?;
            fs::write(&self.path, body).map_err(|source| ConfigError::Write {
                path: self.path.clone(),
                source,
            })?;
            info!("Created default config file: {}", self.path.display());
            return Ok(default);
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(self.path.as_path()).format(config::FileFormat::Json))
            .build()
            .map_err(|source| ConfigError::Read {
                path: self.path.clone(),
                source,
            })?;

        let cfg: RecordingConfig =
            settings
                .try_deserialize()
                .map_err(|source| ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })?;

        cfg.validate()
    }
}
