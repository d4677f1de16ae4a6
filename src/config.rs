//! Configuration for the loader and the label store.
//!
//! Loaded from TOML; every field has a default, so an empty document (or a
//! missing file) yields a working configuration:
//!
//! ```toml
//! [loader]
//! yield_count = 10
//!
//! [labels]
//! database_url = "labels.db"
//! chain_id = "1"
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// Environment variable overriding [`LabelsConfig::database_url`].
pub const LABELS_DB_URL_ENV: &str = "LABELS_DB_URL";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub loader: LoaderConfig,
    pub labels: LabelsConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoaderConfig {
    /// Executor yields a request waits before it closes its window.
    pub yield_count: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig { yield_count: 10 }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LabelsConfig {
    /// SQLite path of the labels database, `:memory:` for a private one.
    pub database_url: String,
    /// Only rows of this chain are considered.
    pub chain_id: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        LabelsConfig {
            database_url: ":memory:".to_string(),
            chain_id: "1".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_toml_str(&content)?;
                tracing::info!(path = %path.display(), "loaded config");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Io {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    /// Applies `LABELS_DB_URL` when it is set.
    pub fn apply_env(mut self) -> Self {
        if let Ok(url) = std::env::var(LABELS_DB_URL_ENV) {
            tracing::debug!("labels database url taken from {}", LABELS_DB_URL_ENV);
            self.labels.database_url = url;
        }
        self
    }
}
