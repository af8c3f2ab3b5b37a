//! Configuration loading for offsync.
//!
//! Configuration is loaded from a TOML file (default: `offsync.toml`). The
//! engine settings sit at the top level; `[storage]` and `[network]` only
//! concern this host.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sync_core::EngineConfig;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "offsync.toml";

/// Root configuration for the offsync CLI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Engine configuration (origin, cache, sync, lifecycle, notifications).
    #[serde(flatten)]
    pub engine: EngineConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Network configuration.
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite cache database (default: `offsync.db` in the data directory).
    pub database: Option<PathBuf>,
}

/// Network configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkConfig {
    /// Per-request timeout in seconds (default: none).
    pub timeout_secs: Option<u64>,
}

impl StorageConfig {
    /// The database path, resolved against `data_dir` when unset.
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| data_dir.join("offsync.db"))
    }
}

impl NetworkConfig {
    /// The request timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load an explicitly requested file, or `offsync.toml` if it exists,
    /// or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying parse error.
        source: toml::de::Error,
    },
}
