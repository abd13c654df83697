//! Chain configuration
//!
//! Provides the tree, protocol and logging settings, stored in
//! ~/.commitdag/config.toml

use crate::core::error::{CommitDagError, Result};
use crate::core::hash::HashStrategy;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for running and auditing epoch chains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChainConfig {
    pub tree: TreeConfig,
    pub protocol: ProtocolConfig,
    pub logging: LoggingConfig,
}

/// Tree settings, fixed when a tree is initialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    pub hash_strategy: HashStrategy,
}

/// Storage-proof protocol settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Block size used when tagging a file, in bytes
    pub block_size: usize,
    /// Blocks sampled per challenge
    pub challenge_size: usize,
    /// Extra attempts per epoch when a primitive call fails
    pub retry_limit: u32,
    /// Epochs run by `simulate` when none are given
    pub epochs: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            block_size: 4096,
            challenge_size: 8,
            retry_limit: 2,
            epochs: 8,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when RUST_LOG is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl ChainConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load configuration from `path`, falling back to defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: ChainConfig = toml::from_str(&content).map_err(|e| {
            CommitDagError::configuration(format!("Failed to parse config: {}", e))
        })?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            CommitDagError::configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let user_dirs = UserDirs::new().ok_or(CommitDagError::HomeDirectoryNotFound)?;
        Ok(user_dirs.home_dir().join(".commitdag").join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.protocol.block_size == 0 {
            return Err(CommitDagError::configuration("protocol.block_size must be > 0"));
        }
        if self.protocol.challenge_size == 0 {
            return Err(CommitDagError::configuration(
                "protocol.challenge_size must be > 0",
            ));
        }
        Ok(())
    }

    /// Get a value by dotted key, e.g. `protocol.block_size`
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "tree.hash_strategy" => Some(self.tree.hash_strategy.to_string()),
            "protocol.block_size" => Some(self.protocol.block_size.to_string()),
            "protocol.challenge_size" => Some(self.protocol.challenge_size.to_string()),
            "protocol.retry_limit" => Some(self.protocol.retry_limit.to_string()),
            "protocol.epochs" => Some(self.protocol.epochs.to_string()),
            "logging.filter" => Some(self.logging.filter.clone()),
            _ => None,
        }
    }

    /// Set a value by dotted key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
            value.parse().map_err(|_| {
                CommitDagError::configuration(format!("invalid value for {}: {}", key, value))
            })
        }

        let mut updated = self.clone();
        match key {
            "tree.hash_strategy" => {
                updated.tree.hash_strategy = value.parse().map_err(CommitDagError::configuration)?
            }
            "protocol.block_size" => updated.protocol.block_size = parse(key, value)?,
            "protocol.challenge_size" => updated.protocol.challenge_size = parse(key, value)?,
            "protocol.retry_limit" => updated.protocol.retry_limit = parse(key, value)?,
            "protocol.epochs" => updated.protocol.epochs = parse(key, value)?,
            "logging.filter" => updated.logging.filter = value.to_string(),
            _ => {
                return Err(CommitDagError::configuration(format!(
                    "unknown config key: {}",
                    key
                )))
            }
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// All keys accepted by `get`/`set`
    pub fn keys() -> &'static [&'static str] {
        &[
            "tree.hash_strategy",
            "protocol.block_size",
            "protocol.challenge_size",
            "protocol.retry_limit",
            "protocol.epochs",
            "logging.filter",
        ]
    }
}
