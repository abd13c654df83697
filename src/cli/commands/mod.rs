//! CLI command implementations

pub mod config;
pub mod inspect;
pub mod simulate;
pub mod verify;

use crate::config::ChainConfig;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Load configuration from an explicit path or the default location
pub fn load_config(path: Option<&Path>) -> Result<ChainConfig> {
    let config = match path {
        Some(path) => ChainConfig::load_from(path)?,
        None => ChainConfig::load()?,
    };
    Ok(config)
}

/// Where `config` writes to
pub fn config_path(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(ChainConfig::get_config_path()?),
    }
}

/// Key file path: explicit, or next to the audit record
pub fn key_path(key: Option<PathBuf>, audit: &Path) -> PathBuf {
    key.unwrap_or_else(|| audit.with_extension("key"))
}
