//! Configuration management for CommitDAG
//!
//! Settings are stored as TOML in ~/.commitdag/config.toml unless a path is
//! given explicitly.

pub mod chain_config;

// Re-export commonly used items
pub use chain_config::{ChainConfig, LoggingConfig, ProtocolConfig, TreeConfig};
