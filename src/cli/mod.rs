//! Command-line interface for CommitDAG

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// CommitDAG - append-only audit trail for continuous proofs of storage
#[derive(Parser)]
#[command(
    name = "commitdag",
    version,
    about = "Chain per-epoch storage proofs into an auditable append-only tree",
    long_about = "CommitDAG ingests one storage proof per epoch into an incremental binary-indexed authenticated tree and replays the resulting audit record to confirm no epoch was skipped, replayed or forged."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a config file (default: ~/.commitdag/config.toml)
    #[arg(long, global = true, env = "COMMITDAG_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store a file and run simulated proof epochs over it
    Simulate {
        /// File to store and prove
        #[arg(short, long)]
        file: PathBuf,

        /// Number of epochs (default: protocol.epochs from config)
        #[arg(short, long)]
        epochs: Option<u64>,

        /// Where to write the audit record
        #[arg(short, long, default_value = "audit.json")]
        output: PathBuf,

        /// Where to write the private verification key (default: OUTPUT with a .key extension)
        #[arg(short, long)]
        key: Option<PathBuf>,

        /// Seed for deterministic keys and challenges
        #[arg(long)]
        seed: Option<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay an audit record and check every epoch
    Verify {
        /// Audit record produced by `simulate`
        #[arg(value_name = "AUDIT")]
        audit: PathBuf,

        /// Verification key written by `simulate` (default: AUDIT with a .key extension)
        #[arg(short, long)]
        key: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the epochs of an audit record
    Inspect {
        /// Audit record to inspect
        #[arg(value_name = "AUDIT")]
        audit: PathBuf,

        /// Rebuild and print every tree node
        #[arg(long)]
        tree: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change configuration
    Config {
        /// Configuration key, e.g. protocol.block_size
        key: Option<String>,

        /// New value for the key
        value: Option<String>,

        /// List every key and value
        #[arg(short, long)]
        list: bool,

        /// Write the current configuration to disk
        #[arg(long)]
        init: bool,
    },
}
