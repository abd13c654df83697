//! CommitDAG CLI
//!
//! Command-line interface for running and auditing proof-of-storage epoch chains.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use commitdag::cli::{commands, Cli, Commands};

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    // Initialize logging
    let default_filter = if cli.verbose {
        "debug".to_string()
    } else if cli.quiet {
        "error".to_string()
    } else {
        config.logging.filter.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.quiet || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    // Execute the command
    match cli.command {
        Commands::Simulate { file, epochs, output, key, seed, json } => {
            commands::simulate::execute(&config, file, epochs, output, key, seed, json, cli.quiet)
        }
        Commands::Verify { audit, key, json } => {
            commands::verify::execute(&config, audit, key, json, cli.quiet)
        }
        Commands::Inspect { audit, tree, json } => commands::inspect::execute(audit, tree, json),
        Commands::Config { key, value, list, init } => {
            commands::config::execute(cli.config.as_deref(), key, value, list, init)
        }
    }
}
