//! Configuration command implementation

use crate::config::ChainConfig;
use anyhow::{anyhow, Result};
use colored::Colorize;
use std::path::Path;

/// Execute the config command
pub fn execute(
    config_file: Option<&Path>,
    key: Option<String>,
    value: Option<String>,
    list: bool,
    init: bool,
) -> Result<()> {
    let path = super::config_path(config_file)?;
    let mut config = ChainConfig::load_from(&path)?;

    if init {
        config.save_to(&path)?;
        println!(
            "{} Configuration written to {}",
            "✓".green(),
            path.display().to_string().cyan()
        );
        return Ok(());
    }

    match (key, value) {
        (Some(key), Some(value)) => {
            config.set(&key, &value)?;
            config.save_to(&path)?;
            println!("{} {} = {}", "✓".green(), key.bold(), value.cyan());
        }
        (Some(key), None) => {
            let value = config
                .get(&key)
                .ok_or_else(|| anyhow!("Invalid configuration key: {}", key))?;
            println!("{}", value);
        }
        (None, _) if list => list_configuration(&config, &path),
        (None, _) => {
            println!("{}", "Usage: commitdag config <key> [value]".yellow());
            println!("       commitdag config --list");
            println!("       commitdag config --init");
        }
    }

    Ok(())
}

fn list_configuration(config: &ChainConfig, path: &Path) {
    println!("{}: {}", "Configuration file".bold(), path.display().to_string().cyan());
    if !path.exists() {
        println!("  {}", "(not created yet, showing defaults)".dimmed());
    }
    for key in ChainConfig::keys() {
        let value = config.get(key).unwrap_or_default();
        println!("  {} = {}", key.green(), value);
    }
}
