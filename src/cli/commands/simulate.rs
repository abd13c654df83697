//! Simulate command implementation

use crate::config::ChainConfig;
use crate::epoch::EpochChain;
use crate::por::{encode_hex, SimulatedPor};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Execute the simulate command
pub fn execute(
    config: &ChainConfig,
    file: PathBuf,
    epochs: Option<u64>,
    output: PathBuf,
    key: Option<PathBuf>,
    seed: Option<u64>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let key_path = super::key_path(key, &output);
    let file_data = std::fs::read(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let epochs = epochs.unwrap_or(config.protocol.epochs);
    let protocol = &config.protocol;

    let scheme = match seed {
        Some(seed) => SimulatedPor::with_seed(protocol.block_size, protocol.challenge_size, seed),
        None => SimulatedPor::new(protocol.block_size, protocol.challenge_size),
    };

    if !quiet && !json {
        println!("{}", "Running proof epochs...".green());
        println!("  • File: {} ({} bytes)", file.display(), file_data.len());
        println!("  • Hash strategy: {}", config.tree.hash_strategy.to_string().cyan());
        println!("  • Epochs: {}", epochs);
    }

    let mut chain = EpochChain::store(scheme, file_data, config.tree.hash_strategy)?
        .with_retry_limit(protocol.retry_limit);
    chain.run_epochs(epochs)?;

    let key_text = encode_hex(chain.public_key())?;
    let record = chain.into_record();
    record.save(&output)?;
    std::fs::write(&key_path, key_text)
        .with_context(|| format!("Failed to write {}", key_path.display()))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "output": output.display().to_string(),
                "key": key_path.display().to_string(),
                "epochs": record.len(),
                "commitment": record.latest_commitment().map(|c| c.to_hex()),
            }))?
        );
    } else if !quiet {
        for entry in &record.epochs {
            println!(
                "  {} epoch {:>3}  leaf {:<10} {}",
                "✓".green(),
                entry.epoch,
                entry.leaf_index,
                entry.commitment.to_hex().dimmed()
            );
        }
        println!();
        println!(
            "{} {} epochs written to {}",
            "✓".green().bold(),
            record.len(),
            output.display().to_string().cyan()
        );
        println!(
            "  Verification key: {} {}",
            key_path.display().to_string().cyan(),
            "(keep private)".yellow()
        );
    }

    Ok(())
}
