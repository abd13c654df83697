//! Verify command implementation

use crate::config::ChainConfig;
use crate::epoch::{AuditRecord, ChainVerifier};
use crate::por::{decode_hex, SimulatedPor};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Execute the verify command
pub fn execute(
    config: &ChainConfig,
    audit: PathBuf,
    key: Option<PathBuf>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let record = AuditRecord::load(&audit)?;
    let key_path = super::key_path(key, &audit);
    let key_text = std::fs::read_to_string(&key_path)
        .with_context(|| format!("Failed to read verification key {}", key_path.display()))?;
    let public_key = decode_hex(&key_text)?;

    if !quiet && !json {
        println!("{}", "Verifying audit record...".green());
        println!("  • Reading record from: {}", audit.display());
        println!("  • Verification key: {}", key_path.display());
        println!("  • Epochs recorded: {}", record.len());
        println!("  • Hash strategy: {}", record.hash_strategy.to_string().cyan());
    }

    // Verification never draws randomness
    let scheme = SimulatedPor::new(config.protocol.block_size, config.protocol.challenge_size);
    let verifier = ChainVerifier::new(&scheme, public_key);

    match verifier.verify(&record) {
        Ok(report) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "valid": true,
                        "epochs_verified": report.epochs_verified,
                        "commitment": report.final_commitment().map(|c| c.to_hex()),
                    }))?
                );
            } else if !quiet {
                println!();
                println!(
                    "{} All {} epochs verified",
                    "✓".green().bold(),
                    report.epochs_verified
                );
                if let Some(commitment) = report.final_commitment() {
                    println!("  Final commitment: {}", commitment.to_hex().cyan());
                }
            }
            Ok(())
        }
        Err(err) => {
            if let Some((epoch, kind)) = err.audit_failure() {
                if json {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&serde_json::json!({
                            "valid": false,
                            "epoch": epoch,
                            "kind": kind,
                            "error": err.to_string(),
                        }))?
                    );
                } else {
                    eprintln!();
                    eprintln!(
                        "{} Chain rejected at epoch {} ({} failure)",
                        "✗".red().bold(),
                        epoch,
                        kind
                    );
                }
            }
            Err(err.into())
        }
    }
}

