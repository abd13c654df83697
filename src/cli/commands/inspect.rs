//! Inspect command implementation

use crate::core::content::BytesContent;
use crate::dag::IndexedAppendTree;
use crate::epoch::AuditRecord;
use anyhow::{anyhow, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Execute the inspect command
pub fn execute(audit: PathBuf, tree: bool, json: bool) -> Result<()> {
    let record = AuditRecord::load(&audit)?;

    if json {
        println!("{}", record.to_json()?);
        return Ok(());
    }

    println!("{}", "Audit Record".bold());
    println!("  Version:       {}", record.version);
    println!("  Created:       {}", record.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Hash strategy: {}", record.hash_strategy.to_string().cyan());
    println!("  Epochs:        {}", record.len());
    if let Some(commitment) = record.latest_commitment() {
        println!("  Commitment:    {}", commitment.to_hex().cyan());
    }
    println!();

    for entry in &record.epochs {
        println!(
            "{} {}  leaf {} (#{})",
            "Epoch".bold(),
            entry.epoch.to_string().yellow(),
            entry.leaf_index.cyan(),
            entry.leaf_sequence
        );
        println!("  commitment: {}", entry.commitment.to_hex());
        println!("  proof:      {} bytes", entry.proof_value.len());
        for ancestor in &entry.ancestors {
            println!("  ancestor {:<12} {}", ancestor.index, ancestor.hash.to_hex().dimmed());
        }
    }

    if tree {
        let rebuilt = rebuild_tree(&record)?;
        println!();
        println!(
            "{} ({} nodes, {} leaves, width {})",
            "Tree".bold(),
            rebuilt.len(),
            rebuilt.leaf_count(),
            rebuilt.width()
        );
        print!("{}", rebuilt);
    }

    Ok(())
}

/// Append every recorded proof value to a fresh tree
fn rebuild_tree(record: &AuditRecord) -> Result<IndexedAppendTree<BytesContent>> {
    let mut values = record.epochs.iter().map(|e| BytesContent::new(e.proof_value.clone()));
    let genesis = values
        .next()
        .ok_or_else(|| anyhow!("audit record has no epochs"))?;

    let mut tree = IndexedAppendTree::initialize(genesis, record.hash_strategy)?;
    for value in values {
        tree.append(value)?;
    }
    Ok(tree)
}
