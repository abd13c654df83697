//! Public audit record of an epoch chain

use crate::core::error::{CommitDagError, Result};
use crate::core::hash::HashStrategy;
use crate::core::types::{Commitment, Hash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Format version of exported records
pub const RECORD_VERSION: &str = "2.0";

/// A node a verifier recomputes to anchor an epoch's leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorEntry {
    /// Binary index at the time the epoch was recorded
    pub index: String,
    pub hash: Hash,
}

/// What one epoch publishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// 1-based; epoch 1 created the genesis leaf
    pub epoch: u64,
    /// Running commitment right after this epoch's leaf was placed
    pub commitment: Commitment,
    /// Encoded proof returned by the storage-proof primitive; the leaf content
    #[serde(with = "hex::serde")]
    pub proof_value: Vec<u8>,
    /// Encoded challenge the proof answers
    #[serde(with = "hex::serde")]
    pub challenge: Vec<u8>,
    pub leaf_index: String,
    pub leaf_sequence: u64,
    /// Ancestor set of the leaf, nearest first
    pub ancestors: Vec<AncestorEntry>,
}

impl EpochRecord {
    pub fn ancestor_indices(&self) -> Vec<&str> {
        self.ancestors.iter().map(|a| a.index.as_str()).collect()
    }
}

/// Ordered list of epoch records plus what a verifier needs to replay them.
///
/// The verification key is not part of the record; it travels separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub version: String,
    pub hash_strategy: HashStrategy,
    pub created_at: DateTime<Utc>,
    /// Encoded file tag
    #[serde(with = "hex::serde")]
    pub file_tag: Vec<u8>,
    pub epochs: Vec<EpochRecord>,
}

impl AuditRecord {
    pub fn new(hash_strategy: HashStrategy, file_tag: Vec<u8>) -> Self {
        Self {
            version: RECORD_VERSION.to_string(),
            hash_strategy,
            created_at: Utc::now(),
            file_tag,
            epochs: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn epoch(&self, epoch: u64) -> Option<&EpochRecord> {
        self.epochs.iter().find(|e| e.epoch == epoch)
    }

    /// Commitment published by the most recent epoch
    pub fn latest_commitment(&self) -> Option<Commitment> {
        self.epochs.last().map(|e| e.commitment)
    }

    /// Serialize record to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(CommitDagError::JsonSerialization)
    }

    /// Deserialize record from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let record: AuditRecord =
            serde_json::from_str(json).map_err(CommitDagError::JsonSerialization)?;
        if record.version != RECORD_VERSION {
            return Err(CommitDagError::internal(format!(
                "unsupported audit record version {} (expected {})",
                record.version, RECORD_VERSION
            )));
        }
        Ok(record)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
