//! Replay of an audit record
//!
//! The verifier rebuilds its own tree from the recorded proof values, so every
//! recorded index, ancestor hash and commitment is checked against hashes it
//! computed itself. Each epoch must also pass the primitive's own proof check
//! under a verification key supplied by the caller; the record never carries
//! one. The first failure rejects the chain as of that epoch.

use crate::core::content::BytesContent;
use crate::core::error::{CommitDagError, MismatchKind, Result};
use crate::core::hash::{fold_commitment, HashStrategy};
use crate::core::types::{Commitment, Hash};
use crate::dag::{IndexedAppendTree, NodeSnapshot};
use crate::epoch::record::{AuditRecord, EpochRecord};
use crate::por::{decode, StorageProofScheme};
use tracing::{debug, warn};

/// Outcome of a fully accepted replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    pub epochs_verified: u64,
    /// Commitment reproduced for every epoch, in order
    pub commitments: Vec<Commitment>,
}

impl ChainReport {
    pub fn final_commitment(&self) -> Option<Commitment> {
        self.commitments.last().copied()
    }
}

pub struct ChainVerifier<'a, S: StorageProofScheme> {
    scheme: &'a S,
    public_key: S::PublicKey,
}

impl<'a, S: StorageProofScheme> ChainVerifier<'a, S> {
    /// `public_key` is the verification key obtained out of band from the
    /// party that stored the file
    pub fn new(scheme: &'a S, public_key: S::PublicKey) -> Self {
        Self { scheme, public_key }
    }

    /// Replay every epoch of `record`.
    ///
    /// Returns `AuditMismatch` naming the first failing epoch and whether the
    /// hash replay (structural) or the proof check (cryptographic) rejected it.
    pub fn verify(&self, record: &AuditRecord) -> Result<ChainReport> {
        let tag: S::Tag = decode(&record.file_tag)?;

        let mut tree: Option<IndexedAppendTree<BytesContent>> = None;
        let mut commitments = Vec::with_capacity(record.epochs.len());

        for (position, entry) in record.epochs.iter().enumerate() {
            let expected_epoch = position as u64 + 1;
            let result = self
                .replay_hashes(&mut tree, record.hash_strategy, expected_epoch, entry)
                .and_then(|commitment| {
                    self.check_proof(&tag, expected_epoch, entry)?;
                    Ok(commitment)
                });

            match result {
                Ok(commitment) => {
                    debug!(epoch = expected_epoch, commitment = %commitment, "epoch verified");
                    commitments.push(commitment);
                }
                Err(e) => {
                    warn!(epoch = expected_epoch, error = %e, "audit replay rejected chain");
                    return Err(e);
                }
            }
        }

        Ok(ChainReport {
            epochs_verified: commitments.len() as u64,
            commitments,
        })
    }

    fn replay_hashes(
        &self,
        tree: &mut Option<IndexedAppendTree<BytesContent>>,
        strategy: HashStrategy,
        epoch: u64,
        entry: &EpochRecord,
    ) -> Result<Commitment> {
        let mismatch = |reason: String| {
            CommitDagError::audit_mismatch(epoch, MismatchKind::Structural, reason)
        };

        if entry.epoch != epoch {
            return Err(mismatch(format!(
                "expected epoch {}, record holds epoch {}",
                epoch, entry.epoch
            )));
        }

        let content = BytesContent::new(entry.proof_value.clone());
        let (leaf, ancestors) = match tree.as_mut() {
            Some(existing) => {
                let outcome = existing.append(content)?;
                (outcome.leaf, outcome.ancestors)
            }
            None => {
                let fresh = IndexedAppendTree::initialize(content, strategy)?;
                let genesis = NodeSnapshot::from(fresh.genesis());
                *tree = Some(fresh);
                (genesis.clone(), vec![genesis])
            }
        };
        let replayed = tree
            .as_ref()
            .ok_or_else(|| CommitDagError::internal("replay tree missing"))?;

        if leaf.index != entry.leaf_index || leaf.sequence != entry.leaf_sequence {
            return Err(mismatch(format!(
                "leaf recorded at {} (#{}) replays at {} (#{})",
                entry.leaf_index, entry.leaf_sequence, leaf.index, leaf.sequence
            )));
        }

        let replayed_indices: Vec<&str> = ancestors.iter().map(|a| a.index.as_str()).collect();
        if replayed_indices != entry.ancestor_indices() {
            return Err(mismatch(format!(
                "ancestor set {:?} replays as {:?}",
                entry.ancestor_indices(),
                replayed_indices
            )));
        }

        // Replayed hashes were all derived here from recorded proof values, so
        // one level of recomputation per ancestor is enough
        for ancestor in &entry.ancestors {
            let recomputed = replayed.recompute_local(&ancestor.index)?;
            if recomputed != ancestor.hash {
                return Err(mismatch(format!(
                    "ancestor {} recorded as {} recomputes to {}",
                    ancestor.index, ancestor.hash, recomputed
                )));
            }
        }

        let leaf_hash = strategy.digest(&entry.proof_value);
        let ancestor_hashes: Vec<&Hash> = entry
            .ancestors
            .iter()
            .filter(|a| a.index != entry.leaf_index)
            .map(|a| &a.hash)
            .collect();
        let recombined = fold_commitment(strategy, &leaf_hash, ancestor_hashes);

        if recombined != entry.commitment || replayed.running_commitment() != entry.commitment {
            return Err(mismatch(format!(
                "commitment {} does not match replayed {}",
                entry.commitment, recombined
            )));
        }

        Ok(recombined)
    }

    fn check_proof(
        &self,
        tag: &S::Tag,
        epoch: u64,
        entry: &EpochRecord,
    ) -> Result<()> {
        let mismatch = |reason: String| {
            CommitDagError::audit_mismatch(epoch, MismatchKind::Cryptographic, reason)
        };

        let challenge: S::Challenge = decode(&entry.challenge)
            .map_err(|e| mismatch(format!("challenge does not decode: {}", e)))?;
        let proof: S::Proof = decode(&entry.proof_value)
            .map_err(|e| mismatch(format!("proof does not decode: {}", e)))?;

        match self.scheme.verify_proof(tag, &challenge, &proof, &self.public_key) {
            Ok(true) => Ok(()),
            Ok(false) => Err(mismatch("storage proof rejected".to_string())),
            Err(e) => Err(mismatch(format!("storage proof check failed: {}", e))),
        }
    }
}
