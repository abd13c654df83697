//! Drives the tree across epochs with proofs from the storage-proof primitive

use crate::core::content::BytesContent;
use crate::core::error::Result;
use crate::core::hash::HashStrategy;
use crate::dag::{NodeSnapshot, SharedTree};
use crate::epoch::record::{AncestorEntry, AuditRecord, EpochRecord};
use crate::por::{encode, StorageProofScheme};
use tracing::{info, warn};

/// Prover side of the protocol: one stored file, one tree, one audit record
pub struct EpochChain<S: StorageProofScheme> {
    scheme: S,
    public_key: S::PublicKey,
    tag: S::Tag,
    authenticators: S::Authenticators,
    file_data: Vec<u8>,
    strategy: HashStrategy,
    retry_limit: u32,
    tree: Option<SharedTree<BytesContent>>,
    record: AuditRecord,
}

impl<S: StorageProofScheme> EpochChain<S> {
    /// Generate keys and tag the file. The secret key is only needed here.
    pub fn store(scheme: S, file_data: Vec<u8>, strategy: HashStrategy) -> Result<Self> {
        let (public_key, secret_key) = scheme.keygen()?;
        let (tag, authenticators) = scheme.tag(&secret_key, &file_data)?;
        let record = AuditRecord::new(strategy, encode(&tag)?);

        info!(bytes = file_data.len(), strategy = %strategy, "stored file for epoch proofs");
        Ok(Self {
            scheme,
            public_key,
            tag,
            authenticators,
            file_data,
            strategy,
            retry_limit: 0,
            tree: None,
            record,
        })
    }

    /// Extra attempts per epoch when a primitive call fails
    pub fn with_retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    /// Run one epoch: challenge, prove, append the proof as the next leaf,
    /// record the result.
    ///
    /// The tree is only touched once the proof has been fully obtained, so a
    /// failed or cancelled primitive call leaves no trace.
    pub fn run_epoch(&mut self) -> Result<EpochRecord> {
        let epoch = self.record.epochs.len() as u64 + 1;

        let challenge = self.scheme.challenge(&self.tag, &self.public_key)?;
        let proof = self.scheme.generate_proof(
            &challenge,
            &self.authenticators,
            &self.public_key,
            &self.file_data,
        )?;
        let proof_value = encode(&proof)?;
        let challenge = encode(&challenge)?;
        let content = BytesContent::new(proof_value.clone());

        let (commitment, leaf, ancestors) = match self.tree.clone() {
            Some(tree) => {
                let outcome = tree.append(content)?;
                (outcome.commitment, outcome.leaf, outcome.ancestors)
            }
            None => {
                let tree = SharedTree::initialize(content, self.strategy)?;
                let (commitment, genesis) = {
                    let view = tree.read();
                    (view.running_commitment(), NodeSnapshot::from(view.genesis()))
                };
                self.tree = Some(tree);
                (commitment, genesis.clone(), vec![genesis])
            }
        };

        let entry = EpochRecord {
            epoch,
            commitment,
            proof_value,
            challenge,
            leaf_index: leaf.index,
            leaf_sequence: leaf.sequence,
            ancestors: ancestors
                .into_iter()
                .map(|a| AncestorEntry {
                    index: a.index,
                    hash: a.hash,
                })
                .collect(),
        };
        self.record.epochs.push(entry.clone());

        info!(
            epoch,
            commitment = %entry.commitment,
            leaf = %entry.leaf_index,
            ancestors = entry.ancestors.len(),
            "epoch committed"
        );
        Ok(entry)
    }

    /// Run `count` epochs, retrying retryable failures up to the retry limit.
    /// A retried epoch becomes the next append; nothing is overwritten.
    pub fn run_epochs(&mut self, count: u64) -> Result<()> {
        for _ in 0..count {
            let mut attempt = 0;
            loop {
                match self.run_epoch() {
                    Ok(_) => break,
                    Err(e) if e.is_retryable() && attempt < self.retry_limit => {
                        attempt += 1;
                        warn!(attempt, error = %e, "epoch failed, retrying");
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(())
    }

    /// Number of epochs committed so far
    pub fn current_epoch(&self) -> u64 {
        self.record.epochs.len() as u64
    }

    pub fn record(&self) -> &AuditRecord {
        &self.record
    }

    pub fn into_record(self) -> AuditRecord {
        self.record
    }

    pub fn tree(&self) -> Option<&SharedTree<BytesContent>> {
        self.tree.as_ref()
    }

    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    /// Verification key a [`ChainVerifier`](crate::epoch::ChainVerifier)
    /// needs; for privately verifiable schemes it must not be published
    pub fn public_key(&self) -> &S::PublicKey {
        &self.public_key
    }

    pub fn tag(&self) -> &S::Tag {
        &self.tag
    }
}
