//! Epoch chaining and audit replay tests

use commitdag::core::hash::fold_commitment;
use commitdag::epoch::AuditRecord;
use commitdag::por::{decode, encode, encode_hex};
use commitdag::{
    ChainVerifier, CommitDagError, EpochChain, Hash, HashStrategy, MismatchKind, Result,
    SimulatedPor, StorageProofScheme,
};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicU64, Ordering};

/// Deterministic scheme: epoch `n` is challenged with `n` and answered with
/// `n * 7 + file length`.
struct StubScheme {
    next_challenge: AtomicU64,
    /// Epoch whose proof is answered wrongly
    forge_at: Option<u64>,
    /// Challenge calls that fail before the first success
    failures: AtomicU64,
}

impl StubScheme {
    fn honest() -> Self {
        Self {
            next_challenge: AtomicU64::new(1),
            forge_at: None,
            failures: AtomicU64::new(0),
        }
    }

    fn forging_at(epoch: u64) -> Self {
        Self {
            forge_at: Some(epoch),
            ..Self::honest()
        }
    }

    fn failing(times: u64) -> Self {
        Self {
            failures: AtomicU64::new(times),
            ..Self::honest()
        }
    }
}

impl StorageProofScheme for StubScheme {
    type PublicKey = u64;
    type SecretKey = ();
    type Tag = u64;
    type Authenticators = ();
    type Challenge = u64;
    type Proof = u64;

    fn keygen(&self) -> Result<(u64, ())> {
        Ok((42, ()))
    }

    fn tag(&self, _secret_key: &(), file_data: &[u8]) -> Result<(u64, ())> {
        Ok((file_data.len() as u64, ()))
    }

    fn challenge(&self, _tag: &u64, _public_key: &u64) -> Result<u64> {
        if self.failures.load(Ordering::SeqCst) > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            return Err(CommitDagError::primitive("prover unreachable"));
        }
        Ok(self.next_challenge.fetch_add(1, Ordering::SeqCst))
    }

    fn generate_proof(
        &self,
        challenge: &u64,
        _authenticators: &(),
        _public_key: &u64,
        file_data: &[u8],
    ) -> Result<u64> {
        let honest = challenge * 7 + file_data.len() as u64;
        if self.forge_at == Some(*challenge) {
            return Ok(honest + 1);
        }
        Ok(honest)
    }

    fn verify_proof(&self, tag: &u64, challenge: &u64, proof: &u64, public_key: &u64) -> Result<bool> {
        Ok(*public_key == 42 && *proof == challenge * 7 + tag)
    }
}

fn run(scheme: StubScheme, epochs: u64) -> AuditRecord {
    let mut chain = EpochChain::store(scheme, b"stored file".to_vec(), HashStrategy::Sha256).unwrap();
    chain.run_epochs(epochs).unwrap();
    chain.into_record()
}

#[test]
fn test_three_epochs_replay_in_order() {
    let record = run(StubScheme::honest(), 3);
    assert_eq!(record.len(), 3);

    let epochs: Vec<u64> = record.epochs.iter().map(|e| e.epoch).collect();
    assert_eq!(epochs, vec![1, 2, 3]);
    let leaves: Vec<&str> = record.epochs.iter().map(|e| e.leaf_index.as_str()).collect();
    assert_eq!(leaves, vec!["0", "01", "10"]);

    // The recorded ancestor sets alone reproduce each recorded commitment
    for entry in &record.epochs {
        let leaf_hash = HashStrategy::Sha256.digest(&entry.proof_value);
        let others: Vec<&Hash> = entry
            .ancestors
            .iter()
            .filter(|a| a.index != entry.leaf_index)
            .map(|a| &a.hash)
            .collect();
        assert_eq!(
            fold_commitment(HashStrategy::Sha256, &leaf_hash, others),
            entry.commitment
        );
    }

    let scheme = StubScheme::honest();
    let report = ChainVerifier::new(&scheme, 42).verify(&record).unwrap();
    assert_eq!(report.epochs_verified, 3);
    let recorded: Vec<Hash> = record.epochs.iter().map(|e| e.commitment).collect();
    assert_eq!(report.commitments, recorded);
    assert_eq!(report.final_commitment(), record.latest_commitment());
}

#[test]
fn test_genesis_epoch_records_itself_as_ancestor() {
    let record = run(StubScheme::honest(), 1);
    let genesis = record.epoch(1).unwrap();
    assert_eq!(genesis.ancestor_indices(), vec!["0"]);
    assert_eq!(genesis.commitment, HashStrategy::Sha256.digest(&genesis.proof_value));
}

#[test]
fn test_corrupted_proof_value_fails_at_that_epoch() {
    let scheme = StubScheme::honest();
    let record = run(StubScheme::honest(), 5);

    for k in 1..=5u64 {
        let mut tampered = record.clone();
        let entry = &mut tampered.epochs[(k - 1) as usize];
        entry.proof_value[0] ^= 0x01;

        let err = ChainVerifier::new(&scheme, 42).verify(&tampered).unwrap_err();
        assert_eq!(err.audit_failure(), Some((k, MismatchKind::Structural)));
    }
}

#[test]
fn test_tampered_ancestor_hash_is_structural() {
    let scheme = StubScheme::honest();
    let mut record = run(StubScheme::honest(), 4);
    record.epochs[3].ancestors[0].hash = Hash::zero();

    let err = ChainVerifier::new(&scheme, 42).verify(&record).unwrap_err();
    assert_eq!(err.audit_failure(), Some((4, MismatchKind::Structural)));
}

#[test]
fn test_skipped_or_replayed_epoch_is_structural() {
    let scheme = StubScheme::honest();
    let record = run(StubScheme::honest(), 4);

    let mut skipped = record.clone();
    skipped.epochs.remove(1);
    let err = ChainVerifier::new(&scheme, 42).verify(&skipped).unwrap_err();
    assert_eq!(err.audit_failure(), Some((2, MismatchKind::Structural)));

    let mut replayed = record.clone();
    let repeat = replayed.epochs[2].clone();
    replayed.epochs.insert(3, repeat);
    let err = ChainVerifier::new(&scheme, 42).verify(&replayed).unwrap_err();
    assert_eq!(err.audit_failure(), Some((4, MismatchKind::Structural)));
}

#[test]
fn test_forged_proof_is_cryptographic() {
    let record = run(StubScheme::forging_at(2), 3);

    let scheme = StubScheme::honest();
    let err = ChainVerifier::new(&scheme, 42).verify(&record).unwrap_err();
    assert_eq!(err.audit_failure(), Some((2, MismatchKind::Cryptographic)));
}

#[test]
fn test_swapped_challenge_is_cryptographic() {
    let scheme = StubScheme::honest();
    let mut record = run(StubScheme::honest(), 3);
    record.epochs[2].challenge = encode(&99u64).unwrap();

    let err = ChainVerifier::new(&scheme, 42).verify(&record).unwrap_err();
    assert_eq!(err.audit_failure(), Some((3, MismatchKind::Cryptographic)));
}

#[test]
fn test_retry_becomes_next_append() {
    let mut chain =
        EpochChain::store(StubScheme::failing(2), b"stored file".to_vec(), HashStrategy::Sha256)
            .unwrap()
            .with_retry_limit(2);
    chain.run_epochs(2).unwrap();
    assert_eq!(chain.current_epoch(), 2);

    let challenges: Vec<u64> = chain
        .record()
        .epochs
        .iter()
        .map(|e| decode(&e.challenge).unwrap())
        .collect();
    assert_eq!(challenges, vec![1, 2]);

    let verifier_scheme = StubScheme::honest();
    ChainVerifier::new(&verifier_scheme, 42)
        .verify(chain.record())
        .unwrap();
}

#[test]
fn test_failed_epoch_leaves_tree_untouched() {
    let mut chain =
        EpochChain::store(StubScheme::honest(), b"stored file".to_vec(), HashStrategy::Sha256)
            .unwrap();
    chain.run_epochs(2).unwrap();
    let commitment = chain.tree().unwrap().running_commitment();
    let nodes = chain.tree().unwrap().len();

    chain.scheme().failures.store(5, Ordering::SeqCst);
    let err = chain.run_epochs(1).unwrap_err();
    assert!(matches!(err, CommitDagError::PrimitiveError { .. }));

    assert_eq!(chain.current_epoch(), 2);
    assert_eq!(chain.tree().unwrap().running_commitment(), commitment);
    assert_eq!(chain.tree().unwrap().len(), nodes);
}

#[test]
fn test_simulated_scheme_end_to_end() {
    let data: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
    let scheme = SimulatedPor::with_seed(256, 4, 11);
    let mut chain = EpochChain::store(scheme, data, HashStrategy::Sha512_256).unwrap();
    chain.run_epochs(6).unwrap();

    let json = chain.record().to_json().unwrap();
    let record = AuditRecord::from_json(&json).unwrap();
    assert_eq!(record.hash_strategy, HashStrategy::Sha512_256);

    let verifier_scheme = SimulatedPor::new(256, 4);
    let report = ChainVerifier::new(&verifier_scheme, chain.public_key().clone())
        .verify(&record)
        .unwrap();
    assert_eq!(report.epochs_verified, 6);
    assert_eq!(report.final_commitment(), chain.tree().map(|t| t.running_commitment()));
}

#[test]
fn test_simulated_record_does_not_carry_the_key() {
    let scheme = SimulatedPor::with_seed(64, 2, 3);
    let mut chain = EpochChain::store(scheme, vec![9u8; 512], HashStrategy::Sha256).unwrap();
    chain.run_epochs(2).unwrap();

    let key_hex = encode_hex(chain.public_key()).unwrap();
    let json = chain.record().to_json().unwrap();
    assert!(!json.contains(&key_hex));
}

#[test]
fn test_record_rebuilt_from_another_key_is_rejected() {
    let data: Vec<u8> = (0..2048u32).map(|i| (i % 199) as u8).collect();

    let honest_scheme = SimulatedPor::with_seed(128, 4, 21);
    let mut honest = EpochChain::store(honest_scheme, data.clone(), HashStrategy::Sha256).unwrap();
    honest.run_epochs(3).unwrap();

    // Self-consistent chain from a prover who never held the stored file's key
    let mut forged =
        EpochChain::store(SimulatedPor::with_seed(128, 4, 99), data, HashStrategy::Sha256).unwrap();
    forged.run_epochs(3).unwrap();

    let verifier_scheme = SimulatedPor::new(128, 4);
    let verifier = ChainVerifier::new(&verifier_scheme, honest.public_key().clone());
    verifier.verify(honest.record()).unwrap();

    let err = verifier.verify(forged.record()).unwrap_err();
    assert_eq!(err.audit_failure(), Some((1, MismatchKind::Cryptographic)));

    // Same forged epochs under the honest file tag
    let mut spliced = forged.record().clone();
    spliced.file_tag = honest.record().file_tag.clone();
    let err = verifier.verify(&spliced).unwrap_err();
    assert_eq!(err.audit_failure(), Some((1, MismatchKind::Cryptographic)));
}
