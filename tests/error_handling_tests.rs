//! Error taxonomy and failure behaviour

use commitdag::{
    BytesContent, CommitDagError, Content, FileContent, Hash, HashStrategy, IndexedAppendTree,
    MismatchKind, Result,
};
use std::cell::Cell;
use tempfile::TempDir;

/// Content whose hashing fails a fixed number of times
struct FlakyContent {
    payload: Vec<u8>,
    failures: Cell<u32>,
}

impl FlakyContent {
    fn new(payload: &[u8], failures: u32) -> Self {
        Self {
            payload: payload.to_vec(),
            failures: Cell::new(failures),
        }
    }
}

impl Content for FlakyContent {
    fn calculate_hash(&self, strategy: HashStrategy) -> Result<Hash> {
        if self.failures.get() > 0 {
            self.failures.set(self.failures.get() - 1);
            return Err(CommitDagError::hash_error("device not ready"));
        }
        Ok(strategy.digest(&self.payload))
    }

    fn data(&self) -> &[u8] {
        &self.payload
    }
}

#[test]
fn test_initialize_propagates_hash_error() {
    let result = IndexedAppendTree::initialize(FlakyContent::new(b"a", 1), HashStrategy::Sha256);
    assert!(matches!(result, Err(CommitDagError::HashError { .. })));
}

#[test]
fn test_hash_error_leaves_tree_unchanged() {
    let mut tree =
        IndexedAppendTree::initialize(FlakyContent::new(b"a", 0), HashStrategy::Sha256).unwrap();
    tree.append(FlakyContent::new(b"b", 0)).unwrap();

    let commitment = tree.running_commitment();
    let (len, width) = (tree.len(), tree.width());

    // The pending (ab) merge must not run when the leaf cannot be hashed
    let err = tree.append(FlakyContent::new(b"c", 1)).unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(tree.len(), len);
    assert_eq!(tree.width(), width);
    assert_eq!(tree.running_commitment(), commitment);
    assert!(!tree.is_poisoned());

    let outcome = tree.append(FlakyContent::new(b"c", 0)).unwrap();
    assert_eq!(outcome.leaf.index, "10");
    tree.verify_structure().unwrap();
}

#[test]
fn test_missing_file_is_hash_error() {
    let dir = TempDir::new().unwrap();
    let missing = FileContent::new(dir.path().join("gone.bin"));
    let result = IndexedAppendTree::initialize(missing, HashStrategy::Sha256);
    assert!(matches!(result, Err(CommitDagError::HashError { .. })));
}

#[test]
fn test_removed_file_fails_recompute() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("leaf.bin");
    std::fs::write(&path, b"payload").unwrap();

    let tree = IndexedAppendTree::initialize(FileContent::new(&path), HashStrategy::Sha256)
        .unwrap();
    assert_eq!(tree.recompute_hash("0").unwrap(), HashStrategy::Sha256.digest(b"payload"));

    std::fs::remove_file(&path).unwrap();
    assert!(matches!(
        tree.recompute_hash("0"),
        Err(CommitDagError::HashError { .. })
    ));
}

#[test]
fn test_node_not_found() {
    let tree = IndexedAppendTree::initialize(BytesContent::new(b"a".to_vec()), HashStrategy::Sha256)
        .unwrap();
    for query in ["1", "01", "x"] {
        assert!(matches!(
            tree.recompute_hash(query),
            Err(CommitDagError::NodeNotFound { .. })
        ));
        assert!(matches!(
            tree.commitment_for(query),
            Err(CommitDagError::NodeNotFound { .. })
        ));
    }
}

#[test]
fn test_error_classification() {
    assert!(CommitDagError::hash_error("x").is_retryable());
    assert!(CommitDagError::primitive("x").is_retryable());
    assert!(!CommitDagError::structural("x").is_retryable());
    assert!(!CommitDagError::node_not_found("0").is_retryable());

    let mismatch = CommitDagError::audit_mismatch(3, MismatchKind::Cryptographic, "bad proof");
    assert_eq!(mismatch.audit_failure(), Some((3, MismatchKind::Cryptographic)));
    assert!(!mismatch.is_retryable());
    assert_eq!(
        mismatch.to_string(),
        "Audit mismatch at epoch 3 (cryptographic): bad proof"
    );
    assert_eq!(CommitDagError::structural("x").audit_failure(), None);
}
