//! CommitDAG - an append-only audit trail for continuous proofs of storage
//!
//! A remote party proves, epoch after epoch, that it still holds a file. Each
//! epoch's proof becomes the next leaf of an incremental, binary-indexed
//! authenticated tree; the running commitment and the leaf's ancestor set are
//! published so a verifier can later confirm that every epoch was produced in
//! order and none were skipped, replayed or forged.
//!
//! # Core Features
//!
//! - **Indexed Append Tree**: nodes addressed by binary index strings, grown
//!   strictly by append, never rebuilding an existing hash
//! - **Ancestor Sets**: for any leaf, the minimal existing commitments needed
//!   to anchor it in the running commitment
//! - **Epoch Chaining**: drives the tree with proofs from an external
//!   storage-proof scheme and records an exportable audit trail
//! - **Replay Verification**: fail-closed audit that names the first bad epoch
//!   and whether it was tampered with or carried a forged proof
//!
//! # Example Usage
//!
//! ```rust
//! use commitdag::{BytesContent, HashStrategy, IndexedAppendTree};
//!
//! let mut tree = IndexedAppendTree::initialize(
//!     BytesContent::new(b"a".to_vec()),
//!     HashStrategy::Sha256,
//! )?;
//! let outcome = tree.append(BytesContent::new(b"b".to_vec()))?;
//!
//! assert_eq!(outcome.leaf.index, "01");
//! assert_eq!(tree.commitment_for("01")?, outcome.commitment);
//! # Ok::<(), commitdag::CommitDagError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod dag;
pub mod epoch;
pub mod por;

// Re-export commonly used types
pub use core::{
    content::{BytesContent, Content, FileContent},
    error::{CommitDagError, MismatchKind, Result},
    hash::HashStrategy,
    types::{Commitment, Hash, NodeId, NodeKind},
};

pub use dag::{AppendOutcome, AppendStep, IndexedAppendTree, Node, NodeSnapshot, SharedTree};

pub use epoch::{AuditRecord, ChainReport, ChainVerifier, EpochChain, EpochRecord};

pub use por::{SimulatedPor, StorageProofScheme};

pub use config::ChainConfig;

/// Current version of CommitDAG
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
