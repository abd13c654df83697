//! Epoch chaining protocol
//!
//! Each epoch's storage proof becomes the next leaf of the tree; the resulting
//! commitment and ancestor set are published so the chain can be replayed.

pub mod chain;
pub mod record;
pub mod verify;

pub use chain::EpochChain;
pub use record::{AncestorEntry, AuditRecord, EpochRecord, RECORD_VERSION};
pub use verify::{ChainReport, ChainVerifier};
