//! Core types and utilities for CommitDAG
//!
//! This module contains the fundamental data types, error handling,
//! hashing and the content abstraction used throughout the system.

pub mod content;
pub mod error;
pub mod hash;
pub mod types;

// Re-export commonly used items
pub use content::{BytesContent, Content, FileContent};
pub use error::{CommitDagError, MismatchKind, Result};
pub use hash::{fold_commitment, hash_file, sha256, HashStrategy};
pub use types::{Commitment, Hash, NodeId, NodeKind};
