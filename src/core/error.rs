//! Error types for CommitDAG

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which layer of the audit replay rejected an epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchKind {
    /// A recorded hash, index or commitment does not replay (tampering)
    Structural,
    /// The storage-proof primitive rejected the epoch's proof (forged proof)
    Cryptographic,
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchKind::Structural => write!(f, "structural"),
            MismatchKind::Cryptographic => write!(f, "cryptographic"),
        }
    }
}

/// Main error type for CommitDAG operations
#[derive(Error, Debug)]
pub enum CommitDagError {
    /// Content hashing failed; the operation left the tree unchanged
    #[error("Hash error: {reason}")]
    HashError { reason: String },

    /// Index collision or missing child; the tree instance is no longer usable
    #[error("Structural error: {reason}")]
    StructuralError { reason: String },

    /// Replay found a hash or primitive-verification mismatch
    #[error("Audit mismatch at epoch {epoch} ({kind}): {reason}")]
    AuditMismatch {
        epoch: u64,
        kind: MismatchKind,
        reason: String,
    },

    #[error("Node not found: {index}")]
    NodeNotFound { index: String },

    /// Storage-proof primitive errors
    #[error("Storage-proof primitive failed: {reason}")]
    PrimitiveError { reason: String },

    /// Configuration errors
    #[error("Configuration error: {reason}")]
    ConfigurationError { reason: String },

    #[error("Home directory not found")]
    HomeDirectoryNotFound,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Hex encoding/decoding errors
    #[error("Hex encoding error: {0}")]
    HexError(#[from] hex::FromHexError),

    /// Generic error for unexpected conditions
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CommitDagError {
    /// Create a new hash error
    pub fn hash_error(reason: impl Into<String>) -> Self {
        Self::HashError {
            reason: reason.into(),
        }
    }

    /// Create a new structural error
    pub fn structural(reason: impl Into<String>) -> Self {
        Self::StructuralError {
            reason: reason.into(),
        }
    }

    /// Create a new audit mismatch error
    pub fn audit_mismatch(epoch: u64, kind: MismatchKind, reason: impl Into<String>) -> Self {
        Self::AuditMismatch {
            epoch,
            kind,
            reason: reason.into(),
        }
    }

    /// Create a new node not found error
    pub fn node_not_found(index: impl Into<String>) -> Self {
        Self::NodeNotFound {
            index: index.into(),
        }
    }

    /// Create a new primitive error
    pub fn primitive(reason: impl Into<String>) -> Self {
        Self::PrimitiveError {
            reason: reason.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::ConfigurationError {
            reason: reason.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the same call may be retried with the same input
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::HashError { .. } | Self::PrimitiveError { .. })
    }

    /// The failing epoch and layer, for audit mismatches
    pub fn audit_failure(&self) -> Option<(u64, MismatchKind)> {
        match self {
            Self::AuditMismatch { epoch, kind, .. } => Some((*epoch, *kind)),
            _ => None,
        }
    }
}

/// Result type alias for CommitDAG operations
pub type Result<T> = std::result::Result<T, CommitDagError>;
