//! Units of data admitted to the tree as leaves

use crate::core::error::{CommitDagError, Result};
use crate::core::hash::{hash_file, HashStrategy};
use crate::core::types::Hash;
use std::path::{Path, PathBuf};

/// Anything that can become a leaf.
///
/// `calculate_hash` must be deterministic; it may only fail on I/O.
pub trait Content {
    fn calculate_hash(&self, strategy: HashStrategy) -> Result<Hash>;

    /// Opaque payload carried by the leaf
    fn data(&self) -> &[u8];
}

/// Owned byte payload, e.g. a serialized epoch proof
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytesContent(Vec<u8>);

impl BytesContent {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Content for BytesContent {
    fn calculate_hash(&self, strategy: HashStrategy) -> Result<Hash> {
        Ok(strategy.digest(&self.0))
    }

    fn data(&self) -> &[u8] {
        &self.0
    }
}

impl Content for Vec<u8> {
    fn calculate_hash(&self, strategy: HashStrategy) -> Result<Hash> {
        Ok(strategy.digest(self))
    }

    fn data(&self) -> &[u8] {
        self
    }
}

impl Content for String {
    fn calculate_hash(&self, strategy: HashStrategy) -> Result<Hash> {
        Ok(strategy.digest(self.as_bytes()))
    }

    fn data(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// A file on disk, hashed by streaming its contents on every call.
///
/// The payload is the path; the file is re-read whenever the hash is needed,
/// so a file that disappears or changes shows up during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    path: PathBuf,
    path_bytes: Vec<u8>,
}

impl FileContent {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let path_bytes = path.to_string_lossy().into_owned().into_bytes();
        Self { path, path_bytes }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Content for FileContent {
    fn calculate_hash(&self, strategy: HashStrategy) -> Result<Hash> {
        hash_file(strategy, &self.path).map_err(|e| {
            CommitDagError::hash_error(format!("failed to hash {}: {}", self.path.display(), e))
        })
    }

    fn data(&self) -> &[u8] {
        &self.path_bytes
    }
}
