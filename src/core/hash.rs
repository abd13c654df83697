//! Hash utilities for CommitDAG

use crate::core::types::Hash;
use digest::DynDigest;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512_256};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

/// Hash function fixed for the lifetime of a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashStrategy {
    #[default]
    Sha256,
    Sha512_256,
}

impl HashStrategy {
    /// Hash a single buffer
    pub fn digest(self, data: &[u8]) -> Hash {
        match self {
            HashStrategy::Sha256 => Hash::from_bytes(Sha256::digest(data).into()),
            HashStrategy::Sha512_256 => Hash::from_bytes(Sha512_256::digest(data).into()),
        }
    }

    /// `H(left || right)`, used for intermediate nodes and commitment folding
    pub fn hash_pair(self, left: &Hash, right: &Hash) -> Hash {
        let mut hasher = self.streaming();
        hasher.update(left.as_bytes());
        hasher.update(right.as_bytes());
        hasher.finalize()
    }

    /// Start an incremental hash with this strategy
    pub fn streaming(self) -> StreamingHasher {
        StreamingHasher::new(self)
    }

    pub fn name(self) -> &'static str {
        match self {
            HashStrategy::Sha256 => "sha256",
            HashStrategy::Sha512_256 => "sha512_256",
        }
    }
}

impl fmt::Display for HashStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "sha256" => Ok(HashStrategy::Sha256),
            "sha512_256" => Ok(HashStrategy::Sha512_256),
            other => Err(format!("unknown hash strategy: {}", other)),
        }
    }
}

/// Compute SHA-256 hash of data
pub fn sha256(data: &[u8]) -> Hash {
    HashStrategy::Sha256.digest(data)
}

/// Fold an ancestor set into the commitment covering `leaf`.
///
/// Ancestors are given nearest first, as produced by the bit-zeroing walk;
/// each one sits to the left of everything folded so far.
pub fn fold_commitment<'a, I>(strategy: HashStrategy, leaf: &Hash, ancestors: I) -> Hash
where
    I: IntoIterator<Item = &'a Hash>,
{
    ancestors
        .into_iter()
        .fold(*leaf, |acc, ancestor| strategy.hash_pair(ancestor, &acc))
}

/// Hash a file with the given strategy
pub fn hash_file(strategy: HashStrategy, path: &Path) -> io::Result<Hash> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = strategy.streaming();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}

/// Incremental hasher over any supported strategy
pub struct StreamingHasher {
    hasher: Box<dyn DynDigest>,
}

impl StreamingHasher {
    /// Create a new streaming hasher
    pub fn new(strategy: HashStrategy) -> Self {
        let hasher: Box<dyn DynDigest> = match strategy {
            HashStrategy::Sha256 => Box::new(Sha256::new()),
            HashStrategy::Sha512_256 => Box::new(Sha512_256::new()),
        };
        Self { hasher }
    }

    /// Update the hash with new data
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Finalize the hash and return the result
    pub fn finalize(self) -> Hash {
        let out = self.hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&out);
        Hash::from_bytes(bytes)
    }
}
