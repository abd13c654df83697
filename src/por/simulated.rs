//! Privately verifiable linear-MAC proof of retrievability.
//!
//! Each block `m_i` gets the authenticator `sigma_i = f_k(i) + alpha * m_i`
//! over the field `2^61 - 1`. A challenge is a set of `(i, nu_i)` pairs; the
//! prover answers with `mu = sum(nu_i * m_i)` and `sigma = sum(nu_i * sigma_i)`,
//! and the verifier checks `sigma == sum(nu_i * f_k(i)) + alpha * mu`.
//!
//! Block values are taken from the block's SHA-256 digest. The verification
//! key is the secret key itself: anyone holding it can answer any challenge
//! without the file, so it is handed to the verifier privately and never
//! written to an audit record. This drives the epoch chain end to end; it is
//! not a secure storage proof.

use crate::core::error::{CommitDagError, Result};
use crate::core::hash::sha256;
use crate::por::StorageProofScheme;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

const MODULUS: u64 = (1 << 61) - 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedKey {
    pub key: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTag {
    pub file_id: [u8; 16],
    pub block_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// `(block index, coefficient)` pairs
    pub entries: Vec<(u64, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedProof {
    pub mu: u64,
    pub sigma: u64,
}

pub struct SimulatedPor {
    block_size: usize,
    challenge_size: usize,
    rng: Mutex<StdRng>,
}

impl SimulatedPor {
    pub fn new(block_size: usize, challenge_size: usize) -> Self {
        Self::with_rng(block_size, challenge_size, StdRng::from_entropy())
    }

    /// Deterministic keys, file ids and challenges
    pub fn with_seed(block_size: usize, challenge_size: usize, seed: u64) -> Self {
        Self::with_rng(block_size, challenge_size, StdRng::seed_from_u64(seed))
    }

    fn with_rng(block_size: usize, challenge_size: usize, rng: StdRng) -> Self {
        Self {
            block_size: block_size.max(1),
            challenge_size: challenge_size.max(1),
            rng: Mutex::new(rng),
        }
    }

    fn blocks<'a>(&self, file_data: &'a [u8]) -> Vec<&'a [u8]> {
        if file_data.is_empty() {
            return vec![file_data];
        }
        file_data.chunks(self.block_size).collect()
    }
}

impl StorageProofScheme for SimulatedPor {
    type PublicKey = SimulatedKey;
    type SecretKey = SimulatedKey;
    type Tag = FileTag;
    type Authenticators = Vec<u64>;
    type Challenge = Challenge;
    type Proof = AggregatedProof;

    fn keygen(&self) -> Result<(SimulatedKey, SimulatedKey)> {
        let mut key = [0u8; 32];
        self.rng.lock().fill_bytes(&mut key);
        let key = SimulatedKey { key };
        Ok((key.clone(), key))
    }

    fn tag(&self, secret_key: &SimulatedKey, file_data: &[u8]) -> Result<(FileTag, Vec<u64>)> {
        let mut file_id = [0u8; 16];
        self.rng.lock().fill_bytes(&mut file_id);

        let alpha = alpha(secret_key);
        let authenticators = self
            .blocks(file_data)
            .iter()
            .enumerate()
            .map(|(i, block)| {
                add_mod(
                    prf(secret_key, &file_id, i as u64),
                    mul_mod(alpha, block_value(block)),
                )
            })
            .collect::<Vec<_>>();

        let tag = FileTag {
            file_id,
            block_count: authenticators.len() as u64,
        };
        Ok((tag, authenticators))
    }

    fn challenge(&self, tag: &FileTag, _public_key: &SimulatedKey) -> Result<Challenge> {
        if tag.block_count == 0 {
            return Err(CommitDagError::primitive("cannot challenge a file with no blocks"));
        }

        let mut rng = self.rng.lock();
        let entries = (0..self.challenge_size)
            .map(|_| {
                (
                    rng.gen_range(0..tag.block_count),
                    rng.gen_range(1..MODULUS),
                )
            })
            .collect();
        Ok(Challenge { entries })
    }

    fn generate_proof(
        &self,
        challenge: &Challenge,
        authenticators: &Vec<u64>,
        _public_key: &SimulatedKey,
        file_data: &[u8],
    ) -> Result<AggregatedProof> {
        let blocks = self.blocks(file_data);
        let mut mu = 0;
        let mut sigma = 0;

        for &(i, nu) in &challenge.entries {
            let block = blocks.get(i as usize).ok_or_else(|| {
                CommitDagError::primitive(format!("challenged block {} is not stored", i))
            })?;
            let authenticator = authenticators.get(i as usize).ok_or_else(|| {
                CommitDagError::primitive(format!("no authenticator for block {}", i))
            })?;
            mu = add_mod(mu, mul_mod(nu, block_value(block)));
            sigma = add_mod(sigma, mul_mod(nu, *authenticator));
        }

        Ok(AggregatedProof { mu, sigma })
    }

    fn verify_proof(
        &self,
        tag: &FileTag,
        challenge: &Challenge,
        proof: &AggregatedProof,
        public_key: &SimulatedKey,
    ) -> Result<bool> {
        let mut expected = mul_mod(alpha(public_key), proof.mu);
        for &(i, nu) in &challenge.entries {
            if i >= tag.block_count {
                return Ok(false);
            }
            expected = add_mod(expected, mul_mod(nu, prf(public_key, &tag.file_id, i)));
        }
        Ok(expected == proof.sigma)
    }
}

fn field_element(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(word) % MODULUS
}

fn prf(key: &SimulatedKey, file_id: &[u8; 16], i: u64) -> u64 {
    let mut input = Vec::with_capacity(56);
    input.extend_from_slice(&key.key);
    input.extend_from_slice(file_id);
    input.extend_from_slice(&i.to_le_bytes());
    field_element(sha256(&input).as_bytes())
}

fn alpha(key: &SimulatedKey) -> u64 {
    let mut input = b"alpha".to_vec();
    input.extend_from_slice(&key.key);
    field_element(sha256(&input).as_bytes()).max(1)
}

fn block_value(block: &[u8]) -> u64 {
    field_element(sha256(block).as_bytes())
}

fn add_mod(a: u64, b: u64) -> u64 {
    ((a as u128 + b as u128) % MODULUS as u128) as u64
}

fn mul_mod(a: u64, b: u64) -> u64 {
    ((a as u128 * b as u128) % MODULUS as u128) as u64
}
