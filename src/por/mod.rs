//! Boundary to the storage-proof primitive
//!
//! The proof-of-retrievability scheme is an external collaborator. The epoch
//! chain only needs the five operations below and serializable key, tag,
//! challenge and proof values it can publish in the audit record.

pub mod simulated;

pub use simulated::SimulatedPor;

use crate::core::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A homomorphic-authenticator proof-of-retrievability scheme
pub trait StorageProofScheme {
    type PublicKey: Clone + Serialize + DeserializeOwned;
    type SecretKey;
    type Tag: Clone + Serialize + DeserializeOwned;
    type Authenticators;
    type Challenge: Clone + Serialize + DeserializeOwned;
    /// Aggregated data proof together with the aggregated authenticator proof
    type Proof: Clone + Serialize + DeserializeOwned;

    fn keygen(&self) -> Result<(Self::PublicKey, Self::SecretKey)>;

    /// Computed once, when the file is stored
    fn tag(
        &self,
        secret_key: &Self::SecretKey,
        file_data: &[u8],
    ) -> Result<(Self::Tag, Self::Authenticators)>;

    /// One per epoch
    fn challenge(&self, tag: &Self::Tag, public_key: &Self::PublicKey) -> Result<Self::Challenge>;

    fn generate_proof(
        &self,
        challenge: &Self::Challenge,
        authenticators: &Self::Authenticators,
        public_key: &Self::PublicKey,
        file_data: &[u8],
    ) -> Result<Self::Proof>;

    fn verify_proof(
        &self,
        tag: &Self::Tag,
        challenge: &Self::Challenge,
        proof: &Self::Proof,
        public_key: &Self::PublicKey,
    ) -> Result<bool>;
}

/// Canonical byte encoding of a scheme value
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}

/// Hex text form of a scheme value, used for key files
pub fn encode_hex<T: Serialize>(value: &T) -> Result<String> {
    Ok(hex::encode(encode(value)?))
}

pub fn decode_hex<T: DeserializeOwned>(text: &str) -> Result<T> {
    let bytes = hex::decode(text.trim())?;
    decode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::CommitDagError;

    #[test]
    fn test_hex_form_round_trips() {
        let text = encode_hex(&(7u64, vec![1u8, 2, 3])).unwrap();
        let value: (u64, Vec<u8>) = decode_hex(&format!("{}\n", text)).unwrap();
        assert_eq!(value, (7, vec![1, 2, 3]));
    }

    #[test]
    fn test_bad_hex_is_hex_error() {
        let result: Result<u64> = decode_hex("not hex");
        assert!(matches!(result, Err(CommitDagError::HexError(_))));
    }
}
