//! Structural fingerprints for plans and other serializable values.

use blake3::Hasher;
use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(64);
        for b in &self.0 {
            use std::fmt::Write as _;
            let _ = write!(&mut s, "{:02x}", b);
        }
        s
    }
}

impl std::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

pub fn hash_bytes(bytes: &[u8]) -> Hash256 {
    let mut h = Hasher::new();
    h.update(bytes);
    Hash256(h.finalize().into())
}

/// Hash any serde-serializable value deterministically (via JSON).
/// Equal values always produce equal fingerprints.
pub fn fingerprint<T: Serialize>(v: &T) -> Result<Hash256> {
    let bytes = serde_json::to_vec(v).map_err(|e| Error::Hash(e.to_string()))?;
    Ok(hash_bytes(&bytes))
}
