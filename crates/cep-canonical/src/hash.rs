//! SHA-256 digest primitive with a lowercase-hex canonical form.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{CepError, CepResult};

/// A 32-byte SHA-256 digest.
///
/// The canonical textual form is 64 lowercase hex characters. Parsing accepts
/// any letter case but always normalizes to lowercase; wrong lengths and
/// non-hex characters are rejected, never truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalHash([u8; 32]);

impl CanonicalHash {
    /// Hashes the UTF-8 bytes of a canonical string.
    pub fn from_canonical_string(canonical: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Wraps raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parses a 64-character hex string of any letter case.
    pub fn from_hex(value: &str) -> CepResult<Self> {
        if value.len() != 64 {
            return Err(CepError::InvalidHash(value.to_string()));
        }
        let decoded =
            hex::decode(value).map_err(|_| CepError::InvalidHash(value.to_string()))?;
        let bytes: [u8; 32] = decoded
            .try_into()
            .map_err(|_| CepError::InvalidHash(value.to_string()))?;
        Ok(Self(bytes))
    }

    /// The canonical lowercase hex rendering.
    pub fn as_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for CanonicalHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl Serialize for CanonicalHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for CanonicalHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::from_hex(&value).map_err(de::Error::custom)
    }
}
