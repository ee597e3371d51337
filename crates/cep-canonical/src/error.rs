use thiserror::Error;

/// Errors raised by canonicalization, record construction, and verification.
#[derive(Error, Debug)]
pub enum CepError {
    /// Timestamp or date input could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// Hash text was not 64 hex characters.
    #[error("invalid hash: expected 64 hex characters, got '{0}'")]
    InvalidHash(String),
    /// Identifier did not match its scheme's format.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    /// One or more required fields were absent. All missing keys are reported
    /// together rather than one at a time.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    /// Record carried a schema version this implementation does not support.
    #[error("unsupported schema version: {0}")]
    UnsupportedVersion(String),
    /// Recomputed digest disagreed with the stored value.
    #[error("hash verification failed: expected {expected}, got {actual}")]
    HashMismatch {
        /// Digest recomputed from the canonical string.
        expected: String,
        /// Digest claimed by the record under verification.
        actual: String,
    },
    /// Parent digest or revision number inconsistency in a revision chain.
    #[error("revision chain error: {0}")]
    RevisionChain(String),
    /// Structural invariant violated at construction or `validate()`.
    #[error("validation error: {0}")]
    Validation(String),
    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias used throughout the protocol crates.
pub type CepResult<T> = Result<T, CepError>;
