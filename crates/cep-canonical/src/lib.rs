//! Canonical data model primitives for Civic Exchange Protocol records.
//!
//! Every value that participates in hashing lives in this crate:
//!
//! - [`CanonicalTimestamp`]: microsecond-precision UTC instants
//! - [`CanonicalHash`]: SHA-256 digests with a lowercase-hex canonical form
//! - [`Canonicalize`]: the trait producing one deterministic string per record
//! - [`Attestation`]: proof-of-origin block attached to every record
//!
//! The same logical record must produce the same canonical string and digest
//! in every conforming implementation, regardless of language or insertion
//! order. All types here are immutable values; updates return new values.
//!
#![deny(missing_docs)]

/// Attestation block and proof purpose.
pub mod attestation;
/// Canonicalization trait and field helpers.
pub mod canonical;
/// Error types shared across the protocol crates.
pub mod error;
/// SHA-256 digest primitive.
pub mod hash;
/// Microsecond-precision UTC timestamps.
pub mod timestamp;
/// Schema version constants.
pub mod version;

pub use attestation::{Attestation, ProofPurpose};
pub use canonical::{
    format_amount, format_bool, format_share, insert_if_present, insert_required, CanonicalFields,
    Canonicalize,
};
pub use error::{CepError, CepResult};
pub use hash::CanonicalHash;
pub use timestamp::CanonicalTimestamp;
pub use version::SCHEMA_VERSION;
