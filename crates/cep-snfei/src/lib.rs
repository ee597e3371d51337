//! Identity normalization and fingerprint generation for civic entities.
//!
//! Many source systems spell the same civic entity differently. This crate
//! collapses those spellings into one deterministic fingerprint (SNFEI,
//! Sub-National Federated Entity Identifier):
//!
//! - Normalizers for legal names, street addresses, and registration dates
//! - Jurisdiction-aware localization applied before normalization
//! - SHA-256 fingerprint generation over a pipe-delimited canonical input
//! - Confidence tiering driven by a data table, not control flow
//! - A conformance-vector harness for byte-for-byte parity checks against
//!   other implementations
//!
//! All operations are pure: the same input always yields the same normalized
//! strings, the same intermediate hash input, and the same fingerprint.
//!
#![deny(missing_docs)]

/// Fingerprint generation and confidence tiering.
pub mod generator;
/// Jurisdiction-specific name rewrites.
pub mod localization;
/// Pure text normalizers and the canonical hash input.
pub mod normalizer;
/// Conformance test-vector file format and runner.
pub mod vectors;

pub use generator::{
    compute_snfei, generate_snfei, generate_snfei_simple, generate_snfei_with_confidence,
    generate_snfei_with_weights, ConfidenceWeights, Snfei, SnfeiResult,
};
pub use localization::{apply_localization, LocalizationTable};
pub use normalizer::{
    build_canonical_input, normalize_address, normalize_legal_name, normalize_registration_date,
    normalize_registration_date_strict, CanonicalInput,
};
pub use vectors::{
    run_manifest, run_vector, run_vector_file, Manifest, Vector, VectorError, VectorFile,
};
