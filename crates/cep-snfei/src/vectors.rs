//! Conformance test-vector file format and runner.
//!
//! The pipeline must be drivable by externally supplied vector files so that
//! independent implementations can be checked byte-for-byte against the same
//! fixtures. A vector file is a JSON document:
//!
//! ```json
//! {
//!   "description": "...",
//!   "vectors": [
//!     {
//!       "id": "gen_001",
//!       "function": "generate_snfei",
//!       "input": {"legal_name": "Springfield USD", "country_code": "US"},
//!       "expected": {},
//!       "intermediate": {"canonical_string": "springfield unified school district||US|"},
//!       "equivalentInputs": ["SPRINGFIELD USD"]
//!     }
//!   ]
//! }
//! ```
//!
//! Every field of `expected` and `intermediate` is optional; present fields
//! are compared, absent fields are skipped.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::generator::{generate_snfei, generate_snfei_simple, generate_snfei_with_confidence};
use crate::localization::apply_localization;
use crate::normalizer::{normalize_address, normalize_legal_name, normalize_registration_date};

/// Failures raised while loading or running conformance vectors.
#[derive(Error, Debug)]
pub enum VectorError {
    /// Vector file could not be read.
    #[error("I/O error reading vector file: {0}")]
    Io(#[from] std::io::Error),
    /// Vector file was not valid JSON of the expected shape.
    #[error("vector file parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// A vector named a function this runner does not know.
    #[error("vector {id}: unknown function '{function}'")]
    UnknownFunction {
        /// Vector identifier.
        id: String,
        /// The unrecognized function name.
        function: String,
    },
    /// A vector omitted an input field its function requires.
    #[error("vector {id}: missing input field '{field}'")]
    MissingInput {
        /// Vector identifier.
        id: String,
        /// The missing input field.
        field: String,
    },
    /// Actual output disagreed with the expected value.
    #[error("vector {id}: {detail}")]
    Mismatch {
        /// Vector identifier.
        id: String,
        /// Human-readable description of the disagreement.
        detail: String,
    },
}

/// A file of conformance vectors.
#[derive(Debug, Deserialize)]
pub struct VectorFile {
    /// Optional human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// The vectors to run.
    pub vectors: Vec<Vector>,
}

/// One conformance vector: literal input, expected output, and (for
/// fingerprint generation) expected intermediate values.
#[derive(Debug, Deserialize)]
pub struct Vector {
    /// Stable identifier used in failure reports.
    pub id: String,
    /// Which pipeline function the vector exercises.
    pub function: String,
    /// Literal input fields.
    pub input: VectorInput,
    /// Expected outputs; absent fields are not compared.
    #[serde(default)]
    pub expected: VectorExpected,
    /// Expected intermediate values for fingerprint generation.
    #[serde(default)]
    pub intermediate: Option<VectorIntermediate>,
    /// Alternate spellings that must produce the same fingerprint as the
    /// primary input.
    #[serde(default, rename = "equivalentInputs")]
    pub equivalent_inputs: Vec<String>,
}

/// Literal input fields; which ones are required depends on the function.
#[derive(Debug, Default, Deserialize)]
pub struct VectorInput {
    /// Raw legal name.
    #[serde(default)]
    pub legal_name: Option<String>,
    /// ISO country code.
    #[serde(default)]
    pub country_code: Option<String>,
    /// Raw street address.
    #[serde(default)]
    pub address: Option<String>,
    /// Raw registration date.
    #[serde(default)]
    pub registration_date: Option<String>,
    /// Raw date input for date-normalization vectors.
    #[serde(default)]
    pub date_str: Option<String>,
    /// Jurisdiction code for localization.
    #[serde(default)]
    pub jurisdiction: Option<String>,
    /// Raw name for localization vectors.
    #[serde(default)]
    pub name: Option<String>,
}

/// Expected outputs; only present fields are compared.
#[derive(Debug, Default, Deserialize)]
pub struct VectorExpected {
    /// Expected normalized string (null means "normalizes to absent").
    #[serde(default)]
    pub normalized: Option<String>,
    /// Expected localized string.
    #[serde(default)]
    pub localized: Option<String>,
    /// Expected fingerprint value.
    #[serde(default)]
    pub snfei: Option<String>,
    /// Expected confidence tier.
    #[serde(default)]
    pub tier: Option<u8>,
    /// Expected confidence score.
    #[serde(default)]
    pub confidence_score: Option<f64>,
}

/// Expected intermediate values for `generate_snfei` vectors.
#[derive(Debug, Default, Deserialize)]
pub struct VectorIntermediate {
    /// The full pipe-delimited hash input.
    #[serde(default)]
    pub canonical_string: Option<String>,
    /// Normalized legal name segment.
    #[serde(default)]
    pub legal_name_normalized: Option<String>,
    /// Normalized address segment (empty string for absent).
    #[serde(default)]
    pub address_normalized: Option<String>,
    /// Normalized registration date segment (empty string for absent).
    #[serde(default)]
    pub registration_date: Option<String>,
}

fn require<'a>(
    id: &str,
    field: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str, VectorError> {
    value.as_deref().ok_or_else(|| VectorError::MissingInput {
        id: id.to_string(),
        field: field.to_string(),
    })
}

fn mismatch(id: &str, detail: String) -> VectorError {
    VectorError::Mismatch {
        id: id.to_string(),
        detail,
    }
}

fn compare(id: &str, what: &str, actual: &str, expected: &str) -> Result<(), VectorError> {
    if actual == expected {
        Ok(())
    } else {
        Err(mismatch(
            id,
            format!("{what}: expected '{expected}', got '{actual}'"),
        ))
    }
}

/// Runs a single conformance vector.
pub fn run_vector(vector: &Vector) -> Result<(), VectorError> {
    let id = &vector.id;
    let input = &vector.input;
    let expected = &vector.expected;

    match vector.function.as_str() {
        "normalize_legal_name" => {
            let actual = normalize_legal_name(require(id, "legal_name", &input.legal_name)?);
            if let Some(want) = &expected.normalized {
                compare(id, "normalized name", &actual, want)?;
            }
        }
        "normalize_address" => {
            let actual = normalize_address(require(id, "address", &input.address)?);
            if let Some(want) = &expected.normalized {
                compare(id, "normalized address", &actual, want)?;
            }
        }
        "normalize_registration_date" => {
            let actual =
                normalize_registration_date(require(id, "date_str", &input.date_str)?);
            if actual.as_deref() != expected.normalized.as_deref() {
                return Err(mismatch(
                    id,
                    format!(
                        "normalized date: expected {:?}, got {:?}",
                        expected.normalized, actual
                    ),
                ));
            }
        }
        "apply_localization" => {
            let name = require(id, "name", &input.name)?;
            let jurisdiction = input.jurisdiction.as_deref().unwrap_or("");
            let actual = apply_localization(name, jurisdiction);
            if let Some(want) = &expected.localized {
                compare(id, "localized name", &actual, want)?;
            }
        }
        "generate_snfei" => {
            let mut legal_name = require(id, "legal_name", &input.legal_name)?.to_string();
            let country_code = require(id, "country_code", &input.country_code)?;
            if let Some(jurisdiction) = input.jurisdiction.as_deref() {
                legal_name = apply_localization(&legal_name, jurisdiction);
            }
            let (snfei, canonical) = generate_snfei(
                &legal_name,
                country_code,
                input.address.as_deref(),
                input.registration_date.as_deref(),
            );
            if let Some(want) = &expected.snfei {
                compare(id, "snfei", snfei.as_str(), want)?;
            }
            if let Some(intermediate) = &vector.intermediate {
                if let Some(want) = &intermediate.canonical_string {
                    compare(id, "canonical string", &canonical.to_hash_string(), want)?;
                }
                if let Some(want) = &intermediate.legal_name_normalized {
                    compare(id, "normalized name", &canonical.legal_name_normalized, want)?;
                }
                if let Some(want) = &intermediate.address_normalized {
                    let actual = canonical.address_normalized.as_deref().unwrap_or("");
                    compare(id, "normalized address", actual, want)?;
                }
                if let Some(want) = &intermediate.registration_date {
                    let actual = canonical.registration_date.as_deref().unwrap_or("");
                    compare(id, "normalized date", actual, want)?;
                }
            }
            for equivalent in &vector.equivalent_inputs {
                let alternate = generate_snfei_simple(equivalent, country_code, None);
                if alternate != snfei.as_str() {
                    return Err(mismatch(
                        id,
                        format!("equivalent input '{equivalent}' produced a different fingerprint"),
                    ));
                }
            }
        }
        "generate_snfei_with_confidence" => {
            let legal_name = require(id, "legal_name", &input.legal_name)?;
            let country_code = require(id, "country_code", &input.country_code)?;
            let result = generate_snfei_with_confidence(
                legal_name,
                country_code,
                input.address.as_deref(),
                input.registration_date.as_deref(),
                None,
                None,
            );
            if let Some(want) = expected.tier {
                if result.tier != want {
                    return Err(mismatch(
                        id,
                        format!("tier: expected {want}, got {}", result.tier),
                    ));
                }
            }
            if let Some(want) = expected.confidence_score {
                if (result.confidence_score - want).abs() > 1e-6 {
                    return Err(mismatch(
                        id,
                        format!(
                            "confidence: expected {want}, got {}",
                            result.confidence_score
                        ),
                    ));
                }
            }
        }
        other => {
            return Err(VectorError::UnknownFunction {
                id: id.to_string(),
                function: other.to_string(),
            });
        }
    }

    Ok(())
}

/// Loads a vector file and runs every vector in it, returning how many ran.
pub fn run_vector_file(path: impl AsRef<Path>) -> Result<usize, VectorError> {
    let text = fs::read_to_string(path)?;
    let file: VectorFile = serde_json::from_str(&text)?;
    for vector in &file.vectors {
        run_vector(vector)?;
    }
    Ok(file.vectors.len())
}

/// A manifest naming vector files per category and version.
#[derive(Debug, Deserialize)]
pub struct Manifest {
    /// Vector categories by name (e.g. `snfei`).
    pub vectors: std::collections::BTreeMap<String, ManifestCategory>,
}

/// One vector category in a manifest.
#[derive(Debug, Deserialize)]
pub struct ManifestCategory {
    /// Versions of this category's vector set.
    pub versions: std::collections::BTreeMap<String, ManifestVersion>,
}

/// One version of a vector set.
#[derive(Debug, Deserialize)]
pub struct ManifestVersion {
    /// Lifecycle status; only `current` versions are run.
    pub status: String,
    /// Vector files, relative to the manifest.
    pub files: Vec<String>,
}

/// Runs every file of every `current` version named by a manifest,
/// returning how many vectors ran.
pub fn run_manifest(path: impl AsRef<Path>) -> Result<usize, VectorError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let manifest: Manifest = serde_json::from_str(&text)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    let mut total = 0;
    for category in manifest.vectors.values() {
        for version in category.versions.values() {
            if version.status != "current" {
                continue;
            }
            for file in &version.files {
                total += run_vector_file(base.join(file))?;
            }
        }
    }
    Ok(total)
}
