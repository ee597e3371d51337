//! Fingerprint generation and confidence tiering.
//!
//! The SNFEI (Sub-National Federated Entity Identifier) is the SHA-256 hash
//! of the pipe-delimited canonical input:
//!
//! ```text
//! SNFEI = SHA256(name_normalized|address_normalized|country_code|registration_date)
//! ```
//!
//! All inputs pass through the normalizers before hashing, so equivalent
//! spellings of the same entity produce the same fingerprint.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use cep_canonical::{CepError, CepResult};

use crate::normalizer::{build_canonical_input, CanonicalInput};

/// A validated fingerprint: 64 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snfei(String);

impl Snfei {
    /// Parses an existing fingerprint, normalizing letter case. Wrong length
    /// or non-hex characters are rejected.
    pub fn from_hash(hash: &str) -> CepResult<Self> {
        if hash.len() == 64 && hash.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(hash.to_lowercase()))
        } else {
            Err(CepError::InvalidIdentifier(format!(
                "SNFEI must be 64 hex characters: '{hash}'"
            )))
        }
    }

    /// The fingerprint value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Snfei {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Computes the fingerprint for already-normalized input.
pub fn compute_snfei(canonical: &CanonicalInput) -> Snfei {
    let mut hasher = Sha256::new();
    hasher.update(canonical.to_hash_string().as_bytes());
    Snfei(format!("{:x}", hasher.finalize()))
}

/// Generates a fingerprint from raw entity attributes.
///
/// Returns the fingerprint together with the canonical input so that callers
/// can inspect and reproduce the exact hash input.
pub fn generate_snfei(
    legal_name: &str,
    country_code: &str,
    address: Option<&str>,
    registration_date: Option<&str>,
) -> (Snfei, CanonicalInput) {
    let canonical = build_canonical_input(legal_name, country_code, address, registration_date);
    let snfei = compute_snfei(&canonical);
    (snfei, canonical)
}

/// Generates a fingerprint and returns just the hex value.
pub fn generate_snfei_simple(
    legal_name: &str,
    country_code: &str,
    address: Option<&str>,
) -> String {
    let (snfei, _) = generate_snfei(legal_name, country_code, address, None);
    snfei.0
}

/// Confidence weight table.
///
/// The mapping from corroborating fields to tier and score is data, not
/// control flow: it can be revised by deserializing a replacement table from
/// the conformance-vector set without touching the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    /// Score when a valid global LEI is present (tier 1).
    pub tier1_score: f64,
    /// Score when a valid federal UEI is present (tier 2).
    pub tier2_score: f64,
    /// Baseline score for name + country alone (tier 3).
    pub tier3_base: f64,
    /// Added when a street address corroborates the fingerprint.
    pub address_bonus: f64,
    /// Added when a registration date corroborates the fingerprint.
    pub registration_date_bonus: f64,
    /// Added when the normalized name has more than
    /// `descriptive_name_words` words.
    pub descriptive_name_bonus: f64,
    /// Word-count threshold for the descriptive-name bonus.
    pub descriptive_name_words: usize,
    /// Upper bound for tier-3 scores.
    pub tier3_cap: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            tier1_score: 1.0,
            tier2_score: 0.95,
            tier3_base: 0.5,
            address_bonus: 0.2,
            registration_date_bonus: 0.2,
            descriptive_name_bonus: 0.1,
            descriptive_name_words: 3,
            tier3_cap: 0.9,
        }
    }
}

/// Fingerprint plus confidence metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnfeiResult {
    /// The generated fingerprint.
    pub snfei: Snfei,
    /// The canonical input the fingerprint was computed from.
    pub canonical: CanonicalInput,
    /// Confidence score in `[0.0, 1.0]`.
    pub confidence_score: f64,
    /// Identifier tier (1, 2, or 3).
    pub tier: u8,
    /// Which input fields contributed.
    pub fields_used: Vec<String>,
}

fn looks_like_lei(value: &str) -> bool {
    value.len() == 20 && value.chars().all(|c| c.is_ascii_alphanumeric())
}

fn looks_like_uei(value: &str) -> bool {
    value.len() == 12
        && value
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Generates a fingerprint with confidence scoring under the default
/// weight table.
///
/// Tier 1: a valid LEI is present. Tier 2: a valid SAM UEI is present.
/// Tier 3: the fingerprint stands alone; its score starts at the baseline
/// and rises monotonically with each corroborating field, up to the cap.
pub fn generate_snfei_with_confidence(
    legal_name: &str,
    country_code: &str,
    address: Option<&str>,
    registration_date: Option<&str>,
    lei: Option<&str>,
    sam_uei: Option<&str>,
) -> SnfeiResult {
    generate_snfei_with_weights(
        legal_name,
        country_code,
        address,
        registration_date,
        lei,
        sam_uei,
        &ConfidenceWeights::default(),
    )
}

/// Generates a fingerprint with confidence scoring under an explicit
/// weight table.
#[allow(clippy::too_many_arguments)]
pub fn generate_snfei_with_weights(
    legal_name: &str,
    country_code: &str,
    address: Option<&str>,
    registration_date: Option<&str>,
    lei: Option<&str>,
    sam_uei: Option<&str>,
    weights: &ConfidenceWeights,
) -> SnfeiResult {
    let canonical = build_canonical_input(legal_name, country_code, address, registration_date);
    let snfei = compute_snfei(&canonical);
    let mut fields_used = vec!["legal_name".to_string(), "country_code".to_string()];

    if lei.is_some_and(looks_like_lei) {
        fields_used.insert(0, "lei".to_string());
        return SnfeiResult {
            snfei,
            canonical,
            confidence_score: weights.tier1_score,
            tier: 1,
            fields_used,
        };
    }

    if sam_uei.is_some_and(looks_like_uei) {
        fields_used.insert(0, "sam_uei".to_string());
        return SnfeiResult {
            snfei,
            canonical,
            confidence_score: weights.tier2_score,
            tier: 2,
            fields_used,
        };
    }

    let mut confidence = weights.tier3_base;
    if address.is_some() {
        fields_used.push("address".to_string());
        confidence += weights.address_bonus;
    }
    if registration_date.is_some() {
        fields_used.push("registration_date".to_string());
        confidence += weights.registration_date_bonus;
    }
    let word_count = canonical.legal_name_normalized.split_whitespace().count();
    if word_count > weights.descriptive_name_words {
        confidence += weights.descriptive_name_bonus;
    }
    confidence = confidence.min(weights.tier3_cap);

    SnfeiResult {
        snfei,
        canonical,
        confidence_score: confidence,
        tier: 3,
        fields_used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hash_validates_length_and_charset() {
        assert!(Snfei::from_hash(&"a".repeat(64)).is_ok());
        assert!(Snfei::from_hash(&"a".repeat(63)).is_err());
        assert!(Snfei::from_hash(&"g".repeat(64)).is_err());
    }

    #[test]
    fn from_hash_normalizes_case() {
        let snfei = Snfei::from_hash(&"A".repeat(64)).unwrap();
        assert_eq!(snfei.as_str(), "a".repeat(64));
    }

    #[test]
    fn generation_is_deterministic() {
        let (first, _) = generate_snfei("Springfield USD", "US", None, None);
        let (second, _) = generate_snfei("Springfield USD", "US", None, None);
        assert_eq!(first, second);
    }

    #[test]
    fn equivalent_spellings_share_a_fingerprint() {
        let a = generate_snfei_simple("Springfield Unified School District", "US", None);
        let b = generate_snfei_simple("SPRINGFIELD USD", "US", None);
        let c = generate_snfei_simple("springfield unified sch. dist.", "US", None);
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn address_changes_the_fingerprint() {
        let without = generate_snfei_simple("Acme Corp", "US", None);
        let with = generate_snfei_simple("Acme Corp", "US", Some("123 Main St"));
        assert_ne!(without, with);
    }

    #[test]
    fn registration_date_changes_the_fingerprint() {
        let (without, _) = generate_snfei("Acme Corp", "US", None, None);
        let (with, _) = generate_snfei("Acme Corp", "US", None, Some("2020-01-01"));
        assert_ne!(without, with);
    }

    #[test]
    fn country_changes_the_fingerprint() {
        let us = generate_snfei_simple("Springfield", "US", None);
        let ca = generate_snfei_simple("Springfield", "CA", None);
        assert_ne!(us, ca);
    }

    #[test]
    fn fingerprint_is_lowercase_hex() {
        let (snfei, _) = generate_snfei("Springfield School District", "US", None, None);
        assert_eq!(snfei.as_str().len(), 64);
        assert!(snfei.as_str().chars().all(|c| "0123456789abcdef".contains(c)));
    }

    #[test]
    fn tier_3_baseline() {
        let result = generate_snfei_with_confidence("Springfield", "US", None, None, None, None);
        assert_eq!(result.tier, 3);
        assert!((result.confidence_score - 0.5).abs() < 1e-9);
        assert!(result.fields_used.contains(&"legal_name".to_string()));
        assert!(result.fields_used.contains(&"country_code".to_string()));
    }

    #[test]
    fn tier_3_address_bonus() {
        let result = generate_snfei_with_confidence(
            "Acme Corp",
            "US",
            Some("123 Main St"),
            None,
            None,
            None,
        );
        assert_eq!(result.tier, 3);
        assert!((result.confidence_score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn tier_3_caps_at_point_nine() {
        let result = generate_snfei_with_confidence(
            "Springfield Regional Medical Center Inc",
            "US",
            Some("500 Hospital Dr"),
            Some("1990-01-01"),
            None,
            None,
        );
        assert_eq!(result.tier, 3);
        assert!((result.confidence_score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn valid_uei_yields_tier_2() {
        let result = generate_snfei_with_confidence(
            "Acme Corp",
            "US",
            None,
            None,
            None,
            Some("ABC123456789"),
        );
        assert_eq!(result.tier, 2);
        assert!((result.confidence_score - 0.95).abs() < 1e-9);
    }

    #[test]
    fn valid_lei_yields_tier_1() {
        let result = generate_snfei_with_confidence(
            "Acme Corp",
            "US",
            None,
            None,
            Some("12345678901234567890"),
            None,
        );
        assert_eq!(result.tier, 1);
        assert!((result.confidence_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn malformed_external_identifiers_fall_back_to_tier_3() {
        let result = generate_snfei_with_confidence(
            "Acme Corp",
            "US",
            None,
            None,
            Some("too-short"),
            Some("lowercase123"),
        );
        assert_eq!(result.tier, 3);
    }

    #[test]
    fn weights_are_data() {
        let weights = ConfidenceWeights {
            tier3_base: 0.4,
            ..ConfidenceWeights::default()
        };
        let result = generate_snfei_with_weights(
            "Springfield", "US", None, None, None, None, &weights,
        );
        assert!((result.confidence_score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn weights_deserialize_with_defaults() {
        let weights: ConfidenceWeights = serde_json::from_str(r#"{"tier3_base": 0.6}"#).unwrap();
        assert!((weights.tier3_base - 0.6).abs() < 1e-9);
        assert!((weights.address_bonus - 0.2).abs() < 1e-9);
    }
}
