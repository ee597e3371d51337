//! Pure text normalizers and the canonical fingerprint input.
//!
//! Each normalizer is idempotent: applying it twice yields the same string
//! as applying it once. Equivalence is achieved by case-folding, punctuation
//! stripping, whitespace collapsing, and token-level expansion of known
//! abbreviations, so that e.g. `"SPRINGFIELD USD"` and
//! `"Springfield Unified Sch. Dist."` converge to the same string.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cep_canonical::{CepError, CepResult};

/// Abbreviation expansions applied token-by-token to legal names.
/// Expansion targets never appear as keys, which keeps the pass idempotent.
const NAME_TOKEN_EXPANSIONS: &[(&str, &str)] = &[
    ("assn", "association"),
    ("auth", "authority"),
    ("dept", "department"),
    ("dist", "district"),
    ("govt", "government"),
    ("isd", "independent school district"),
    ("sch", "school"),
    ("twp", "township"),
    ("univ", "university"),
    ("usd", "unified school district"),
];

/// Directional and street-type expansions applied token-by-token to
/// addresses.
const ADDRESS_TOKEN_EXPANSIONS: &[(&str, &str)] = &[
    ("apt", "apartment"),
    ("ave", "avenue"),
    ("blvd", "boulevard"),
    ("ct", "court"),
    ("dr", "drive"),
    ("e", "east"),
    ("hwy", "highway"),
    ("ln", "lane"),
    ("n", "north"),
    ("ne", "northeast"),
    ("nw", "northwest"),
    ("pkwy", "parkway"),
    ("rd", "road"),
    ("s", "south"),
    ("se", "southeast"),
    ("st", "street"),
    ("ste", "suite"),
    ("sw", "southwest"),
    ("w", "west"),
];

/// Date notations accepted by [`normalize_registration_date`], tried in
/// order. Ambiguous all-numeric forms resolve as month/day/year.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
];

fn strip_punctuation(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect()
}

fn expand_tokens(value: &str, table: &[(&str, &str)]) -> String {
    value
        .split_whitespace()
        .map(|token| {
            table
                .iter()
                .find(|(abbrev, _)| *abbrev == token)
                .map(|(_, expansion)| *expansion)
                .unwrap_or(token)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes a legal name: case-fold, strip punctuation, collapse
/// whitespace, expand known abbreviations.
pub fn normalize_legal_name(legal_name: &str) -> String {
    let lowered = legal_name.to_lowercase();
    let stripped = strip_punctuation(&lowered);
    expand_tokens(&stripped, NAME_TOKEN_EXPANSIONS)
}

/// Normalizes a street address: case-fold, strip punctuation, expand
/// directional and street-type abbreviations.
pub fn normalize_address(address: &str) -> String {
    let lowered = address.to_lowercase();
    let stripped = strip_punctuation(&lowered);
    expand_tokens(&stripped, ADDRESS_TOKEN_EXPANSIONS)
}

/// Normalizes a registration date to an ISO calendar date (`YYYY-MM-DD`).
///
/// Unparsable input yields `None` rather than an error; callers that must
/// reject bad dates use [`normalize_registration_date_strict`].
pub fn normalize_registration_date(date_str: &str) -> Option<String> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
}

/// Strict variant of [`normalize_registration_date`]: unparsable input is an
/// error instead of an absent value.
pub fn normalize_registration_date_strict(date_str: &str) -> CepResult<String> {
    normalize_registration_date(date_str)
        .ok_or_else(|| CepError::InvalidTimestamp(date_str.to_string()))
}

/// The normalized fields a fingerprint is computed from.
///
/// `to_hash_string` renders the exact pipe-delimited intermediate used as
/// the SHA-256 input; it is a conformance fixture and must be reproducible
/// field-for-field across implementations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalInput {
    /// Normalized legal name.
    pub legal_name_normalized: String,
    /// Normalized street address, when one was supplied.
    pub address_normalized: Option<String>,
    /// ISO 3166-1 alpha-2 country code, uppercased.
    pub country_code: String,
    /// Normalized registration date, when one was supplied and parsable.
    pub registration_date: Option<String>,
}

impl CanonicalInput {
    /// Renders `name|address|country|date` with empty segments for missing
    /// address or date.
    pub fn to_hash_string(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.legal_name_normalized,
            self.address_normalized.as_deref().unwrap_or(""),
            self.country_code,
            self.registration_date.as_deref().unwrap_or("")
        )
    }
}

/// Runs the full normalization pipeline over raw entity attributes.
pub fn build_canonical_input(
    legal_name: &str,
    country_code: &str,
    address: Option<&str>,
    registration_date: Option<&str>,
) -> CanonicalInput {
    CanonicalInput {
        legal_name_normalized: normalize_legal_name(legal_name),
        address_normalized: address.map(normalize_address),
        country_code: country_code.trim().to_uppercase(),
        registration_date: registration_date.and_then(normalize_registration_date),
    }
}
