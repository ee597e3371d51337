//! Deterministic serialization of records into one canonical string.
//!
//! Every hashable type exposes an ordered map from field key to pre-formatted
//! value. The canonical string joins the entries with commas, each rendered
//! as `"key":"value"`. Keys come out in strict byte-wise alphabetical order
//! because the field map is a `BTreeMap`; insertion order can never leak into
//! the hash. Nested objects contribute their own canonical string as the
//! value, embedded verbatim; collections are pre-sorted by a per-type key and
//! rendered as bracketed, comma-separated fragments.

use std::collections::BTreeMap;

use crate::hash::CanonicalHash;

/// Ordered field map: canonical key to pre-formatted value.
pub type CanonicalFields = BTreeMap<String, String>;

/// Types that can produce a deterministic canonical string.
///
/// Two independently constructed values with equal logical content must yield
/// byte-identical canonical strings, and therefore identical digests.
pub trait Canonicalize {
    /// The ordered field map. Absent and empty-string fields are never
    /// inserted; their keys must not appear.
    fn canonical_fields(&self) -> CanonicalFields;

    /// Joins the field map into the canonical string.
    fn to_canonical_string(&self) -> String {
        self.canonical_fields()
            .iter()
            .map(|(key, value)| format!("\"{}\":\"{}\"", key, value))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// SHA-256 digest of the canonical string. Always recomputed from the
    /// current value; digests are never cached.
    fn calculate_hash(&self) -> CanonicalHash {
        CanonicalHash::from_canonical_string(&self.to_canonical_string())
    }
}

/// Inserts a required field. Empty values are skipped so that an empty string
/// and an absent field hash identically.
pub fn insert_required(fields: &mut CanonicalFields, key: &str, value: &str) {
    if !value.is_empty() {
        fields.insert(key.to_string(), value.to_string());
    }
}

/// Inserts an optional field when present and non-empty.
pub fn insert_if_present(fields: &mut CanonicalFields, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        insert_required(fields, key, value);
    }
}

/// Renders a monetary amount with exactly two decimal digits, rounding
/// half-up.
pub fn format_amount(amount: f64) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    format!("{:.2}", rounded)
}

/// Renders a participation share with exactly four decimal digits.
pub fn format_share(share: f64) -> String {
    format!("{:.4}", share)
}

/// Renders a boolean as lowercase `true`/`false`.
pub fn format_bool(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample;

    impl Canonicalize for Sample {
        fn canonical_fields(&self) -> CanonicalFields {
            let mut fields = CanonicalFields::new();
            insert_required(&mut fields, "zulu", "last");
            insert_required(&mut fields, "alpha", "first");
            insert_if_present(&mut fields, "mid", Some("middle"));
            insert_if_present(&mut fields, "none", None);
            insert_if_present(&mut fields, "empty", Some(""));
            fields
        }
    }

    #[test]
    fn keys_come_out_alphabetical() {
        let fields = Sample.canonical_fields();
        let keys: Vec<&String> = fields.keys().collect();
        assert_eq!(keys, vec!["alpha", "mid", "zulu"]);
    }

    #[test]
    fn canonical_string_joins_quoted_entries() {
        assert_eq!(
            Sample.to_canonical_string(),
            r#""alpha":"first","mid":"middle","zulu":"last""#
        );
    }

    #[test]
    fn absent_and_empty_fields_are_omitted() {
        let fields = Sample.canonical_fields();
        assert!(!fields.contains_key("none"));
        assert!(!fields.contains_key("empty"));
    }

    #[test]
    fn digest_is_stable() {
        assert_eq!(Sample.calculate_hash(), Sample.calculate_hash());
    }

    #[test]
    fn amounts_render_two_decimals() {
        assert_eq!(format_amount(100.0), "100.00");
        assert_eq!(format_amount(100.5), "100.50");
        assert_eq!(format_amount(100.756), "100.76");
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(1234567.89), "1234567.89");
    }

    #[test]
    fn amounts_round_half_up() {
        assert_eq!(format_amount(0.125), "0.13");
        assert_eq!(format_amount(0.375), "0.38");
    }

    #[test]
    fn booleans_render_lowercase() {
        assert_eq!(format_bool(true), "true");
        assert_eq!(format_bool(false), "false");
    }

    #[test]
    fn shares_render_four_decimals() {
        assert_eq!(format_share(0.5), "0.5000");
        assert_eq!(format_share(0.3333), "0.3333");
    }
}
