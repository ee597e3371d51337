//! Shared machinery for mapping raw source keys onto canonical field names.

use std::collections::BTreeMap;

use serde_json::Value;

use cep_canonical::{CepError, CepResult};

/// A raw input record: source-system keys to JSON values.
pub type RawMap = serde_json::Map<String, Value>;

/// Maps raw keys onto canonical names using a `(raw, canonical)` table.
///
/// Keys absent from the table are dropped with a warning; they never fail
/// the build. When two raw keys map to the same canonical name, the last
/// one in input order wins.
pub fn map_fields(
    raw: &RawMap,
    table: &[(&str, &str)],
) -> (BTreeMap<String, Value>, Vec<String>) {
    let mut mapped = BTreeMap::new();
    let mut warnings = Vec::new();
    for (key, value) in raw {
        match table.iter().find(|(raw_key, _)| *raw_key == key.as_str()) {
            Some((_, canonical_key)) => {
                mapped.insert((*canonical_key).to_string(), value.clone());
            }
            None => warnings.push(format!("unknown field ignored: '{key}'")),
        }
    }
    (mapped, warnings)
}

/// Validates that every required canonical key is present and non-null,
/// reporting all missing keys in one aggregate error.
pub fn validate_required(
    mapped: &BTreeMap<String, Value>,
    required: &[&str],
) -> CepResult<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|key| matches!(mapped.get(**key as &str), None | Some(Value::Null)))
        .map(|key| (*key).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CepError::MissingFields(missing))
    }
}

/// Extracts a required string field after presence validation.
pub(crate) fn expect_string(mapped: &BTreeMap<String, Value>, key: &str) -> CepResult<String> {
    mapped
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CepError::Validation(format!("field '{key}' must be a string")))
}

/// Extracts an optional string field, treating null as absent.
pub(crate) fn optional_string(mapped: &BTreeMap<String, Value>, key: &str) -> Option<String> {
    mapped.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TABLE: &[(&str, &str)] = &[("legalName", "legal_name"), ("countryCode", "country_code")];

    fn raw(value: Value) -> RawMap {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn known_keys_map_and_unknown_keys_warn() {
        let input = raw(json!({"legalName": "Acme", "color": "blue"}));
        let (mapped, warnings) = map_fields(&input, TABLE);
        assert_eq!(mapped.get("legal_name").unwrap(), "Acme");
        assert_eq!(warnings, vec!["unknown field ignored: 'color'".to_string()]);
    }

    #[test]
    fn all_missing_keys_are_reported_together() {
        let input = raw(json!({"legalName": null}));
        let (mapped, _) = map_fields(&input, TABLE);
        let err = validate_required(&mapped, &["legal_name", "country_code"]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("legal_name"));
        assert!(message.contains("country_code"));
    }

    #[test]
    fn present_keys_pass_validation() {
        let input = raw(json!({"legalName": "Acme", "countryCode": "US"}));
        let (mapped, _) = map_fields(&input, TABLE);
        assert!(validate_required(&mapped, &["legal_name", "country_code"]).is_ok());
    }
}
