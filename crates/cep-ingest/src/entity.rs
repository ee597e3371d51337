//! Entity builder: raw source fields to an entity record plus fingerprint.
//!
//! Pipeline: map keys, validate presence, localize the legal name for the
//! jurisdiction, run the normalization pipeline, generate the fingerprint,
//! resolve the verifiable identifier, and construct the record.

use std::collections::BTreeMap;

use serde_json::Value;

use cep_canonical::{Attestation, CepError, CepResult};
use cep_records::{EntityIdentifiers, EntityRecord, EntityStatus, ResolutionConfidence};
use cep_snfei::{apply_localization, generate_snfei_with_confidence, SnfeiResult};

use crate::fields::{expect_string, map_fields, optional_string, validate_required, RawMap};

/// Raw entity keys and their canonical names.
const ENTITY_FIELD_MAP: &[(&str, &str)] = &[
    ("entityId", "source_id"),
    ("legalName", "legal_name"),
    ("entityType", "entity_type"),
    ("jurisdiction", "jurisdiction"),
    ("countryCode", "country_code"),
    ("address", "address"),
    ("registrationDate", "registration_date"),
];

/// Canonical keys that must be present to build an entity.
const ENTITY_REQUIRED: &[&str] = &["legal_name", "country_code"];

/// Raw entity-type codes and their vocabulary URIs.
const ENTITY_TYPE_URI_MAP: &[(&str, &str)] = &[
    (
        "COUNTY",
        "https://civic-exchange.org/vocabulary/entity-type#county-government",
    ),
    (
        "FEDERAL",
        "https://civic-exchange.org/vocabulary/entity-type#federal-government",
    ),
    (
        "MUNICIPALITY",
        "https://civic-exchange.org/vocabulary/entity-type#local-government",
    ),
    (
        "NONPROFIT_501C3",
        "https://civic-exchange.org/vocabulary/entity-type#nonprofit-501c3",
    ),
    (
        "SCHOOL_DISTRICT",
        "https://civic-exchange.org/vocabulary/entity-type#educational-institution",
    ),
    (
        "SPECIAL_DISTRICT",
        "https://civic-exchange.org/vocabulary/entity-type#special-district",
    ),
    (
        "STATE",
        "https://civic-exchange.org/vocabulary/entity-type#state-government",
    ),
];

/// Result of building an entity from raw data.
#[derive(Debug, Clone)]
pub struct EntityBuildResult {
    /// The constructed, validated entity record.
    pub record: EntityRecord,
    /// The fingerprint generation result, including the canonical input.
    pub snfei: SnfeiResult,
    /// Unknown-field warnings accumulated during mapping.
    pub warnings: Vec<String>,
}

fn entity_type_uri(mapped: &BTreeMap<String, Value>) -> Option<String> {
    let raw_type = optional_string(mapped, "entity_type")?;
    let upper = raw_type.to_uppercase();
    ENTITY_TYPE_URI_MAP
        .iter()
        .find(|(code, _)| *code == upper)
        .map(|(_, uri)| (*uri).to_string())
}

/// Builds a canonical entity record from raw source fields.
///
/// The caller supplies the attestation and status blocks; everything else is
/// derived from the raw map. The returned record has already passed
/// `validate()`.
pub fn build_entity(
    raw: &RawMap,
    attestation: Attestation,
    status: EntityStatus,
) -> CepResult<EntityBuildResult> {
    let (mapped, warnings) = map_fields(raw, ENTITY_FIELD_MAP);
    validate_required(&mapped, ENTITY_REQUIRED)?;

    let legal_name = expect_string(&mapped, "legal_name")?;
    let country_code = expect_string(&mapped, "country_code")?;
    let jurisdiction = optional_string(&mapped, "jurisdiction");
    let address = optional_string(&mapped, "address");
    let registration_date = optional_string(&mapped, "registration_date");

    let localized = apply_localization(
        &legal_name,
        jurisdiction.as_deref().unwrap_or(&country_code),
    );
    let snfei = generate_snfei_with_confidence(
        &localized,
        &country_code,
        address.as_deref(),
        registration_date.as_deref(),
        None,
        None,
    );

    let identifiers = EntityIdentifiers::new().with_snfei(snfei.snfei.clone());
    let verifiable_id = identifiers
        .primary_identifier()
        .ok_or_else(|| CepError::Validation("identifier resolution produced no value".into()))?;

    let mut record = EntityRecord::new(
        verifiable_id,
        identifiers,
        legal_name,
        jurisdiction.unwrap_or(country_code),
        status,
        attestation,
    )
    .with_normalized_name(snfei.canonical.legal_name_normalized.clone())
    .with_resolution_confidence(ResolutionConfidence::new(snfei.confidence_score));
    if let Some(uri) = entity_type_uri(&mapped) {
        record = record.with_entity_type(uri);
    }
    record.validate()?;

    Ok(EntityBuildResult {
        record,
        snfei,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cep_records::EntityStatusCode;
    use serde_json::json;

    fn fixture_attestation() -> Attestation {
        Attestation::new(
            "cep-entity:demo:attestor-1",
            "2025-11-28T15:00:00.000000Z".parse().unwrap(),
            "Ed25519Signature2020",
            "z3FXQqFwbZxKBxGxqFpCDabcdef1234567890",
            "did:web:example.gov#key-1",
        )
    }

    fn fixture_status() -> EntityStatus {
        EntityStatus::new(EntityStatusCode::Active, "2024-01-01")
    }

    fn raw(value: serde_json::Value) -> RawMap {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn builds_a_validated_entity() {
        let input = raw(json!({
            "entityId": "US-IL-MUNI-0012",
            "legalName": "City of Springfield",
            "entityType": "MUNICIPALITY",
            "jurisdiction": "US-IL",
            "countryCode": "US",
            "address": "200 Main Street"
        }));
        let result = build_entity(&input, fixture_attestation(), fixture_status()).unwrap();
        assert!(result.warnings.is_empty());
        assert_eq!(result.record.jurisdiction_iso, "US-IL");
        assert_eq!(
            result.record.legal_name_normalized.as_deref(),
            Some("city of springfield")
        );
        assert!(result
            .record
            .verifiable_id
            .starts_with("cep-entity:snfei:"));
        assert_eq!(
            result.record.entity_type_uri.as_deref(),
            Some("https://civic-exchange.org/vocabulary/entity-type#local-government")
        );
    }

    #[test]
    fn unknown_fields_warn_without_failing() {
        let input = raw(json!({
            "legalName": "City of Springfield",
            "countryCode": "US",
            "mascot": "lion"
        }));
        let result = build_entity(&input, fixture_attestation(), fixture_status()).unwrap();
        assert_eq!(result.warnings, vec!["unknown field ignored: 'mascot'".to_string()]);
    }

    #[test]
    fn missing_keys_are_aggregated() {
        let input = raw(json!({"entityType": "MUNICIPALITY"}));
        let err = build_entity(&input, fixture_attestation(), fixture_status()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("legal_name"));
        assert!(message.contains("country_code"));
    }

    #[test]
    fn equivalent_raw_spellings_build_the_same_identity() {
        let first = raw(json!({"legalName": "Springfield USD", "countryCode": "US"}));
        let second = raw(json!({
            "legalName": "Springfield Unified School District",
            "countryCode": "US"
        }));
        let a = build_entity(&first, fixture_attestation(), fixture_status()).unwrap();
        let b = build_entity(&second, fixture_attestation(), fixture_status()).unwrap();
        assert_eq!(a.record.verifiable_id, b.record.verifiable_id);
        assert_eq!(a.snfei.snfei, b.snfei.snfei);
        assert_eq!(
            a.record.legal_name_normalized,
            b.record.legal_name_normalized
        );
    }

    #[test]
    fn fingerprint_confidence_flows_into_the_record() {
        let input = raw(json!({
            "legalName": "Springfield School District",
            "countryCode": "US"
        }));
        let result = build_entity(&input, fixture_attestation(), fixture_status()).unwrap();
        assert_eq!(result.snfei.tier, 3);
        let confidence = result.record.resolution_confidence.as_ref().unwrap();
        assert!((confidence.score - 0.5).abs() < 1e-9);
    }
}
