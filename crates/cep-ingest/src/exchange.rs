//! Exchange builder: raw source fields to an exchange record.
//!
//! Accepts both grantor/grantee and source/recipient key spellings,
//! promotes date-only inputs to midnight UTC, and assembles categorization
//! and source references when the raw record carries them.

use std::collections::BTreeMap;

use serde_json::Value;

use cep_canonical::{Attestation, CanonicalTimestamp, CepError, CepResult};
use cep_records::{
    ExchangeCategorization, ExchangeParty, ExchangeRecord, ExchangeStatus, ExchangeStatusCode,
    ExchangeValue, SourceReference,
};

use crate::fields::{expect_string, map_fields, optional_string, validate_required, RawMap};

/// Raw exchange keys and their canonical names. Grantor/grantee spellings
/// are aliases for source/recipient.
const EXCHANGE_FIELD_MAP: &[(&str, &str)] = &[
    ("exchangeId", "exchange_id"),
    ("exchangeType", "exchange_type"),
    ("grantorEntityId", "source_entity_id"),
    ("granteeEntityId", "recipient_entity_id"),
    ("sourceEntityId", "source_entity_id"),
    ("recipientEntityId", "recipient_entity_id"),
    ("grantAmount", "amount"),
    ("amount", "amount"),
    ("currency", "currency"),
    ("awardDate", "occurred_date"),
    ("occurredDate", "occurred_date"),
    ("description", "description"),
    ("attestation", "attestation"),
    ("sourceSystem", "source_system"),
    ("sourceRecordId", "source_record_id"),
    ("sourceUrl", "source_url"),
    ("cfdaNumber", "cfda_number"),
    ("naicsCode", "naics_code"),
    ("gtasAccountCode", "gtas_account_code"),
    ("localCategoryCode", "local_category_code"),
    ("localCategoryLabel", "local_category_label"),
    ("programCode", "local_category_code"),
];

/// Canonical keys that must be present to build an exchange.
const EXCHANGE_REQUIRED: &[&str] = &[
    "exchange_id",
    "exchange_type",
    "source_entity_id",
    "recipient_entity_id",
    "amount",
    "currency",
    "occurred_date",
    "attestation",
];

/// Well-known exchange types and their vocabulary URIs.
const EXCHANGE_TYPE_URI_MAP: &[(&str, &str)] = &[
    ("CONTRACT", "https://civic-exchange.org/types/contract"),
    ("DONATION", "https://civic-exchange.org/types/donation"),
    ("FEE", "https://civic-exchange.org/types/fee"),
    ("GRANT", "https://civic-exchange.org/types/grant"),
    ("PAYMENT", "https://civic-exchange.org/types/payment"),
    ("TAX", "https://civic-exchange.org/types/tax"),
    ("TRANSFER", "https://civic-exchange.org/types/transfer"),
];

/// Result of building an exchange from raw data.
#[derive(Debug, Clone)]
pub struct ExchangeBuildResult {
    /// The constructed, validated exchange record.
    pub record: ExchangeRecord,
    /// Unknown-field warnings accumulated during mapping.
    pub warnings: Vec<String>,
}

fn exchange_type_uri(exchange_type: &str) -> String {
    let upper = exchange_type.to_uppercase();
    EXCHANGE_TYPE_URI_MAP
        .iter()
        .find(|(code, _)| *code == upper)
        .map(|(_, uri)| (*uri).to_string())
        .unwrap_or_else(|| {
            format!(
                "https://civic-exchange.org/types/{}",
                exchange_type.to_lowercase()
            )
        })
}

/// Parses a date or datetime; date-only input becomes midnight UTC.
fn parse_occurred_timestamp(date_str: &str) -> CepResult<CanonicalTimestamp> {
    if date_str.contains('T') {
        CanonicalTimestamp::parse(date_str)
    } else {
        CanonicalTimestamp::parse(&format!("{date_str}T00:00:00.000000Z"))
    }
}

fn build_attestation(raw: &Value) -> CepResult<Attestation> {
    let attested_by = raw
        .get("attestedBy")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let timestamp_str = raw
        .get("attestationTimestamp")
        .and_then(Value::as_str)
        .unwrap_or("");
    let timestamp = CanonicalTimestamp::parse(timestamp_str)?;
    let verification_method = format!(
        "urn:cep:attestor:{}",
        attested_by.replace(' ', "-").to_lowercase()
    );
    // Manual attestations carry no cryptographic proof value.
    Ok(Attestation::new(
        attested_by,
        timestamp,
        "ManualAttestation",
        "",
        verification_method,
    ))
}

fn amount_value(mapped: &BTreeMap<String, Value>) -> CepResult<f64> {
    let value = mapped
        .get("amount")
        .ok_or_else(|| CepError::Validation("field 'amount' must be numeric".into()))?;
    match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| CepError::Validation("field 'amount' must be numeric".into())),
        Value::String(text) => text
            .parse::<f64>()
            .map_err(|_| CepError::Validation(format!("field 'amount' is not numeric: '{text}'"))),
        _ => Err(CepError::Validation("field 'amount' must be numeric".into())),
    }
}

fn build_categorization(mapped: &BTreeMap<String, Value>) -> Option<ExchangeCategorization> {
    let categorization = ExchangeCategorization {
        cfda_number: optional_string(mapped, "cfda_number"),
        naics_code: optional_string(mapped, "naics_code"),
        gtas_account_code: optional_string(mapped, "gtas_account_code"),
        local_category_code: optional_string(mapped, "local_category_code"),
        local_category_label: optional_string(mapped, "local_category_label")
            .or_else(|| optional_string(mapped, "description")),
    };
    categorization.has_any().then_some(categorization)
}

fn build_source_reference(mapped: &BTreeMap<String, Value>) -> Option<SourceReference> {
    let source_system = optional_string(mapped, "source_system")?;
    let source_record_id = optional_string(mapped, "source_record_id")?;
    let mut reference = SourceReference::new(source_system, source_record_id);
    if let Some(url) = optional_string(mapped, "source_url") {
        reference = reference.with_url(url);
    }
    Some(reference)
}

/// Builds a canonical exchange record from raw source fields.
///
/// The returned record has already passed `validate()`.
pub fn build_exchange(raw: &RawMap) -> CepResult<ExchangeBuildResult> {
    let (mapped, warnings) = map_fields(raw, EXCHANGE_FIELD_MAP);
    validate_required(&mapped, EXCHANGE_REQUIRED)?;

    let attestation = build_attestation(
        mapped
            .get("attestation")
            .ok_or_else(|| CepError::MissingFields(vec!["attestation".into()]))?,
    )?;
    let occurred_timestamp = parse_occurred_timestamp(&expect_string(&mapped, "occurred_date")?)?;

    let source_entity_id = expect_string(&mapped, "source_entity_id")?;
    let recipient_entity_id = expect_string(&mapped, "recipient_entity_id")?;
    let relationship_id = format!("rel:{source_entity_id}:{recipient_entity_id}");

    let mut record = ExchangeRecord::new(
        expect_string(&mapped, "exchange_id")?,
        relationship_id,
        exchange_type_uri(&expect_string(&mapped, "exchange_type")?),
        ExchangeParty::new(source_entity_id),
        ExchangeParty::new(recipient_entity_id),
        ExchangeValue::monetary(amount_value(&mapped)?, expect_string(&mapped, "currency")?),
        occurred_timestamp,
        ExchangeStatus::new(ExchangeStatusCode::Completed, occurred_timestamp),
        attestation,
    );
    if let Some(categorization) = build_categorization(&mapped) {
        record = record.with_categorization(categorization);
    }
    if let Some(reference) = build_source_reference(&mapped) {
        record = record.with_source_reference(reference);
    }
    record.validate()?;

    Ok(ExchangeBuildResult { record, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cep_canonical::Canonicalize;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawMap {
        value.as_object().unwrap().clone()
    }

    fn grant_input() -> RawMap {
        raw(json!({
            "exchangeId": "cep-exchange:state:GRANT_2024_0042",
            "exchangeType": "GRANT",
            "grantorEntityId": "cep-entity:sam-uei:AGENCY12345A",
            "granteeEntityId": "cep-entity:sam-uei:SCHOOL67890B",
            "grantAmount": 50000.0,
            "currency": "USD",
            "awardDate": "2024-05-15",
            "cfdaNumber": "84.010",
            "attestation": {
                "attestedBy": "State Grants Office",
                "attestationTimestamp": "2024-05-16T09:00:00.000000Z"
            }
        }))
    }

    #[test]
    fn builds_a_validated_exchange() {
        let result = build_exchange(&grant_input()).unwrap();
        assert!(result.warnings.is_empty());
        let record = &result.record;
        assert_eq!(
            record.exchange_type_uri,
            "https://civic-exchange.org/types/grant"
        );
        assert_eq!(
            record.relationship_id,
            "rel:cep-entity:sam-uei:AGENCY12345A:cep-entity:sam-uei:SCHOOL67890B"
        );
        assert_eq!(
            record.occurred_timestamp.to_canonical_string(),
            "2024-05-15T00:00:00.000000Z"
        );
        assert_eq!(
            record.categorization.as_ref().unwrap().cfda_number.as_deref(),
            Some("84.010")
        );
    }

    #[test]
    fn manual_attestation_has_no_proof_value() {
        let result = build_exchange(&grant_input()).unwrap();
        let attestation = &result.record.attestation;
        assert_eq!(attestation.proof_type, "ManualAttestation");
        assert_eq!(attestation.attestor_id, "State Grants Office");
        assert_eq!(
            attestation.verification_method_uri,
            "urn:cep:attestor:state-grants-office"
        );
        assert!(!result
            .record
            .to_canonical_string()
            .contains("\"proofValue\""));
    }

    #[test]
    fn missing_keys_are_aggregated() {
        let input = raw(json!({"exchangeType": "GRANT"}));
        let err = build_exchange(&input).unwrap_err();
        let message = err.to_string();
        for key in [
            "exchange_id",
            "source_entity_id",
            "recipient_entity_id",
            "amount",
            "currency",
            "occurred_date",
            "attestation",
        ] {
            assert!(message.contains(key), "missing key {key} not reported");
        }
    }

    #[test]
    fn unknown_exchange_types_get_derived_uris() {
        assert_eq!(
            exchange_type_uri("REBATE"),
            "https://civic-exchange.org/types/rebate"
        );
    }

    #[test]
    fn unknown_fields_warn_without_failing() {
        let mut input = grant_input();
        input.insert("fiscalYear".to_string(), json!(2024));
        let result = build_exchange(&input).unwrap();
        assert_eq!(
            result.warnings,
            vec!["unknown field ignored: 'fiscalYear'".to_string()]
        );
    }

    #[test]
    fn string_amounts_parse() {
        let mut input = grant_input();
        input.insert("grantAmount".to_string(), json!("50000.00"));
        let result = build_exchange(&input).unwrap();
        assert!((result.record.value.amount - 50_000.0).abs() < 1e-9);
    }

    #[test]
    fn source_reference_is_attached_when_present() {
        let mut input = grant_input();
        input.insert(
            "sourceSystem".to_string(),
            json!("https://grants.example.gov"),
        );
        input.insert("sourceRecordId".to_string(), json!("AWD-42"));
        let result = build_exchange(&input).unwrap();
        let references = result.record.source_references.as_ref().unwrap();
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].source_record_id, "AWD-42");
    }
}
