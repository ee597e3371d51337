//! Exchange records: verifiable value exchanges between entities within an
//! established relationship. The atomic unit of civic transparency.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cep_canonical::{
    insert_required, Attestation, CanonicalFields, CanonicalHash, CanonicalTimestamp,
    Canonicalize, CepError, CepResult, SCHEMA_VERSION,
};

use crate::provenance::{ExchangeCategorization, ProvenanceChain};
use crate::revision::{default_revision, default_schema_version, Revisioned};
use crate::source::{render_sorted, SourceReference};
use crate::value::{ExchangeParty, ExchangeValue};

/// Exchange operational status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExchangeStatusCode {
    /// Initiated but not settled.
    Pending,
    /// Settled.
    Completed,
    /// Settled and later reversed.
    Reversed,
    /// Canceled before settlement.
    Canceled,
    /// Under dispute.
    Disputed,
}

impl ExchangeStatusCode {
    /// Canonical string form of the status code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeStatusCode::Pending => "PENDING",
            ExchangeStatusCode::Completed => "COMPLETED",
            ExchangeStatusCode::Reversed => "REVERSED",
            ExchangeStatusCode::Canceled => "CANCELED",
            ExchangeStatusCode::Disputed => "DISPUTED",
        }
    }
}

/// Exchange status block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeStatus {
    /// Operational status code.
    pub status_code: ExchangeStatusCode,
    /// When the status took effect.
    pub status_effective_timestamp: CanonicalTimestamp,
}

impl ExchangeStatus {
    /// Creates a status block.
    pub fn new(
        status_code: ExchangeStatusCode,
        status_effective_timestamp: CanonicalTimestamp,
    ) -> Self {
        Self {
            status_code,
            status_effective_timestamp,
        }
    }
}

impl Canonicalize for ExchangeStatus {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        insert_required(&mut fields, "statusCode", self.status_code.as_str());
        insert_required(
            &mut fields,
            "statusEffectiveTimestamp",
            &self.status_effective_timestamp.to_canonical_string(),
        );
        fields
    }
}

/// A complete exchange record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRecord {
    /// Namespaced verifiable identifier for this exchange.
    pub verifiable_id: String,
    /// The relationship this exchange occurred within.
    pub relationship_id: String,
    /// Vocabulary URI for the exchange type.
    pub exchange_type_uri: String,
    /// The party value moved from.
    pub source_entity: ExchangeParty,
    /// The party value moved to.
    pub recipient_entity: ExchangeParty,
    /// The value exchanged.
    pub value: ExchangeValue,
    /// When the exchange occurred.
    pub occurred_timestamp: CanonicalTimestamp,
    /// Current status.
    pub status: ExchangeStatus,
    /// Proof of origin.
    pub attestation: Attestation,
    /// Schema version the record conforms to.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Provenance of the funds, when traced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance_chain: Option<ProvenanceChain>,
    /// Categorization codes for reporting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categorization: Option<ExchangeCategorization>,
    /// References to authoritative source records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_references: Option<Vec<SourceReference>>,
    /// Digest of the previous revision, linking the revision chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_record_hash: Option<CanonicalHash>,
    /// Revision number, starting at 1.
    #[serde(default = "default_revision")]
    pub revision_number: u32,
}

impl ExchangeRecord {
    /// Creates an exchange record with the required fields.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        verifiable_id: impl Into<String>,
        relationship_id: impl Into<String>,
        exchange_type_uri: impl Into<String>,
        source_entity: ExchangeParty,
        recipient_entity: ExchangeParty,
        value: ExchangeValue,
        occurred_timestamp: CanonicalTimestamp,
        status: ExchangeStatus,
        attestation: Attestation,
    ) -> Self {
        Self {
            verifiable_id: verifiable_id.into(),
            relationship_id: relationship_id.into(),
            exchange_type_uri: exchange_type_uri.into(),
            source_entity,
            recipient_entity,
            value,
            occurred_timestamp,
            status,
            attestation,
            schema_version: SCHEMA_VERSION.to_string(),
            provenance_chain: None,
            categorization: None,
            source_references: None,
            previous_record_hash: None,
            revision_number: 1,
        }
    }

    /// Returns a copy with the provenance chain set.
    pub fn with_provenance(mut self, chain: ProvenanceChain) -> Self {
        self.provenance_chain = Some(chain);
        self
    }

    /// Returns a copy with categorization set.
    pub fn with_categorization(mut self, categorization: ExchangeCategorization) -> Self {
        self.categorization = Some(categorization);
        self
    }

    /// Returns a copy with a source reference added.
    pub fn with_source_reference(mut self, reference: SourceReference) -> Self {
        self.source_references
            .get_or_insert_with(Vec::new)
            .push(reference);
        self
    }

    /// Returns a copy with the previous-revision digest set.
    pub fn with_previous_hash(mut self, hash: CanonicalHash) -> Self {
        self.previous_record_hash = Some(hash);
        self
    }

    /// Returns a copy with the revision number set.
    pub fn with_revision(mut self, revision: u32) -> Self {
        self.revision_number = revision;
        self
    }

    /// Checks structural invariants.
    pub fn validate(&self) -> CepResult<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(CepError::UnsupportedVersion(self.schema_version.clone()));
        }
        if self.verifiable_id.is_empty() {
            return Err(CepError::Validation("verifiableId is required".into()));
        }
        if self.relationship_id.is_empty() {
            return Err(CepError::Validation("relationshipId is required".into()));
        }
        if self.exchange_type_uri.is_empty() {
            return Err(CepError::Validation("exchangeTypeUri is required".into()));
        }
        if self.source_entity.entity_id.is_empty() || self.recipient_entity.entity_id.is_empty() {
            return Err(CepError::Validation(
                "source and recipient entity IDs are required".into(),
            ));
        }
        if self.revision_number < 1 {
            return Err(CepError::Validation("revisionNumber must be >= 1".into()));
        }
        Ok(())
    }
}

impl Canonicalize for ExchangeRecord {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        insert_required(&mut fields, "attestation", &self.attestation.to_canonical_string());
        if let Some(categorization) = &self.categorization {
            if categorization.has_any() {
                insert_required(
                    &mut fields,
                    "categorization",
                    &categorization.to_canonical_string(),
                );
            }
        }
        insert_required(&mut fields, "exchangeTypeUri", &self.exchange_type_uri);
        insert_required(
            &mut fields,
            "occurredTimestamp",
            &self.occurred_timestamp.to_canonical_string(),
        );
        if let Some(hash) = &self.previous_record_hash {
            insert_required(&mut fields, "previousRecordHash", &hash.as_hex());
        }
        if let Some(chain) = &self.provenance_chain {
            if chain.has_any() {
                insert_required(&mut fields, "provenanceChain", &chain.to_canonical_string());
            }
        }
        insert_required(
            &mut fields,
            "recipientEntity",
            &self.recipient_entity.to_canonical_string(),
        );
        insert_required(&mut fields, "relationshipId", &self.relationship_id);
        insert_required(&mut fields, "revisionNumber", &self.revision_number.to_string());
        insert_required(&mut fields, "schemaVersion", &self.schema_version);
        insert_required(
            &mut fields,
            "sourceEntity",
            &self.source_entity.to_canonical_string(),
        );
        if let Some(references) = &self.source_references {
            if !references.is_empty() {
                fields.insert("sourceReferences".to_string(), render_sorted(references));
            }
        }
        insert_required(&mut fields, "status", &self.status.to_canonical_string());
        insert_required(&mut fields, "value", &self.value.to_canonical_string());
        insert_required(&mut fields, "verifiableId", &self.verifiable_id);
        fields
    }
}

impl Revisioned for ExchangeRecord {
    fn revision_number(&self) -> u32 {
        self.revision_number
    }

    fn previous_record_hash(&self) -> Option<&CanonicalHash> {
        self.previous_record_hash.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_attestation() -> Attestation {
        Attestation::new(
            "cep-entity:sam-uei:ATTESTOR123A",
            "2025-11-28T14:30:00.000000Z".parse().unwrap(),
            "Ed25519Signature2020",
            "z3FXQqFwbZxKBxGxqFpCDabcdef1234567890",
            "did:web:example.gov#key-1",
        )
    }

    fn test_exchange() -> ExchangeRecord {
        ExchangeRecord::new(
            "cep-exchange:treasury:PAY_2025_001234",
            "cep-relationship:usaspending:GRANT_84010_2025",
            "https://civic-exchange.org/types/grant",
            ExchangeParty::new("cep-entity:sam-uei:AGENCY12345A")
                .with_role("urn:role:disbursing-agency"),
            ExchangeParty::new("cep-entity:sam-uei:SCHOOL67890B").with_role("urn:role:grantee"),
            ExchangeValue::usd(50_000.0),
            "2025-09-15T14:03:22.500000Z".parse().unwrap(),
            ExchangeStatus::new(
                ExchangeStatusCode::Completed,
                "2025-09-15T14:03:22.500000Z".parse().unwrap(),
            ),
            test_attestation(),
        )
    }

    #[test]
    fn new_record_validates() {
        assert!(test_exchange().validate().is_ok());
    }

    #[test]
    fn canonical_keys_are_sorted() {
        let record = test_exchange()
            .with_provenance(
                ProvenanceChain::new()
                    .with_funding_chain_tag("FEDERAL>STATE>SCHOOL_DISTRICT")
                    .with_ultimate_source("cep-entity:sam-uei:USDOE12345AB"),
            )
            .with_categorization(ExchangeCategorization::new().with_cfda("84.010"))
            .with_source_reference(SourceReference::new("https://a.example.gov", "1"));
        let keys: Vec<String> = record.canonical_fields().keys().cloned().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn canonical_string_contains_expected_sections() {
        let record = test_exchange()
            .with_provenance(
                ProvenanceChain::new().with_funding_chain_tag("FEDERAL>STATE>SCHOOL_DISTRICT"),
            )
            .with_categorization(ExchangeCategorization::new().with_cfda("84.010"));
        let canonical = record.to_canonical_string();
        for key in [
            "attestation",
            "categorization",
            "exchangeTypeUri",
            "occurredTimestamp",
            "provenanceChain",
            "recipientEntity",
            "sourceEntity",
            "status",
            "value",
            "verifiableId",
        ] {
            assert!(
                canonical.contains(&format!("\"{key}\":")),
                "missing key {key}"
            );
        }
    }

    #[test]
    fn empty_categorization_is_omitted() {
        let record = test_exchange().with_categorization(ExchangeCategorization::new());
        assert!(!record.canonical_fields().contains_key("categorization"));
    }

    #[test]
    fn empty_provenance_is_omitted() {
        let record = test_exchange().with_provenance(ProvenanceChain::new());
        assert!(!record.canonical_fields().contains_key("provenanceChain"));
    }

    #[test]
    fn revision_chain_links_through_digests() {
        let first = test_exchange();
        let second = test_exchange()
            .with_previous_hash(first.calculate_hash())
            .with_revision(2);
        assert!(crate::revision::verify_chain(&[first, second]).is_ok());
    }

    #[test]
    fn missing_relationship_id_fails_validation() {
        let mut record = test_exchange();
        record.relationship_id = String::new();
        assert!(record.validate().is_err());
    }

    #[test]
    fn serde_round_trips() {
        let record = test_exchange();
        let json = serde_json::to_string(&record).unwrap();
        let back: ExchangeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.calculate_hash(), record.calculate_hash());
    }
}
