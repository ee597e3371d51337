//! Relationship records: verifiable legal or functional relationships
//! between two or more attested entities.
//!
//! Relationships are bilateral (two role-tagged parties with fixed
//! directionality) or multilateral (a de-duplicated, sorted member
//! collection with optional participation shares).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cep_canonical::{
    format_amount, insert_if_present, insert_required, Attestation, CanonicalFields, CanonicalHash,
    CanonicalTimestamp, Canonicalize, CepError, CepResult, SCHEMA_VERSION,
};

use crate::multilateral::MultilateralMembers;
use crate::parties::BilateralParties;
use crate::revision::{default_revision, default_schema_version, Revisioned};
use crate::source::{render_sorted, SourceReference};

/// Relationship operational status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipStatusCode {
    /// Agreed but not yet effective.
    Pending,
    /// In force.
    Active,
    /// Temporarily suspended.
    Suspended,
    /// Ran to completion.
    Completed,
    /// Ended before completion.
    Terminated,
    /// Superseded by an amendment.
    Amended,
}

impl RelationshipStatusCode {
    /// Canonical string form of the status code.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipStatusCode::Pending => "PENDING",
            RelationshipStatusCode::Active => "ACTIVE",
            RelationshipStatusCode::Suspended => "SUSPENDED",
            RelationshipStatusCode::Completed => "COMPLETED",
            RelationshipStatusCode::Terminated => "TERMINATED",
            RelationshipStatusCode::Amended => "AMENDED",
        }
    }
}

/// Relationship status block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipStatus {
    /// Operational status code.
    pub status_code: RelationshipStatusCode,
    /// When the status took effect.
    pub status_effective_timestamp: CanonicalTimestamp,
}

impl RelationshipStatus {
    /// Creates a status block.
    pub fn new(
        status_code: RelationshipStatusCode,
        status_effective_timestamp: CanonicalTimestamp,
    ) -> Self {
        Self {
            status_code,
            status_effective_timestamp,
        }
    }
}

impl Canonicalize for RelationshipStatus {
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

/// Financial terms of a relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialTerms {
    /// Total agreed value, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_value: Option<f64>,
    /// Obligated (committed) value, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obligated_value: Option<f64>,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl FinancialTerms {
    /// Creates terms in the given currency with no values set.
    pub fn new(currency_code: impl Into<String>) -> Self {
        Self {
            total_value: None,
            obligated_value: None,
            currency_code: currency_code.into(),
        }
    }

    /// Returns a copy with the total value set.
    pub fn with_total_value(mut self, value: f64) -> Self {
        self.total_value = Some(value);
        self
    }

    /// Returns a copy with the obligated value set.
    pub fn with_obligated_value(mut self, value: f64) -> Self {
        self.obligated_value = Some(value);
        self
    }
}

impl Canonicalize for FinancialTerms {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        insert_required(&mut fields, "currencyCode", &self.currency_code);
        if let Some(value) = self.obligated_value {
            insert_required(&mut fields, "obligatedValue", &format_amount(value));
        }
        if let Some(value) = self.total_value {
            insert_required(&mut fields, "totalValue", &format_amount(value));
        }
        fields
    }
}

/// The parties of a relationship: bilateral or multilateral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RelationshipParties {
    /// Two role-tagged parties with fixed directionality.
    Bilateral {
        /// The party pair.
        parties: BilateralParties,
    },
    /// A de-duplicated, identifier-sorted member collection.
    Multilateral {
        /// The member collection.
        members: MultilateralMembers,
    },
}

/// A complete relationship record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipRecord {
    /// Namespaced verifiable identifier for this relationship.
    pub verifiable_id: String,
    /// Vocabulary URI for the relationship type.
    pub relationship_type_uri: String,
    /// The participating parties.
    pub parties: RelationshipParties,
    /// When the relationship took effect.
    pub effective_timestamp: CanonicalTimestamp,
    /// Current status.
    pub status: RelationshipStatus,
    /// ISO 3166 jurisdiction code.
    pub jurisdiction_iso: String,
    /// Proof of origin.
    pub attestation: Attestation,
    /// Schema version the record conforms to.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Parent relationship, for amendments and sub-awards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_relationship_id: Option<String>,
    /// When the relationship expires, if bounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_timestamp: Option<CanonicalTimestamp>,
    /// Financial terms, when the relationship carries value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_terms: Option<FinancialTerms>,
    /// Free-form term attributes (sorted map).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_attributes: Option<BTreeMap<String, String>>,
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

impl RelationshipRecord {
    fn new(
        verifiable_id: String,
        relationship_type_uri: String,
        parties: RelationshipParties,
        effective_timestamp: CanonicalTimestamp,
        status: RelationshipStatus,
        jurisdiction_iso: String,
        attestation: Attestation,
    ) -> Self {
        Self {
            verifiable_id,
            relationship_type_uri,
            parties,
            effective_timestamp,
            status,
            jurisdiction_iso,
            attestation,
            schema_version: SCHEMA_VERSION.to_string(),
            parent_relationship_id: None,
            expiration_timestamp: None,
            financial_terms: None,
            terms_attributes: None,
            source_references: None,
            previous_record_hash: None,
            revision_number: 1,
        }
    }

    /// Creates a bilateral relationship record.
    pub fn new_bilateral(
        verifiable_id: impl Into<String>,
        relationship_type_uri: impl Into<String>,
        parties: BilateralParties,
        effective_timestamp: CanonicalTimestamp,
        status: RelationshipStatus,
        jurisdiction_iso: impl Into<String>,
        attestation: Attestation,
    ) -> Self {
        Self::new(
            verifiable_id.into(),
            relationship_type_uri.into(),
            RelationshipParties::Bilateral { parties },
            effective_timestamp,
            status,
            jurisdiction_iso.into(),
            attestation,
        )
    }

    /// Creates a multilateral relationship record.
    pub fn new_multilateral(
        verifiable_id: impl Into<String>,
        relationship_type_uri: impl Into<String>,
        members: MultilateralMembers,
        effective_timestamp: CanonicalTimestamp,
        status: RelationshipStatus,
        jurisdiction_iso: impl Into<String>,
        attestation: Attestation,
    ) -> Self {
        Self::new(
            verifiable_id.into(),
            relationship_type_uri.into(),
            RelationshipParties::Multilateral { members },
            effective_timestamp,
            status,
            jurisdiction_iso.into(),
            attestation,
        )
    }

    /// Returns a copy with the parent relationship set.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_relationship_id = Some(parent_id.into());
        self
    }

    /// Returns a copy with the expiration timestamp set.
    pub fn with_expiration(mut self, timestamp: CanonicalTimestamp) -> Self {
        self.expiration_timestamp = Some(timestamp);
        self
    }

    /// Returns a copy with financial terms set.
    pub fn with_financial_terms(mut self, terms: FinancialTerms) -> Self {
        self.financial_terms = Some(terms);
        self
    }

    /// Returns a copy with a term attribute added.
    pub fn with_terms_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.terms_attributes
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
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

    /// Checks structural invariants, including share consistency for
    /// multilateral parties.
    pub fn validate(&self) -> CepResult<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(CepError::UnsupportedVersion(self.schema_version.clone()));
        }
        if self.verifiable_id.is_empty() {
            return Err(CepError::Validation("verifiableId is required".into()));
        }
        if self.relationship_type_uri.is_empty() {
            return Err(CepError::Validation(
                "relationshipTypeUri is required".into(),
            ));
        }
        if self.jurisdiction_iso.is_empty() {
            return Err(CepError::Validation("jurisdictionIso is required".into()));
        }
        if self.revision_number < 1 {
            return Err(CepError::Validation("revisionNumber must be >= 1".into()));
        }
        if let RelationshipParties::Multilateral { members } = &self.parties {
            if members.is_empty() {
                return Err(CepError::Validation(
                    "multilateral relationships need at least one member".into(),
                ));
            }
            members.validate_shares()?;
        }
        Ok(())
    }
}

impl Canonicalize for RelationshipRecord {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        insert_required(&mut fields, "attestation", &self.attestation.to_canonical_string());
        insert_required(
            &mut fields,
            "effectiveTimestamp",
            &self.effective_timestamp.to_canonical_string(),
        );
        if let Some(timestamp) = &self.expiration_timestamp {
            insert_required(
                &mut fields,
                "expirationTimestamp",
                &timestamp.to_canonical_string(),
            );
        }
        if let Some(terms) = &self.financial_terms {
            insert_required(&mut fields, "financialTerms", &terms.to_canonical_string());
        }
        insert_required(&mut fields, "jurisdictionIso", &self.jurisdiction_iso);
        insert_if_present(
            &mut fields,
            "parentRelationshipId",
            self.parent_relationship_id.as_deref(),
        );
        match &self.parties {
            RelationshipParties::Bilateral { parties } => {
                insert_required(
                    &mut fields,
                    "bilateralParties",
                    &parties.to_canonical_string(),
                );
            }
            RelationshipParties::Multilateral { members } => {
                insert_required(
                    &mut fields,
                    "multilateralMembers",
                    &members.to_canonical_string(),
                );
            }
        }
        if let Some(hash) = &self.previous_record_hash {
            insert_required(&mut fields, "previousRecordHash", &hash.as_hex());
        }
        insert_required(
            &mut fields,
            "relationshipTypeUri",
            &self.relationship_type_uri,
        );
        insert_required(&mut fields, "revisionNumber", &self.revision_number.to_string());
        insert_required(&mut fields, "schemaVersion", &self.schema_version);
        if let Some(references) = &self.source_references {
            if !references.is_empty() {
                fields.insert("sourceReferences".to_string(), render_sorted(references));
            }
        }
        insert_required(&mut fields, "status", &self.status.to_canonical_string());
        if let Some(attributes) = &self.terms_attributes {
            if !attributes.is_empty() {
                let json = serde_json::to_string(attributes).unwrap_or_default();
                fields.insert("termsAttributes".to_string(), json);
            }
        }
        insert_required(&mut fields, "verifiableId", &self.verifiable_id);
        fields
    }
}

impl Revisioned for RelationshipRecord {
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
    use crate::multilateral::Member;
    use crate::parties::Party;

    fn test_attestation() -> Attestation {
        Attestation::new(
            "cep-entity:sam-uei:ATTESTOR123A",
            "2025-11-28T14:30:00.000000Z".parse().unwrap(),
            "Ed25519Signature2020",
            "z3FXQqFwbZxKBxGxqFpCDabcdef1234567890",
            "did:web:example.gov#key-1",
        )
    }

    fn bilateral() -> RelationshipRecord {
        RelationshipRecord::new_bilateral(
            "cep-relationship:usaspending:CONT_AWD_12345",
            "https://civic-exchange.org/vocabulary/relationship-type#prime-contract",
            BilateralParties::new(
                Party::new("cep-entity:sam-uei:AGENCY12345A", "urn:role:grantor"),
                Party::new("cep-entity:sam-uei:VENDOR67890B", "urn:role:grantee"),
            ),
            "2025-01-01T00:00:00.000000Z".parse().unwrap(),
            RelationshipStatus::new(
                RelationshipStatusCode::Active,
                "2025-01-01T00:00:00.000000Z".parse().unwrap(),
            ),
            "US",
            test_attestation(),
        )
    }

    fn multilateral() -> RelationshipRecord {
        let members = MultilateralMembers::new()
            .with_member(Member::new("cep-entity:b", "urn:role:member").with_share(0.5))
            .with_member(Member::new("cep-entity:a", "urn:role:member").with_share(0.5));
        RelationshipRecord::new_multilateral(
            "cep-relationship:local:JV_001",
            "https://civic-exchange.org/vocabulary/relationship-type#joint-venture",
            members,
            "2025-01-01T00:00:00.000000Z".parse().unwrap(),
            RelationshipStatus::new(
                RelationshipStatusCode::Active,
                "2025-01-01T00:00:00.000000Z".parse().unwrap(),
            ),
            "US",
            test_attestation(),
        )
    }

    #[test]
    fn bilateral_record_validates() {
        assert!(bilateral().validate().is_ok());
    }

    #[test]
    fn canonical_keys_are_sorted() {
        let record = bilateral()
            .with_financial_terms(
                FinancialTerms::new("USD")
                    .with_total_value(500_000.0)
                    .with_obligated_value(250_000.0),
            )
            .with_source_reference(SourceReference::new("https://a.example.gov", "1"));
        let keys: Vec<String> = record.canonical_fields().keys().cloned().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn bilateral_and_multilateral_use_distinct_keys() {
        assert!(bilateral()
            .canonical_fields()
            .contains_key("bilateralParties"));
        assert!(multilateral()
            .canonical_fields()
            .contains_key("multilateralMembers"));
    }

    #[test]
    fn unbalanced_multilateral_shares_fail_validation() {
        let members = MultilateralMembers::new()
            .with_member(Member::new("cep-entity:a", "urn:role:member").with_share(0.5))
            .with_member(Member::new("cep-entity:b", "urn:role:member").with_share(0.4));
        let record = RelationshipRecord::new_multilateral(
            "cep-relationship:local:JV_002",
            "urn:type:joint-venture",
            members,
            "2025-01-01T00:00:00.000000Z".parse().unwrap(),
            RelationshipStatus::new(
                RelationshipStatusCode::Active,
                "2025-01-01T00:00:00.000000Z".parse().unwrap(),
            ),
            "US",
            test_attestation(),
        );
        assert!(record.validate().is_err());
    }

    #[test]
    fn empty_multilateral_membership_fails_validation() {
        let record = RelationshipRecord::new_multilateral(
            "cep-relationship:local:JV_003",
            "urn:type:joint-venture",
            MultilateralMembers::new(),
            "2025-01-01T00:00:00.000000Z".parse().unwrap(),
            RelationshipStatus::new(
                RelationshipStatusCode::Active,
                "2025-01-01T00:00:00.000000Z".parse().unwrap(),
            ),
            "US",
            test_attestation(),
        );
        assert!(record.validate().is_err());
    }

    #[test]
    fn source_reference_order_does_not_change_the_hash() {
        let forward = bilateral()
            .with_source_reference(SourceReference::new("https://a.example.gov", "1"))
            .with_source_reference(SourceReference::new("https://b.example.gov", "2"));
        let reverse = bilateral()
            .with_source_reference(SourceReference::new("https://b.example.gov", "2"))
            .with_source_reference(SourceReference::new("https://a.example.gov", "1"));
        assert_eq!(forward.calculate_hash(), reverse.calculate_hash());
    }

    #[test]
    fn terms_attributes_render_as_sorted_compact_json() {
        let record = bilateral()
            .with_terms_attribute("zeta", "2")
            .with_terms_attribute("alpha", "1");
        let fields = record.canonical_fields();
        assert_eq!(
            fields.get("termsAttributes").unwrap(),
            r#"{"alpha":"1","zeta":"2"}"#
        );
    }

    #[test]
    fn financial_terms_render_two_decimals() {
        let terms = FinancialTerms::new("USD")
            .with_total_value(500_000.0)
            .with_obligated_value(250_000.0);
        let canonical = terms.to_canonical_string();
        assert_eq!(
            canonical,
            r#""currencyCode":"USD","obligatedValue":"250000.00","totalValue":"500000.00""#
        );
    }
}
