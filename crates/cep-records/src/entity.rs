//! Entity records: verified civic entities.
//!
//! The entity record is the foundational aggregate. Relationships and
//! exchanges reference attested entities by their verifiable identifiers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cep_canonical::{
    format_amount, insert_if_present, insert_required, Attestation, CanonicalFields, CanonicalHash,
    Canonicalize, CepError, CepResult, SCHEMA_VERSION,
};

use crate::identifiers::EntityIdentifiers;
use crate::revision::{default_revision, default_schema_version, Revisioned};

/// Entity operational status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatusCode {
    /// Entity is operating.
    Active,
    /// Entity exists but is not operating.
    Inactive,
    /// Entity is administratively suspended.
    Suspended,
    /// Entity has been dissolved.
    Dissolved,
    /// Entity has merged into a successor.
    Merged,
}

impl EntityStatusCode {
    /// Canonical string form of the status code.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatusCode::Active => "ACTIVE",
            EntityStatusCode::Inactive => "INACTIVE",
            EntityStatusCode::Suspended => "SUSPENDED",
            EntityStatusCode::Dissolved => "DISSOLVED",
            EntityStatusCode::Merged => "MERGED",
        }
    }
}

/// Entity status block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStatus {
    /// Operational status code.
    pub status_code: EntityStatusCode,
    /// Calendar date (`YYYY-MM-DD`) the status took effect.
    pub status_effective_date: String,
    /// Calendar date the status ended, if it has.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_termination_date: Option<String>,
    /// Verifiable ID of the successor entity after a merge or dissolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub successor_entity_id: Option<String>,
}

impl EntityStatus {
    /// Creates a status with the required fields.
    pub fn new(status_code: EntityStatusCode, status_effective_date: impl Into<String>) -> Self {
        Self {
            status_code,
            status_effective_date: status_effective_date.into(),
            status_termination_date: None,
            successor_entity_id: None,
        }
    }

    /// Returns a copy with the termination date set.
    pub fn with_termination_date(mut self, date: impl Into<String>) -> Self {
        self.status_termination_date = Some(date.into());
        self
    }

    /// Returns a copy with the successor entity set.
    pub fn with_successor(mut self, entity_id: impl Into<String>) -> Self {
        self.successor_entity_id = Some(entity_id.into());
        self
    }
}

impl Canonicalize for EntityStatus {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        insert_required(&mut fields, "statusCode", self.status_code.as_str());
        insert_required(
            &mut fields,
            "statusEffectiveDate",
            &self.status_effective_date,
        );
        insert_if_present(
            &mut fields,
            "statusTerminationDate",
            self.status_termination_date.as_deref(),
        );
        insert_if_present(
            &mut fields,
            "successorEntityId",
            self.successor_entity_id.as_deref(),
        );
        fields
    }
}

/// Entity-resolution confidence metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionConfidence {
    /// Resolution confidence in `[0.0, 1.0]`.
    pub score: f64,
    /// URI describing the resolution method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_uri: Option<String>,
    /// How many source records supported the resolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_record_count: Option<u32>,
}

impl ResolutionConfidence {
    /// Creates a confidence block with just a score.
    pub fn new(score: f64) -> Self {
        Self {
            score,
            method_uri: None,
            source_record_count: None,
        }
    }
}

impl Canonicalize for ResolutionConfidence {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        insert_if_present(&mut fields, "methodUri", self.method_uri.as_deref());
        insert_required(&mut fields, "score", &format_amount(self.score));
        if let Some(count) = self.source_record_count {
            insert_required(&mut fields, "sourceRecordCount", &count.to_string());
        }
        fields
    }
}

/// A complete entity record.
///
/// Immutable; every `with_*` method returns a new value, so a digest read
/// from one state can never go stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    /// Namespaced verifiable identifier for this entity.
    pub verifiable_id: String,
    /// The identifier set backing the verifiable ID.
    pub identifiers: EntityIdentifiers,
    /// Legal name as registered.
    pub legal_name: String,
    /// ISO 3166 jurisdiction code (e.g. `US-CA`).
    pub jurisdiction_iso: String,
    /// Current operational status.
    pub status: EntityStatus,
    /// Proof of origin.
    pub attestation: Attestation,
    /// Schema version the record conforms to.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Normalized form of the legal name, when computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_name_normalized: Option<String>,
    /// Entity-type vocabulary URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type_uri: Option<String>,
    /// NAICS industry code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub naics_code: Option<String>,
    /// Resolution confidence metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_confidence: Option<ResolutionConfidence>,
    /// Digest of the previous revision, linking the revision chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_record_hash: Option<CanonicalHash>,
    /// Revision number, starting at 1.
    #[serde(default = "default_revision")]
    pub revision_number: u32,
}

impl EntityRecord {
    /// Creates an entity record with the required fields.
    pub fn new(
        verifiable_id: impl Into<String>,
        identifiers: EntityIdentifiers,
        legal_name: impl Into<String>,
        jurisdiction_iso: impl Into<String>,
        status: EntityStatus,
        attestation: Attestation,
    ) -> Self {
        Self {
            verifiable_id: verifiable_id.into(),
            identifiers,
            legal_name: legal_name.into(),
            jurisdiction_iso: jurisdiction_iso.into(),
            status,
            attestation,
            schema_version: SCHEMA_VERSION.to_string(),
            legal_name_normalized: None,
            entity_type_uri: None,
            naics_code: None,
            resolution_confidence: None,
            previous_record_hash: None,
            revision_number: 1,
        }
    }

    /// Returns a copy with the normalized name set.
    pub fn with_normalized_name(mut self, name: impl Into<String>) -> Self {
        self.legal_name_normalized = Some(name.into());
        self
    }

    /// Returns a copy with the entity-type URI set.
    pub fn with_entity_type(mut self, uri: impl Into<String>) -> Self {
        self.entity_type_uri = Some(uri.into());
        self
    }

    /// Returns a copy with the NAICS code set.
    pub fn with_naics(mut self, code: impl Into<String>) -> Self {
        self.naics_code = Some(code.into());
        self
    }

    /// Returns a copy with resolution confidence set.
    pub fn with_resolution_confidence(mut self, confidence: ResolutionConfidence) -> Self {
        self.resolution_confidence = Some(confidence);
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

    /// Checks structural invariants. A record must pass before it is used.
    pub fn validate(&self) -> CepResult<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(CepError::UnsupportedVersion(self.schema_version.clone()));
        }
        if self.verifiable_id.is_empty() {
            return Err(CepError::Validation("verifiableId is required".into()));
        }
        if !self.identifiers.has_any() {
            return Err(CepError::Validation(
                "at least one identifier is required".into(),
            ));
        }
        if self.legal_name.is_empty() {
            return Err(CepError::Validation("legalName is required".into()));
        }
        if self.jurisdiction_iso.is_empty() {
            return Err(CepError::Validation("jurisdictionIso is required".into()));
        }
        if self.revision_number < 1 {
            return Err(CepError::Validation("revisionNumber must be >= 1".into()));
        }
        Ok(())
    }
}

impl Canonicalize for EntityRecord {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        insert_required(&mut fields, "attestation", &self.attestation.to_canonical_string());
        insert_if_present(&mut fields, "entityTypeUri", self.entity_type_uri.as_deref());
        insert_required(&mut fields, "identifiers", &self.identifiers.to_canonical_string());
        insert_required(&mut fields, "jurisdictionIso", &self.jurisdiction_iso);
        insert_required(&mut fields, "legalName", &self.legal_name);
        insert_if_present(
            &mut fields,
            "legalNameNormalized",
            self.legal_name_normalized.as_deref(),
        );
        insert_if_present(&mut fields, "naicsCode", self.naics_code.as_deref());
        if let Some(hash) = &self.previous_record_hash {
            insert_required(&mut fields, "previousRecordHash", &hash.as_hex());
        }
        if let Some(confidence) = &self.resolution_confidence {
            insert_required(
                &mut fields,
                "resolutionConfidence",
                &confidence.to_canonical_string(),
            );
        }
        insert_required(&mut fields, "revisionNumber", &self.revision_number.to_string());
        insert_required(&mut fields, "schemaVersion", &self.schema_version);
        insert_required(&mut fields, "status", &self.status.to_canonical_string());
        insert_required(&mut fields, "verifiableId", &self.verifiable_id);
        fields
    }
}

impl Revisioned for EntityRecord {
    fn revision_number(&self) -> u32 {
        self.revision_number
    }

    fn previous_record_hash(&self) -> Option<&CanonicalHash> {
        self.previous_record_hash.as_ref()
    }
}
