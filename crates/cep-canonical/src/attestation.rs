//! Proof-of-origin block attached to every record.
//!
//! An attestation states who vouches for a record, when, and how the claim
//! can be verified. The structure aligns with W3C Verifiable Credentials
//! Data Integrity proofs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::canonical::{insert_if_present, insert_required, CanonicalFields, Canonicalize};
use crate::timestamp::CanonicalTimestamp;

/// The purpose of a cryptographic proof.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    /// The proof asserts the truth of a claim.
    #[default]
    AssertionMethod,
    /// The proof authenticates the identity of the attestor.
    Authentication,
    /// The proof delegates a capability to another party.
    CapabilityDelegation,
}

impl ProofPurpose {
    /// Canonical string form of the purpose.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProofPurpose::AssertionMethod => "assertionMethod",
            ProofPurpose::Authentication => "authentication",
            ProofPurpose::CapabilityDelegation => "capabilityDelegation",
        }
    }
}

/// Attestation proving record origin and integrity.
///
/// Immutable; the `with_*` methods return updated copies. Equality and
/// hashing consider every present field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    /// Verifiable ID of the entity or node attesting to this record.
    pub attestor_id: String,
    /// When the attestation was created.
    pub attestation_timestamp: CanonicalTimestamp,
    /// Proof algorithm identifier, e.g. `Ed25519Signature2020`.
    pub proof_type: String,
    /// The cryptographic signature or proof value.
    pub proof_value: String,
    /// URI resolving to the public key or DID document for verification.
    pub verification_method_uri: String,
    /// The purpose of the proof.
    #[serde(default)]
    pub proof_purpose: ProofPurpose,
    /// Optional URI to a timestamping authority or ledger anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_uri: Option<String>,
}

impl Attestation {
    /// Creates an attestation with the required fields.
    pub fn new(
        attestor_id: impl Into<String>,
        attestation_timestamp: CanonicalTimestamp,
        proof_type: impl Into<String>,
        proof_value: impl Into<String>,
        verification_method_uri: impl Into<String>,
    ) -> Self {
        Self {
            attestor_id: attestor_id.into(),
            attestation_timestamp,
            proof_type: proof_type.into(),
            proof_value: proof_value.into(),
            verification_method_uri: verification_method_uri.into(),
            proof_purpose: ProofPurpose::default(),
            anchor_uri: None,
        }
    }

    /// Returns a copy with the proof purpose set.
    pub fn with_purpose(mut self, purpose: ProofPurpose) -> Self {
        self.proof_purpose = purpose;
        self
    }

    /// Returns a copy with the anchor URI set.
    pub fn with_anchor(mut self, uri: impl Into<String>) -> Self {
        self.anchor_uri = Some(uri.into());
        self
    }
}

impl Canonicalize for Attestation {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        insert_if_present(&mut fields, "anchorUri", self.anchor_uri.as_deref());
        insert_required(
            &mut fields,
            "attestationTimestamp",
            &self.attestation_timestamp.to_canonical_string(),
        );
        insert_required(&mut fields, "attestorId", &self.attestor_id);
        insert_required(&mut fields, "proofPurpose", self.proof_purpose.as_str());
        insert_required(&mut fields, "proofType", &self.proof_type);
        insert_required(&mut fields, "proofValue", &self.proof_value);
        insert_required(
            &mut fields,
            "verificationMethodUri",
            &self.verification_method_uri,
        );
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_attestation() -> Attestation {
        Attestation::new(
            "cep-entity:sam-uei:J6H4FB3N5YK7",
            "2025-11-28T14:30:00.000000Z".parse().unwrap(),
            "Ed25519Signature2020",
            "z3FXQqFwbZxKBxGxqFpCD...",
            "did:web:example.gov#key-1",
        )
    }

    #[test]
    fn canonical_field_order_is_alphabetical() {
        let fields = test_attestation().canonical_fields();
        let keys: Vec<&String> = fields.keys().collect();
        assert_eq!(
            keys,
            vec![
                "attestationTimestamp",
                "attestorId",
                "proofPurpose",
                "proofType",
                "proofValue",
                "verificationMethodUri"
            ]
        );
    }

    #[test]
    fn canonical_string_starts_with_timestamp() {
        let canonical = test_attestation().to_canonical_string();
        assert!(canonical.starts_with(r#""attestationTimestamp":"2025-11-28T14:30:00.000000Z""#));
        assert!(canonical.contains(r#""attestorId":"cep-entity:sam-uei:J6H4FB3N5YK7""#));
        assert!(canonical.contains(r#""proofPurpose":"assertionMethod""#));
    }

    #[test]
    fn anchor_uri_appears_when_set() {
        let attestation =
            test_attestation().with_anchor("https://anchor.example.gov/tx/abc123");
        assert!(attestation.canonical_fields().contains_key("anchorUri"));
    }

    #[test]
    fn equal_attestations_hash_identically() {
        assert_eq!(
            test_attestation().calculate_hash(),
            test_attestation().calculate_hash()
        );
    }
}
