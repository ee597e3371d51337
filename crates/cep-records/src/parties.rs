//! Bilateral party structures for two-party relationships.
//!
//! Bilateral relationships have fixed directionality: party A initiates,
//! grants, or contracts; party B receives, performs, or benefits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cep_canonical::{insert_required, CanonicalFields, Canonicalize};

/// A role-tagged party in a bilateral relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    /// Verifiable ID of the participating entity.
    pub entity_id: String,
    /// Vocabulary URI for the party's role.
    pub role_uri: String,
}

impl Party {
    /// Creates a party.
    pub fn new(entity_id: impl Into<String>, role_uri: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            role_uri: role_uri.into(),
        }
    }
}

impl Canonicalize for Party {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        insert_required(&mut fields, "entityId", &self.entity_id);
        insert_required(&mut fields, "roleUri", &self.role_uri);
        fields
    }
}

/// The two parties of a bilateral relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BilateralParties {
    /// Initiating, granting, or contracting party.
    pub party_a: Party,
    /// Receiving, performing, or beneficiary party.
    pub party_b: Party,
}

impl BilateralParties {
    /// Creates the party pair.
    pub fn new(party_a: Party, party_b: Party) -> Self {
        Self { party_a, party_b }
    }
}

impl Canonicalize for BilateralParties {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        insert_required(&mut fields, "partyA", &self.party_a.to_canonical_string());
        insert_required(&mut fields, "partyB", &self.party_b.to_canonical_string());
        fields
    }
}
