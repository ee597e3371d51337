//! Member collections for n-ary relationships (consortia, boards, joint
//! ventures).
//!
//! Members live in an ordered map keyed by entity ID, so iteration and
//! serialization order never depend on insertion order and the digest is
//! stable however callers assembled the collection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cep_canonical::{format_share, insert_required, CanonicalFields, Canonicalize, CepError, CepResult};

/// Tolerance when checking that participation shares sum to 1.0.
const SHARE_SUM_TOLERANCE: f64 = 0.0001;

/// A member of a multilateral relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Verifiable ID of the member entity.
    pub entity_id: String,
    /// Vocabulary URI for the member's role.
    pub role_uri: String,
    /// Fractional participation share, when shares are tracked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participation_share: Option<f64>,
}

impl Member {
    /// Creates a member without a participation share.
    pub fn new(entity_id: impl Into<String>, role_uri: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            role_uri: role_uri.into(),
            participation_share: None,
        }
    }

    /// Returns a copy with the participation share set.
    pub fn with_share(mut self, share: f64) -> Self {
        self.participation_share = Some(share);
        self
    }
}

impl Canonicalize for Member {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        insert_required(&mut fields, "entityId", &self.entity_id);
        if let Some(share) = self.participation_share {
            insert_required(&mut fields, "participationShare", &format_share(share));
        }
        insert_required(&mut fields, "roleUri", &self.role_uri);
        fields
    }
}

/// De-duplicating, identifier-sorted member collection.
///
/// Inserting a second member with an entity ID already present is a silent
/// no-op: the first insert wins. Iteration is always sorted by entity ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Member>", from = "Vec<Member>")]
pub struct MultilateralMembers {
    members: BTreeMap<String, Member>,
}

impl MultilateralMembers {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member; duplicates by entity ID are silently dropped.
    pub fn add(&mut self, member: Member) {
        self.members.entry(member.entity_id.clone()).or_insert(member);
    }

    /// Builder-style [`add`](Self::add).
    pub fn with_member(mut self, member: Member) -> Self {
        self.add(member);
        self
    }

    /// Number of distinct members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the collection has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterates members in entity-ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    /// Validates share consistency: shares must be universally absent or
    /// present on every member, and then sum to 1.0 within tolerance.
    pub fn validate_shares(&self) -> CepResult<()> {
        let shares: Vec<f64> = self
            .members
            .values()
            .filter_map(|member| member.participation_share)
            .collect();
        if shares.is_empty() {
            return Ok(());
        }
        if shares.len() != self.members.len() {
            return Err(CepError::Validation(
                "participation shares must be set on every member or on none".into(),
            ));
        }
        let total: f64 = shares.iter().sum();
        if (total - 1.0).abs() > SHARE_SUM_TOLERANCE {
            return Err(CepError::Validation(format!(
                "participation shares must sum to 1.0, got {total:.4}"
            )));
        }
        Ok(())
    }
}

impl From<Vec<Member>> for MultilateralMembers {
    fn from(members: Vec<Member>) -> Self {
        let mut collection = Self::new();
        for member in members {
            collection.add(member);
        }
        collection
    }
}

impl From<MultilateralMembers> for Vec<Member> {
    fn from(collection: MultilateralMembers) -> Self {
        collection.members.into_values().collect()
    }
}

impl Canonicalize for MultilateralMembers {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        if !self.members.is_empty() {
            let joined = self
                .members
                .values()
                .map(|member| member.to_canonical_string())
                .collect::<Vec<_>>()
                .join(",");
            fields.insert("members".to_string(), format!("[{joined}]"));
        }
        fields
    }
}
