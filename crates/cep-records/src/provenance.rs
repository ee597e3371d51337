//! Provenance chains and categorization codes for exchanges.
//!
//! A provenance chain traces the flow of funds through the civic graph, from
//! the ultimate source through intermediaries to the recorded exchange.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cep_canonical::{insert_if_present, insert_required, CanonicalFields, Canonicalize};

/// An intermediary entity in a funding chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediaryEntity {
    /// Verifiable ID of the intermediary.
    pub entity_id: String,
    /// Vocabulary URI for the intermediary's role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_uri: Option<String>,
}

impl IntermediaryEntity {
    /// Creates an intermediary with just an entity ID.
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            role_uri: None,
        }
    }

    /// Returns a copy with the role URI set.
    pub fn with_role(mut self, role_uri: impl Into<String>) -> Self {
        self.role_uri = Some(role_uri.into());
        self
    }
}

impl Canonicalize for IntermediaryEntity {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        insert_required(&mut fields, "entityId", &self.entity_id);
        insert_if_present(&mut fields, "roleUri", self.role_uri.as_deref());
        fields
    }
}

/// Provenance chain tracing the flow of funds.
///
/// Intermediaries keep their given order: the chain is a path, not a set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceChain {
    /// Free-form tag describing the chain (e.g. `FEDERAL>STATE>DISTRICT`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_chain_tag: Option<String>,
    /// Verifiable ID of the ultimate funding source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ultimate_source_entity_id: Option<String>,
    /// Intermediaries between source and recipient, in path order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intermediary_entities: Option<Vec<IntermediaryEntity>>,
    /// Exchange this one was funded from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_exchange_id: Option<String>,
}

impl ProvenanceChain {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with the funding-chain tag set.
    pub fn with_funding_chain_tag(mut self, tag: impl Into<String>) -> Self {
        self.funding_chain_tag = Some(tag.into());
        self
    }

    /// Returns a copy with the ultimate source set.
    pub fn with_ultimate_source(mut self, entity_id: impl Into<String>) -> Self {
        self.ultimate_source_entity_id = Some(entity_id.into());
        self
    }

    /// Returns a copy with an intermediary appended.
    pub fn with_intermediary(mut self, entity: IntermediaryEntity) -> Self {
        self.intermediary_entities
            .get_or_insert_with(Vec::new)
            .push(entity);
        self
    }

    /// Returns a copy with the parent exchange set.
    pub fn with_parent_exchange(mut self, exchange_id: impl Into<String>) -> Self {
        self.parent_exchange_id = Some(exchange_id.into());
        self
    }

    /// Whether any provenance information is present.
    pub fn has_any(&self) -> bool {
        self.funding_chain_tag.is_some()
            || self.ultimate_source_entity_id.is_some()
            || self
                .intermediary_entities
                .as_ref()
                .is_some_and(|entities| !entities.is_empty())
            || self.parent_exchange_id.is_some()
    }
}

impl Canonicalize for ProvenanceChain {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        insert_if_present(
            &mut fields,
            "fundingChainTag",
            self.funding_chain_tag.as_deref(),
        );
        if let Some(entities) = &self.intermediary_entities {
            if !entities.is_empty() {
                let joined = entities
                    .iter()
                    .map(|entity| entity.to_canonical_string())
                    .collect::<Vec<_>>()
                    .join(",");
                fields.insert("intermediaryEntities".to_string(), format!("[{joined}]"));
            }
        }
        insert_if_present(
            &mut fields,
            "parentExchangeId",
            self.parent_exchange_id.as_deref(),
        );
        insert_if_present(
            &mut fields,
            "ultimateSourceEntityId",
            self.ultimate_source_entity_id.as_deref(),
        );
        fields
    }
}

/// Categorization codes for reporting and analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeCategorization {
    /// CFDA program number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cfda_number: Option<String>,
    /// NAICS industry code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub naics_code: Option<String>,
    /// GTAS account code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gtas_account_code: Option<String>,
    /// Local category code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_category_code: Option<String>,
    /// Label for the local category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_category_label: Option<String>,
}

impl ExchangeCategorization {
    /// An empty categorization.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with the CFDA number set.
    pub fn with_cfda(mut self, cfda: impl Into<String>) -> Self {
        self.cfda_number = Some(cfda.into());
        self
    }

    /// Returns a copy with the NAICS code set.
    pub fn with_naics(mut self, naics: impl Into<String>) -> Self {
        self.naics_code = Some(naics.into());
        self
    }

    /// Returns a copy with the GTAS account code set.
    pub fn with_gtas(mut self, gtas: impl Into<String>) -> Self {
        self.gtas_account_code = Some(gtas.into());
        self
    }

    /// Returns a copy with the local category set.
    pub fn with_local_category(
        mut self,
        code: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.local_category_code = Some(code.into());
        self.local_category_label = Some(label.into());
        self
    }

    /// Whether any categorization code is present.
    pub fn has_any(&self) -> bool {
        self.cfda_number.is_some()
            || self.naics_code.is_some()
            || self.gtas_account_code.is_some()
            || self.local_category_code.is_some()
    }
}

impl Canonicalize for ExchangeCategorization {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        insert_if_present(&mut fields, "cfdaNumber", self.cfda_number.as_deref());
        insert_if_present(
            &mut fields,
            "gtasAccountCode",
            self.gtas_account_code.as_deref(),
        );
        insert_if_present(
            &mut fields,
            "localCategoryCode",
            self.local_category_code.as_deref(),
        );
        insert_if_present(
            &mut fields,
            "localCategoryLabel",
            self.local_category_label.as_deref(),
        );
        insert_if_present(&mut fields, "naicsCode", self.naics_code.as_deref());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chain_has_nothing() {
        let chain = ProvenanceChain::new();
        assert!(!chain.has_any());
        assert!(chain.canonical_fields().is_empty());
    }

    #[test]
    fn intermediaries_keep_path_order() {
        let chain = ProvenanceChain::new()
            .with_intermediary(IntermediaryEntity::new("cep-entity:z"))
            .with_intermediary(IntermediaryEntity::new("cep-entity:a"));
        let fields = chain.canonical_fields();
        let rendered = fields.get("intermediaryEntities").unwrap();
        assert!(rendered.find("cep-entity:z").unwrap() < rendered.find("cep-entity:a").unwrap());
    }

    #[test]
    fn funding_chain_fields_render() {
        let chain = ProvenanceChain::new()
            .with_funding_chain_tag("FEDERAL>STATE>SCHOOL_DISTRICT")
            .with_ultimate_source("cep-entity:sam-uei:USDOE12345AB");
        let fields = chain.canonical_fields();
        assert!(fields.contains_key("fundingChainTag"));
        assert!(fields.contains_key("ultimateSourceEntityId"));
    }

    #[test]
    fn categorization_reports_presence() {
        assert!(!ExchangeCategorization::new().has_any());
        assert!(ExchangeCategorization::new().with_cfda("84.010").has_any());
    }
}
