//! Entity identifier schemes and the prioritized identifier set.
//!
//! Identifier schemes are organized into tiers:
//!
//! - Global: LEI (ISO 17442 Legal Entity Identifier)
//! - Federal: SAM.gov UEI
//! - Generated: SNFEI fingerprint
//! - Regional: Canadian Business Number
//! - Extension: arbitrary named schemes
//!
//! Format validators are strict and total; malformed input is rejected at
//! construction, never coerced.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use cep_canonical::{insert_if_present, CanonicalFields, Canonicalize, CepError, CepResult};
use cep_snfei::Snfei;

/// Legal Entity Identifier per ISO 17442: exactly 20 alphanumeric
/// characters, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lei(String);

impl Lei {
    /// Parses a validated LEI, folding to uppercase.
    pub fn parse(value: &str) -> CepResult<Self> {
        let folded = value.to_uppercase();
        let re = Regex::new(r"^[A-Z0-9]{20}$").expect("invalid regex");
        if !re.is_match(&folded) {
            return Err(CepError::InvalidIdentifier(format!("invalid LEI: '{value}'")));
        }
        Ok(Self(folded))
    }

    /// The identifier value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// SAM.gov Unique Entity Identifier: exactly 12 uppercase alphanumeric
/// characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SamUei(String);

impl SamUei {
    /// Parses a validated SAM UEI. Lowercase input is rejected, not folded.
    pub fn parse(value: &str) -> CepResult<Self> {
        let re = Regex::new(r"^[A-Z0-9]{12}$").expect("invalid regex");
        if !re.is_match(value) {
            return Err(CepError::InvalidIdentifier(format!(
                "invalid SAM UEI: '{value}'"
            )));
        }
        Ok(Self(value.to_string()))
    }

    /// The identifier value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Canadian Business Number with program account: 9 digits, 2 uppercase
/// letters, 4 digits (e.g. `123456789RC0001`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanadianBn(String);

impl CanadianBn {
    /// Parses a validated Canadian BN.
    pub fn parse(value: &str) -> CepResult<Self> {
        let re = Regex::new(r"^[0-9]{9}[A-Z]{2}[0-9]{4}$").expect("invalid regex");
        if !re.is_match(value) {
            return Err(CepError::InvalidIdentifier(format!(
                "invalid Canadian BN: '{value}'"
            )));
        }
        Ok(Self(value.to_string()))
    }

    /// The identifier value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An identifier under a scheme not explicitly modeled here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalScheme {
    /// URI identifying the scheme.
    pub scheme_uri: String,
    /// Identifier value under that scheme.
    pub value: String,
}

/// Every known identifier for an entity.
///
/// A usable identity needs at least one populated slot. Exactly one primary
/// identifier is derived by fixed priority; see [`primary_identifier`].
///
/// [`primary_identifier`]: EntityIdentifiers::primary_identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityIdentifiers {
    /// Global LEI, when assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lei: Option<Lei>,
    /// Federal SAM UEI, when assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sam_uei: Option<SamUei>,
    /// Generated fingerprint, when no authoritative identifier exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snfei: Option<Snfei>,
    /// Canadian Business Number, when assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canadian_bn: Option<CanadianBn>,
    /// Extension schemes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_schemes: Option<Vec<AdditionalScheme>>,
}

impl EntityIdentifiers {
    /// An empty identifier set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with the LEI set.
    pub fn with_lei(mut self, lei: Lei) -> Self {
        self.lei = Some(lei);
        self
    }

    /// Returns a copy with the SAM UEI set.
    pub fn with_sam_uei(mut self, uei: SamUei) -> Self {
        self.sam_uei = Some(uei);
        self
    }

    /// Returns a copy with the fingerprint set.
    pub fn with_snfei(mut self, snfei: Snfei) -> Self {
        self.snfei = Some(snfei);
        self
    }

    /// Returns a copy with the Canadian BN set.
    pub fn with_canadian_bn(mut self, bn: CanadianBn) -> Self {
        self.canadian_bn = Some(bn);
        self
    }

    /// Returns a copy with an additional scheme appended.
    pub fn with_additional_scheme(mut self, scheme: AdditionalScheme) -> Self {
        self.additional_schemes
            .get_or_insert_with(Vec::new)
            .push(scheme);
        self
    }

    /// Whether at least one identifier slot is populated.
    pub fn has_any(&self) -> bool {
        self.lei.is_some()
            || self.sam_uei.is_some()
            || self.snfei.is_some()
            || self.canadian_bn.is_some()
            || self
                .additional_schemes
                .as_ref()
                .is_some_and(|schemes| !schemes.is_empty())
    }

    /// Resolves the single primary identifier as a namespaced string.
    ///
    /// Priority: LEI, then SAM UEI, then SNFEI, then Canadian BN, then the
    /// first additional scheme. `None` when no slot is populated.
    pub fn primary_identifier(&self) -> Option<String> {
        if let Some(lei) = &self.lei {
            return Some(format!("cep-entity:lei:{}", lei.as_str()));
        }
        if let Some(uei) = &self.sam_uei {
            return Some(format!("cep-entity:sam-uei:{}", uei.as_str()));
        }
        if let Some(snfei) = &self.snfei {
            return Some(format!("cep-entity:snfei:{}", snfei.as_str()));
        }
        if let Some(bn) = &self.canadian_bn {
            return Some(format!("cep-entity:canadian-bn:{}", bn.as_str()));
        }
        if let Some(scheme) = self.additional_schemes.as_ref().and_then(|s| s.first()) {
            return Some(format!("cep-entity:other:{}", scheme.value));
        }
        None
    }
}

impl Canonicalize for EntityIdentifiers {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        if let Some(schemes) = &self.additional_schemes {
            if !schemes.is_empty() {
                let mut sorted: Vec<&AdditionalScheme> = schemes.iter().collect();
                sorted.sort_by(|a, b| a.scheme_uri.cmp(&b.scheme_uri));
                let json = serde_json::to_string(&sorted).unwrap_or_default();
                fields.insert("additionalSchemes".to_string(), json);
            }
        }
        insert_if_present(
            &mut fields,
            "canadianBn",
            self.canadian_bn.as_ref().map(CanadianBn::as_str),
        );
        insert_if_present(&mut fields, "lei", self.lei.as_ref().map(Lei::as_str));
        insert_if_present(
            &mut fields,
            "samUei",
            self.sam_uei.as_ref().map(SamUei::as_str),
        );
        insert_if_present(&mut fields, "snfei", self.snfei.as_ref().map(Snfei::as_str));
        fields
    }
}
