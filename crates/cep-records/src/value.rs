//! Value types for exchanges: monetary amounts, in-kind contributions, and
//! the parties between whom value moves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cep_canonical::{
    format_amount, insert_if_present, insert_required, CanonicalFields, Canonicalize,
};

/// Vocabulary URI for monetary value.
pub const VALUE_TYPE_MONETARY: &str =
    "https://civic-exchange.org/vocabulary/value-type#monetary";
/// Vocabulary URI for in-kind value.
pub const VALUE_TYPE_IN_KIND: &str = "https://civic-exchange.org/vocabulary/value-type#in-kind";
/// Vocabulary URI for service-hours value.
pub const VALUE_TYPE_SERVICE_HOURS: &str =
    "https://civic-exchange.org/vocabulary/value-type#service-hours";

/// The value being exchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeValue {
    /// Amount, rendered to two decimals in the canonical string.
    pub amount: f64,
    /// ISO 4217 currency code.
    pub currency_code: String,
    /// Vocabulary URI for the kind of value.
    pub value_type_uri: String,
    /// Description of the contribution for in-kind value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_kind_description: Option<String>,
}

impl ExchangeValue {
    /// A monetary value in the given currency.
    pub fn monetary(amount: f64, currency_code: impl Into<String>) -> Self {
        Self {
            amount,
            currency_code: currency_code.into(),
            value_type_uri: VALUE_TYPE_MONETARY.to_string(),
            in_kind_description: None,
        }
    }

    /// A monetary value in US dollars.
    pub fn usd(amount: f64) -> Self {
        Self::monetary(amount, "USD")
    }

    /// An in-kind contribution valued at `amount` USD.
    pub fn in_kind(amount: f64, description: impl Into<String>) -> Self {
        Self {
            amount,
            currency_code: "USD".to_string(),
            value_type_uri: VALUE_TYPE_IN_KIND.to_string(),
            in_kind_description: Some(description.into()),
        }
    }
}

impl Canonicalize for ExchangeValue {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        insert_required(&mut fields, "amount", &format_amount(self.amount));
        insert_required(&mut fields, "currencyCode", &self.currency_code);
        insert_if_present(
            &mut fields,
            "inKindDescription",
            self.in_kind_description.as_deref(),
        );
        insert_required(&mut fields, "valueTypeUri", &self.value_type_uri);
        fields
    }
}

/// A party in an exchange (source or recipient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeParty {
    /// Verifiable ID of the participating entity.
    pub entity_id: String,
    /// Vocabulary URI for the party's role in the exchange.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_uri: Option<String>,
    /// Account identifier within the party's system, when relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_identifier: Option<String>,
}

impl ExchangeParty {
    /// Creates a party with just an entity ID.
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            role_uri: None,
            account_identifier: None,
        }
    }

    /// Returns a copy with the role URI set.
    pub fn with_role(mut self, role_uri: impl Into<String>) -> Self {
        self.role_uri = Some(role_uri.into());
        self
    }

    /// Returns a copy with the account identifier set.
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account_identifier = Some(account.into());
        self
    }
}

impl Canonicalize for ExchangeParty {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        insert_if_present(
            &mut fields,
            "accountIdentifier",
            self.account_identifier.as_deref(),
        );
        insert_required(&mut fields, "entityId", &self.entity_id);
        insert_if_present(&mut fields, "roleUri", self.role_uri.as_deref());
        fields
    }
}
