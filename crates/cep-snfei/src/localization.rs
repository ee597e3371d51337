//! Jurisdiction-specific name rewrites applied before normalization.
//!
//! Localization maps regional spellings onto the vocabulary the normalizer
//! expects ("Centre" to "center", "Municipio" to "municipality"). Rules are
//! configuration data: the built-in table can be replaced wholesale by
//! deserializing a [`LocalizationTable`] from JSON, with no code change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Built-in rewrite rules, keyed by jurisdiction or country code.
const BUILTIN_RULES: &[(&str, &[(&str, &str)])] = &[
    (
        "CA",
        &[
            ("centre", "center"),
            ("organisation", "organization"),
            ("programme", "program"),
        ],
    ),
    (
        "GB",
        &[
            ("centre", "center"),
            ("labour", "labor"),
            ("licence", "license"),
            ("organisation", "organization"),
            ("programme", "program"),
        ],
    ),
    (
        "US-PR",
        &[
            ("ayuntamiento", "municipality"),
            ("departamento", "department"),
            ("municipio", "municipality"),
        ],
    ),
];

/// Jurisdiction-keyed token rewrite table.
///
/// Lookup tries the full jurisdiction code first (`US-PR`), then its country
/// prefix (`US`). Unknown jurisdictions leave the name untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizationTable {
    rules: BTreeMap<String, BTreeMap<String, String>>,
}

impl LocalizationTable {
    /// An empty table; every lookup is the identity.
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Rewrites a name using the rules for the given jurisdiction.
    ///
    /// Matching is token-based and case-insensitive; replaced tokens come out
    /// in the rule's (lowercase) spelling, which the normalizer folds anyway.
    pub fn apply(&self, name: &str, jurisdiction: &str) -> String {
        let Some(rules) = self.rules_for(jurisdiction) else {
            return name.to_string();
        };
        name.split_whitespace()
            .map(|token| {
                let key: String = token
                    .chars()
                    .filter(|c| c.is_alphanumeric())
                    .collect::<String>()
                    .to_lowercase();
                rules.get(&key).map(String::as_str).unwrap_or(token)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn rules_for(&self, jurisdiction: &str) -> Option<&BTreeMap<String, String>> {
        let code = jurisdiction.trim().to_uppercase();
        if code.is_empty() {
            return None;
        }
        if let Some(rules) = self.rules.get(&code) {
            return Some(rules);
        }
        let country = code.split('-').next().unwrap_or(&code);
        self.rules.get(country)
    }
}

impl Default for LocalizationTable {
    fn default() -> Self {
        let mut rules = BTreeMap::new();
        for (jurisdiction, pairs) in BUILTIN_RULES {
            let entry: BTreeMap<String, String> = pairs
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect();
            rules.insert(jurisdiction.to_string(), entry);
        }
        Self { rules }
    }
}

/// Rewrites a name using the built-in rules for the given jurisdiction.
///
/// Applied only when a jurisdiction or country context is available; an
/// empty jurisdiction is the identity.
pub fn apply_localization(name: &str, jurisdiction: &str) -> String {
    LocalizationTable::default().apply(name, jurisdiction)
}
