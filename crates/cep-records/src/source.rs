//! References to authoritative source records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cep_canonical::{insert_if_present, insert_required, CanonicalFields, Canonicalize};

/// A pointer to the authoritative record a fact was drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReference {
    /// URI identifying the source system.
    pub source_system_uri: String,
    /// Record ID within the source system.
    pub source_record_id: String,
    /// Direct URL to the source record, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl SourceReference {
    /// Creates a source reference.
    pub fn new(source_system_uri: impl Into<String>, source_record_id: impl Into<String>) -> Self {
        Self {
            source_system_uri: source_system_uri.into(),
            source_record_id: source_record_id.into(),
            source_url: None,
        }
    }

    /// Returns a copy with the source URL set.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}

impl Canonicalize for SourceReference {
    fn canonical_fields(&self) -> CanonicalFields {
        let mut fields = BTreeMap::new();
        insert_required(&mut fields, "sourceRecordId", &self.source_record_id);
        insert_required(&mut fields, "sourceSystemUri", &self.source_system_uri);
        insert_if_present(&mut fields, "sourceUrl", self.source_url.as_deref());
        fields
    }
}

/// Renders a reference list as a bracketed array, sorted by system URI then
/// record ID so that the set of sources, not their attachment order,
/// determines the hash.
pub(crate) fn render_sorted(references: &[SourceReference]) -> String {
    let mut sorted: Vec<&SourceReference> = references.iter().collect();
    sorted.sort_by(|a, b| {
        (&a.source_system_uri, &a.source_record_id)
            .cmp(&(&b.source_system_uri, &b.source_record_id))
    });
    let joined = sorted
        .iter()
        .map(|reference| reference.to_canonical_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("[{joined}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_sort_by_system_then_record() {
        let refs = vec![
            SourceReference::new("https://b.example.gov", "2"),
            SourceReference::new("https://b.example.gov", "1"),
            SourceReference::new("https://a.example.gov", "9"),
        ];
        let rendered = render_sorted(&refs);
        let a = rendered.find("a.example.gov").unwrap();
        let b1 = rendered.find(r#""sourceRecordId":"1""#).unwrap();
        let b2 = rendered.find(r#""sourceRecordId":"2""#).unwrap();
        assert!(a < b1);
        assert!(b1 < b2);
    }

    #[test]
    fn url_is_optional() {
        let fields = SourceReference::new("https://a.example.gov", "1").canonical_fields();
        assert!(!fields.contains_key("sourceUrl"));
        let fields = SourceReference::new("https://a.example.gov", "1")
            .with_url("https://a.example.gov/records/1")
            .canonical_fields();
        assert!(fields.contains_key("sourceUrl"));
    }
}
