//! Hash command implementation.

use std::fs;

use cep_canonical::Canonicalize;
use cep_records::{EntityRecord, ExchangeRecord, RelationshipRecord};
use serde_json::json;

use crate::RecordType;

pub fn run(
    record_path: String,
    record_type: RecordType,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(&record_path)
        .map_err(|e| format!("failed to read '{}': {}", record_path, e))?;

    let (canonical, hash) = match record_type {
        RecordType::Entity => {
            let record: EntityRecord = serde_json::from_str(&text)?;
            record.validate()?;
            (record.to_canonical_string(), record.calculate_hash())
        }
        RecordType::Relationship => {
            let record: RelationshipRecord = serde_json::from_str(&text)?;
            record.validate()?;
            (record.to_canonical_string(), record.calculate_hash())
        }
        RecordType::Exchange => {
            let record: ExchangeRecord = serde_json::from_str(&text)?;
            record.validate()?;
            (record.to_canonical_string(), record.calculate_hash())
        }
    };

    if json_output {
        let output = json!({
            "canonicalString": canonical,
            "hash": hash.as_hex(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Canonical string:\n{}", canonical);
        println!("SHA-256: {}", hash.as_hex());
    }

    Ok(())
}
