//! Verify-chain command implementation.

use std::fs;

use cep_records::{verify_chain, EntityRecord, ExchangeRecord, RelationshipRecord, Revisioned};
use serde_json::json;

use crate::RecordType;

pub fn run(
    records_path: String,
    record_type: RecordType,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(&records_path)
        .map_err(|e| format!("failed to read '{}': {}", records_path, e))?;

    let revisions = match record_type {
        RecordType::Entity => {
            let records: Vec<EntityRecord> = serde_json::from_str(&text)?;
            for record in &records {
                record.validate()?;
            }
            check(&records)?
        }
        RecordType::Relationship => {
            let records: Vec<RelationshipRecord> = serde_json::from_str(&text)?;
            for record in &records {
                record.validate()?;
            }
            check(&records)?
        }
        RecordType::Exchange => {
            let records: Vec<ExchangeRecord> = serde_json::from_str(&text)?;
            for record in &records {
                record.validate()?;
            }
            check(&records)?
        }
    };

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({"ok": true, "revisions": revisions}))?
        );
    } else {
        println!("Chain OK ({} revisions)", revisions);
    }

    Ok(())
}

fn check<R: Revisioned>(records: &[R]) -> Result<usize, Box<dyn std::error::Error>> {
    verify_chain(records)?;
    Ok(records.len())
}
