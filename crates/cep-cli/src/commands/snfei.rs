//! Snfei command implementation.

use cep_snfei::generate_snfei_with_confidence;
use serde_json::json;

pub fn run(
    legal_name: String,
    country_code: String,
    address: Option<String>,
    registration_date: Option<String>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = generate_snfei_with_confidence(
        &legal_name,
        &country_code,
        address.as_deref(),
        registration_date.as_deref(),
        None,
        None,
    );

    if json_output {
        let output = json!({
            "snfei": result.snfei.as_str(),
            "tier": result.tier,
            "confidenceScore": result.confidence_score,
            "canonicalInput": result.canonical.to_hash_string(),
            "fieldsUsed": result.fields_used,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("SNFEI: {}", result.snfei);
        println!("Tier: {}, confidence: {}", result.tier, result.confidence_score);
        println!("Canonical input: {}", result.canonical.to_hash_string());
    }

    Ok(())
}
