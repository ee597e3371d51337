//! Integration tests for CLI commands.

use std::fs;
use std::process::Command;

use cep_canonical::{Attestation, Canonicalize};
use cep_records::{EntityIdentifiers, EntityRecord, EntityStatus, EntityStatusCode, SamUei};
use tempfile::TempDir;

fn run_cli(args: &[&str]) -> (bool, String, String) {
    let output = Command::new("cargo")
        .args(["run", "--bin", "cep", "--"])
        .args(args)
        .output()
        .expect("Failed to execute CLI");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    (output.status.success(), stdout, stderr)
}

fn fixture_entity() -> EntityRecord {
    EntityRecord::new(
        "cep-entity:sam-uei:J6H4FB3N5YK7",
        EntityIdentifiers::new().with_sam_uei(SamUei::parse("J6H4FB3N5YK7").unwrap()),
        "Acme Consulting LLC",
        "US-CA",
        EntityStatus::new(EntityStatusCode::Active, "2020-01-15"),
        Attestation::new(
            "cep-entity:sam-uei:ATTESTOR123A",
            "2025-11-28T14:30:00.000000Z".parse().unwrap(),
            "Ed25519Signature2020",
            "z3FXQqFwbZxKBxGxqFpCDabcdef1234567890",
            "did:web:example.gov#key-1",
        ),
    )
}

#[test]
fn test_snfei_command() {
    let (success, stdout, _) = run_cli(&["snfei", "Springfield School District"]);
    assert!(success);
    assert!(stdout.contains("SNFEI: "));
    assert!(stdout.contains("Tier: 3, confidence: 0.5"));
    assert!(stdout.contains("Canonical input: springfield school district||US|"));
}

#[test]
fn test_snfei_json_output() {
    let (success, stdout, _) = run_cli(&[
        "snfei",
        "Springfield School District",
        "--country-code",
        "US",
        "--json",
    ]);
    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["tier"], 3);
    assert_eq!(parsed["canonicalInput"], "springfield school district||US|");
    assert_eq!(parsed["snfei"].as_str().unwrap().len(), 64);
}

#[test]
fn test_hash_command_matches_library() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("entity.json");
    let entity = fixture_entity();
    fs::write(&path, serde_json::to_string_pretty(&entity).unwrap()).unwrap();

    let (success, stdout, _) = run_cli(&[
        "hash",
        path.to_str().unwrap(),
        "--record-type",
        "entity",
        "--json",
    ]);
    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        parsed["hash"].as_str().unwrap(),
        entity.calculate_hash().as_hex()
    );
    assert_eq!(
        parsed["canonicalString"].as_str().unwrap(),
        entity.to_canonical_string()
    );
}

#[test]
fn test_verify_chain_command() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("chain.json");
    let first = fixture_entity();
    let second = fixture_entity()
        .with_naics("541512")
        .with_previous_hash(first.calculate_hash())
        .with_revision(2);
    fs::write(&path, serde_json::to_string(&vec![first, second]).unwrap()).unwrap();

    let (success, stdout, _) = run_cli(&[
        "verify-chain",
        path.to_str().unwrap(),
        "--record-type",
        "entity",
    ]);
    assert!(success);
    assert!(stdout.contains("Chain OK (2 revisions)"));
}

#[test]
fn test_verify_chain_rejects_broken_links() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.json");
    let first = fixture_entity();
    // Second revision claims a parent digest that is not the first's.
    let second = fixture_entity()
        .with_previous_hash(fixture_entity().with_naics("999999").calculate_hash())
        .with_revision(2);
    fs::write(&path, serde_json::to_string(&vec![first, second]).unwrap()).unwrap();

    let (success, _, stderr) = run_cli(&[
        "verify-chain",
        path.to_str().unwrap(),
        "--record-type",
        "entity",
    ]);
    assert!(!success);
    assert!(stderr.contains("hash verification failed"));
}

#[test]
fn test_version_command() {
    let (success, stdout, _) = run_cli(&["version"]);
    assert!(success);
    assert_eq!(stdout.trim(), env!("CARGO_PKG_VERSION"));
}
