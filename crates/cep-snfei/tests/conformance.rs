//! Runs the repository's shipped conformance vectors through the pipeline.

use std::path::PathBuf;

use cep_snfei::{run_manifest, run_vector_file};

fn vectors_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("test_vectors")
}

#[test]
fn shipped_manifest_passes() {
    let count = run_manifest(vectors_root().join("manifest.json")).unwrap();
    assert!(count >= 20, "expected the full vector set to run, got {count}");
}

#[test]
fn normalization_vectors_pass() {
    let count = run_vector_file(vectors_root().join("snfei").join("normalization.json")).unwrap();
    assert!(count > 0);
}

#[test]
fn generation_vectors_pass() {
    let count = run_vector_file(vectors_root().join("snfei").join("generation.json")).unwrap();
    assert!(count > 0);
}
