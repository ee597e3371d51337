//! Hash-linked revision chains and their verification.
//!
//! Each record may carry the digest of its immediate predecessor, forming an
//! append-only, singly-linked history. Verification is an explicit operation,
//! distinct from construction: a record is well-formed on its own regardless
//! of chain context. Digests are always recomputed from canonical strings;
//! there is no cache to go stale.

use cep_canonical::{CanonicalHash, Canonicalize, CepError, CepResult, SCHEMA_VERSION};

pub(crate) fn default_revision() -> u32 {
    1
}

pub(crate) fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

/// Records that participate in a revision chain.
pub trait Revisioned: Canonicalize {
    /// This record's revision number (>= 1).
    fn revision_number(&self) -> u32;

    /// Digest of the immediately preceding revision, if any.
    fn previous_record_hash(&self) -> Option<&CanonicalHash>;
}

/// Verifies that `next` is the legitimate successor revision of `previous`.
///
/// `next` must carry a parent digest equal to the digest recomputed from
/// `previous`, and a revision number exactly one greater.
pub fn verify_link<R: Revisioned>(previous: &R, next: &R) -> CepResult<()> {
    let expected = previous.calculate_hash();
    let actual = next.previous_record_hash().ok_or_else(|| {
        CepError::RevisionChain(format!(
            "revision {} carries no parent digest",
            next.revision_number()
        ))
    })?;
    if *actual != expected {
        return Err(CepError::HashMismatch {
            expected: expected.as_hex(),
            actual: actual.as_hex(),
        });
    }
    if next.revision_number() != previous.revision_number() + 1 {
        return Err(CepError::RevisionChain(format!(
            "revision number {} does not follow {}",
            next.revision_number(),
            previous.revision_number()
        )));
    }
    Ok(())
}

/// Verifies a whole chain, oldest revision first.
///
/// Every adjacent pair must link per [`verify_link`], and a chain starting at
/// revision 1 must not carry a parent digest.
pub fn verify_chain<R: Revisioned>(records: &[R]) -> CepResult<()> {
    if let Some(first) = records.first() {
        if first.revision_number() == 1 && first.previous_record_hash().is_some() {
            return Err(CepError::RevisionChain(
                "revision 1 must not carry a parent digest".into(),
            ));
        }
    }
    for pair in records.windows(2) {
        verify_link(&pair[0], &pair[1])?;
    }
    Ok(())
}
