//! Record types for the Civic Exchange Protocol.
//!
//! This crate provides the three record aggregates and their verification:
//! - [`EntityRecord`]: a verified civic entity
//! - [`RelationshipRecord`]: a bilateral or multilateral relationship
//!   between attested entities
//! - [`ExchangeRecord`]: a value exchange within a relationship
//!
//! Core invariants:
//! - Records are immutable value objects; every update returns a new value
//! - Canonical field keys are strictly alphabetical; collections are sorted
//!   by documented keys, never by insertion order
//! - Digests are content-derived and always recomputed, never cached
//! - Revision chains link records by parent digest and are verified by an
//!   explicit operation, distinct from construction
//!
#![deny(missing_docs)]

/// Entity records and their status blocks.
pub mod entity;
/// Exchange records and their status blocks.
pub mod exchange;
/// Identifier schemes and the prioritized identifier set.
pub mod identifiers;
/// Member collections for n-ary relationships.
pub mod multilateral;
/// Bilateral party structures.
pub mod parties;
/// Provenance chains and categorization codes.
pub mod provenance;
/// Relationship records and financial terms.
pub mod relationship;
/// Hash-linked revision chains and verification.
pub mod revision;
/// References to authoritative source records.
pub mod source;
/// Exchange value types and parties.
pub mod value;

pub use entity::{EntityRecord, EntityStatus, EntityStatusCode, ResolutionConfidence};
pub use exchange::{ExchangeRecord, ExchangeStatus, ExchangeStatusCode};
pub use identifiers::{AdditionalScheme, CanadianBn, EntityIdentifiers, Lei, SamUei};
pub use multilateral::{Member, MultilateralMembers};
pub use parties::{BilateralParties, Party};
pub use provenance::{ExchangeCategorization, IntermediaryEntity, ProvenanceChain};
pub use relationship::{
    FinancialTerms, RelationshipParties, RelationshipRecord, RelationshipStatus,
    RelationshipStatusCode,
};
pub use revision::{verify_chain, verify_link, Revisioned};
pub use source::SourceReference;
pub use value::{ExchangeParty, ExchangeValue};
