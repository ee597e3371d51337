//! Field mapping and builders over the canonical record constructors.
//!
//! Source systems deliver loosely structured JSON with their own key
//! spellings. This crate maps those keys onto canonical names, validates
//! presence (reporting every missing key in one aggregate error), and drives
//! the normalization pipeline and record constructors. Unknown keys become
//! warnings, never failures; the core record types themselves never warn.
//!
#![deny(missing_docs)]

/// Entity builder: raw fields to an entity record plus fingerprint.
pub mod entity;
/// Exchange builder: raw fields to an exchange record.
pub mod exchange;
/// Shared field-map machinery.
pub mod fields;

pub use entity::{build_entity, EntityBuildResult};
pub use exchange::{build_exchange, ExchangeBuildResult};
pub use fields::{map_fields, validate_required, RawMap};
