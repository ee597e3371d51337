//! CLI subcommand implementations.

pub mod hash;
pub mod snfei;
pub mod verify;
