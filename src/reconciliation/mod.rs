//! Bank reconciliation.
//!
//! Matches the posted lines of one ledger account against an external bank
//! statement and reports what is missing from either side.

pub mod engine;
pub mod types;

pub use engine::*;
pub use types::*;
