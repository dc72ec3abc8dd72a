//! Farmflow Core - Domain entities and services for farm record keeping.
//!
//! This crate contains the core business logic for the record-entry flows.
//! It is framework-agnostic: entry surfaces own their member collections
//! and drive the synchronizer defined in [`grouping`], and the [`animals`]
//! module builds the add-animals wizard state on top of it.

pub mod animals;
pub mod errors;
pub mod grouping;

// Re-export common types from the animals and grouping modules
pub use animals::*;
pub use grouping::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
