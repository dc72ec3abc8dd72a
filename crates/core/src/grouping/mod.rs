//! Grouped entry synchronization - model, traits, and synchronizer.

mod grouping_model;
mod grouping_service;

pub use grouping_model::{CorrelationId, EntryState, GroupEntry, MemberEntry};
pub use grouping_service::GroupSynchronizer;
