//! Grouped entry domain model.
//!
//! A group entry is a coarse record (one card on an entry form) that may
//! aggregate zero or more finer-grained member entries. Members point back
//! at their owning group through a correlation id that is stable for the
//! lifetime of the group and independent of collection position.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier linking member entries to their owning group entry.
///
/// Generated once when the group entry is created and never reassigned or
/// reused within a synchronization session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generates a fresh id. Only the synchronizer creates these.
    pub(crate) fn generate() -> Self {
        CorrelationId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a group entry.
///
/// A `Standalone` group has no members and its summary fields are edited
/// directly. A `Derived` group mirrors its members; losing the last member
/// prunes the group instead of reverting it to `Standalone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryState {
    Standalone,
    Derived,
}

/// Finer-grained record contributing detail data to exactly one group entry.
pub trait MemberEntry {
    /// The owning group's correlation id.
    fn group_correlation_id(&self) -> &CorrelationId;
}

/// Coarse record that aggregates member entries.
pub trait GroupEntry {
    type Member: MemberEntry;

    /// Builds a new entry with field defaults and the given id.
    fn with_correlation_id(id: CorrelationId) -> Self;

    fn correlation_id(&self) -> &CorrelationId;

    /// Overwrites the summary fields from a single member.
    ///
    /// Reconciliation calls this once per matching member in members
    /// order, so when several members map to the same group the last one
    /// wins.
    fn apply_member(&mut self, member: &Self::Member);
}
