use std::collections::HashSet;

use log::debug;

use super::grouping_model::{CorrelationId, EntryState, GroupEntry, MemberEntry};

/// Keeps an owned, ordered collection of group entries consistent with an
/// externally-owned collection of member entries.
///
/// The surrounding form surface owns the members and must call
/// [`reconcile`](Self::reconcile) after every member mutation. Every
/// operation is a bounded, synchronous pass over in-memory collections.
/// Malformed input (an index out of range, an unknown correlation id) is a
/// caller bug and panics rather than corrupting the collections silently.
pub struct GroupSynchronizer<G: GroupEntry> {
    groups: Vec<G>,
    derived: HashSet<CorrelationId>,
}

impl<G: GroupEntry> GroupSynchronizer<G> {
    pub fn new() -> Self {
        GroupSynchronizer {
            groups: Vec::new(),
            derived: HashSet::new(),
        }
    }

    /// Appends a new group entry with field defaults and a fresh
    /// correlation id, and returns a reference to it.
    pub fn add_group(&mut self) -> &G {
        let index = self.groups.len();
        self.groups
            .push(G::with_correlation_id(CorrelationId::generate()));
        &self.groups[index]
    }

    /// The ordered group entries. Mutation goes through [`add_group`],
    /// [`remove_group`], [`edit_group`], and [`reconcile`] only.
    ///
    /// [`add_group`]: Self::add_group
    /// [`remove_group`]: Self::remove_group
    /// [`edit_group`]: Self::edit_group
    /// [`reconcile`]: Self::reconcile
    pub fn groups(&self) -> &[G] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Lifecycle state of the group at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn state(&self, index: usize) -> EntryState {
        if self.derived.contains(self.groups[index].correlation_id()) {
            EntryState::Derived
        } else {
            EntryState::Standalone
        }
    }

    /// Edits a group entry in place.
    ///
    /// Intended for standalone entries, whose summary fields are directly
    /// editable. A derived entry's summary fields are overwritten again on
    /// the next reconcile pass.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn edit_group(&mut self, index: usize, edit: impl FnOnce(&mut G)) {
        edit(&mut self.groups[index]);
    }

    /// Removes the group at `index` and cascade-removes every member
    /// referencing it, preserving the relative order of the rest.
    ///
    /// Whether the last remaining group may be removed is a policy of the
    /// calling surface, not enforced here.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn remove_group(&mut self, index: usize, members: &mut Vec<G::Member>) {
        assert!(
            index < self.groups.len(),
            "group index {index} out of range ({} groups)",
            self.groups.len()
        );
        let removed = self.groups.remove(index);
        let id = removed.correlation_id();
        let before = members.len();
        members.retain(|member| member.group_correlation_id() != id);
        self.derived.remove(id);
        debug!(
            "removed group {} and {} cascading member(s)",
            id,
            before - members.len()
        );
    }

    /// Removes the group with the given correlation id.
    ///
    /// Direct entry point for a member-editing surface that has already
    /// deleted the group's last member itself; same contract as the pruning
    /// branch of [`reconcile`](Self::reconcile) without replaying the whole
    /// members collection.
    ///
    /// # Panics
    ///
    /// Panics if no group carries `correlation_id`.
    pub fn on_group_removed_externally(&mut self, correlation_id: &CorrelationId) {
        let index = self
            .groups
            .iter()
            .position(|group| group.correlation_id() == correlation_id)
            .unwrap_or_else(|| panic!("unknown group correlation id {correlation_id}"));
        self.groups.remove(index);
        self.derived.remove(correlation_id);
    }

    /// Reconciles the groups collection against the current members.
    ///
    /// A single atomic pass: each group either has its summary fields
    /// refreshed from its matching members (becoming derived) or, when no
    /// member references it anymore, is marked and pruned after the scan
    /// with the relative order of the rest preserved. Idempotent, and never
    /// mutates `members`.
    ///
    /// An empty `members` collection means the detail surface has not
    /// produced rows yet and the pass is a no-op. This deliberately treats
    /// "no details entered" and "all details explicitly cleared" the same
    /// way; a group whose only member was removed survives until a pass
    /// where other members still exist.
    ///
    /// # Panics
    ///
    /// Panics if a member references a correlation id no group carries;
    /// a dangling reference is a caller bug, like the other contract
    /// checks.
    pub fn reconcile(&mut self, members: &[G::Member]) {
        if members.is_empty() {
            return;
        }

        {
            let group_ids: HashSet<&CorrelationId> = self
                .groups
                .iter()
                .map(|group| group.correlation_id())
                .collect();
            for member in members {
                assert!(
                    group_ids.contains(member.group_correlation_id()),
                    "member references unknown group correlation id {}",
                    member.group_correlation_id()
                );
            }
        }

        let mut pruned: HashSet<CorrelationId> = HashSet::new();

        for group in self.groups.iter_mut() {
            let group_id = group.correlation_id().clone();
            let mut matched = false;
            for member in members
                .iter()
                .filter(|member| member.group_correlation_id() == &group_id)
            {
                group.apply_member(member);
                matched = true;
            }
            if matched {
                self.derived.insert(group_id);
            } else {
                pruned.insert(group_id);
            }
        }

        if !pruned.is_empty() {
            debug!("pruning {} group(s) left without members", pruned.len());
            self.groups
                .retain(|group| !pruned.contains(group.correlation_id()));
            for id in &pruned {
                self.derived.remove(id);
            }
        }
    }
}

impl<G: GroupEntry> Default for GroupSynchronizer<G> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Card {
        id: CorrelationId,
        label: String,
        count: u32,
    }

    impl GroupEntry for Card {
        type Member = Row;

        fn with_correlation_id(id: CorrelationId) -> Self {
            Card {
                id,
                label: String::new(),
                count: 0,
            }
        }

        fn correlation_id(&self) -> &CorrelationId {
            &self.id
        }

        fn apply_member(&mut self, member: &Row) {
            self.label = member.label.clone();
            self.count = member.count;
        }
    }

    #[derive(Debug, Clone)]
    struct Row {
        card_id: CorrelationId,
        label: String,
        count: u32,
    }

    impl MemberEntry for Row {
        fn group_correlation_id(&self) -> &CorrelationId {
            &self.card_id
        }
    }

    fn row(card: &Card, label: &str, count: u32) -> Row {
        Row {
            card_id: card.id.clone(),
            label: label.to_string(),
            count,
        }
    }

    #[test]
    fn test_add_group_appends_with_unique_ids() {
        let mut sync = GroupSynchronizer::<Card>::new();
        let first = sync.add_group().id.clone();
        let second = sync.add_group().id.clone();

        assert_eq!(sync.len(), 2);
        assert_ne!(first, second);
        assert_eq!(sync.groups()[0].id, first);
        assert_eq!(sync.groups()[1].id, second);
    }

    #[test]
    fn test_empty_members_is_noop() {
        let mut sync = GroupSynchronizer::<Card>::new();
        sync.add_group();
        sync.add_group();
        let snapshot = sync.groups().to_vec();

        sync.reconcile(&[]);

        assert_eq!(sync.groups(), snapshot.as_slice());
    }

    #[test]
    fn test_append_then_empty_reconcile_keeps_new_group() {
        let mut sync = GroupSynchronizer::<Card>::new();
        sync.add_group();
        sync.reconcile(&[]);

        assert_eq!(sync.len(), 1);
        assert_eq!(sync.state(0), EntryState::Standalone);
    }

    #[test]
    fn test_reconcile_prunes_groups_without_members() {
        let mut sync = GroupSynchronizer::<Card>::new();
        let g1 = sync.add_group().clone();
        sync.add_group();
        let rows = vec![row(&g1, "ewes", 12)];

        sync.reconcile(&rows);

        assert_eq!(sync.len(), 1);
        assert_eq!(sync.groups()[0].id, g1.id);
        assert_eq!(sync.groups()[0].label, "ewes");
        assert_eq!(sync.groups()[0].count, 12);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut sync = GroupSynchronizer::<Card>::new();
        let g1 = sync.add_group().clone();
        let g2 = sync.add_group().clone();
        sync.add_group();
        let rows = vec![row(&g1, "ewes", 12), row(&g2, "rams", 2)];

        sync.reconcile(&rows);
        let snapshot = sync.groups().to_vec();
        sync.reconcile(&rows);

        assert_eq!(sync.groups(), snapshot.as_slice());
    }

    #[test]
    fn test_last_matching_member_wins() {
        let mut sync = GroupSynchronizer::<Card>::new();
        let g1 = sync.add_group().clone();
        let rows = vec![row(&g1, "first", 1), row(&g1, "second", 2)];

        sync.reconcile(&rows);

        assert_eq!(sync.groups()[0].label, "second");
        assert_eq!(sync.groups()[0].count, 2);
    }

    #[test]
    fn test_reconcile_preserves_group_order() {
        let mut sync = GroupSynchronizer::<Card>::new();
        let g1 = sync.add_group().clone();
        let g2 = sync.add_group().clone();
        let g3 = sync.add_group().clone();
        let rows = vec![row(&g3, "last", 3), row(&g1, "first", 1)];

        sync.reconcile(&rows);

        assert_eq!(sync.len(), 2);
        assert_eq!(sync.groups()[0].id, g1.id);
        assert_eq!(sync.groups()[1].id, g3.id);
        assert!(!sync.groups().iter().any(|g| g.id == g2.id));
    }

    #[test]
    fn test_remove_group_cascades_members() {
        let mut sync = GroupSynchronizer::<Card>::new();
        let g1 = sync.add_group().clone();
        let g2 = sync.add_group().clone();
        let mut rows = vec![row(&g1, "a", 1), row(&g1, "b", 2), row(&g2, "c", 3)];

        sync.remove_group(0, &mut rows);

        assert_eq!(sync.len(), 1);
        assert_eq!(sync.groups()[0].id, g2.id);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].card_id, g2.id);
    }

    #[test]
    fn test_remove_group_preserves_member_order() {
        let mut sync = GroupSynchronizer::<Card>::new();
        let g1 = sync.add_group().clone();
        let g2 = sync.add_group().clone();
        let mut rows = vec![row(&g2, "first", 1), row(&g1, "gone", 0), row(&g2, "second", 2)];

        sync.remove_group(0, &mut rows);

        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["first", "second"]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_remove_group_out_of_range_panics() {
        let mut sync = GroupSynchronizer::<Card>::new();
        sync.add_group();
        let mut rows: Vec<Row> = Vec::new();

        sync.remove_group(1, &mut rows);
    }

    #[test]
    fn test_on_group_removed_externally() {
        let mut sync = GroupSynchronizer::<Card>::new();
        let g1 = sync.add_group().clone();
        let g2 = sync.add_group().clone();

        sync.on_group_removed_externally(&g1.id);

        assert_eq!(sync.len(), 1);
        assert_eq!(sync.groups()[0].id, g2.id);
    }

    #[test]
    #[should_panic(expected = "unknown group correlation id")]
    fn test_on_group_removed_externally_unknown_id_panics() {
        let mut sync = GroupSynchronizer::<Card>::new();
        let g1 = sync.add_group().clone();
        let mut rows: Vec<Row> = Vec::new();
        sync.remove_group(0, &mut rows);

        sync.on_group_removed_externally(&g1.id);
    }

    #[test]
    #[should_panic(expected = "references unknown group correlation id")]
    fn test_reconcile_rejects_member_with_unknown_group() {
        let mut other = GroupSynchronizer::<Card>::new();
        let foreign = other.add_group().clone();

        let mut sync = GroupSynchronizer::<Card>::new();
        sync.add_group();

        sync.reconcile(&[row(&foreign, "stray", 1)]);
    }

    #[test]
    fn test_standalone_becomes_derived_once_a_member_appears() {
        let mut sync = GroupSynchronizer::<Card>::new();
        let g1 = sync.add_group().clone();
        assert_eq!(sync.state(0), EntryState::Standalone);

        sync.reconcile(&[row(&g1, "ewes", 12)]);

        assert_eq!(sync.state(0), EntryState::Derived);
    }

    #[test]
    fn test_edit_group_updates_standalone_summary() {
        let mut sync = GroupSynchronizer::<Card>::new();
        sync.add_group();

        sync.edit_group(0, |card| {
            card.label = "heifers".to_string();
            card.count = 4;
        });

        assert_eq!(sync.groups()[0].label, "heifers");
        assert_eq!(sync.groups()[0].count, 4);
    }
}
