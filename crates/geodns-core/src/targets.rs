//! Tracked target set
//!
//! The mapping from member identity to its published [`GeoRecord`]. The map
//! is shared between the reconciliation loop (writer) and external readers,
//! so it lives behind a mutex and every cross-component handoff gets a
//! snapshot copy rather than the live map.

use std::sync::{Arc, Mutex};

use indexmap::IndexMap;

use crate::geo::GeoRecord;
use crate::traits::MemberId;

/// Shared, insertion-ordered member → record map
///
/// Clones are handles to the same underlying map. Insertion order is
/// preserved so published output is stable across polls.
#[derive(Clone, Default)]
pub struct TargetTracker {
    inner: Arc<Mutex<IndexMap<MemberId, GeoRecord>>>,
}

impl TargetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current record for a member, if tracked
    pub fn get(&self, id: &MemberId) -> Option<GeoRecord> {
        self.inner.lock().unwrap().get(id).cloned()
    }

    /// Insert or replace a member's record; returns the previous one
    pub fn insert(&self, id: MemberId, record: GeoRecord) -> Option<GeoRecord> {
        self.inner.lock().unwrap().insert(id, record)
    }

    /// Remove a member; true if it was tracked
    pub fn remove(&self, id: &MemberId) -> bool {
        // shift_remove keeps the order of the remaining entries
        self.inner.lock().unwrap().shift_remove(id).is_some()
    }

    /// Snapshot of the tracked member identities
    pub fn member_ids(&self) -> Vec<MemberId> {
        self.inner.lock().unwrap().keys().cloned().collect()
    }

    /// Full snapshot, in insertion order
    pub fn snapshot(&self) -> Vec<(MemberId, GeoRecord)> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .map(|(id, rec)| (id.clone(), rec.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(address: &str) -> GeoRecord {
        GeoRecord::new(address, "somewhere", 1.0, 2.0)
    }

    #[test]
    fn insert_get_remove() {
        let tracker = TargetTracker::new();
        let id = MemberId::new("m1");

        assert!(tracker.get(&id).is_none());
        assert!(tracker.insert(id.clone(), rec("a.example.com")).is_none());
        assert_eq!(tracker.get(&id).unwrap().address, "a.example.com");

        let previous = tracker.insert(id.clone(), rec("b.example.com")).unwrap();
        assert_eq!(previous.address, "a.example.com");

        assert!(tracker.remove(&id));
        assert!(!tracker.remove(&id));
        assert!(tracker.is_empty());
    }

    #[test]
    fn snapshot_preserves_insertion_order() {
        let tracker = TargetTracker::new();
        for name in ["c", "a", "b"] {
            tracker.insert(MemberId::new(name), rec(&format!("{name}.example.com")));
        }

        let ids: Vec<String> = tracker
            .snapshot()
            .into_iter()
            .map(|(id, _)| id.to_string())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn clones_share_state() {
        let tracker = TargetTracker::new();
        let handle = tracker.clone();

        tracker.insert(MemberId::new("m1"), rec("a.example.com"));
        assert_eq!(handle.len(), 1);
    }
}
