//! Expiry Tracker Module
//!
//! Keeps every entry's absolute deadline in an ordered set so the periodic
//! sweep can collect expired entries without scanning live ones.

use std::collections::BTreeSet;

use crate::cache::arena::EntryId;

/// Ordered `(deadline, entry)` pairs.
#[derive(Debug, Default)]
pub struct ExpiryTracker {
    deadlines: BTreeSet<(u64, EntryId)>,
}

impl ExpiryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once `now` is strictly past `expires_at`.
    pub fn is_expired(expires_at: u64, now: u64) -> bool {
        now > expires_at
    }

    /// Records the deadline of a newly inserted entry.
    pub fn set_expiry(&mut self, id: EntryId, expires_at: u64) {
        self.deadlines.insert((expires_at, id));
    }

    /// Moves an entry from its previous deadline to a new one.
    pub fn reschedule(&mut self, id: EntryId, previous: u64, expires_at: u64) {
        self.deadlines.remove(&(previous, id));
        self.deadlines.insert((expires_at, id));
    }

    /// Forgets an entry; returns false if it was not tracked at that deadline.
    pub fn cancel(&mut self, id: EntryId, expires_at: u64) -> bool {
        self.deadlines.remove(&(expires_at, id))
    }

    /// Removes and returns every entry whose deadline is before `now`, oldest first.
    pub fn drain_expired(&mut self, now: u64) -> Vec<EntryId> {
        // Everything at or after (now, MIN) is still live
        let live = self.deadlines.split_off(&(now, EntryId(0)));
        let expired = std::mem::replace(&mut self.deadlines, live);
        expired.into_iter().map(|(_, id)| id).collect()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.deadlines.first().map(|(deadline, _)| *deadline)
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    pub(crate) fn contains(&self, id: EntryId, expires_at: u64) -> bool {
        self.deadlines.contains(&(expires_at, id))
    }
}
