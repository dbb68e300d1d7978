//! LFU Tracker Module
//!
//! Frequency buckets ordered by count. Each bucket is an `OrderList` that
//! entries join at the back; the victim is the back of the lowest bucket,
//! so ties at one frequency go to the entry that reached it most recently.
//!
//! ```text
//!   freq=1: [k2] ◄──► [k3]     <- victim: k3
//!   freq=6: [k1]
//! ```
//!
//! An entry's bucket always equals its `access_count`; a bucket that
//! empties is dropped on the spot.

use std::collections::BTreeMap;

use crate::cache::arena::{EntryArena, EntryId};
use crate::cache::policy::{EvictionPolicy, EvictionStructure, OrderList};

#[derive(Debug, Default)]
pub struct LfuTracker {
    buckets: BTreeMap<u32, OrderList>,
    len: usize,
}

impl LfuTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowest populated frequency.
    pub fn min_frequency(&self) -> Option<u32> {
        self.buckets.keys().next().copied()
    }

    pub fn bucket_len(&self, frequency: u32) -> usize {
        self.buckets.get(&frequency).map_or(0, OrderList::len)
    }

    fn attach(&mut self, arena: &mut EntryArena, id: EntryId, frequency: u32) {
        self.buckets
            .entry(frequency)
            .or_default()
            .push_back(arena, id);
    }

    fn detach(&mut self, arena: &mut EntryArena, id: EntryId, frequency: u32) -> bool {
        let Some(bucket) = self.buckets.get_mut(&frequency) else {
            return false;
        };
        let unlinked = bucket.unlink(arena, id);
        if bucket.is_empty() {
            self.buckets.remove(&frequency);
        }
        unlinked
    }
}

impl EvictionStructure for LfuTracker {
    fn kind(&self) -> EvictionPolicy {
        EvictionPolicy::Lfu
    }

    fn on_insert(&mut self, arena: &mut EntryArena, id: EntryId) {
        let Some(entry) = arena.get_mut(id) else {
            return;
        };
        entry.access_count = 1;
        self.attach(arena, id, 1);
        self.len += 1;
    }

    fn on_access(&mut self, arena: &mut EntryArena, id: EntryId) {
        let Some(frequency) = arena.get(id).map(|entry| entry.access_count) else {
            return;
        };
        if !self.detach(arena, id, frequency) {
            return;
        }
        let next = frequency.saturating_add(1);
        if let Some(entry) = arena.get_mut(id) {
            entry.access_count = next;
        }
        self.attach(arena, id, next);
    }

    fn select_victim(&mut self, _arena: &mut EntryArena, _now: u64) -> Option<EntryId> {
        self.buckets
            .first_key_value()
            .and_then(|(_, bucket)| bucket.back())
    }

    fn on_remove(&mut self, arena: &mut EntryArena, id: EntryId) {
        let Some(frequency) = arena.get(id).map(|entry| entry.access_count) else {
            return;
        };
        if self.detach(arena, id, frequency) {
            self.len -= 1;
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn tracked(&self, arena: &EntryArena) -> Vec<EntryId> {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.iter(arena))
            .collect()
    }
}
