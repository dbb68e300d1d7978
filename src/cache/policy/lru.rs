//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use crate::cache::arena::{EntryArena, EntryId};
use crate::cache::policy::{EvictionPolicy, EvictionStructure, OrderList};

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Entries are linked into an `OrderList` where:
/// - Front = Most recently used
/// - Back = Least recently used
///
/// Victim selection prefers, in order: any expired entry (scanning from the
/// back), then the coldest entry at or below `frequency_threshold` accesses
/// when the back entry is hotter than that, then the back entry.
#[derive(Debug, Default)]
pub struct LruTracker {
    order: OrderList,
    frequency_threshold: Option<u32>,
}

impl LruTracker {
    // == Constructor ==
    pub fn new(frequency_threshold: Option<u32>) -> Self {
        Self {
            order: OrderList::new(),
            frequency_threshold,
        }
    }

    // == Peek Oldest ==
    /// Returns the least recently used entry without removing it.
    pub fn peek_oldest(&self) -> Option<EntryId> {
        self.order.back()
    }

    fn find_expired(&self, arena: &EntryArena, now: u64) -> Option<EntryId> {
        self.order
            .iter_rev(arena)
            .find(|id| arena.get(*id).is_some_and(|entry| entry.is_expired_at(now)))
    }

    fn find_cold(&self, arena: &EntryArena, threshold: u32) -> Option<EntryId> {
        self.order
            .iter_rev(arena)
            .find(|id| arena.get(*id).is_some_and(|entry| entry.access_count <= threshold))
    }
}

impl EvictionStructure for LruTracker {
    fn kind(&self) -> EvictionPolicy {
        EvictionPolicy::Lru
    }

    fn on_insert(&mut self, arena: &mut EntryArena, id: EntryId) {
        self.order.push_front(arena, id);
    }

    // == Touch ==
    fn on_access(&mut self, arena: &mut EntryArena, id: EntryId) {
        if let Some(entry) = arena.get_mut(id) {
            entry.access_count = entry.access_count.saturating_add(1);
        }
        self.order.move_to_front(arena, id);
    }

    // == Evict Oldest ==
    fn select_victim(&mut self, arena: &mut EntryArena, now: u64) -> Option<EntryId> {
        if let Some(expired) = self.find_expired(arena, now) {
            return Some(expired);
        }

        let oldest = self.order.back()?;
        if let Some(threshold) = self.frequency_threshold {
            let hot = arena
                .get(oldest)
                .is_some_and(|entry| entry.access_count > threshold);
            if hot {
                if let Some(cold) = self.find_cold(arena, threshold) {
                    return Some(cold);
                }
            }
        }
        Some(oldest)
    }

    fn on_remove(&mut self, arena: &mut EntryArena, id: EntryId) {
        self.order.unlink(arena, id);
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn tracked(&self, arena: &EntryArena) -> Vec<EntryId> {
        self.order.iter(arena).collect()
    }
}
