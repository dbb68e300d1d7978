//! FIFO Tracker Module
//!
//! Evicts in insertion order; reads never reorder.

use crate::cache::arena::{EntryArena, EntryId};
use crate::cache::policy::{EvictionPolicy, EvictionStructure, OrderList};

/// Insertion-ordered list: newest at the front, oldest at the back.
#[derive(Debug, Default)]
pub struct FifoTracker {
    order: OrderList,
}

impl FifoTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EvictionStructure for FifoTracker {
    fn kind(&self) -> EvictionPolicy {
        EvictionPolicy::Fifo
    }

    fn on_insert(&mut self, arena: &mut EntryArena, id: EntryId) {
        self.order.push_front(arena, id);
    }

    fn on_access(&mut self, _arena: &mut EntryArena, _id: EntryId) {}

    fn select_victim(&mut self, _arena: &mut EntryArena, _now: u64) -> Option<EntryId> {
        self.order.back()
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
