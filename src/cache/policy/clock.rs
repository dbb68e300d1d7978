//! CLOCK Tracker Module
//!
//! Second-chance eviction over a circular list with a persistent hand.
//!
//! ```text
//!   front ─► [k4 ref=1] ─► [k2 ref=0] ─► [k1 ref=1] ─┐
//!      ▲                                              │
//!      └──────────────────── wrap ◄───────────────────┘
//!   hand advances front -> back, then wraps
//! ```
//!
//! At each stop: an expired entry is taken at once, an unreferenced entry
//! is taken, a referenced entry loses its bit and the hand moves on. When
//! a victim is removed the hand falls back to its predecessor, so the next
//! scan resumes just after it.

use crate::cache::arena::{EntryArena, EntryId};
use crate::cache::policy::{EvictionPolicy, EvictionStructure, OrderList};

#[derive(Debug, Default)]
pub struct ClockTracker {
    ring: OrderList,
    // None means "before the front"
    hand: Option<EntryId>,
}

impl ClockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hand(&self) -> Option<EntryId> {
        self.hand
    }

    fn advance(&mut self, arena: &EntryArena) -> Option<EntryId> {
        let next = self
            .hand
            .and_then(|hand| self.ring.next_of(arena, hand))
            .or(self.ring.front());
        self.hand = next;
        next
    }
}

impl EvictionStructure for ClockTracker {
    fn kind(&self) -> EvictionPolicy {
        EvictionPolicy::Clock
    }

    fn on_insert(&mut self, arena: &mut EntryArena, id: EntryId) {
        if let Some(entry) = arena.get_mut(id) {
            entry.reference_bit = true;
        }
        self.ring.push_front(arena, id);
    }

    fn on_access(&mut self, arena: &mut EntryArena, id: EntryId) {
        if let Some(entry) = arena.get_mut(id) {
            entry.reference_bit = true;
        }
    }

    fn select_victim(&mut self, arena: &mut EntryArena, now: u64) -> Option<EntryId> {
        // One lap clears every bit, so a second lap always finds a victim
        let max_steps = self.ring.len() * 2 + 1;
        for _ in 0..max_steps {
            let current = self.advance(arena)?;
            let entry = arena.get_mut(current)?;
            if entry.is_expired_at(now) || !entry.reference_bit {
                return Some(current);
            }
            entry.reference_bit = false;
        }
        None
    }

    fn on_remove(&mut self, arena: &mut EntryArena, id: EntryId) {
        if self.hand == Some(id) {
            self.hand = self.ring.prev_of(arena, id);
        }
        self.ring.unlink(arena, id);
    }

    fn len(&self) -> usize {
        self.ring.len()
    }

    fn tracked(&self, arena: &EntryArena) -> Vec<EntryId> {
        self.ring.iter(arena).collect()
    }
}
