//! Order List Module
//!
//! Doubly linked list threaded through the `prev`/`next` fields of entries
//! in an `EntryArena`. The list owns only its head, tail and length; the
//! links live in the entries, so an entry can sit in at most one list.
//!
//! ```text
//!   head ─► [id_3] ◄──► [id_2] ◄──► [id_1] ◄── tail
//! ```
//!
//! All link operations are O(1). Walking uses `EntryId`s, so removal of
//! an entry never invalidates the handles of its neighbours.

use std::iter;

use crate::cache::arena::{EntryArena, EntryId};

#[derive(Debug, Default)]
pub struct OrderList {
    head: Option<EntryId>,
    tail: Option<EntryId>,
    len: usize,
}

impl OrderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn front(&self) -> Option<EntryId> {
        self.head
    }

    pub fn back(&self) -> Option<EntryId> {
        self.tail
    }

    pub fn push_front(&mut self, arena: &mut EntryArena, id: EntryId) {
        let old_head = self.head;
        let Some(entry) = arena.get_mut(id) else {
            return;
        };
        entry.prev = None;
        entry.next = old_head;

        match old_head.and_then(|head| arena.get_mut(head)) {
            Some(head) => head.prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
    }

    pub fn push_back(&mut self, arena: &mut EntryArena, id: EntryId) {
        let old_tail = self.tail;
        let Some(entry) = arena.get_mut(id) else {
            return;
        };
        entry.prev = old_tail;
        entry.next = None;

        match old_tail.and_then(|tail| arena.get_mut(tail)) {
            Some(tail) => tail.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
    }

    /// Detaches `id`; returns false if it is not linked into this list.
    pub fn unlink(&mut self, arena: &mut EntryArena, id: EntryId) -> bool {
        let Some(entry) = arena.get(id) else {
            return false;
        };
        let (prev, next) = (entry.prev, entry.next);
        if (prev.is_none() && self.head != Some(id)) || (next.is_none() && self.tail != Some(id))
        {
            return false;
        }

        match prev.and_then(|p| arena.get_mut(p)) {
            Some(prev_entry) => prev_entry.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| arena.get_mut(n)) {
            Some(next_entry) => next_entry.prev = prev,
            None => self.tail = prev,
        }
        if let Some(entry) = arena.get_mut(id) {
            entry.prev = None;
            entry.next = None;
        }
        self.len -= 1;
        true
    }

    pub fn move_to_front(&mut self, arena: &mut EntryArena, id: EntryId) {
        if self.head == Some(id) {
            return;
        }
        if self.unlink(arena, id) {
            self.push_front(arena, id);
        }
    }

    pub fn next_of(&self, arena: &EntryArena, id: EntryId) -> Option<EntryId> {
        arena.get(id).and_then(|entry| entry.next)
    }

    pub fn prev_of(&self, arena: &EntryArena, id: EntryId) -> Option<EntryId> {
        arena.get(id).and_then(|entry| entry.prev)
    }

    /// Front to back.
    pub fn iter<'a>(&self, arena: &'a EntryArena) -> impl Iterator<Item = EntryId> + 'a {
        iter::successors(self.head, move |id| arena.get(*id).and_then(|entry| entry.next))
    }

    /// Back to front.
    pub fn iter_rev<'a>(&self, arena: &'a EntryArena) -> impl Iterator<Item = EntryId> + 'a {
        iter::successors(self.tail, move |id| arena.get(*id).and_then(|entry| entry.prev))
    }
}
