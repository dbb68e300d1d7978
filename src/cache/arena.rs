//! Entry Arena Module
//!
//! Owns every live `Entry` and hands out stable `EntryId` handles. The key
//! index and the eviction structures store these ids, never entry copies.

use crate::cache::entry::Entry;

/// Stable handle to an entry slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(pub(crate) usize);

impl EntryId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Slot storage for entries with free-list reuse.
#[derive(Debug, Default)]
pub struct EntryArena {
    slots: Vec<Option<Entry>>,
    free_list: Vec<usize>,
    len: usize,
}

impl EntryArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub fn insert(&mut self, entry: Entry) -> EntryId {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx] = Some(entry);
            idx
        } else {
            self.slots.push(Some(entry));
            self.slots.len() - 1
        };
        self.len += 1;
        EntryId(idx)
    }

    pub fn remove(&mut self, id: EntryId) -> Option<Entry> {
        let entry = self.slots.get_mut(id.0)?.take()?;
        self.free_list.push(id.0);
        self.len -= 1;
        Some(entry)
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|entry| (EntryId(idx), entry)))
    }
}
