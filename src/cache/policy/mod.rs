//! Eviction Policy Module
//!
//! Each policy keeps its own ordering over the entries of an `EntryArena`.
//! The store owns the entries; a policy only links them and picks victims.
//!
//! | Policy | Structure                         | Victim                          |
//! |--------|-----------------------------------|---------------------------------|
//! | LRU    | recency list, MRU at front        | expired first, then LRU tail    |
//! | FIFO   | insertion list, newest at front   | oldest insertion                |
//! | CLOCK  | circular list + hand              | first unreferenced or expired   |
//! | LFU    | frequency -> bucket list          | last entry of lowest bucket     |

mod clock;
mod fifo;
mod lfu;
mod list;
mod lru;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::arena::{EntryArena, EntryId};
use crate::error::CacheError;

pub use clock::ClockTracker;
pub use fifo::FifoTracker;
pub use lfu::LfuTracker;
pub use list::OrderList;
pub use lru::LruTracker;

/// Default access count above which LRU looks for a colder victim.
pub const DEFAULT_LRU_FREQUENCY_THRESHOLD: u32 = 5;

// == Eviction Structure ==
/// Bookkeeping contract shared by every policy.
///
/// Callers guarantee that `id` is live in `arena` for every call, that
/// `on_insert` happens exactly once per entry, and that `on_remove` is
/// called before the entry leaves the arena.
pub trait EvictionStructure: fmt::Debug + Send {
    fn kind(&self) -> EvictionPolicy;

    fn on_insert(&mut self, arena: &mut EntryArena, id: EntryId);

    fn on_access(&mut self, arena: &mut EntryArena, id: EntryId);

    /// Picks the next entry to evict without unlinking it.
    fn select_victim(&mut self, arena: &mut EntryArena, now: u64) -> Option<EntryId>;

    fn on_remove(&mut self, arena: &mut EntryArena, id: EntryId);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every tracked entry, in the structure's own order.
    fn tracked(&self, arena: &EntryArena) -> Vec<EntryId>;
}

// == Eviction Policy ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EvictionPolicy {
    #[default]
    Lru,
    Lfu,
    Clock,
    Fifo,
}

impl EvictionPolicy {
    pub const ALL: [EvictionPolicy; 4] = [
        EvictionPolicy::Lru,
        EvictionPolicy::Lfu,
        EvictionPolicy::Clock,
        EvictionPolicy::Fifo,
    ];

    /// Builds the structure for this policy.
    ///
    /// `lru_frequency_threshold` only applies to LRU; `None` turns its
    /// cold-entry preference off.
    pub fn build(self, lru_frequency_threshold: Option<u32>) -> Box<dyn EvictionStructure> {
        match self {
            EvictionPolicy::Lru => Box::new(LruTracker::new(lru_frequency_threshold)),
            EvictionPolicy::Lfu => Box::new(LfuTracker::new()),
            EvictionPolicy::Clock => Box::new(ClockTracker::new()),
            EvictionPolicy::Fifo => Box::new(FifoTracker::new()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EvictionPolicy::Lru => "LRU",
            EvictionPolicy::Lfu => "LFU",
            EvictionPolicy::Clock => "CLOCK",
            EvictionPolicy::Fifo => "FIFO",
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LRU" => Ok(EvictionPolicy::Lru),
            "LFU" => Ok(EvictionPolicy::Lfu),
            "CLOCK" => Ok(EvictionPolicy::Clock),
            "FIFO" => Ok(EvictionPolicy::Fifo),
            other => Err(CacheError::invalid(format!(
                "Unknown eviction policy '{}', expected LRU, LFU, CLOCK or FIFO",
                other
            ))),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::cache::arena::{EntryArena, EntryId};
    use crate::cache::entry::Entry;

    /// Arena holding one long-lived entry per key, in order.
    pub fn arena_with(keys: &[&str]) -> (EntryArena, Vec<EntryId>) {
        let mut arena = EntryArena::new();
        let ids = keys
            .iter()
            .map(|key| arena.insert(Entry::new(key, "v", u64::MAX)))
            .collect();
        (arena, ids)
    }

    pub fn key_of(arena: &EntryArena, id: EntryId) -> &str {
        arena.get(id).map(|entry| entry.key.as_str()).unwrap_or("")
    }
}
