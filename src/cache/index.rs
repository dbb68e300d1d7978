//! Key Index Module
//!
//! Separate-chaining hash table from key to `EntryId`. Knows nothing about
//! eviction or expiry.
//!
//! ## Layout
//!
//! ```text
//!   buckets (power of two)
//!   [0] ─► []
//!   [1] ─► [(h, id 7), (h, id 2)]    chain read newest first
//!   [2] ─► [(h, id 4)]
//!   ...
//!   index = spread(xxh32(key)) & (buckets - 1)
//! ```
//!
//! Slots hold only the hash and the handle. The key itself lives in the
//! `Entry`, so every lookup resolves candidates through the `EntryArena`
//! and an entry must be unindexed before it leaves the arena.
//!
//! The table doubles once `len >= buckets * 0.75`, rehashing every slot.
//! A failed allocation while doubling surfaces as `ResizeFailure`.

use std::hash::Hasher;

use twox_hash::XxHash32;

use crate::cache::arena::{EntryArena, EntryId};
use crate::error::{CacheError, Result};

const INITIAL_BUCKETS: usize = 16;
// Load factor 0.75 as a ratio, kept integral
const LOAD_NUMERATOR: usize = 3;
const LOAD_DENOMINATOR: usize = 4;

#[derive(Debug, Clone, Copy)]
struct Slot {
    hash: u32,
    id: EntryId,
}

impl Slot {
    fn holds(&self, hash: u32, key: &str, entries: &EntryArena) -> bool {
        self.hash == hash && entries.get(self.id).is_some_and(|entry| entry.key == key)
    }
}

/// Chained hash table mapping keys to entry handles.
#[derive(Debug)]
pub struct KeyIndex {
    // Each chain is appended at the back; lookups walk it back to front so
    // the most recently inserted key of a bucket is found first.
    buckets: Vec<Vec<Slot>>,
    len: usize,
}

impl KeyIndex {
    pub fn new() -> Self {
        Self::with_buckets(INITIAL_BUCKETS)
    }

    /// Creates an index with at least `buckets` buckets, rounded up to a power of two.
    pub fn with_buckets(buckets: usize) -> Self {
        let count = buckets.max(1).next_power_of_two();
        let mut table = Vec::with_capacity(count);
        table.resize_with(count, Vec::new);
        Self {
            buckets: table,
            len: 0,
        }
    }

    // == Get ==
    pub fn get(&self, key: &str, entries: &EntryArena) -> Result<Option<EntryId>> {
        check_key(key)?;
        let hash = spread_hash(key);
        let chain = &self.buckets[self.bucket_of(hash)];
        Ok(chain
            .iter()
            .rev()
            .find(|slot| slot.holds(hash, key, entries))
            .map(|slot| slot.id))
    }

    // == Insert ==
    /// Indexes the live entry `id` under its own key, returning the handle
    /// that key previously mapped to.
    pub fn insert(&mut self, id: EntryId, entries: &EntryArena) -> Result<Option<EntryId>> {
        let key = entries
            .get(id)
            .map(|entry| entry.key.as_str())
            .ok_or_else(|| CacheError::invalid("Cannot index a vacant entry"))?;
        check_key(key)?;
        let hash = spread_hash(key);
        let bucket = self.bucket_of(hash);
        if let Some(slot) = self.buckets[bucket]
            .iter_mut()
            .rev()
            .find(|slot| slot.holds(hash, key, entries))
        {
            return Ok(Some(std::mem::replace(&mut slot.id, id)));
        }

        let bucket = if self.len * LOAD_DENOMINATOR >= self.buckets.len() * LOAD_NUMERATOR {
            self.resize()?;
            self.bucket_of(hash)
        } else {
            bucket
        };

        self.buckets[bucket].push(Slot { hash, id });
        self.len += 1;
        Ok(None)
    }

    // == Remove ==
    /// Unindexes `key`. Must run while its entry is still in `entries`.
    pub fn remove(&mut self, key: &str, entries: &EntryArena) -> Result<Option<EntryId>> {
        check_key(key)?;
        let hash = spread_hash(key);
        let bucket = self.bucket_of(hash);
        let chain = &mut self.buckets[bucket];
        match chain
            .iter()
            .rposition(|slot| slot.holds(hash, key, entries))
        {
            Some(pos) => {
                let slot = chain.remove(pos);
                self.len -= 1;
                Ok(Some(slot.id))
            }
            None => Ok(None),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Iterates indexed handles bucket by bucket, newest first within a chain.
    pub fn ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.buckets
            .iter()
            .flat_map(|chain| chain.iter().rev())
            .map(|slot| slot.id)
    }

    fn bucket_of(&self, hash: u32) -> usize {
        hash as usize & (self.buckets.len() - 1)
    }

    fn resize(&mut self) -> Result<()> {
        let requested = self
            .buckets
            .len()
            .checked_mul(2)
            .ok_or(CacheError::ResizeFailure {
                requested: usize::MAX,
            })?;

        let mut table: Vec<Vec<Slot>> = Vec::new();
        table
            .try_reserve_exact(requested)
            .map_err(|_| CacheError::ResizeFailure { requested })?;
        table.resize_with(requested, Vec::new);

        // Old chains are drained front to back so relative order survives
        for slot in std::mem::take(&mut self.buckets).into_iter().flatten() {
            let bucket = slot.hash as usize & (requested - 1);
            table[bucket].push(slot);
        }
        self.buckets = table;
        Ok(())
    }
}

impl Default for KeyIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// 32-bit xxHash of the key with its high half folded into the low bits.
pub fn spread_hash(key: &str) -> u32 {
    let mut hasher = XxHash32::with_seed(0);
    hasher.write(key.as_bytes());
    let h = hasher.finish() as u32;
    h ^ (h >> 16)
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::invalid("Key cannot be empty"));
    }
    Ok(())
}
