//! Cache Statistics Module
//!
//! Counters kept by a `CacheStore`. Lookups are split into hits and misses;
//! removals are split by cause so a full cache and a short TTL can be told
//! apart; failed log appends are counted since `put` never reports them.

use serde::Serialize;

/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalCause {
    /// Chosen by the eviction policy to make room for a new key
    Capacity,
    /// Deadline passed; found by a read, the sweep, or victim selection
    Expired,
}

// == Cache Stats ==
/// Snapshot of a store's counters, serializable for reporting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// `get` calls that returned a value
    pub hits: u64,
    /// `get` calls on an absent or expired key
    pub misses: u64,
    /// Live entries removed to stay within capacity
    pub evictions: u64,
    /// Entries removed because their TTL elapsed
    pub expirations: u64,
    /// Log appends that failed after the in-memory write succeeded
    pub persistence_failures: u64,
    /// Entries held when the snapshot was taken
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of lookups served from the cache, 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    /// Total `get` calls that reached the index.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Total entries removed for any cause.
    pub fn removals(&self) -> u64 {
        self.evictions + self.expirations
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Removal ==
    pub fn record_removal(&mut self, cause: RemovalCause) {
        match cause {
            RemovalCause::Capacity => self.evictions += 1,
            RemovalCause::Expired => self.expirations += 1,
        }
    }

    pub fn record_persistence_failure(&mut self) {
        self.persistence_failures += 1;
    }

    pub(crate) fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
