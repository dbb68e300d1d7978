//! Cache Store Module
//!
//! Single-threaded cache core: key index, entry arena, one eviction
//! structure, expiry tracker and append-only log, kept consistent under
//! every mutation. `CacheEngine` wraps it in a lock and adds the sweep.

use tracing::{debug, info, warn};

use crate::cache::aof::{AppendLog, LogRecord};
use crate::cache::arena::{EntryArena, EntryId};
use crate::cache::entry::{current_timestamp_ms, validate_key, validate_value, Entry};
use crate::cache::expiry::ExpiryTracker;
use crate::cache::index::KeyIndex;
use crate::cache::policy::{EvictionPolicy, EvictionStructure};
use crate::cache::{CacheStats, RemovalCause};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Cache storage with pluggable eviction, TTL expiry and an optional log.
#[derive(Debug)]
pub struct CacheStore {
    /// Key -> entry handle
    index: KeyIndex,
    /// Owner of every live entry
    entries: EntryArena,
    /// Active eviction structure
    policy: Box<dyn EvictionStructure>,
    /// Deadlines for the periodic sweep
    expiry: ExpiryTracker,
    /// Append-only log, None when persistence is off
    log: Option<AppendLog>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an in-memory store with no log.
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Result<Self> {
        Self::from_config(&Config::new(capacity, policy).without_persistence())
    }

    /// Creates a store and, when a log path is configured, replays it.
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.capacity == 0 {
            return Err(CacheError::invalid("Capacity must be positive"));
        }

        let mut store = Self {
            index: KeyIndex::new(),
            entries: EntryArena::with_capacity(config.capacity.min(1 << 16)),
            policy: config.policy.build(config.lru_frequency_threshold),
            expiry: ExpiryTracker::new(),
            log: config
                .aof_path
                .as_ref()
                .map(|path| AppendLog::new(path, config.aof_fsync)),
            stats: CacheStats::new(),
            capacity: config.capacity,
        };
        store.restore_from_log()?;

        info!(
            "Cache store ready: capacity={}, policy={}, log={}, entries={}",
            store.capacity,
            store.policy.kind(),
            store
                .log
                .as_ref()
                .map_or_else(|| "disabled".to_string(), |log| log.path().display().to_string()),
            store.len()
        );
        Ok(store)
    }

    // == Put ==
    /// Stores `value` under `key` for `ttl_ms` milliseconds.
    ///
    /// An existing key is updated in place and counts as an access. A new
    /// key evicts one entry first when the store is full. The write is then
    /// appended to the log; a log failure is recorded but does not fail
    /// the call.
    pub fn put(&mut self, key: &str, value: &str, ttl_ms: u64) -> Result<()> {
        validate_key(key)?;
        validate_value(value)?;
        if ttl_ms == 0 {
            return Err(CacheError::invalid("TTL must be positive"));
        }

        let now = current_timestamp_ms();
        let expires_at = now.saturating_add(ttl_ms);
        self.upsert(key, value, expires_at, now)?;
        self.append_to_log(&LogRecord::put(key, value, expires_at));
        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// An expired entry is removed on the spot and reported as absent.
    pub fn get(&mut self, key: &str) -> Result<Option<String>> {
        let Some(id) = self.index.get(key, &self.entries)? else {
            self.stats.record_miss();
            return Ok(None);
        };

        let now = current_timestamp_ms();
        let live = self
            .entries
            .get(id)
            .is_some_and(|entry| !entry.is_expired_at(now));
        if !live {
            if self.remove_entry(id).is_some() {
                self.stats.record_removal(RemovalCause::Expired);
            }
            self.stats.record_miss();
            return Ok(None);
        }

        self.policy.on_access(&mut self.entries, id);
        self.stats.record_hit();
        Ok(self.entries.get(id).map(|entry| entry.value.clone()))
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the keys that were removed, oldest deadline first.
    pub fn cleanup_expired(&mut self) -> Vec<String> {
        let now = current_timestamp_ms();
        let expired = self.expiry.drain_expired(now);

        let mut removed = Vec::with_capacity(expired.len());
        for id in expired {
            if let Some(entry) = self.remove_entry(id) {
                self.stats.record_removal(RemovalCause::Expired);
                removed.push(entry.key);
            }
        }
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.index.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy.kind()
    }

    /// Size of the append-only log in bytes, 0 without persistence.
    pub fn aof_file_size(&self) -> u64 {
        self.log.as_ref().map_or(0, AppendLog::file_size)
    }

    /// Inserts or updates an entry with an absolute deadline. Shared by
    /// `put` and log replay; never touches the log itself.
    fn upsert(&mut self, key: &str, value: &str, expires_at: u64, now: u64) -> Result<()> {
        if let Some(id) = self.index.get(key, &self.entries)? {
            if let Some(entry) = self.entries.get_mut(id) {
                let previous = std::mem::replace(&mut entry.expires_at, expires_at);
                entry.value.clear();
                entry.value.push_str(value);
                self.expiry.reschedule(id, previous, expires_at);
                self.policy.on_access(&mut self.entries, id);
                return Ok(());
            }
        }

        if self.index.len() >= self.capacity {
            self.evict_one(now);
        }

        let id = self.entries.insert(Entry::new(key, value, expires_at));
        if let Err(err) = self.index.insert(id, &self.entries) {
            self.entries.remove(id);
            return Err(err);
        }
        self.expiry.set_expiry(id, expires_at);
        self.policy.on_insert(&mut self.entries, id);
        Ok(())
    }

    fn evict_one(&mut self, now: u64) {
        let Some(victim) = self.policy.select_victim(&mut self.entries, now) else {
            warn!("Cache full but {} found no eviction victim", self.policy.kind());
            return;
        };
        if let Some(entry) = self.remove_entry(victim) {
            if entry.is_expired_at(now) {
                self.stats.record_removal(RemovalCause::Expired);
            } else {
                self.stats.record_removal(RemovalCause::Capacity);
            }
            debug!("Evicted key {} ({})", entry.key, self.policy.kind());
        }
    }

    /// Removes an entry from the index, policy, arena and expiry tracker,
    /// in that order. The index resolves keys through the arena, so it is
    /// cleared while the entry is still there.
    fn remove_entry(&mut self, id: EntryId) -> Option<Entry> {
        let key = &self.entries.get(id)?.key;
        let unindexed = self.index.remove(key, &self.entries);
        debug_assert!(matches!(unindexed, Ok(Some(found)) if found == id));

        self.policy.on_remove(&mut self.entries, id);
        let entry = self.entries.remove(id)?;
        self.expiry.cancel(id, entry.expires_at);
        Some(entry)
    }

    fn append_to_log(&mut self, record: &LogRecord) {
        let Some(log) = self.log.as_mut() else {
            return;
        };
        if let Err(err) = log.append(record) {
            warn!(
                "Failed to append to {}: {}",
                log.path().display(),
                err
            );
            self.stats.record_persistence_failure();
        }
    }

    fn restore_from_log(&mut self) -> Result<()> {
        let Some(log) = self.log.as_ref() else {
            return Ok(());
        };
        let path = log.path().display().to_string();
        let replay = match log.replay() {
            Ok(replay) => replay,
            Err(err) => {
                warn!("Failed to load {}: {}", path, err);
                return Ok(());
            }
        };

        let now = current_timestamp_ms();
        let (mut restored, mut expired) = (0usize, 0usize);
        for record in replay.records {
            if let Err(err) = validate_key(&record.key).and(validate_value(&record.value)) {
                warn!("Skipping log record for {}: {}", record.key, err);
                continue;
            }
            // The latest record wins, even when it has already expired
            if ExpiryTracker::is_expired(record.expires_at, now) {
                if let Some(id) = self.index.get(&record.key, &self.entries)? {
                    self.remove_entry(id);
                }
                expired += 1;
                continue;
            }
            self.upsert(&record.key, &record.value, record.expires_at, now)?;
            restored += 1;
        }

        info!(
            "Replayed {}: restored={}, expired={}, malformed={}, truncated={}",
            path, restored, expired, replay.malformed, replay.truncated
        );
        Ok(())
    }

    /// Panics if the index, arena, policy and expiry tracker disagree.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        use std::collections::HashSet;

        assert_eq!(self.index.len(), self.entries.len(), "index/arena size");
        assert_eq!(self.policy.len(), self.entries.len(), "policy/arena size");
        assert_eq!(self.expiry.len(), self.entries.len(), "expiry/arena size");
        assert!(self.len() <= self.capacity, "over capacity");
        assert!(self.index.bucket_count().is_power_of_two());

        for id in self.index.ids() {
            let entry = self.entries.get(id).expect("indexed id is live");
            assert_eq!(self.index.get(&entry.key, &self.entries).ok().flatten(), Some(id));
            assert!(self.expiry.contains(id, entry.expires_at));
        }

        let tracked = self.policy.tracked(&self.entries);
        let unique: HashSet<EntryId> = tracked.iter().copied().collect();
        assert_eq!(unique.len(), tracked.len(), "entry linked twice");
        for id in tracked {
            let entry = self.entries.get(id).expect("tracked id is live");
            assert_eq!(self.index.get(&entry.key, &self.entries).ok().flatten(), Some(id));
            if self.policy.kind() == EvictionPolicy::Lfu {
                assert!(entry.access_count >= 1);
            }
        }
    }
}
