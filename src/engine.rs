//! Cache Engine
//!
//! Public, thread-safe entry point. One lock guards the whole store; the
//! expiry sweep thread takes the same lock.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::info;

use crate::cache::{CacheStats, CacheStore, EvictionPolicy};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_sweep_task, SweepHandle};

/// Embedded key-value cache with TTL expiry, a fixed eviction policy and
/// an append-only log.
///
/// # Example
/// ```no_run
/// use mini_cache::{CacheEngine, EvictionPolicy};
///
/// let cache = CacheEngine::new(1000, EvictionPolicy::Lru)?;
/// cache.put("user:1", "alice", 60_000)?;
/// assert_eq!(cache.get("user:1")?, Some("alice".to_string()));
/// cache.shutdown();
/// # Ok::<(), mini_cache::CacheError>(())
/// ```
#[derive(Debug)]
pub struct CacheEngine {
    store: Arc<Mutex<CacheStore>>,
    sweeper: Mutex<Option<SweepHandle>>,
}

impl CacheEngine {
    /// Creates an engine with default settings: log at `appendonly.aof`
    /// in the working directory and a 10 second expiry sweep.
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Result<Self> {
        Self::with_config(&Config::new(capacity, policy))
    }

    /// Creates an engine, replaying the configured log before returning.
    pub fn with_config(config: &Config) -> Result<Self> {
        let store = Arc::new(Mutex::new(CacheStore::from_config(config)?));

        let sweeper = if config.sweep_interval_ms > 0 {
            let interval = Duration::from_millis(config.sweep_interval_ms);
            Some(spawn_sweep_task(store.clone(), interval).map_err(CacheError::SweepSpawn)?)
        } else {
            info!("Expiry sweep disabled");
            None
        };

        Ok(Self {
            store,
            sweeper: Mutex::new(sweeper),
        })
    }

    /// Returns the live value for `key`, or None if absent or expired.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.store.lock().get(key)
    }

    /// Inserts or replaces `key` with a TTL in milliseconds.
    pub fn put(&self, key: &str, value: &str, ttl_ms: u64) -> Result<()> {
        self.store.lock().put(key, value, ttl_ms)
    }

    /// Number of stored entries, expired-but-unswept ones included.
    pub fn size(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.store.lock().capacity()
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.store.lock().policy()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    /// Size of the append-only log in bytes.
    pub fn aof_file_size(&self) -> u64 {
        self.store.lock().aof_file_size()
    }

    /// Runs one expiry sweep now and returns the removed keys.
    pub fn cleanup_expired(&self) -> Vec<String> {
        self.store.lock().cleanup_expired()
    }

    /// Stops the expiry sweep and waits for it to exit. Safe to call more
    /// than once; the cache stays usable afterwards.
    pub fn shutdown(&self) {
        let sweeper = self.sweeper.lock().take();
        if let Some(sweeper) = sweeper {
            sweeper.stop();
            info!("Cache engine shut down");
        }
    }
}

impl Drop for CacheEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
