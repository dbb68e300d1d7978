//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::{EvictionPolicy, DEFAULT_AOF_FILE, DEFAULT_LRU_FREQUENCY_THRESHOLD};

/// Default background sweep interval in milliseconds.
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 10_000;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Eviction policy, fixed for the cache's lifetime
    pub policy: EvictionPolicy,
    /// Append-only log location, None disables persistence
    pub aof_path: Option<PathBuf>,
    /// Call `sync_data` after every append
    pub aof_fsync: bool,
    /// Background sweep interval in milliseconds, 0 disables the sweep
    pub sweep_interval_ms: u64,
    /// LRU evicts a colder entry when the tail exceeds this many accesses
    pub lru_frequency_threshold: Option<u32>,
}

impl Config {
    /// Defaults with an explicit capacity and policy.
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Self {
        Self {
            capacity,
            policy,
            ..Self::default()
        }
    }

    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `EVICTION_POLICY` - LRU, LFU, CLOCK or FIFO (default: LRU)
    /// - `AOF_PATH` - Log file path (default: appendonly.aof)
    /// - `AOF_ENABLED` - `false` disables persistence (default: true)
    /// - `AOF_FSYNC` - Sync every append to disk (default: false)
    /// - `SWEEP_INTERVAL_MS` - Expiry sweep period in ms (default: 10000)
    /// - `LRU_FREQUENCY_THRESHOLD` - Hot-entry threshold, `off` disables (default: 5)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let aof_enabled = env::var("AOF_ENABLED")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);
        let aof_path = aof_enabled.then(|| {
            env::var("AOF_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_AOF_FILE))
        });

        let lru_frequency_threshold = match env::var("LRU_FREQUENCY_THRESHOLD") {
            Ok(v) if v.eq_ignore_ascii_case("off") => None,
            Ok(v) => v.parse().ok().or(defaults.lru_frequency_threshold),
            Err(_) => defaults.lru_frequency_threshold,
        };

        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            policy: env::var("EVICTION_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.policy),
            aof_path,
            aof_fsync: env::var("AOF_FSYNC")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.aof_fsync),
            sweep_interval_ms: env::var("SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval_ms),
            lru_frequency_threshold,
        }
    }

    pub fn with_aof_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.aof_path = Some(path.into());
        self
    }

    pub fn without_persistence(mut self) -> Self {
        self.aof_path = None;
        self
    }

    pub fn with_aof_fsync(mut self, fsync: bool) -> Self {
        self.aof_fsync = fsync;
        self
    }

    pub fn with_sweep_interval_ms(mut self, interval_ms: u64) -> Self {
        self.sweep_interval_ms = interval_ms;
        self
    }

    pub fn with_lru_frequency_threshold(mut self, threshold: Option<u32>) -> Self {
        self.lru_frequency_threshold = threshold;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            policy: EvictionPolicy::Lru,
            aof_path: Some(PathBuf::from(DEFAULT_AOF_FILE)),
            aof_fsync: false,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
            lru_frequency_threshold: Some(DEFAULT_LRU_FREQUENCY_THRESHOLD),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.policy, EvictionPolicy::Lru);
        assert_eq!(config.aof_path, Some(PathBuf::from("appendonly.aof")));
        assert!(!config.aof_fsync);
        assert_eq!(config.sweep_interval_ms, 10_000);
        assert_eq!(config.lru_frequency_threshold, Some(5));
    }

    #[test]
    fn test_config_builders() {
        let config = Config::new(3, EvictionPolicy::Clock)
            .with_aof_path("/tmp/cache.aof")
            .with_aof_fsync(true)
            .with_sweep_interval_ms(0)
            .with_lru_frequency_threshold(None);

        assert_eq!(config.capacity, 3);
        assert_eq!(config.policy, EvictionPolicy::Clock);
        assert_eq!(config.aof_path, Some(PathBuf::from("/tmp/cache.aof")));
        assert!(config.aof_fsync);
        assert_eq!(config.sweep_interval_ms, 0);
        assert_eq!(config.lru_frequency_threshold, None);

        assert!(config.without_persistence().aof_path.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_CAPACITY");
        env::remove_var("EVICTION_POLICY");
        env::remove_var("AOF_PATH");
        env::remove_var("AOF_ENABLED");
        env::remove_var("AOF_FSYNC");
        env::remove_var("SWEEP_INTERVAL_MS");
        env::remove_var("LRU_FREQUENCY_THRESHOLD");

        let config = Config::from_env();
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.policy, EvictionPolicy::Lru);
        assert_eq!(config.aof_path, Some(PathBuf::from("appendonly.aof")));
        assert_eq!(config.sweep_interval_ms, 10_000);
        assert_eq!(config.lru_frequency_threshold, Some(5));
    }
}
