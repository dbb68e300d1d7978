//! Cache Module
//!
//! Storage core of the engine: a chained key index over an entry arena,
//! pluggable eviction structures, TTL tracking and an append-only log.

mod aof;
mod arena;
mod entry;
mod expiry;
mod index;
pub mod policy;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use aof::{AppendLog, LogOp, LogRecord, Replay, DEFAULT_AOF_FILE};
pub use arena::{EntryArena, EntryId};
pub use entry::{current_timestamp_ms, Entry};
pub use expiry::ExpiryTracker;
pub use index::{spread_hash, KeyIndex};
pub use policy::{EvictionPolicy, EvictionStructure, DEFAULT_LRU_FREQUENCY_THRESHOLD};
pub use stats::{CacheStats, RemovalCause};
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
