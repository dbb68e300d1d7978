//! Mini Cache - an embedded key-value cache engine
//!
//! Bounded string cache with per-entry TTL, one of four eviction policies
//! (LRU, LFU, CLOCK, FIFO) and an append-only log replayed at startup.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod tasks;

pub use cache::{CacheStats, EvictionPolicy};
pub use config::Config;
pub use engine::CacheEngine;
pub use error::{CacheError, Result};
