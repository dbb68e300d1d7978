//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and policy metadata.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::cache::arena::EntryId;
use crate::cache::expiry::ExpiryTracker;
use crate::cache::{MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::{CacheError, Result};

// == Cache Entry ==
/// A single cache entry: value, absolute deadline, and eviction metadata.
///
/// `prev`/`next` link the entry into whichever order list its eviction
/// structure keeps (recency list, clock ring, or frequency bucket).
#[derive(Debug, Clone)]
pub struct Entry {
    pub key: String,
    pub value: String,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Accesses counted by LRU and LFU; starts at 1
    pub access_count: u32,
    /// CLOCK second-chance flag
    pub reference_bit: bool,
    pub(crate) prev: Option<EntryId>,
    pub(crate) next: Option<EntryId>,
}

impl Entry {
    // == Constructor ==
    pub fn new(key: &str, value: &str, expires_at: u64) -> Self {
        Self {
            key: key.to_owned(),
            value: value.to_owned(),
            expires_at,
            access_count: 1,
            reference_bit: true,
            prev: None,
            next: None,
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now` is strictly past its deadline.
    pub fn is_expired_at(&self, now: u64) -> bool {
        ExpiryTracker::is_expired(self.expires_at, now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms())
    }
}

// == Validation ==
/// Checks a key against the cache's input limits.
///
/// Whitespace is rejected because log records are whitespace-separated.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::invalid("Key cannot be empty"));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::invalid(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    if key.chars().any(char::is_whitespace) {
        return Err(CacheError::invalid("Key cannot contain whitespace"));
    }
    Ok(())
}

/// Checks a value against the cache's input limits.
pub fn validate_value(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(CacheError::invalid("Value cannot be empty"));
    }
    if value.len() > MAX_VALUE_SIZE {
        return Err(CacheError::invalid(format!(
            "Value exceeds maximum size of {} bytes",
            MAX_VALUE_SIZE
        )));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(CacheError::invalid("Value cannot contain whitespace"));
    }
    Ok(())
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
