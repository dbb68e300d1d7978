//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use std::io;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Empty key or value, non-positive capacity, non-positive TTL
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Append-only log could not be written or read
    #[error("Persistence I/O failure: {0}")]
    Persistence(#[from] io::Error),

    /// A log line could not be parsed during replay
    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// The key index could not allocate a larger bucket table
    #[error("Failed to grow key index to {requested} buckets")]
    ResizeFailure { requested: usize },

    /// The background sweep thread could not be started
    #[error("Failed to start expiry sweep: {0}")]
    SweepSpawn(#[source] io::Error),
}

impl CacheError {
    /// Shorthand for building an `InvalidArgument` error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        CacheError::InvalidArgument(msg.into())
    }

    /// Returns true for errors the cache cannot recover from.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CacheError::ResizeFailure { .. })
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
