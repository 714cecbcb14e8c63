//! Error types for addrcache.
//!
//! The cache distinguishes normal absence (empty-store `peek`/`pop`, which
//! return `Ok(None)`) from real failures. Only the latter appear here.

use thiserror::Error;

/// Result type alias using `CacheError`.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Main error type for all cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache has been closed; no further operations are accepted.
    #[error("cache is closed")]
    Closed,

    /// A blocking wait was cancelled before an entry became available.
    #[error("wait interrupted before an entry became available")]
    Interrupted,

    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Spawning the background sweeper failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CacheError {
    /// Returns true if this error is recoverable (the caller can retry).
    ///
    /// An interrupted wait can be retried once the cancellation reason has
    /// passed; a closed cache never comes back.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CacheError::Interrupted)
    }
}
