//! Error types for the update cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Errors surfaced by the cache and lock operations.
///
/// Absence of a key is never an error: `get` returns `Ok(None)` for
/// missing and expired entries alike.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Value passed to `set` could not be serialized
    #[error("Failed to encode value for key '{key}': {source}")]
    Encoding {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Stored representation could not be deserialized into the requested type
    #[error("Failed to decode value for key '{key}': {source}")]
    Decoding {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Another holder owns a live lock on the resource
    #[error("Resource is locked: {0}")]
    AlreadyLocked(String),

    /// Key or resource name rejected before touching the store
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl CacheError {
    /// Returns true for lock contention, which callers treat as
    /// "someone else is refreshing" rather than a failure.
    pub fn is_already_locked(&self) -> bool {
        matches!(self, CacheError::AlreadyLocked(_))
    }
}

// == Config Error Enum ==
/// Errors raised while loading process configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GH_TOKEN required")]
    MissingToken,

    #[error("Invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
