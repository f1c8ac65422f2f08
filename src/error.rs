//! Error types for the cache client
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Backend Error Enum ==
/// Failures reported by a storage backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The store could not be reached (connection lost, closed, timed out)
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The store refused the request (size limits, bad arguments)
    #[error("backend rejected request: {0}")]
    Rejected(String),
}

// == Cache Error Enum ==
/// Unified error type for the cache client.
///
/// A missing or expired key is not an error; `get` reports it as `Ok(None)`.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backend could not be reached; callers may retry
    #[error("{op} '{key}' failed: {source}")]
    BackendUnavailable {
        op: &'static str,
        key: String,
        #[source]
        source: BackendError,
    },

    /// The backend refused the request
    #[error("{op} '{key}' rejected: {source}")]
    BackendRejected {
        op: &'static str,
        key: String,
        #[source]
        source: BackendError,
    },

    /// Key is empty
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Operation issued after `close`
    #[error("Client is closed")]
    ClientClosed,

    /// Stored payload could not be encoded or decoded
    #[error("codec error for '{key}': {source}")]
    Codec {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Load function passed to `get_or_load` failed
    #[error("loader failed for '{key}': {source}")]
    Loader {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

impl CacheError {
    /// Wraps a backend failure with the operation and key it happened on,
    /// keeping the backend's error kind.
    pub fn backend(op: &'static str, key: &str, source: BackendError) -> Self {
        match source {
            BackendError::Unavailable(_) => CacheError::BackendUnavailable {
                op,
                key: key.to_string(),
                source,
            },
            BackendError::Rejected(_) => CacheError::BackendRejected {
                op,
                key: key.to_string(),
                source,
            },
        }
    }

    /// Returns true for failures worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, CacheError::BackendUnavailable { .. })
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache client.
pub type Result<T> = std::result::Result<T, CacheError>;
