//! Backend Module
//!
//! The narrow storage capability the cache client is written against, plus
//! an in-memory implementation.

mod lru;
mod memory;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::BackendError;

pub use lru::LruTracker;
pub use memory::{MemoryBackend, MemoryStore};

/// Maximum key length in bytes accepted by the in-memory backend
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum stored entry size in bytes for the in-memory backend.
///
/// Measured on what the backend receives: the client's JSON envelope, not
/// the raw value. Strings cost roughly their length; a `Vec<u8>` encodes as
/// a JSON number array at up to four bytes per element.
pub const MAX_ENTRY_SIZE: usize = 1024 * 1024; // 1 MB

// == Backend Trait ==
/// Key/value store consumed by [`CacheClient`](crate::cache::CacheClient).
///
/// Implementations report a missing key as `Ok(None)`, never as an error.
/// Values are opaque bytes; the client owns their encoding.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Short name used in log fields, e.g. "memory" or "redis".
    fn name(&self) -> &'static str;

    /// Whether `set` honours its `ttl` argument natively.
    ///
    /// Backends returning false receive `None` for every ttl.
    fn supports_ttl(&self) -> bool {
        true
    }

    /// Stores `value` under `key`, replacing any previous value and expiration.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>)
        -> Result<(), BackendError>;

    /// Returns the stored bytes, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Deletes `key`. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), BackendError>;

    /// Releases connections or other resources held by the backend.
    async fn close(&self) -> Result<(), BackendError>;
}
