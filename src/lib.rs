//! Coldbox - a TTL key/value cache client
//!
//! Put/get/remove with per-call or default expiration over a pluggable
//! storage backend. Expiration is enforced on read, so an expired entry is
//! never returned even if the backend still holds it.

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use backend::{Backend, MemoryBackend};
pub use cache::{CacheClient, ClientStats};
pub use config::{ClientConfig, MemoryConfig};
pub use error::{BackendError, CacheError, Result};
pub use tasks::spawn_cleanup_task;
