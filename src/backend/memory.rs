//! In-Memory Backend
//!
//! HashMap storage with native TTL, lazy expiry on read and an LRU capacity
//! bound. Shared behind `Arc<RwLock<_>>` so clones see the same data.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::backend::{Backend, LruTracker, MAX_ENTRY_SIZE, MAX_KEY_LENGTH};
use crate::cache::deadline;
use crate::config::MemoryConfig;
use crate::error::BackendError;

#[derive(Debug, Clone)]
struct StoredValue {
    bytes: Vec<u8>,
    /// None = kept until deleted or evicted
    expires_at: Option<DateTime<Utc>>,
}

impl StoredValue {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| now >= expires)
    }
}

// == Memory Store ==
/// Synchronous storage engine behind [`MemoryBackend`].
#[derive(Debug)]
pub struct MemoryStore {
    entries: HashMap<String, StoredValue>,
    lru: LruTracker,
    max_entries: usize,
    evictions: u64,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `max_entries` - Entry count above which the least recently used key is evicted
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            max_entries,
            evictions: 0,
        }
    }

    // == Set ==
    /// Stores bytes under `key`, evicting the least recently used entry when
    /// a new key would exceed capacity. Overwrites reset the expiration.
    ///
    /// # Returns
    /// - `Err(BackendError::Rejected)` for keys over `MAX_KEY_LENGTH`, entries
    ///   over `MAX_ENTRY_SIZE`, or a zero-capacity store
    pub fn set(
        &mut self,
        key: &str,
        bytes: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), BackendError> {
        if key.len() > MAX_KEY_LENGTH {
            return Err(BackendError::Rejected(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        if bytes.len() > MAX_ENTRY_SIZE {
            return Err(BackendError::Rejected(format!(
                "entry exceeds maximum size of {} bytes",
                MAX_ENTRY_SIZE
            )));
        }

        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted) => {
                    self.entries.remove(&evicted);
                    self.evictions += 1;
                    debug!(key = %evicted, "evicted least recently used entry");
                }
                None => {
                    return Err(BackendError::Rejected(
                        "store has no capacity".to_string(),
                    ))
                }
            }
        }

        let expires_at = ttl.and_then(|ttl| deadline(Utc::now(), ttl));
        self.entries
            .insert(key.to_string(), StoredValue { bytes, expires_at });
        self.lru.touch(key);
        Ok(())
    }

    // == Get ==
    /// Returns the bytes for `key`; an expired entry is purged and reported absent.
    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        let expired = self.entries.get(key)?.is_expired(Utc::now());
        if expired {
            self.remove(key);
            return None;
        }

        self.lru.touch(key);
        self.entries.get(key).map(|stored| stored.bytes.clone())
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }

    // == Purge Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let now = Utc::now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, stored)| stored.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    /// Physically stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }
}

// == Memory Backend ==
/// Cloneable in-process [`Backend`].
///
/// Clones share storage and the closed flag, so a test or the sweeper task
/// can keep a handle after handing one to a client.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    store: Arc<RwLock<MemoryStore>>,
    closed: Arc<AtomicBool>,
    native_ttl: bool,
}

impl MemoryBackend {
    // == Constructor ==
    /// Creates a backend with native TTL support.
    ///
    /// # Arguments
    /// * `config` - Capacity settings; `cleanup_interval` is read by the sweeper, not here
    pub fn new(config: &MemoryConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::new(config.max_entries))),
            closed: Arc::new(AtomicBool::new(false)),
            native_ttl: true,
        }
    }

    /// A backend that ignores TTLs, keeping every value until deleted.
    pub fn without_native_ttl(config: &MemoryConfig) -> Self {
        Self {
            native_ttl: false,
            ..Self::new(config)
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Entries dropped by the LRU bound since creation.
    pub async fn evictions(&self) -> u64 {
        self.store.read().await.evictions()
    }

    /// Drops expired entries; used by the background sweeper.
    pub async fn purge_expired(&self) -> usize {
        self.store.write().await.purge_expired()
    }

    fn ensure_open(&self) -> Result<(), BackendError> {
        if self.is_closed() {
            Err(BackendError::Unavailable(
                "memory backend is closed".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(&MemoryConfig::default())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn supports_ttl(&self) -> bool {
        self.native_ttl
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), BackendError> {
        self.ensure_open()?;
        let ttl = if self.native_ttl { ttl } else { None };
        self.store.write().await.set(key, value, ttl)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        self.ensure_open()?;
        // Write lock: reads touch the LRU and may purge.
        Ok(self.store.write().await.get(key))
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        self.ensure_open()?;
        self.store.write().await.remove(key);
        Ok(())
    }

    async fn close(&self) -> Result<(), BackendError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.store.write().await.clear();
        }
        Ok(())
    }
}
