//! Cache Client Module
//!
//! Put/get/remove with per-call or default expiration over any [`Backend`].

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::cache::codec;
use crate::cache::{CacheEntry, ClientStats, Payload, StatsRecorder};
use crate::config::{non_zero, ClientConfig};
use crate::error::{BackendError, CacheError, Result};

/// Outcome of reading one key.
enum Lookup<V> {
    Hit(V),
    /// A negative-cache marker written by `get_or_load`
    KnownMissing,
    Miss,
}

// == Cache Client ==
/// TTL cache client.
///
/// One backend call per operation and no local memoization, so a shared
/// client never drifts from backend state. Same-key ordering is left to the
/// backend.
///
/// Call [`close`](Self::close) when done. Operations must not run
/// concurrently with `close`. A client dropped without `close` releases its
/// backend on the current tokio runtime.
pub struct CacheClient<B: Backend> {
    backend: Arc<B>,
    config: ClientConfig,
    stats: StatsRecorder,
    closed: AtomicBool,
}

impl<B: Backend> CacheClient<B> {
    // == Constructor ==
    /// Creates a client over `backend`.
    ///
    /// # Arguments
    /// * `backend` - Storage the client owns until `close` or drop
    /// * `config` - Default and miss durations, fixed for the client's lifetime
    pub fn new(backend: B, config: ClientConfig) -> Self {
        debug!(backend = backend.name(), ?config, "cache client created");
        Self {
            backend: Arc::new(backend),
            config,
            stats: StatsRecorder::default(),
            closed: AtomicBool::new(false),
        }
    }

    /// The configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Snapshot of the operation counters.
    pub fn stats(&self) -> ClientStats {
        self.stats.snapshot()
    }

    // == Put ==
    /// Stores `value` under `key`.
    ///
    /// The entry expires `ttl` from now; with `ttl` None the configured
    /// default applies. A zero duration stores the entry without expiry.
    /// Overwriting a key replaces both value and expiration.
    ///
    /// # Arguments
    /// * `key` - Non-empty key
    /// * `value` - Any serde-serializable value
    /// * `ttl` - Lifetime override; None uses `ClientConfig::default_ttl`
    ///
    /// # Errors
    /// `InvalidKey` for an empty key, `Codec` for values JSON cannot hold
    /// (NaN or infinite floats), `BackendUnavailable`/`BackendRejected` when
    /// the backend fails, `ClientClosed` after `close`.
    pub async fn put<V>(&self, key: &str, value: &V, ttl: Option<Duration>) -> Result<()>
    where
        V: Serialize + Sync + ?Sized,
    {
        let ttl = match ttl {
            Some(ttl) => non_zero(ttl),
            None => self.config.default_ttl,
        };
        self.write("put", key, Payload::Value(value), ttl).await?;
        self.stats.record_put();
        Ok(())
    }

    // == Get ==
    /// Returns the value under `key`.
    ///
    /// # Returns
    /// - `Ok(Some(value))` for a live entry
    /// - `Ok(None)` if the key is absent, expired or a negative-cache marker
    pub async fn get<V: DeserializeOwned>(&self, key: &str) -> Result<Option<V>> {
        match self.lookup(key).await? {
            Lookup::Hit(value) => Ok(Some(value)),
            Lookup::KnownMissing | Lookup::Miss => Ok(None),
        }
    }

    // == Get Or Load ==
    /// Read-through get.
    ///
    /// On a miss, `loader` is called. A loaded value is stored with the
    /// default TTL. When the loader finds nothing and a miss TTL is
    /// configured, a negative marker is stored so later calls skip the
    /// loader until it expires.
    pub async fn get_or_load<V, F, Fut>(&self, key: &str, loader: F) -> Result<Option<V>>
    where
        V: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Option<V>>>,
    {
        match self.lookup::<V>(key).await? {
            Lookup::Hit(value) => return Ok(Some(value)),
            Lookup::KnownMissing => return Ok(None),
            Lookup::Miss => {}
        }

        debug!(key, "loading value after miss");
        let loaded = loader().await.map_err(|source| CacheError::Loader {
            key: key.to_string(),
            source,
        })?;

        match loaded {
            Some(value) => {
                self.put(key, &value, None).await?;
                Ok(Some(value))
            }
            None => {
                if let Some(miss_ttl) = self.config.miss_ttl {
                    self.write("put", key, Payload::<()>::Missing, Some(miss_ttl))
                        .await?;
                    debug!(key, ?miss_ttl, "stored negative cache marker");
                }
                Ok(None)
            }
        }
    }

    // == Remove ==
    /// Deletes `key`. Removing an absent key succeeds.
    pub async fn remove(&self, key: &str) -> Result<()> {
        self.ensure_open()?;
        validate_key(key)?;

        self.backend
            .delete(key)
            .await
            .map_err(|source| self.backend_failure("remove", key, source))?;

        self.stats.record_remove();
        debug!(key, "removed");
        Ok(())
    }

    // == Close ==
    /// Releases the backend. Every later call, `close` included, fails with
    /// [`CacheError::ClientClosed`].
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(CacheError::ClientClosed);
        }

        info!(backend = self.backend.name(), "closing cache client");
        self.backend
            .close()
            .await
            .map_err(|source| self.backend_failure("close", "*", source))
    }

    async fn lookup<V: DeserializeOwned>(&self, key: &str) -> Result<Lookup<V>> {
        self.ensure_open()?;
        validate_key(key)?;

        let raw = self
            .backend
            .get(key)
            .await
            .map_err(|source| self.backend_failure("get", key, source))?;

        let Some(bytes) = raw else {
            self.stats.record_miss();
            debug!(key, "cache miss");
            return Ok(Lookup::Miss);
        };

        // Expiry is checked before the payload is decoded, so a stale entry
        // of another type still reads as a miss.
        let header = codec::decode_header(&bytes).map_err(|source| codec_error(key, source))?;
        if header.is_expired() {
            self.stats.record_expired();
            debug!(key, expires_at = ?header.expires_at, "cache entry expired");
            return Ok(Lookup::Miss);
        }

        let entry: CacheEntry<V> =
            codec::decode(&bytes).map_err(|source| codec_error(key, source))?;
        let ttl_remaining = entry.ttl_remaining();

        match entry.payload {
            Payload::Value(value) => {
                self.stats.record_hit();
                debug!(key, ?ttl_remaining, "cache hit");
                Ok(Lookup::Hit(value))
            }
            Payload::Missing => {
                self.stats.record_miss();
                debug!(key, "negative cache hit");
                Ok(Lookup::KnownMissing)
            }
        }
    }

    async fn write<V: Serialize>(
        &self,
        op: &'static str,
        key: &str,
        payload: Payload<V>,
        ttl: Option<Duration>,
    ) -> Result<()> {
        self.ensure_open()?;
        validate_key(key)?;

        let entry = CacheEntry::new(payload, ttl);
        let bytes = codec::encode(&entry).map_err(|source| codec_error(key, source))?;

        // Without native TTL the envelope alone enforces expiry on read.
        let backend_ttl = if self.backend.supports_ttl() { ttl } else { None };

        self.backend
            .set(key, bytes, backend_ttl)
            .await
            .map_err(|source| self.backend_failure(op, key, source))?;

        debug!(key, ?ttl, "stored");
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(CacheError::ClientClosed)
        } else {
            Ok(())
        }
    }

    fn backend_failure(&self, op: &'static str, key: &str, source: BackendError) -> CacheError {
        self.stats.record_backend_error();
        warn!(op, key, backend = self.backend.name(), error = %source, "backend call failed");
        CacheError::backend(op, key, source)
    }
}

impl<B: Backend> Drop for CacheClient<B> {
    fn drop(&mut self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let backend = Arc::clone(&self.backend);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(error) = backend.close().await {
                        warn!(backend = backend.name(), %error, "backend close on drop failed");
                    }
                });
            }
            Err(_) => warn!(
                backend = self.backend.name(),
                "cache client dropped outside a runtime without close"
            ),
        }
    }
}

/// Only emptiness is checked; length limits belong to each backend.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("Key cannot be empty".to_string()));
    }
    Ok(())
}

fn codec_error(key: &str, source: serde_json::Error) -> CacheError {
    CacheError::Codec {
        key: key.to_string(),
        source,
    }
}
