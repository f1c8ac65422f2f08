//! Cache Entry Module
//!
//! The envelope the client writes to the backend: payload plus expiration
//! metadata, so expiry can be enforced on read whatever the backend does.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Payload ==
/// What a stored entry holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Payload<V> {
    /// A cached value
    Value(V),
    /// Negative-cache marker: the loader reported no value
    Missing,
}

// == Cache Entry ==
/// A stored value with its timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    pub payload: Payload<V>,
    pub created_at: DateTime<Utc>,
    /// None = never expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry stamped with the current time.
    ///
    /// # Arguments
    /// * `payload` - The value or negative-cache marker to store
    /// * `ttl` - Lifetime from now; None means the entry never expires
    pub fn new(payload: Payload<V>, ttl: Option<Duration>) -> Self {
        let now = Utc::now();
        Self {
            payload,
            created_at: now,
            expires_at: ttl.and_then(|ttl| deadline(now, ttl)),
        }
    }

    // == Is Expired ==
    /// True once the current time has reached the expiration time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| now >= expires)
    }

    // == Time To Live ==
    /// Remaining lifetime of the entry.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` once the entry has expired
    /// - `Some(remaining)` while it is live
    /// - `None` if it never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at.map(|expires| {
            (expires - Utc::now())
                .to_std()
                .unwrap_or(Duration::ZERO)
        })
    }
}

// == Entry Header ==
/// Expiration metadata of a stored entry, decoded without its payload.
///
/// Lets a reader drop an expired entry even when the payload no longer
/// matches the type being asked for.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntryHeader {
    pub expires_at: Option<DateTime<Utc>>,
}

impl EntryHeader {
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires| Utc::now() >= expires)
    }
}

/// Absolute expiration for `ttl` measured from `now`.
///
/// Returns None when the deadline is not representable, which callers treat
/// as "never expires".
pub fn deadline(now: DateTime<Utc>, ttl: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_without_ttl_never_expires() {
        let entry = CacheEntry::new(Payload::Value("Pizza"), None);

        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining().is_none());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(Payload::Value(1u32), Some(Duration::from_millis(200)));
        assert!(!entry.is_expired());

        sleep(Duration::from_millis(300));

        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new(Payload::Value(()), Some(Duration::from_secs(10)));

        let remaining = entry.ttl_remaining().unwrap();
        assert!(remaining <= Duration::from_secs(10));
        assert!(remaining >= Duration::from_secs(9));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Utc::now();
        let entry = CacheEntry {
            payload: Payload::Value("x"),
            created_at: now,
            expires_at: Some(now),
        };

        assert!(entry.is_expired_at(now), "Entry should be expired at boundary");
    }

    #[test]
    fn test_deadline_overflow_means_never() {
        assert_eq!(deadline(Utc::now(), Duration::MAX), None);
    }

    #[test]
    fn test_header_expiry_matches_entry() {
        let now = Utc::now();
        let header = EntryHeader {
            expires_at: Some(now),
        };
        assert!(header.is_expired());
        assert!(!EntryHeader { expires_at: None }.is_expired());
    }

    #[test]
    fn test_missing_marker_decodes_as_any_type() {
        let marker = CacheEntry::<()>::new(Payload::Missing, None);
        let bytes = serde_json::to_vec(&marker).unwrap();

        let decoded: CacheEntry<String> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded.payload, Payload::Missing);
    }
}
