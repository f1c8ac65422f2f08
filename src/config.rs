//! Configuration Module
//!
//! Immutable settings for the cache client and the in-memory backend,
//! loadable from environment variables.

use std::env;
use std::time::Duration;

/// Client configuration.
///
/// Passed once at construction; the client never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// TTL applied by `put` when no explicit duration is given, None = never expires
    pub default_ttl: Option<Duration>,
    /// TTL of negative-cache markers written by `get_or_load`, None = disabled
    pub miss_ttl: Option<Duration>,
}

impl ClientConfig {
    /// Creates a config with the given default and miss durations.
    ///
    /// A zero duration is treated as "not set".
    pub fn with_default_durations(default_ttl: Duration, miss_ttl: Duration) -> Self {
        Self {
            default_ttl: non_zero(default_ttl),
            miss_ttl: non_zero(miss_ttl),
        }
    }

    /// Creates a new ClientConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds, 0 = never expires (default: 300)
    /// - `CACHE_MISS_TTL` - Miss caching TTL in seconds, 0 = disabled (default: 0)
    pub fn from_env() -> Self {
        Self::with_default_durations(
            Duration::from_secs(env_or("CACHE_DEFAULT_TTL", 300)),
            Duration::from_secs(env_or("CACHE_MISS_TTL", 0)),
        )
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_ttl: Some(Duration::from_secs(300)),
            miss_ttl: None,
        }
    }
}

/// In-memory backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryConfig {
    /// Maximum number of entries before LRU eviction kicks in
    pub max_entries: usize,
    /// Interval in seconds between expired-entry sweeps
    pub cleanup_interval: u64,
}

impl MemoryConfig {
    /// Loads the backend settings from the environment.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        Self {
            max_entries: env_or("MAX_ENTRIES", 1000),
            cleanup_interval: env_or("CLEANUP_INTERVAL", 1),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            cleanup_interval: 1,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, fallback: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(fallback)
}

pub(crate) fn non_zero(duration: Duration) -> Option<Duration> {
    (!duration.is_zero()).then_some(duration)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.default_ttl, Some(Duration::from_secs(300)));
        assert_eq!(config.miss_ttl, None);
    }

    #[test]
    fn test_with_default_durations() {
        let config = ClientConfig::with_default_durations(
            Duration::from_secs(1),
            Duration::from_secs(2),
        );
        assert_eq!(config.default_ttl, Some(Duration::from_secs(1)));
        assert_eq!(config.miss_ttl, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_zero_durations_mean_unset() {
        let config = ClientConfig::with_default_durations(Duration::ZERO, Duration::ZERO);
        assert_eq!(config.default_ttl, None);
        assert_eq!(config.miss_ttl, None);
    }

    #[test]
    fn test_config_from_env_defaults() {
        env::remove_var("CACHE_DEFAULT_TTL");
        env::remove_var("CACHE_MISS_TTL");
        env::remove_var("MAX_ENTRIES");
        env::remove_var("CLEANUP_INTERVAL");

        assert_eq!(ClientConfig::from_env(), ClientConfig::default());
        assert_eq!(MemoryConfig::from_env(), MemoryConfig::default());
    }
}
