//! Cache Module
//!
//! The TTL cache client, its stored entry format and its statistics.

mod client;
mod codec;
mod entry;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use client::CacheClient;
pub use entry::{deadline, CacheEntry, EntryHeader, Payload};
pub use stats::ClientStats;
pub(crate) use stats::StatsRecorder;
