//! Background Tasks Module
//!
//! # Tasks
//! - TTL Cleanup: purges expired entries from the in-memory backend

mod cleanup;

pub use cleanup::spawn_cleanup_task;
