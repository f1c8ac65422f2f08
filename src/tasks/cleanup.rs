//! TTL Cleanup Task
//!
//! Background task that periodically purges expired entries from a
//! [`MemoryBackend`]. Reads already treat expired entries as absent; the
//! sweep only reclaims memory.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::backend::MemoryBackend;

/// Spawns a background task that purges expired entries every `interval`.
///
/// The task ends on its own once the backend is closed; otherwise abort the
/// returned handle during shutdown.
///
/// # Example
/// ```ignore
/// let backend = MemoryBackend::default();
/// let cleanup_handle = spawn_cleanup_task(backend.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(backend: MemoryBackend, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(?interval, "Starting TTL cleanup task");

        loop {
            tokio::time::sleep(interval).await;

            if backend.is_closed() {
                info!("Backend closed, stopping TTL cleanup task");
                break;
            }

            let removed = backend.purge_expired().await;
            if removed > 0 {
                let evictions = backend.evictions().await;
                info!(evictions, "TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;

    const TICK: Duration = Duration::from_millis(100);

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let backend = MemoryBackend::default();
        backend
            .set("expire_soon", b"value".to_vec(), Some(Duration::from_millis(150)))
            .await
            .unwrap();

        let handle = spawn_cleanup_task(backend.clone(), TICK);
        tokio::time::sleep(Duration::from_millis(400)).await;

        // Gone from storage without any read touching it
        assert!(backend.is_empty().await, "Expired entry should have been purged");

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let backend = MemoryBackend::default();
        backend
            .set("long_lived", b"value".to_vec(), Some(Duration::from_secs(3600)))
            .await
            .unwrap();

        let handle = spawn_cleanup_task(backend.clone(), TICK);
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(
            backend.get("long_lived").await.unwrap(),
            Some(b"value".to_vec())
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_stops_when_backend_closes() {
        let backend = MemoryBackend::default();
        let handle = spawn_cleanup_task(backend.clone(), TICK);

        backend.close().await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(handle.is_finished(), "Task should exit after backend close");
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let handle = spawn_cleanup_task(MemoryBackend::default(), TICK);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
