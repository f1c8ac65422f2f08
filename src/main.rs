//! Coldbox demo
//!
//! Stores a value with a one second TTL, watches it expire, then removes it,
//! logging each result. Client and backend settings come from the environment.

use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coldbox::{spawn_cleanup_task, CacheClient, ClientConfig, MemoryBackend, MemoryConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coldbox=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client_config = ClientConfig::from_env();
    let memory_config = MemoryConfig::from_env();
    info!(?client_config, ?memory_config, "Configuration loaded");

    let backend = MemoryBackend::new(&memory_config);
    let cleanup_handle = spawn_cleanup_task(
        backend.clone(),
        Duration::from_secs(memory_config.cleanup_interval.max(1)),
    );

    let client = CacheClient::new(backend, client_config);
    info!(default_ttl = ?client.config().default_ttl, "Cache client ready");
    let ttl = Duration::from_secs(1);

    client
        .put("food", "Pizza", Some(ttl))
        .await
        .context("storing demo value")?;
    let fresh: Option<String> = client.get("food").await?;
    info!(value = ?fresh, "read before expiry");

    tokio::time::sleep(ttl + Duration::from_millis(500)).await;

    let stale: Option<String> = client.get("food").await?;
    info!(value = ?stale, "read after expiry");

    client.remove("food").await?;
    info!(stats = ?client.stats(), "removed demo key");

    client.close().await?;
    // The sweeper exits on its own once the backend is closed.
    cleanup_handle.await?;

    info!("Demo complete");
    Ok(())
}
