//! Blob Warfare relay - room and snapshot store over HTTP.

use game::config::Config;
use relay::{RelayStore, RoomPolicy};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Blob Warfare Relay v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load()?;
    let policy = RoomPolicy {
        capacity: config.relay.room_capacity,
        max_age_ms: config.relay.room_max_age_ms,
        liveness_ms: config.relay.liveness_ms,
    };
    info!("Loaded configuration");
    info!("  Room capacity: {}", policy.capacity);
    info!("  Room max age: {}s", policy.max_age_ms / 1000);
    info!("  Liveness window: {}s", policy.liveness_ms / 1000);

    let addr: SocketAddr = format!("{}:{}", config.relay.bind, config.relay.port).parse()?;
    let store = Arc::new(Mutex::new(RelayStore::new(policy)));
    relay::serve(addr, store).await?;

    Ok(())
}
