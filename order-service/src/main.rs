//! Order-service entry point (§10).
//!
//! # Configuration
//!
//! - `DATABASE_URL` — required. No in-memory fallback: an authority without
//!   a durable event store isn't a usable deployment.
//! - `BIND_ADDR` — optional, defaults to `0.0.0.0:3001`.
//! - `RUST_LOG` — optional, read by `tracing_subscriber::EnvFilter`.

use anyhow::Context;
use order_saga_core::{Clock, EventBus, EventStore, SystemClock};
use order_saga_postgres::PostgresEventStore;
use order_saga_testing::InMemoryEventBus;
use order_service::{build_router, AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set; order-service has no in-memory fallback")?;
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());

    let event_store = PostgresEventStore::connect(&database_url)
        .await
        .context("failed to connect order-service to its database")?;
    let pool = event_store.pool().clone();

    let store: Arc<dyn EventStore> = Arc::new(event_store);
    let bus: Arc<dyn EventBus> = Arc::new(InMemoryEventBus::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let state = AppState {
        pool,
        store,
        bus,
        clock,
    };

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!(%bind_addr, "order-service listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
