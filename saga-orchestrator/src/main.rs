//! Saga-orchestrator entry point (§10).
//!
//! # Configuration
//!
//! - `ORDER_SERVICE_URL` — required, e.g. `http://localhost:3001`.
//! - `INVENTORY_SERVICE_URL` — required, e.g. `http://localhost:3002`.
//! - `BIND_ADDR` — optional, defaults to `0.0.0.0:3003`.
//! - `RUST_LOG` — optional, read by `tracing_subscriber::EnvFilter`.

use anyhow::Context;
use order_saga_core::{Clock, EventBus, SystemClock};
use order_saga_testing::InMemoryEventBus;
use saga_orchestrator::saga::SagaConfig;
use saga_orchestrator::{build_router, AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let order_service_url =
        std::env::var("ORDER_SERVICE_URL").context("ORDER_SERVICE_URL must be set")?;
    let inventory_service_url =
        std::env::var("INVENTORY_SERVICE_URL").context("INVENTORY_SERVICE_URL must be set")?;
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3003".to_string());

    let client = reqwest::Client::builder()
        .timeout(saga_orchestrator::client::STEP_TIMEOUT)
        .build()
        .context("failed to build HTTP client")?;

    let bus: Arc<dyn EventBus> = Arc::new(InMemoryEventBus::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let state = AppState {
        client,
        config: SagaConfig {
            order_service_url,
            inventory_service_url,
        },
        bus,
        clock,
    };

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!(%bind_addr, "saga-orchestrator listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
