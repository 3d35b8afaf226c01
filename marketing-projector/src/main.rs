//! Marketing-projector entry point (§10).
//!
//! # Configuration
//!
//! - `DATABASE_URL` — required. No in-memory fallback: a read model without
//!   a durable store isn't a usable deployment.
//! - `BIND_ADDR` — optional, defaults to `0.0.0.0:3004`.
//! - `RUST_LOG` — optional, read by `tracing_subscriber::EnvFilter`.
//!
//! The background subscriber (§4.5, §10) runs on its own task and is
//! cancelled via a `oneshot` channel on `SIGINT`/`SIGTERM`, so the process
//! never drops a message mid-projection on shutdown.

use anyhow::Context;
use marketing_projector::{build_router, AppState};
use order_saga_core::EventBus;
use order_saga_testing::InMemoryEventBus;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set; marketing-projector has no in-memory fallback")?;
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3004".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&database_url)
        .await
        .context("failed to connect marketing-projector to its database")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run marketing-projector migrations")?;

    let bus: Arc<dyn EventBus> = Arc::new(InMemoryEventBus::new());
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let subscriber = tokio::spawn(marketing_projector::subscriber::run(bus, pool.clone(), shutdown_rx));

    let state = AppState { pool };
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!(%bind_addr, "marketing-projector listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    let _ = shutdown_tx.send(());
    subscriber.await.context("subscriber task panicked")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
