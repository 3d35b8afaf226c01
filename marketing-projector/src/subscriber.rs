//! Background bus-subscriber task (§4.5, §10): consumes `order_events` and
//! projects each message, exiting cleanly on a shutdown signal.

use crate::projections::{self, ProjectionError};
use futures::StreamExt;
use order_saga_core::EventBus;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Runs the subscription loop until `shutdown` fires or the bus stream ends.
///
/// Each message is projected independently; a malformed payload or a
/// database failure is logged and dropped so the subscription stays alive
/// (§7: the projector swallows per-message errors).
pub async fn run(bus: Arc<dyn EventBus>, pool: PgPool, mut shutdown: oneshot::Receiver<()>) {
    let mut stream = match bus.subscribe(&["order_events"]).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!(error = %e, "marketing-projector failed to subscribe to order_events");
            return;
        }
    };

    loop {
        tokio::select! {
            message = stream.next() => {
                match message {
                    Some(Ok(envelope)) => project_one(&pool, &envelope).await,
                    Some(Err(e)) => tracing::warn!(error = %e, "bus returned a malformed message"),
                    None => {
                        tracing::info!("order_events stream ended; subscriber exiting");
                        break;
                    }
                }
            }
            _ = &mut shutdown => {
                tracing::info!("shutdown signal received; subscriber exiting");
                break;
            }
        }
    }
}

async fn project_one(pool: &PgPool, envelope: &serde_json::Value) {
    let Some(event_type) = envelope.get("event_type").and_then(serde_json::Value::as_str) else {
        tracing::warn!(?envelope, "message missing 'event_type'; dropping");
        return;
    };
    let empty = serde_json::Value::Object(serde_json::Map::new());
    let data = envelope.get("data").unwrap_or(&empty);

    match projections::handle_event(pool, event_type, data).await {
        Ok(()) => tracing::info!(event_type, "projected event"),
        Err(ProjectionError::Malformed(reason)) => {
            tracing::warn!(event_type, reason, "dropping malformed event");
        }
        Err(ProjectionError::Database(reason)) => {
            tracing::warn!(event_type, reason, "projection transaction failed; dropping event");
        }
    }
}
