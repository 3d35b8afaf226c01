//! Shared application state for the order-service binary.

use order_saga_core::{Clock, EventBus, EventStore};
use sqlx::PgPool;
use std::sync::Arc;

/// State shared across every handler.
///
/// Command handlers write through `pool` directly so the event append and
/// the `order_reads` upsert land in one transaction (§4.2); `store` stays
/// around for the read-only `GET /events*` inspection endpoints.
#[derive(Clone)]
pub struct AppState {
    /// Raw pool used by command handlers for transactional writes.
    pub pool: PgPool,
    /// Event store used by the read-only event inspection endpoints.
    pub store: Arc<dyn EventStore>,
    /// Bus every committed order event is published to.
    pub bus: Arc<dyn EventBus>,
    /// Clock injected for deterministic timestamps in tests.
    pub clock: Arc<dyn Clock>,
}
