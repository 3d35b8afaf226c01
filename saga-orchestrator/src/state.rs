//! Shared application state for the saga-orchestrator binary.

use crate::saga::SagaConfig;
use order_saga_core::{Clock, EventBus};
use std::sync::Arc;

/// State threaded through every handler via axum's `State` extractor.
///
/// Unlike `order-service`/`inventory-service`, there is no `PgPool` here —
/// the orchestrator is stateless per §4.4 and holds only a `reqwest::Client`
/// and the two authorities' base URLs.
#[derive(Clone)]
pub struct AppState {
    /// Shared HTTP client used for every outbound call.
    pub client: reqwest::Client,
    /// Base URLs of the order and inventory authorities.
    pub config: SagaConfig,
    /// Bus the saga publishes its terminal event to.
    pub bus: Arc<dyn EventBus>,
    /// Clock used to timestamp saga-log entries.
    pub clock: Arc<dyn Clock>,
}
