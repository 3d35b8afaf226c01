//! Route table for the saga-orchestrator binary (§6).

use crate::handlers;
use crate::state::AppState;
use axum::routing::post;
use axum::Router;
use order_saga_web::{handlers::health::health_check, middleware::correlation_id_layer};

/// Builds the saga-orchestrator `Router`.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route("/saga/place-order", post(handlers::place_order))
        .layer(correlation_id_layer())
        .with_state(state)
}
