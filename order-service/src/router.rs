//! Route table for the order-service binary (§6).

use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use order_saga_web::{handlers::health::health_check, middleware::correlation_id_layer};

/// Builds the order-service `Router`.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/commands/orders", post(handlers::create_order))
        .route(
            "/commands/orders/:order_id/confirm",
            post(handlers::confirm_order),
        )
        .route(
            "/commands/orders/:order_id/cancel",
            post(handlers::cancel_order),
        )
        .route("/queries/orders", get(handlers::list_orders))
        .route("/queries/orders/:order_id", get(handlers::get_order))
        .route("/events", get(handlers::list_events))
        .route("/events/:order_id", get(handlers::get_events))
        .layer(correlation_id_layer())
        .with_state(state)
}
