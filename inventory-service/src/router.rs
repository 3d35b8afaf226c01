//! Route table for the inventory-service binary (§6).

use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use order_saga_web::{handlers::health::health_check, middleware::correlation_id_layer};

/// Builds the inventory-service `Router`.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/commands/inventory/:product_id/reserve", post(handlers::reserve))
        .route("/commands/inventory/:product_id/release", post(handlers::release))
        .route("/queries/products", get(handlers::list_products))
        .route("/queries/products/:product_id", get(handlers::get_product))
        .route("/events", get(handlers::list_events))
        .route("/events/:product_id", get(handlers::get_events))
        .layer(correlation_id_layer())
        .with_state(state)
}
