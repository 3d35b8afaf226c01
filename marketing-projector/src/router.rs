//! Route table for the marketing-projector binary (§6).

use crate::handlers;
use crate::state::AppState;
use axum::routing::get;
use axum::Router;
use order_saga_web::{handlers::health::health_check, middleware::correlation_id_layer};

/// Builds the marketing-projector `Router`. Query-only: no `/commands*` routes.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/queries/marketing/customers", get(handlers::list_customers))
        .route("/queries/marketing/customers/:customer_name", get(handlers::get_customer))
        .route("/queries/marketing/products", get(handlers::list_products))
        .route("/queries/marketing/daily", get(handlers::list_daily_sales))
        .route("/queries/marketing/overview", get(handlers::overview))
        .layer(correlation_id_layer())
        .with_state(state)
}
