//! HTTP handler for `POST /saga/place-order` (§4.4, §6).

use crate::saga::{self, PlaceOrderRequest};
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use order_saga_web::CorrelationId;
use serde::{Deserialize, Serialize};

/// Body of `POST /saga/place-order`.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderBody {
    /// Caller-supplied order identifier.
    pub order_id: String,
    /// Customer placing the order.
    pub customer_name: String,
    /// Product being ordered.
    pub product_id: String,
    /// Human-readable product name.
    pub product_name: String,
    /// Units requested.
    pub quantity: i64,
    /// Total order price.
    pub total_price: f64,
}

/// `{success, saga_log}` response (§6).
#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    /// `true` only when all three forward steps completed.
    pub success: bool,
    /// The full step-by-step log of this execution.
    pub saga_log: Vec<crate::domain::SagaStep>,
}

/// `POST /saga/place-order` (§4.4, §6).
///
/// Always answers `200 OK` — failure is conveyed through the response body,
/// never through the HTTP status (§7's propagation rule for the saga's own
/// boundary).
pub async fn place_order(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Json(body): Json<PlaceOrderBody>,
) -> Json<PlaceOrderResponse> {
    let request = PlaceOrderRequest {
        order_id: body.order_id,
        customer_name: body.customer_name,
        product_id: body.product_id,
        product_name: body.product_name,
        quantity: body.quantity,
        total_price: body.total_price,
    };

    let outcome = saga::execute(
        &state.client,
        &state.config,
        state.bus.as_ref(),
        state.clock.as_ref(),
        &correlation_id.0.to_string(),
        &request,
    )
    .await;

    Json(PlaceOrderResponse {
        success: outcome.success,
        saga_log: outcome.saga_log,
    })
}
