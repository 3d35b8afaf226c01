//! HTTP handlers for the order-service binary (§6).

use crate::commands;
use crate::read_model::{self, OrderView};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use order_saga_core::StreamId;
use order_saga_web::AppError;
use serde::{Deserialize, Serialize};

/// Body of `POST /commands/orders`.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// The order's caller-assigned id.
    pub order_id: String,
    /// The customer's display name.
    pub customer_name: String,
    /// The product being ordered.
    pub product_id: String,
    /// The product's display name at order time.
    pub product_name: String,
    /// Units ordered. Must be greater than zero.
    pub quantity: u32,
    /// Total charged for the order.
    pub total_price: f64,
}

/// Body of `POST /commands/orders/{order_id}/cancel`.
#[derive(Debug, Deserialize, Default)]
pub struct CancelOrderRequest {
    /// Why the order is being cancelled. Defaults to a generic reason.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Response body for every order command and query.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// The order's id.
    pub order_id: String,
    /// The customer's display name.
    pub customer_name: String,
    /// The product being ordered.
    pub product_id: String,
    /// The product's display name at order time.
    pub product_name: String,
    /// Units ordered.
    pub quantity: u32,
    /// Total charged for the order.
    pub total_price: f64,
    /// The order's current lifecycle status.
    pub status: String,
    /// The version of the last event folded into this view.
    pub version: u64,
}

impl From<crate::domain::Order> for OrderResponse {
    fn from(order: crate::domain::Order) -> Self {
        Self {
            order_id: order.id,
            customer_name: order.customer_name,
            product_id: order.product_id,
            product_name: order.product_name,
            quantity: order.quantity,
            total_price: order.total_price,
            status: order.status.to_string(),
            version: order.version.value(),
        }
    }
}

/// `POST /commands/orders` — creates a new order in `PENDING` (§4.2).
///
/// # Errors
///
/// Returns [`AppError::validation`] if `quantity` is zero, or a mapped
/// [`order_saga_web::AppError`] if the command itself fails.
pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    if body.quantity == 0 {
        return Err(AppError::validation("quantity must be greater than zero"));
    }

    let order = commands::create_order(
        &state.pool,
        state.bus.as_ref(),
        state.clock.as_ref(),
        &body.order_id,
        &body.customer_name,
        &body.product_id,
        &body.product_name,
        body.quantity,
        body.total_price,
    )
    .await?;

    Ok(Json(order.into()))
}

/// `POST /commands/orders/{order_id}/confirm` — confirms a reserved order (§4.2).
///
/// # Errors
///
/// Returns a mapped [`order_saga_web::AppError`] if the order doesn't exist
/// or the write fails.
pub async fn confirm_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = commands::confirm_order(&state.pool, state.bus.as_ref(), state.clock.as_ref(), &order_id)
        .await?;
    Ok(Json(order.into()))
}

/// `POST /commands/orders/{order_id}/cancel` — cancels an order (§4.2).
///
/// # Errors
///
/// Returns a mapped [`order_saga_web::AppError`] if the order doesn't exist
/// or the write fails.
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(body): Json<CancelOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let reason = body.reason.unwrap_or_else(|| "cancelled by request".to_string());
    let order = commands::cancel_order(
        &state.pool,
        state.bus.as_ref(),
        state.clock.as_ref(),
        &order_id,
        &reason,
    )
    .await?;
    Ok(Json(order.into()))
}

/// `GET /queries/orders/{order_id}` — fetches one order's read-model row (§4.2).
///
/// # Errors
///
/// Returns [`AppError::not_found`] if no such order exists, or
/// [`AppError::internal`] on storage failure.
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderView>, AppError> {
    let view = read_model::get_order(&state.pool, &order_id)
        .await
        .map_err(|e| AppError::internal("order query failed").with_source(e.into()))?
        .ok_or_else(|| AppError::not_found("Order", &order_id))?;
    Ok(Json(view))
}

/// `GET /queries/orders` — lists every order's read-model row (§4.2).
///
/// # Errors
///
/// Returns [`AppError::internal`] on storage failure.
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<OrderView>>, AppError> {
    let views = read_model::list_orders(&state.pool)
        .await
        .map_err(|e| AppError::internal("order query failed").with_source(e.into()))?;
    Ok(Json(views))
}

/// `GET /events/{order_id}` — returns an order stream's raw events, for inspection (§4.6).
///
/// # Errors
///
/// Returns [`AppError::internal`] on storage failure.
pub async fn get_events(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<Vec<order_saga_core::StoredEvent>>, AppError> {
    let events = state
        .store
        .load_events(&StreamId::new(order_id))
        .await
        .map_err(|e| AppError::internal("event store error").with_source(anyhow::anyhow!(e.to_string())))?;
    Ok(Json(events))
}

/// `GET /events` — returns every event across every order stream, for auditing (§4.6).
///
/// # Errors
///
/// Returns [`AppError::internal`] on storage failure.
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<order_saga_core::StoredEvent>>, AppError> {
    let events = state
        .store
        .load_all()
        .await
        .map_err(|e| AppError::internal("event store error").with_source(anyhow::anyhow!(e.to_string())))?;
    Ok(Json(events))
}

