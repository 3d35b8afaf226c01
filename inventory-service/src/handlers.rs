//! HTTP handlers for the inventory-service binary (§6).

use crate::commands::{self, ReservationOutcome};
use crate::read_model::{self, ProductView};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use order_saga_core::StreamId;
use order_saga_web::AppError;
use serde::{Deserialize, Serialize};

/// Body of `POST /commands/inventory/{product_id}/reserve` and `.../release`.
#[derive(Debug, Deserialize)]
pub struct ReservationRequest {
    /// The order the reservation (or release) is for.
    pub order_id: String,
    /// Units to reserve or release.
    pub quantity: u32,
}

/// `{success: true}` response body.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    /// Always `true` for this response shape.
    pub success: bool,
}

/// `{detail: reason}` response body for a 409 rejection.
#[derive(Debug, Serialize)]
pub struct RejectionResponse {
    /// Why the reservation was rejected.
    pub detail: String,
}

/// `POST /commands/inventory/{product_id}/reserve` (§4.3, §6).
///
/// Returns 200 `{success: true}` on success, or 409 `{detail: reason}` on
/// insufficient stock — a business rejection, not an [`AppError`].
///
/// # Errors
///
/// Returns a mapped [`AppError`] only on concurrency conflict or storage failure.
pub async fn reserve(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(body): Json<ReservationRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let outcome = commands::reserve_inventory(
        &state.pool,
        state.bus.as_ref(),
        state.clock.as_ref(),
        &product_id,
        &body.order_id,
        body.quantity,
    )
    .await?;

    match outcome {
        ReservationOutcome::Reserved => Ok((
            StatusCode::OK,
            Json(serde_json::to_value(SuccessResponse { success: true }).unwrap_or_default()),
        )),
        ReservationOutcome::InsufficientStock { available } => Ok((
            StatusCode::CONFLICT,
            Json(
                serde_json::to_value(RejectionResponse {
                    detail: format!(
                        "insufficient stock for product '{product_id}': requested {}, available {available}",
                        body.quantity
                    ),
                })
                .unwrap_or_default(),
            ),
        )),
    }
}

/// `POST /commands/inventory/{product_id}/release` (§4.3, §6).
///
/// # Errors
///
/// Returns a mapped [`AppError`] on concurrency conflict or storage failure.
pub async fn release(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(body): Json<ReservationRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    commands::release_inventory(
        &state.pool,
        state.bus.as_ref(),
        state.clock.as_ref(),
        &product_id,
        &body.order_id,
        body.quantity,
    )
    .await?;

    Ok(Json(SuccessResponse { success: true }))
}

/// `GET /queries/products/{product_id}` (§4.3, §6).
///
/// # Errors
///
/// Returns [`AppError::not_found`] if no such product exists, or
/// [`AppError::internal`] on storage failure.
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductView>, AppError> {
    let view = read_model::get_product(&state.pool, &product_id)
        .await
        .map_err(|e| AppError::internal("product query failed").with_source(e.into()))?
        .ok_or_else(|| AppError::not_found("Product", &product_id))?;
    Ok(Json(view))
}

/// `GET /queries/products` (§4.3, §6).
///
/// # Errors
///
/// Returns [`AppError::internal`] on storage failure.
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<ProductView>>, AppError> {
    let views = read_model::list_products(&state.pool)
        .await
        .map_err(|e| AppError::internal("product query failed").with_source(e.into()))?;
    Ok(Json(views))
}

/// `GET /events/{product_id}` — returns a product stream's raw events, for inspection (§4.6).
///
/// # Errors
///
/// Returns [`AppError::internal`] on storage failure.
pub async fn get_events(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Vec<order_saga_core::StoredEvent>>, AppError> {
    let events = state
        .store
        .load_events(&StreamId::new(product_id))
        .await
        .map_err(|e| AppError::internal("event store error").with_source(anyhow::anyhow!(e.to_string())))?;
    Ok(Json(events))
}

/// `GET /events` — returns every event across every product stream, for auditing (§4.6).
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
