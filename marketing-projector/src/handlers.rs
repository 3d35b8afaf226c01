//! HTTP handlers for the marketing-projector binary (§4.5, §6).

use crate::read_model::{self, CustomerSummaryView, DailySalesView, MarketingOverview, ProductPopularityView};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use order_saga_web::AppError;

/// `GET /queries/marketing/customers` — every customer, by revenue.
///
/// # Errors
///
/// Returns [`AppError::internal`] on storage failure.
pub async fn list_customers(State(state): State<AppState>) -> Result<Json<Vec<CustomerSummaryView>>, AppError> {
    let views = read_model::list_customers(&state.pool)
        .await
        .map_err(|e| AppError::internal("customer query failed").with_source(e.into()))?;
    Ok(Json(views))
}

/// `GET /queries/marketing/customers/{customer_name}`.
///
/// # Errors
///
/// Returns [`AppError::not_found`] if no such customer has ordered, or
/// [`AppError::internal`] on storage failure.
pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_name): Path<String>,
) -> Result<Json<CustomerSummaryView>, AppError> {
    let view = read_model::get_customer(&state.pool, &customer_name)
        .await
        .map_err(|e| AppError::internal("customer query failed").with_source(e.into()))?
        .ok_or_else(|| AppError::not_found("Customer", &customer_name))?;
    Ok(Json(view))
}

/// `GET /queries/marketing/products` — every product, by revenue.
///
/// # Errors
///
/// Returns [`AppError::internal`] on storage failure.
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<ProductPopularityView>>, AppError> {
    let views = read_model::list_products(&state.pool)
        .await
        .map_err(|e| AppError::internal("product query failed").with_source(e.into()))?;
    Ok(Json(views))
}

/// `GET /queries/marketing/daily` — the most recent 30 days of sales.
///
/// # Errors
///
/// Returns [`AppError::internal`] on storage failure.
pub async fn list_daily_sales(State(state): State<AppState>) -> Result<Json<Vec<DailySalesView>>, AppError> {
    let views = read_model::list_daily_sales(&state.pool)
        .await
        .map_err(|e| AppError::internal("daily sales query failed").with_source(e.into()))?;
    Ok(Json(views))
}

/// `GET /queries/marketing/overview` — the combined dashboard response.
///
/// # Errors
///
/// Returns [`AppError::internal`] on storage failure.
pub async fn overview(State(state): State<AppState>) -> Result<Json<MarketingOverview>, AppError> {
    let view = read_model::overview(&state.pool)
        .await
        .map_err(|e| AppError::internal("overview query failed").with_source(e.into()))?;
    Ok(Json(view))
}
