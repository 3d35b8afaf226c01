//! Read-model queries against `order_reads` (§4.2 `GET /queries/orders*`).

use serde::Serialize;
use sqlx::{FromRow, PgPool};

/// One row of the order read model.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderView {
    /// The order's id.
    pub order_id: String,
    /// The customer's display name.
    pub customer_name: String,
    /// The product being ordered.
    pub product_id: String,
    /// The product's display name at order time.
    pub product_name: String,
    /// Units ordered.
    pub quantity: i64,
    /// Total charged for the order.
    pub total_price: f64,
    /// The order's current lifecycle status (`"PENDING"`/`"CONFIRMED"`/`"CANCELLED"`).
    pub status: String,
    /// The version of the last event folded into this row.
    pub version: i64,
}

/// Fetches a single order's read-model row.
///
/// # Errors
///
/// Returns `Ok(None)` if no row exists for `order_id`; propagates any other
/// `sqlx::Error` from the query.
pub async fn get_order(pool: &PgPool, order_id: &str) -> Result<Option<OrderView>, sqlx::Error> {
    sqlx::query_as::<_, OrderView>(
        r"
        SELECT order_id, customer_name, product_id, product_name, quantity, total_price, status, version
        FROM order_reads
        WHERE order_id = $1
        ",
    )
    .bind(order_id)
    .fetch_optional(pool)
    .await
}

/// Lists every order's read-model row, most recently updated first.
///
/// # Errors
///
/// Propagates any `sqlx::Error` from the query.
pub async fn list_orders(pool: &PgPool) -> Result<Vec<OrderView>, sqlx::Error> {
    sqlx::query_as::<_, OrderView>(
        r"
        SELECT order_id, customer_name, product_id, product_name, quantity, total_price, status, version
        FROM order_reads
        ORDER BY updated_at DESC
        ",
    )
    .fetch_all(pool)
    .await
}
