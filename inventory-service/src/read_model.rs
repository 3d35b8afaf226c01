//! Read-model queries against `product_reads` (§4.3 `GET /queries/products*`).

use serde::Serialize;
use sqlx::{FromRow, PgPool};

/// One row of the inventory read model.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductView {
    /// The product's id.
    pub product_id: String,
    /// Units on hand.
    pub quantity: i64,
    /// Units held against open orders.
    pub reserved: i64,
    /// The version of the last event folded into this row.
    pub version: i64,
}

/// Fetches a single product's read-model row.
///
/// # Errors
///
/// Returns `Ok(None)` if no row exists for `product_id`; propagates any
/// other `sqlx::Error` from the query.
pub async fn get_product(pool: &PgPool, product_id: &str) -> Result<Option<ProductView>, sqlx::Error> {
    sqlx::query_as::<_, ProductView>(
        "SELECT product_id, quantity, reserved, version FROM product_reads WHERE product_id = $1",
    )
    .bind(product_id)
    .fetch_optional(pool)
    .await
}

/// Lists every product's read-model row, most recently updated first.
///
/// # Errors
///
/// Propagates any `sqlx::Error` from the query.
pub async fn list_products(pool: &PgPool) -> Result<Vec<ProductView>, sqlx::Error> {
    sqlx::query_as::<_, ProductView>(
        "SELECT product_id, quantity, reserved, version FROM product_reads ORDER BY updated_at DESC",
    )
    .fetch_all(pool)
    .await
}
