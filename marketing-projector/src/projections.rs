//! Projection handlers (§4.5): one function per `order_events` event type,
//! each committing its own transaction.
//!
//! `OrderCreated`'s snapshot insert is idempotent (`ON CONFLICT DO NOTHING`);
//! the summary upserts that follow are **not** — redelivery of the same
//! event would double-count. That is accepted as-is under the bus's
//! at-most-once, no-redelivery contract (§4.6), not corrected here.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;

/// Errors a projection handler can hit.
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// The message didn't have the fields this projector needs
    /// (`MALFORMED_EVENT`, §7). Caller logs and drops the message.
    #[error("malformed event payload: {0}")]
    Malformed(String),

    /// A database operation failed (`STORAGE_ERROR`, §7).
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for ProjectionError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e.to_string())
    }
}

fn field_str<'a>(data: &'a serde_json::Value, key: &str) -> Result<&'a str, ProjectionError> {
    data.get(key)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| ProjectionError::Malformed(format!("missing or non-string field '{key}'")))
}

fn field_i64(data: &serde_json::Value, key: &str) -> Result<i64, ProjectionError> {
    data.get(key)
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| ProjectionError::Malformed(format!("missing or non-integer field '{key}'")))
}

fn field_f64(data: &serde_json::Value, key: &str) -> Result<f64, ProjectionError> {
    data.get(key)
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| ProjectionError::Malformed(format!("missing or non-numeric field '{key}'")))
}

fn field_timestamp(data: &serde_json::Value, key: &str) -> Result<DateTime<Utc>, ProjectionError> {
    field_str(data, key)?
        .parse::<DateTime<Utc>>()
        .map_err(|e| ProjectionError::Malformed(format!("invalid timestamp '{key}': {e}")))
}

/// Dispatches one `{event_type, data}` message to its projection handler.
/// An `event_type` this projector doesn't recognize is silently ignored —
/// only `order_events` carries types this projector understands.
///
/// # Errors
///
/// Returns [`ProjectionError::Malformed`] if `data` is missing fields this
/// handler needs, or [`ProjectionError::Database`] if the transaction fails.
pub async fn handle_event(pool: &PgPool, event_type: &str, data: &serde_json::Value) -> Result<(), ProjectionError> {
    match event_type {
        "OrderCreated" => project_order_created(pool, data).await,
        "OrderConfirmed" => project_order_confirmed(pool, data).await,
        "OrderCancelled" => project_order_cancelled(pool, data).await,
        _ => Ok(()),
    }
}

async fn project_order_created(pool: &PgPool, data: &serde_json::Value) -> Result<(), ProjectionError> {
    let order_id = field_str(data, "order_id")?;
    let customer_name = field_str(data, "customer_name")?;
    let product_id = field_str(data, "product_id")?;
    let product_name = field_str(data, "product_name")?;
    let quantity = field_i64(data, "quantity")?;
    let total_price = field_f64(data, "total_price")?;
    let timestamp = field_timestamp(data, "timestamp")?;
    let order_date = timestamp.date_naive();

    let mut tx: Transaction<'_, Postgres> = pool.begin().await?;

    sqlx::query(
        "INSERT INTO marketing_order_snapshot \
            (order_id, customer_name, product_id, product_name, quantity, total_price, status, order_date, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, 'PENDING', $7, $8, $8) \
         ON CONFLICT (order_id) DO NOTHING",
    )
    .bind(order_id)
    .bind(customer_name)
    .bind(product_id)
    .bind(product_name)
    .bind(quantity)
    .bind(total_price)
    .bind(order_date)
    .bind(timestamp)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO customer_summary \
            (customer_name, total_orders, total_revenue, avg_order_value, first_order_at, last_order_at, updated_at) \
         VALUES ($1, 1, $2, $2, $3, $3, $3) \
         ON CONFLICT (customer_name) DO UPDATE SET \
            total_orders = customer_summary.total_orders + 1, \
            total_revenue = customer_summary.total_revenue + $2, \
            avg_order_value = (customer_summary.total_revenue + $2) / (customer_summary.total_orders + 1), \
            last_order_at = $3, \
            updated_at = $3",
    )
    .bind(customer_name)
    .bind(total_price)
    .bind(timestamp)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO product_popularity \
            (product_id, product_name, total_units_ordered, total_order_count, total_revenue, unique_customers, updated_at) \
         VALUES ($1, $2, $3, 1, $4, 0, $5) \
         ON CONFLICT (product_id) DO UPDATE SET \
            total_units_ordered = product_popularity.total_units_ordered + $3, \
            total_order_count = product_popularity.total_order_count + 1, \
            total_revenue = product_popularity.total_revenue + $4, \
            updated_at = $5",
    )
    .bind(product_id)
    .bind(product_name)
    .bind(quantity)
    .bind(total_price)
    .bind(timestamp)
    .execute(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO product_customer_map (product_id, customer_name) VALUES ($1, $2) ON CONFLICT DO NOTHING")
        .bind(product_id)
        .bind(customer_name)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "UPDATE product_popularity SET unique_customers = \
            (SELECT COUNT(*) FROM product_customer_map WHERE product_id = $1) \
         WHERE product_id = $1",
    )
    .bind(product_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO daily_sales_summary (sale_date, total_orders, total_revenue, avg_order_value, updated_at) \
         VALUES ($1, 1, $2, $2, $3) \
         ON CONFLICT (sale_date) DO UPDATE SET \
            total_orders = daily_sales_summary.total_orders + 1, \
            total_revenue = daily_sales_summary.total_revenue + $2, \
            avg_order_value = (daily_sales_summary.total_revenue + $2) / (daily_sales_summary.total_orders + 1), \
            updated_at = $3",
    )
    .bind(order_date)
    .bind(total_price)
    .bind(timestamp)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

struct SnapshotRow {
    customer_name: String,
    product_id: String,
    quantity: i64,
    order_date: chrono::NaiveDate,
}

async fn load_snapshot(
    tx: &mut Transaction<'_, Postgres>,
    order_id: &str,
) -> Result<Option<SnapshotRow>, ProjectionError> {
    let row = sqlx::query_as::<_, (String, String, i64, chrono::NaiveDate)>(
        "SELECT customer_name, product_id, quantity, order_date FROM marketing_order_snapshot WHERE order_id = $1",
    )
    .bind(order_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(|(customer_name, product_id, quantity, order_date)| SnapshotRow {
        customer_name,
        product_id,
        quantity,
        order_date,
    }))
}

/// `OrderConfirmed` (§4.5). A confirm with no matching snapshot (arrived
/// out of order, or the `OrderCreated` was lost) is dropped silently — the
/// projector does not buffer and waits for no later retry.
async fn project_order_confirmed(pool: &PgPool, data: &serde_json::Value) -> Result<(), ProjectionError> {
    let order_id = field_str(data, "order_id")?;
    let timestamp = field_timestamp(data, "timestamp")?;

    let mut tx = pool.begin().await?;

    let Some(snapshot) = load_snapshot(&mut tx, order_id).await? else {
        return Ok(());
    };

    sqlx::query("UPDATE marketing_order_snapshot SET status = 'CONFIRMED', updated_at = $1 WHERE order_id = $2")
        .bind(timestamp)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE customer_summary SET confirmed_orders = confirmed_orders + 1, updated_at = $1 WHERE customer_name = $2")
        .bind(timestamp)
        .bind(&snapshot.customer_name)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "UPDATE product_popularity SET confirmed_units = confirmed_units + $1, \
            confirmed_order_count = confirmed_order_count + 1, updated_at = $2 WHERE product_id = $3",
    )
    .bind(snapshot.quantity)
    .bind(timestamp)
    .bind(&snapshot.product_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE daily_sales_summary SET confirmed_orders = confirmed_orders + 1, updated_at = $1 WHERE sale_date = $2")
        .bind(timestamp)
        .bind(snapshot.order_date)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// `OrderCancelled` (§4.5). Same out-of-order handling as `OrderConfirmed`.
async fn project_order_cancelled(pool: &PgPool, data: &serde_json::Value) -> Result<(), ProjectionError> {
    let order_id = field_str(data, "order_id")?;
    let timestamp = field_timestamp(data, "timestamp")?;

    let mut tx = pool.begin().await?;

    let Some(snapshot) = load_snapshot(&mut tx, order_id).await? else {
        return Ok(());
    };

    sqlx::query("UPDATE marketing_order_snapshot SET status = 'CANCELLED', updated_at = $1 WHERE order_id = $2")
        .bind(timestamp)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE customer_summary SET cancelled_orders = cancelled_orders + 1, updated_at = $1 WHERE customer_name = $2")
        .bind(timestamp)
        .bind(&snapshot.customer_name)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE daily_sales_summary SET cancelled_orders = cancelled_orders + 1, updated_at = $1 WHERE sale_date = $2")
        .bind(timestamp)
        .bind(snapshot.order_date)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_str_rejects_missing_key() {
        let data = serde_json::json!({});
        assert!(matches!(field_str(&data, "order_id"), Err(ProjectionError::Malformed(_))));
    }

    #[test]
    fn field_timestamp_rejects_non_rfc3339() {
        let data = serde_json::json!({"timestamp": "not-a-date"});
        assert!(matches!(field_timestamp(&data, "timestamp"), Err(ProjectionError::Malformed(_))));
    }
}
