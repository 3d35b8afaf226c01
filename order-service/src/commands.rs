//! Order commands: `CreateOrder`, `ConfirmOrder`, `CancelOrder` (§4.2).
//!
//! Each command appends its event and upserts `order_reads` in one
//! transaction (§4.2: "the event append and the read model update occur in
//! a single transactional commit"), then publishes to `order_events` after
//! the commit — the publish-after-commit dual-write the spec accepts (§9).

use crate::domain::{Order, OrderEvent, OrderStatus};
use chrono::{DateTime, Utc};
use order_saga_core::event_bus::{event_envelope, EventBus};
use order_saga_core::stream::Version;
use order_saga_core::Clock;
use sqlx::{PgPool, Row};
use thiserror::Error;

/// Errors a command can report.
#[derive(Debug, Error)]
pub enum OrderCommandError {
    /// No order exists with the given id (`NOT_FOUND`, §7).
    #[error("order '{0}' not found")]
    NotFound(String),

    /// Another writer already advanced this order's stream (`CONCURRENCY_CONFLICT`, §7).
    #[error("concurrency conflict on order '{0}'")]
    ConcurrencyConflict(String),

    /// A database call failed (`STORAGE_ERROR`, §7).
    #[error("database error: {0}")]
    Database(String),
}

fn db_err(e: sqlx::Error) -> OrderCommandError {
    OrderCommandError::Database(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

async fn load_order(pool: &PgPool, order_id: &str) -> Result<Order, OrderCommandError> {
    let rows = sqlx::query(
        r"
        SELECT event_type, event_data, version
        FROM events
        WHERE aggregate_id = $1
        ORDER BY version ASC
        ",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    let events: Vec<(OrderEvent, Version)> = rows
        .iter()
        .map(|row| -> Result<(OrderEvent, Version), OrderCommandError> {
            let payload: serde_json::Value = row.try_get("event_data").map_err(db_err)?;
            let event: OrderEvent =
                serde_json::from_value(payload).map_err(|e| OrderCommandError::Database(e.to_string()))?;
            #[allow(clippy::cast_sign_loss)]
            let version: i64 = row.try_get("version").map_err(db_err)?;
            Ok((event, Version::new(version as u64)))
        })
        .collect::<Result<_, _>>()?;

    Order::fold(&events).ok_or_else(|| OrderCommandError::NotFound(order_id.to_string()))
}

async fn append_and_upsert(
    pool: &PgPool,
    order_id: &str,
    event: &OrderEvent,
    expected_version: Version,
    read_model: ReadModelWrite<'_>,
) -> Result<Version, OrderCommandError> {
    let mut tx = pool.begin().await.map_err(db_err)?;

    #[allow(clippy::cast_sign_loss)]
    let current: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(version), 0) FROM events WHERE aggregate_id = $1 FOR UPDATE",
    )
    .bind(order_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(db_err)?;
    let current_version = Version::new(current as u64);

    if current_version != expected_version {
        return Err(OrderCommandError::ConcurrencyConflict(order_id.to_string()));
    }

    let new_version = expected_version.next();
    let payload = serde_json::to_value(event).map_err(|e| OrderCommandError::Database(e.to_string()))?;

    #[allow(clippy::cast_possible_wrap)]
    let insert = sqlx::query(
        r"
        INSERT INTO events (aggregate_id, aggregate_type, event_type, event_data, version)
        VALUES ($1, 'Order', $2, $3, $4)
        ",
    )
    .bind(order_id)
    .bind(event.event_type())
    .bind(&payload)
    .bind(new_version.value() as i64)
    .execute(&mut *tx)
    .await;

    if let Err(e) = insert {
        if is_unique_violation(&e) {
            return Err(OrderCommandError::ConcurrencyConflict(order_id.to_string()));
        }
        return Err(db_err(e));
    }

    match read_model {
        ReadModelWrite::Insert {
            customer_name,
            product_id,
            product_name,
            quantity,
            total_price,
        } => {
            sqlx::query(
                r"
                INSERT INTO order_reads
                    (order_id, customer_name, product_id, product_name, quantity, total_price, status, version)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ",
            )
            .bind(order_id)
            .bind(customer_name)
            .bind(product_id)
            .bind(product_name)
            .bind(i64::from(quantity))
            .bind(total_price)
            .bind(OrderStatus::Pending.to_string())
            .bind(new_version.value() as i64)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        ReadModelWrite::UpdateStatus(status) => {
            sqlx::query(
                "UPDATE order_reads SET status = $1, version = $2, updated_at = now() WHERE order_id = $3",
            )
            .bind(status.to_string())
            .bind(new_version.value() as i64)
            .bind(order_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
    }

    tx.commit().await.map_err(db_err)?;
    Ok(new_version)
}

enum ReadModelWrite<'a> {
    Insert {
        customer_name: &'a str,
        product_id: &'a str,
        product_name: &'a str,
        quantity: u32,
        total_price: f64,
    },
    UpdateStatus(OrderStatus),
}

/// Creates a new order (§4.2 `CreateOrder`).
///
/// # Errors
///
/// Returns [`OrderCommandError::ConcurrencyConflict`] if `order_id` already
/// has events (should not happen with a fresh id), or
/// [`OrderCommandError::Database`] on storage failure.
#[allow(clippy::too_many_arguments)]
pub async fn create_order(
    pool: &PgPool,
    bus: &dyn EventBus,
    clock: &dyn Clock,
    order_id: &str,
    customer_name: &str,
    product_id: &str,
    product_name: &str,
    quantity: u32,
    total_price: f64,
) -> Result<Order, OrderCommandError> {
    let timestamp: DateTime<Utc> = clock.now();
    let event = OrderEvent::OrderCreated {
        order_id: order_id.to_string(),
        customer_name: customer_name.to_string(),
        product_id: product_id.to_string(),
        product_name: product_name.to_string(),
        quantity,
        total_price,
        timestamp,
    };

    let version = append_and_upsert(
        pool,
        order_id,
        &event,
        Version::INITIAL,
        ReadModelWrite::Insert {
            customer_name,
            product_id,
            product_name,
            quantity,
            total_price,
        },
    )
    .await?;

    publish(bus, &event).await;

    Ok(Order {
        id: order_id.to_string(),
        customer_name: customer_name.to_string(),
        product_id: product_id.to_string(),
        product_name: product_name.to_string(),
        quantity,
        total_price,
        status: OrderStatus::Pending,
        version,
    })
}

/// Confirms an order after a successful inventory reservation (§4.2 `ConfirmOrder`).
///
/// No idempotency guard: the caller (the saga orchestrator) is trusted to
/// invoke this exactly once per order (§4.2).
///
/// # Errors
///
/// Returns [`OrderCommandError::NotFound`] if the order doesn't exist, or
/// [`OrderCommandError::ConcurrencyConflict`]/[`OrderCommandError::Database`]
/// on write failure.
pub async fn confirm_order(
    pool: &PgPool,
    bus: &dyn EventBus,
    clock: &dyn Clock,
    order_id: &str,
) -> Result<Order, OrderCommandError> {
    let current = load_order(pool, order_id).await?;
    let event = OrderEvent::OrderConfirmed {
        order_id: order_id.to_string(),
        timestamp: clock.now(),
    };

    let version = append_and_upsert(
        pool,
        order_id,
        &event,
        current.version,
        ReadModelWrite::UpdateStatus(OrderStatus::Confirmed),
    )
    .await?;

    publish(bus, &event).await;

    Ok(Order {
        status: OrderStatus::Confirmed,
        version,
        ..current
    })
}

/// Cancels an order, forward or as saga compensation (§4.2 `CancelOrder`).
///
/// # Errors
///
/// Returns [`OrderCommandError::NotFound`] if the order doesn't exist, or
/// [`OrderCommandError::ConcurrencyConflict`]/[`OrderCommandError::Database`]
/// on write failure.
pub async fn cancel_order(
    pool: &PgPool,
    bus: &dyn EventBus,
    clock: &dyn Clock,
    order_id: &str,
    reason: &str,
) -> Result<Order, OrderCommandError> {
    let current = load_order(pool, order_id).await?;
    let event = OrderEvent::OrderCancelled {
        order_id: order_id.to_string(),
        reason: reason.to_string(),
        timestamp: clock.now(),
    };

    let version = append_and_upsert(
        pool,
        order_id,
        &event,
        current.version,
        ReadModelWrite::UpdateStatus(OrderStatus::Cancelled),
    )
    .await?;

    publish(bus, &event).await;

    Ok(Order {
        status: OrderStatus::Cancelled,
        version,
        ..current
    })
}

async fn publish(bus: &dyn EventBus, event: &OrderEvent) {
    let Ok(payload) = serde_json::to_value(event) else {
        tracing::error!("failed to serialize order event for publish");
        return;
    };
    // `data` is already the event's own payload; re-wrap under the
    // `{event_type, data}` envelope §4.6/§6 require.
    let data = payload
        .get("data")
        .cloned()
        .unwrap_or(serde_json::Value::Null);
    let envelope = event_envelope(event.event_type(), data);
    if let Err(e) = bus.publish("order_events", envelope).await {
        tracing::warn!(error = %e, "failed to publish order event");
    }
}
