//! Inventory commands: `ReserveInventory`, `ReleaseInventory` (§4.3).
//!
//! A product with no `product_reads` row yet is treated as `quantity = 0,
//! reserved = 0` (§7: "command's read step returns a business failure" for
//! a missing read target) rather than `NOT_FOUND` — an unseeded product
//! simply has no stock to reserve against.

use crate::domain::InventoryEvent;
use order_saga_core::event_bus::{event_envelope, EventBus};
use order_saga_core::Clock;
use sqlx::{PgPool, Row};
use thiserror::Error;

/// Errors an inventory command can report.
#[derive(Debug, Error)]
pub enum InventoryCommandError {
    /// Another writer already advanced this product's stream (`CONCURRENCY_CONFLICT`, §7).
    #[error("concurrency conflict on product '{0}'")]
    ConcurrencyConflict(String),

    /// A database call failed (`STORAGE_ERROR`, §7).
    #[error("database error: {0}")]
    Database(String),
}

/// Outcome of a reservation attempt (§4.3, §6: 200 vs. 409).
#[derive(Debug, Clone, PartialEq)]
pub enum ReservationOutcome {
    /// The reservation was recorded; `reserved` now includes `quantity`.
    Reserved,
    /// Rejected for insufficient stock (`BUSINESS_REJECT`).
    InsufficientStock {
        /// Units that were actually available.
        available: u32,
    },
}

fn db_err(e: sqlx::Error) -> InventoryCommandError {
    InventoryCommandError::Database(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

struct ProductRow {
    quantity: i64,
    reserved: i64,
    version: i64,
}

async fn load_for_update(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product_id: &str,
) -> Result<ProductRow, InventoryCommandError> {
    let row = sqlx::query(
        "SELECT quantity, reserved, version FROM product_reads WHERE product_id = $1 FOR UPDATE",
    )
    .bind(product_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(db_err)?;

    Ok(match row {
        Some(row) => ProductRow {
            quantity: row.try_get("quantity").map_err(db_err)?,
            reserved: row.try_get("reserved").map_err(db_err)?,
            version: row.try_get("version").map_err(db_err)?,
        },
        None => ProductRow {
            quantity: 0,
            reserved: 0,
            version: 0,
        },
    })
}

async fn append_event(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product_id: &str,
    event: &InventoryEvent,
    new_version: i64,
) -> Result<(), InventoryCommandError> {
    let payload = serde_json::to_value(event)
        .map_err(|e| InventoryCommandError::Database(e.to_string()))?;

    let insert = sqlx::query(
        r"
        INSERT INTO events (aggregate_id, aggregate_type, event_type, event_data, version)
        VALUES ($1, 'Inventory', $2, $3, $4)
        ",
    )
    .bind(product_id)
    .bind(event.event_type())
    .bind(&payload)
    .bind(new_version)
    .execute(&mut **tx)
    .await;

    match insert {
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => {
            Err(InventoryCommandError::ConcurrencyConflict(product_id.to_string()))
        }
        Err(e) => Err(db_err(e)),
    }
}

async fn upsert_read_model(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product_id: &str,
    quantity: i64,
    reserved: i64,
    new_version: i64,
) -> Result<(), InventoryCommandError> {
    sqlx::query(
        r"
        INSERT INTO product_reads (product_id, quantity, reserved, version)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (product_id)
        DO UPDATE SET reserved = EXCLUDED.reserved, version = EXCLUDED.version, updated_at = now()
        ",
    )
    .bind(product_id)
    .bind(quantity)
    .bind(reserved)
    .bind(new_version)
    .execute(&mut **tx)
    .await
    .map_err(db_err)?;
    Ok(())
}

async fn publish(bus: &dyn EventBus, event: &InventoryEvent) {
    let Ok(payload) = serde_json::to_value(event) else {
        tracing::error!("failed to serialize inventory event for publish");
        return;
    };
    let data = payload.get("data").cloned().unwrap_or(serde_json::Value::Null);
    let envelope = event_envelope(event.event_type(), data);
    if let Err(e) = bus.publish("inventory_events", envelope).await {
        tracing::warn!(error = %e, "failed to publish inventory event");
    }
}

/// Pure reservation arithmetic (§4.3, P3): given the stock currently on
/// record, decides whether `requested` units fit and what `reserved`
/// becomes. Split out from [`reserve_inventory`] so the invariant
/// (`reserved` never exceeds `quantity`, and only moves by exactly what was
/// granted or released) is directly property-testable without a database.
#[must_use]
fn resolve_reservation(quantity: i64, reserved: i64, requested: u32) -> (i64, ReservationOutcome) {
    let available = (quantity - reserved).max(0);
    if i64::from(requested) > available {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let available = available as u32;
        (reserved, ReservationOutcome::InsufficientStock { available })
    } else {
        (reserved + i64::from(requested), ReservationOutcome::Reserved)
    }
}

/// Pure release arithmetic (§4.3, P3): `reserved` never drops below zero
/// even if `requested` exceeds what's currently held.
#[must_use]
fn resolve_release(reserved: i64, requested: u32) -> i64 {
    (reserved - i64::from(requested)).max(0)
}

/// Attempts to reserve `quantity` units of `product_id` against `order_id` (§4.3).
///
/// Reads `quantity`/`reserved` under `SELECT ... FOR UPDATE`, the
/// serialization point that makes two concurrent reservers for the same
/// product resolve to exactly one winner (race discipline, §4.3).
///
/// # Errors
///
/// Returns [`InventoryCommandError::ConcurrencyConflict`] if another writer
/// raced this append, or [`InventoryCommandError::Database`] on storage
/// failure. Insufficient stock is **not** an error — see
/// [`ReservationOutcome::InsufficientStock`].
pub async fn reserve_inventory(
    pool: &PgPool,
    bus: &dyn EventBus,
    clock: &dyn Clock,
    product_id: &str,
    order_id: &str,
    quantity: u32,
) -> Result<ReservationOutcome, InventoryCommandError> {
    let mut tx = pool.begin().await.map_err(db_err)?;
    let product = load_for_update(&mut tx, product_id).await?;
    let new_version = product.version + 1;
    let (new_reserved, outcome) = resolve_reservation(product.quantity, product.reserved, quantity);

    let event = match outcome {
        ReservationOutcome::InsufficientStock { available } => InventoryEvent::InventoryReservationFailed {
            product_id: product_id.to_string(),
            order_id: order_id.to_string(),
            quantity_requested: quantity,
            quantity_available: available,
            timestamp: clock.now(),
        },
        ReservationOutcome::Reserved => InventoryEvent::InventoryReserved {
            product_id: product_id.to_string(),
            order_id: order_id.to_string(),
            quantity,
            timestamp: clock.now(),
        },
    };
    append_event(&mut tx, product_id, &event, new_version).await?;
    upsert_read_model(&mut tx, product_id, product.quantity, new_reserved, new_version).await?;
    tx.commit().await.map_err(db_err)?;
    publish(bus, &event).await;

    Ok(outcome)
}

/// Releases a prior reservation (§4.3 `ReleaseInventory`), e.g. as saga
/// compensation. No validation that a matching reservation exists —
/// compensations are trusted to be honest.
///
/// # Errors
///
/// Returns [`InventoryCommandError::ConcurrencyConflict`] if another writer
/// raced this append, or [`InventoryCommandError::Database`] on storage
/// failure.
pub async fn release_inventory(
    pool: &PgPool,
    bus: &dyn EventBus,
    clock: &dyn Clock,
    product_id: &str,
    order_id: &str,
    quantity: u32,
) -> Result<(), InventoryCommandError> {
    let mut tx = pool.begin().await.map_err(db_err)?;
    let product = load_for_update(&mut tx, product_id).await?;
    let new_version = product.version + 1;
    let new_reserved = resolve_release(product.reserved, quantity);

    let event = InventoryEvent::InventoryReleased {
        product_id: product_id.to_string(),
        order_id: order_id.to_string(),
        quantity,
        timestamp: clock.now(),
    };
    append_event(&mut tx, product_id, &event, new_version).await?;
    upsert_read_model(&mut tx, product_id, product.quantity, new_reserved, new_version).await?;
    tx.commit().await.map_err(db_err)?;
    publish(bus, &event).await;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn insufficient_stock_is_not_an_error_variant() {
        let outcome = ReservationOutcome::InsufficientStock { available: 2 };
        assert_eq!(outcome, ReservationOutcome::InsufficientStock { available: 2 });
        assert_ne!(outcome, ReservationOutcome::Reserved);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Reserve(u32),
        Release(u32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u32..20).prop_map(Op::Reserve),
            (0u32..20).prop_map(Op::Release),
        ]
    }

    proptest! {
        /// P3: across any interleaving of reserve/release, `reserved` stays
        /// within `[0, quantity]` and always equals the sum of granted
        /// reservations minus the sum of releases.
        #[test]
        fn reserved_tracks_grants_minus_releases_and_never_exceeds_quantity(
            quantity in 0i64..1_000,
            ops in prop::collection::vec(op_strategy(), 0..50),
        ) {
            let mut reserved = 0i64;
            let mut granted_total = 0i64;
            let mut released_total = 0i64;

            for op in ops {
                match op {
                    Op::Reserve(requested) => {
                        let (new_reserved, outcome) = resolve_reservation(quantity, reserved, requested);
                        if matches!(outcome, ReservationOutcome::Reserved) {
                            granted_total += i64::from(requested);
                        }
                        reserved = new_reserved;
                    }
                    Op::Release(requested) => {
                        let before = reserved;
                        reserved = resolve_release(reserved, requested);
                        released_total += before - reserved;
                    }
                }

                prop_assert!(reserved >= 0);
                prop_assert!(reserved <= quantity);
            }

            prop_assert_eq!(reserved, granted_total - released_total);
        }
    }
}
