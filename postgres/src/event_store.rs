//! `PostgreSQL`-backed [`EventStore`].
//!
//! Grounded on this workspace's dead-letter-queue query style (manual
//! `sqlx::Row` mapping, `DatabaseError(e.to_string())` on failure): see
//! `postgres/src/dead_letter_queue.rs`. One pool, one table, one aggregate
//! type per process (§3, §4.1) — `order-service` and `inventory-service`
//! each run this migration against their own database.

use chrono::{DateTime, Utc};
use order_saga_core::event_store::{AggregateType, EventStore, EventStoreError, StoredEvent};
use order_saga_core::stream::{StreamId, Version};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;

fn db_err(e: sqlx::Error) -> EventStoreError {
    EventStoreError::DatabaseError(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// `PostgreSQL` event store: one row per event, one table per process.
///
/// Appends run inside a `SELECT ... FOR UPDATE` transaction so a concurrent
/// writer for the same stream blocks rather than racing; the table's
/// `UNIQUE (aggregate_id, version)` constraint is the backstop for the
/// window between a stream's first row not existing yet (nothing to lock)
/// and the insert landing (I1).
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Connects a new pool against `database_url` and runs pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::DatabaseError`] if the connection or
    /// migration fails.
    pub async fn connect(database_url: &str) -> Result<Self, EventStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(db_err)?;
        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            EventStoreError::DatabaseError(e.to_string())
        })?;
        Ok(Self { pool })
    }

    /// Wraps an already-connected, already-migrated pool.
    #[must_use]
    pub const fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Borrows the underlying pool.
    ///
    /// Command handlers that need to combine an event append with a
    /// read-model write in one transaction (§4.2) go through this directly
    /// rather than through the `EventStore` trait, which only exposes
    /// single-event appends.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_stored_event(row: &sqlx::postgres::PgRow) -> Result<StoredEvent, EventStoreError> {
        let aggregate_id: String = row.try_get("aggregate_id").map_err(db_err)?;
        let aggregate_type: String = row.try_get("aggregate_type").map_err(db_err)?;
        let event_type: String = row.try_get("event_type").map_err(db_err)?;
        let payload: serde_json::Value = row.try_get("event_data").map_err(db_err)?;
        let version: i64 = row.try_get("version").map_err(db_err)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(db_err)?;

        #[allow(clippy::cast_sign_loss)]
        Ok(StoredEvent {
            aggregate_id: StreamId::new(aggregate_id),
            aggregate_type: parse_aggregate_type(&aggregate_type)?,
            event_type,
            payload,
            version: Version::new(version as u64),
            created_at,
        })
    }
}

fn parse_aggregate_type(s: &str) -> Result<AggregateType, EventStoreError> {
    match s {
        "Order" => Ok(AggregateType::Order),
        "Inventory" => Ok(AggregateType::Inventory),
        other => Err(EventStoreError::DatabaseError(format!(
            "unknown aggregate_type '{other}' in events table"
        ))),
    }
}

impl EventStore for PostgresEventStore {
    fn append_event(
        &self,
        aggregate_id: StreamId,
        aggregate_type: AggregateType,
        event_type: String,
        payload: serde_json::Value,
        expected_version: Version,
    ) -> Pin<Box<dyn Future<Output = Result<Version, EventStoreError>> + Send + '_>> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await.map_err(db_err)?;

            #[allow(clippy::cast_sign_loss)]
            let current: i64 = sqlx::query_scalar(
                "SELECT COALESCE(MAX(version), 0) FROM events WHERE aggregate_id = $1 FOR UPDATE",
            )
            .bind(aggregate_id.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;
            let current_version = Version::new(current as u64);

            if current_version != expected_version {
                return Err(EventStoreError::ConcurrencyConflict {
                    stream_id: aggregate_id,
                    expected: expected_version,
                    actual: current_version,
                });
            }

            let new_version = expected_version.next();
            #[allow(clippy::cast_possible_wrap)]
            let insert = sqlx::query(
                r"
                INSERT INTO events (aggregate_id, aggregate_type, event_type, event_data, version)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(aggregate_id.as_str())
            .bind(aggregate_type.to_string())
            .bind(&event_type)
            .bind(&payload)
            .bind(new_version.value() as i64)
            .execute(&mut *tx)
            .await;

            match insert {
                Ok(_) => {
                    tx.commit().await.map_err(db_err)?;
                    Ok(new_version)
                }
                Err(e) if is_unique_violation(&e) => {
                    drop(tx);
                    #[allow(clippy::cast_sign_loss)]
                    let actual: i64 = sqlx::query_scalar(
                        "SELECT COALESCE(MAX(version), 0) FROM events WHERE aggregate_id = $1",
                    )
                    .bind(aggregate_id.as_str())
                    .fetch_one(&self.pool)
                    .await
                    .map_err(db_err)?;
                    Err(EventStoreError::ConcurrencyConflict {
                        stream_id: aggregate_id,
                        expected: expected_version,
                        actual: Version::new(actual as u64),
                    })
                }
                Err(e) => Err(db_err(e)),
            }
        })
    }

    fn load_events(
        &self,
        aggregate_id: &StreamId,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StoredEvent>, EventStoreError>> + Send + '_>> {
        let aggregate_id = aggregate_id.clone();
        Box::pin(async move {
            let rows = sqlx::query(
                r"
                SELECT aggregate_id, aggregate_type, event_type, event_data, version, created_at
                FROM events
                WHERE aggregate_id = $1
                ORDER BY version ASC
                ",
            )
            .bind(aggregate_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

            rows.iter().map(Self::row_to_stored_event).collect()
        })
    }

    fn load_all(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StoredEvent>, EventStoreError>> + Send + '_>> {
        Box::pin(async move {
            let rows = sqlx::query(
                r"
                SELECT aggregate_id, aggregate_type, event_type, event_data, version, created_at
                FROM events
                ORDER BY created_at ASC, version ASC
                ",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

            rows.iter().map(Self::row_to_stored_event).collect()
        })
    }
}

impl FromStr for AggregateType {
    type Err = EventStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_aggregate_type(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_aggregate_types() {
        assert_eq!(parse_aggregate_type("Order").unwrap(), AggregateType::Order);
        assert_eq!(
            parse_aggregate_type("Inventory").unwrap(),
            AggregateType::Inventory
        );
        assert!(parse_aggregate_type("Bogus").is_err());
    }
}
