//! The event store abstraction: append-only, optimistically-concurrent, per-stream.
//!
//! One [`EventStore`] instance backs exactly one authority (Order or
//! Inventory); each authority's table is private to it (§3: "each authority
//! exclusively owns its event store").

use crate::stream::{StreamId, Version};
use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Discriminates which aggregate kind a stream belongs to.
///
/// Stored alongside each event record so `load_all` (used for auditing across
/// aggregates) can tell them apart without guessing from `event_type` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum AggregateType {
    /// An order stream (keyed by order id).
    Order,
    /// A product inventory stream (keyed by product id).
    Inventory,
}

impl fmt::Display for AggregateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Order => write!(f, "Order"),
            Self::Inventory => write!(f, "Inventory"),
        }
    }
}

/// One persisted event record (§3).
///
/// `payload` is the event's JSON body; its shape is determined by
/// `event_type` and is opaque to the store itself.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoredEvent {
    /// The stream this event belongs to.
    pub aggregate_id: StreamId,
    /// The aggregate kind.
    pub aggregate_type: AggregateType,
    /// The event's type discriminator (e.g. `"OrderCreated"`).
    pub event_type: String,
    /// The event's JSON payload.
    pub payload: serde_json::Value,
    /// The event's version within its stream (starts at 1).
    pub version: Version,
    /// When the store committed this event.
    pub created_at: DateTime<Utc>,
}

/// Errors an [`EventStore`] implementation can report.
#[derive(Debug, Error, Clone)]
pub enum EventStoreError {
    /// Another writer already produced `actual` at the attempted version (I1).
    #[error("concurrency conflict on stream '{stream_id}': expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The stream that was contended.
        stream_id: StreamId,
        /// The version the caller expected to extend.
        expected: Version,
        /// The version actually present.
        actual: Version,
    },

    /// The requested stream has no events.
    #[error("stream '{0}' not found")]
    StreamNotFound(StreamId),

    /// A transport/IO failure talking to the backing store (`STORAGE_ERROR`).
    #[error("database error: {0}")]
    DatabaseError(String),

    /// The payload could not be encoded or decoded as JSON.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Trait for event store implementations.
///
/// Uses `Pin<Box<dyn Future>>` returns rather than `async fn` so that
/// implementations can be stored behind `Arc<dyn EventStore>` (dyn
/// compatibility); a trait with `async fn` cannot be made into a trait
/// object.
pub trait EventStore: Send + Sync {
    /// Appends one event to `aggregate_id`'s stream at `expected_version + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::ConcurrencyConflict`] if another writer has
    /// already produced `expected_version + 1` (I1), or
    /// [`EventStoreError::DatabaseError`] on storage failure.
    fn append_event(
        &self,
        aggregate_id: StreamId,
        aggregate_type: AggregateType,
        event_type: String,
        payload: serde_json::Value,
        expected_version: Version,
    ) -> Pin<Box<dyn Future<Output = Result<Version, EventStoreError>> + Send + '_>>;

    /// Loads every event for `aggregate_id`, ordered ascending by version.
    ///
    /// Returns an empty vector if the stream does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::DatabaseError`] on storage failure.
    fn load_events(
        &self,
        aggregate_id: &StreamId,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StoredEvent>, EventStoreError>> + Send + '_>>;

    /// Loads every event across every stream, ordered ascending by
    /// `(created_at, version)`. For auditing only — never used to
    /// reconstruct a single aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::DatabaseError`] on storage failure.
    fn load_all(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StoredEvent>, EventStoreError>> + Send + '_>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrency_conflict_display() {
        let err = EventStoreError::ConcurrencyConflict {
            stream_id: StreamId::new("order-1"),
            expected: Version::new(2),
            actual: Version::new(3),
        };
        assert_eq!(
            err.to_string(),
            "concurrency conflict on stream 'order-1': expected version 2, found 3"
        );
    }

    #[test]
    fn stream_not_found_display() {
        let err = EventStoreError::StreamNotFound(StreamId::new("order-9"));
        assert_eq!(err.to_string(), "stream 'order-9' not found");
    }

    #[test]
    fn aggregate_type_display() {
        assert_eq!(AggregateType::Order.to_string(), "Order");
        assert_eq!(AggregateType::Inventory.to_string(), "Inventory");
    }
}
