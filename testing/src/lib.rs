//! In-memory [`EventStore`] and [`EventBus`] implementations for tests, plus
//! a [`FixedClock`] for deterministic timestamps.
//!
//! These are the test-time stand-ins for `order-saga-postgres`'s
//! `PostgresEventStore` and the production `InMemoryEventBus` every binary
//! wires up by default (§4.6 — the bus contract is in-memory-shaped even in
//! production here, so this crate's bus doubles as the real one; see
//! `order-saga-postgres` for the real store).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use order_saga_core::event_bus::{EventBus, EventBusError, EventStream};
use order_saga_core::event_store::{AggregateType, EventStore, EventStoreError, StoredEvent};
use order_saga_core::stream::{StreamId, Version};
use order_saga_core::Clock;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;

/// A clock that always returns the same instant.
///
/// Makes event timestamps deterministic in tests that assert on exact
/// `created_at`/`timestamp` values.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Creates a fixed clock reporting `time`.
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self(time)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A default fixed clock (2025-01-01T00:00:00Z) for tests that don't care
/// about the exact value.
///
/// # Panics
///
/// Panics if the hardcoded timestamp fails to parse, which cannot happen.
#[must_use]
pub fn test_clock() -> FixedClock {
    FixedClock::new(
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp always parses")
            .with_timezone(&Utc),
    )
}

/// In-memory [`EventStore`]: one `Vec<StoredEvent>` per stream, guarded by a
/// mutex. Good enough to exercise optimistic concurrency in unit tests
/// without a database.
#[derive(Default)]
pub struct InMemoryEventStore {
    streams: Mutex<HashMap<StreamId, Vec<StoredEvent>>>,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventStore for InMemoryEventStore {
    fn append_event(
        &self,
        aggregate_id: StreamId,
        aggregate_type: AggregateType,
        event_type: String,
        payload: serde_json::Value,
        expected_version: Version,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Version, EventStoreError>> + Send + '_>>
    {
        Box::pin(async move {
            let mut streams = self
                .streams
                .lock()
                .map_err(|e| EventStoreError::DatabaseError(e.to_string()))?;
            let events = streams.entry(aggregate_id.clone()).or_default();
            #[allow(clippy::cast_possible_truncation)]
            let current_version = Version::new(events.len() as u64);

            if current_version != expected_version {
                return Err(EventStoreError::ConcurrencyConflict {
                    stream_id: aggregate_id,
                    expected: expected_version,
                    actual: current_version,
                });
            }

            let new_version = expected_version.next();
            events.push(StoredEvent {
                aggregate_id,
                aggregate_type,
                event_type,
                payload,
                version: new_version,
                created_at: Utc::now(),
            });
            Ok(new_version)
        })
    }

    fn load_events(
        &self,
        aggregate_id: &StreamId,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<StoredEvent>, EventStoreError>> + Send + '_>>
    {
        let aggregate_id = aggregate_id.clone();
        Box::pin(async move {
            let streams = self
                .streams
                .lock()
                .map_err(|e| EventStoreError::DatabaseError(e.to_string()))?;
            Ok(streams.get(&aggregate_id).cloned().unwrap_or_default())
        })
    }

    fn load_all(
        &self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<StoredEvent>, EventStoreError>> + Send + '_>>
    {
        Box::pin(async move {
            let streams = self
                .streams
                .lock()
                .map_err(|e| EventStoreError::DatabaseError(e.to_string()))?;
            let mut all: Vec<StoredEvent> = streams.values().flatten().cloned().collect();
            all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.version.cmp(&b.version)));
            Ok(all)
        })
    }
}

/// In-memory [`EventBus`]: one `tokio::sync::broadcast` channel per topic.
///
/// Matches §4.6 exactly: at-most-once (a message published with no
/// subscribers listening on that topic is simply dropped by `broadcast`),
/// no durability, no replay. Topics are created lazily on first publish or
/// subscribe.
pub struct InMemoryEventBus {
    topics: Mutex<HashMap<String, broadcast::Sender<serde_json::Value>>>,
}

impl InMemoryEventBus {
    /// Creates a bus with no topics yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
        }
    }

    fn sender_for(&self, topic: &str) -> broadcast::Sender<serde_json::Value> {
        #[allow(clippy::unwrap_used)]
        let mut topics = self.topics.lock().unwrap();
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(1024).0)
            .clone()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for InMemoryEventBus {
    fn publish(
        &self,
        topic: &str,
        message: serde_json::Value,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), EventBusError>> + Send + '_>> {
        let sender = self.sender_for(topic);
        Box::pin(async move {
            // `send` errors only when there are zero receivers; per the
            // at-most-once contract that's a silent drop, not a failure.
            let _ = sender.send(message);
            Ok(())
        })
    }

    fn subscribe(
        &self,
        topics: &[&str],
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<EventStream, EventBusError>> + Send + '_>>
    {
        let receivers: Vec<_> = topics.iter().map(|t| self.sender_for(t).subscribe()).collect();
        Box::pin(async move {
            let streams = receivers.into_iter().map(|rx| {
                tokio_stream_from_receiver(rx)
            });
            let merged = stream::select_all(streams);
            Ok(Box::pin(merged) as EventStream)
        })
    }
}

fn tokio_stream_from_receiver(
    mut rx: broadcast::Receiver<serde_json::Value>,
) -> std::pin::Pin<Box<dyn futures::Stream<Item = Result<serde_json::Value, EventBusError>> + Send>> {
    Box::pin(async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(message) => yield Ok(message),
                Err(broadcast::error::RecvError::Closed) => break,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fixed_clock_is_stable() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
    }

    #[tokio::test]
    async fn append_and_load_roundtrip() {
        let store = InMemoryEventStore::new();
        let stream_id = StreamId::new("order-1");
        let v1 = store
            .append_event(
                stream_id.clone(),
                AggregateType::Order,
                "OrderCreated".to_string(),
                serde_json::json!({"order_id": "order-1"}),
                Version::INITIAL,
            )
            .await
            .expect("first append succeeds");
        assert_eq!(v1.value(), 1);

        let events = store.load_events(&stream_id).await.expect("load succeeds");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].version.value(), 1);
    }

    #[tokio::test]
    async fn append_rejects_stale_expected_version() {
        let store = InMemoryEventStore::new();
        let stream_id = StreamId::new("order-1");
        store
            .append_event(
                stream_id.clone(),
                AggregateType::Order,
                "OrderCreated".to_string(),
                serde_json::json!({}),
                Version::INITIAL,
            )
            .await
            .expect("first append succeeds");

        let conflict = store
            .append_event(
                stream_id.clone(),
                AggregateType::Order,
                "OrderConfirmed".to_string(),
                serde_json::json!({}),
                Version::INITIAL,
            )
            .await
            .expect_err("second writer at stale version must conflict");

        assert!(matches!(
            conflict,
            EventStoreError::ConcurrencyConflict { .. }
        ));
    }

    #[tokio::test]
    async fn bus_delivers_to_subscriber() {
        use futures::StreamExt;

        let bus = InMemoryEventBus::new();
        let mut stream = bus.subscribe(&["order_events"]).await.expect("subscribe succeeds");

        bus.publish("order_events", serde_json::json!({"event_type": "OrderCreated"}))
            .await
            .expect("publish succeeds");

        let received = stream.next().await.expect("message arrives").expect("not an error");
        assert_eq!(received["event_type"], "OrderCreated");
    }

    #[tokio::test]
    async fn bus_drops_messages_with_no_subscriber() {
        let bus = InMemoryEventBus::new();
        // Nobody subscribed to "order_events" yet; publish must not error.
        bus.publish("order_events", serde_json::json!({"event_type": "OrderCreated"}))
            .await
            .expect("publish with no subscribers is a no-op, not an error");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// P1: for any sequence of sequential, correctly-versioned appends to
        /// one stream, the loaded versions form 1..N with no gaps.
        #[test]
        fn sequential_appends_yield_gapless_versions(event_count in 1usize..30) {
            let versions: Vec<u64> = tokio_test::block_on(async {
                let store = InMemoryEventStore::new();
                let stream_id = StreamId::new("stream-under-test");
                let mut expected = Version::INITIAL;

                for i in 0..event_count {
                    let version = store
                        .append_event(
                            stream_id.clone(),
                            AggregateType::Order,
                            "OrderCreated".to_string(),
                            serde_json::json!({"i": i}),
                            expected,
                        )
                        .await
                        .expect("append at the correct expected_version always succeeds");
                    expected = version;
                }

                let events = store.load_events(&stream_id).await.expect("load succeeds");
                events.iter().map(|e| e.version.value()).collect()
            });

            #[allow(clippy::cast_possible_truncation)]
            let want: Vec<u64> = (1..=event_count as u64).collect();
            prop_assert_eq!(versions, want);
        }
    }
}
