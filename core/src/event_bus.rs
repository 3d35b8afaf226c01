//! The message bus abstraction (§4.6): at-most-once, no-redelivery pub/sub.
//!
//! Every authority publishes its own events here after committing them to
//! its event store (§4.2, §4.3); the saga orchestrator publishes terminal
//! saga events; the marketing projector is the bus's only subscriber.

use futures::Stream;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors an [`EventBus`] implementation can report.
#[derive(Error, Debug, Clone)]
pub enum EventBusError {
    /// Publishing to `topic` failed.
    #[error("publish failed for topic '{topic}': {reason}")]
    PublishFailed {
        /// The topic that failed.
        topic: String,
        /// Why it failed.
        reason: String,
    },

    /// Subscribing to `topics` failed.
    #[error("subscription failed for topics {topics:?}: {reason}")]
    SubscriptionFailed {
        /// The topics that failed to subscribe.
        topics: Vec<String>,
        /// Why it failed.
        reason: String,
    },

    /// A received message was not valid JSON, or lacked `event_type`/`data`
    /// (`MALFORMED_EVENT`, §7). Callers log and drop; the subscription
    /// itself keeps running.
    #[error("malformed event: {0}")]
    MalformedEvent(String),
}

/// A stream of messages from a subscription.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<serde_json::Value, EventBusError>> + Send>>;

/// Trait for message bus implementations.
///
/// # Delivery semantics
///
/// Unlike this codebase's other lineage (which documents at-least-once,
/// consumer-group delivery for its Kafka-backed bus), implementations of
/// this trait used in this workspace honor §4.6's contract exactly:
/// **at-most-once**, no durability, no redelivery, and no ordering guarantee
/// across publishers. A message published while nobody is subscribed is
/// simply lost.
///
/// # Dyn compatibility
///
/// Uses `Pin<Box<dyn Future>>` returns instead of `async fn` so
/// implementations can live behind `Arc<dyn EventBus>`.
pub trait EventBus: Send + Sync {
    /// Publishes one JSON message to `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError::PublishFailed`] if the publish cannot be
    /// accepted (e.g. the topic's internal channel is gone).
    fn publish(
        &self,
        topic: &str,
        message: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = Result<(), EventBusError>> + Send + '_>>;

    /// Subscribes to `topics`, returning a stream of messages published to
    /// any of them from this point forward.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError::SubscriptionFailed`] if subscription fails.
    fn subscribe(
        &self,
        topics: &[&str],
    ) -> Pin<Box<dyn Future<Output = Result<EventStream, EventBusError>> + Send + '_>>;
}

/// Convenience constructor for the `{"event_type": ..., "data": ...}`
/// envelope every authority publishes (§6).
#[must_use]
pub fn event_envelope(event_type: &str, data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "event_type": event_type,
        "data": data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_failed_display() {
        let err = EventBusError::PublishFailed {
            topic: "order_events".to_string(),
            reason: "channel closed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "publish failed for topic 'order_events': channel closed"
        );
    }

    #[test]
    fn envelope_shape() {
        let env = event_envelope("OrderCreated", serde_json::json!({"order_id": "o-1"}));
        assert_eq!(env["event_type"], "OrderCreated");
        assert_eq!(env["data"]["order_id"], "o-1");
    }
}
