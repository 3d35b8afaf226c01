//! Inventory events (§3, §4.1).
//!
//! Unlike the order authority, inventory commands never fold a full event
//! history to decide what to do — §4.3 step 1 reads `quantity`/`reserved`
//! directly off the `product_reads` row, which commands keep in lockstep
//! with the event stream in the same transaction as every append. The
//! event stream here exists for audit (`GET /events`) and for the bus, not
//! for reconstruction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the three events a product's inventory stream can contain (§4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "data")]
pub enum InventoryEvent {
    /// A reservation succeeded; `reserved` increased by `quantity`.
    InventoryReserved {
        /// The product reserved against.
        product_id: String,
        /// The order the reservation is held for.
        order_id: String,
        /// Units reserved.
        quantity: u32,
        /// When the reservation was recorded.
        timestamp: DateTime<Utc>,
    },
    /// A reservation was rejected for insufficient stock; no state change.
    InventoryReservationFailed {
        /// The product that was short on stock.
        product_id: String,
        /// The order whose reservation failed.
        order_id: String,
        /// Units requested.
        quantity_requested: u32,
        /// Units available at the time of the attempt.
        quantity_available: u32,
        /// When the failure was recorded.
        timestamp: DateTime<Utc>,
    },
    /// A prior reservation was released; `reserved` decreased by `quantity`.
    InventoryReleased {
        /// The product released.
        product_id: String,
        /// The order the reservation was held for.
        order_id: String,
        /// Units released.
        quantity: u32,
        /// When the release was recorded.
        timestamp: DateTime<Utc>,
    },
}

impl InventoryEvent {
    /// The `event_type` discriminator string stored alongside the payload.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::InventoryReserved { .. } => "InventoryReserved",
            Self::InventoryReservationFailed { .. } => "InventoryReservationFailed",
            Self::InventoryReleased { .. } => "InventoryReleased",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn event_type_strings() {
        let reserved = InventoryEvent::InventoryReserved {
            product_id: "p-1".to_string(),
            order_id: "o-1".to_string(),
            quantity: 3,
            timestamp: Utc::now(),
        };
        assert_eq!(reserved.event_type(), "InventoryReserved");

        let failed = InventoryEvent::InventoryReservationFailed {
            product_id: "p-1".to_string(),
            order_id: "o-1".to_string(),
            quantity_requested: 10,
            quantity_available: 2,
            timestamp: Utc::now(),
        };
        assert_eq!(failed.event_type(), "InventoryReservationFailed");

        let released = InventoryEvent::InventoryReleased {
            product_id: "p-1".to_string(),
            order_id: "o-1".to_string(),
            quantity: 3,
            timestamp: Utc::now(),
        };
        assert_eq!(released.event_type(), "InventoryReleased");
    }

    #[test]
    fn round_trips_through_json_envelope() {
        let event = InventoryEvent::InventoryReserved {
            product_id: "p-1".to_string(),
            order_id: "o-1".to_string(),
            quantity: 3,
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event_type"], "InventoryReserved");
        assert_eq!(value["data"]["quantity"], 3);

        let back: InventoryEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back.event_type(), event.event_type());
    }
}
