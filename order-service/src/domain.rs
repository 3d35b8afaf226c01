//! The Order aggregate (§3, §4.1): events, fold, and lifecycle state machine.

use chrono::{DateTime, Utc};
use order_saga_core::stream::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An order's lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Created, awaiting inventory reservation and confirmation.
    Pending,
    /// Reservation succeeded and the order was confirmed.
    Confirmed,
    /// The order was cancelled, forward or as saga compensation.
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Confirmed => write!(f, "CONFIRMED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// One of the three events an order's stream can contain (§4.1).
///
/// Tagged so the wire shape matches `{"event_type": ..., "data": {...}}`
/// exactly (§4.6, §6) with no separate mapping step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "data")]
pub enum OrderEvent {
    /// The order was created in `PENDING`.
    OrderCreated {
        /// The order's id.
        order_id: String,
        /// The customer's display name.
        customer_name: String,
        /// The product being ordered.
        product_id: String,
        /// The product's display name at order time.
        product_name: String,
        /// Units ordered.
        quantity: u32,
        /// Total charged for the order.
        total_price: f64,
        /// When the order was created.
        timestamp: DateTime<Utc>,
    },
    /// The order was confirmed after a successful reservation.
    OrderConfirmed {
        /// The order's id.
        order_id: String,
        /// When the order was confirmed.
        timestamp: DateTime<Utc>,
    },
    /// The order was cancelled, forward or as compensation.
    OrderCancelled {
        /// The order's id.
        order_id: String,
        /// Why the order was cancelled.
        reason: String,
        /// When the order was cancelled.
        timestamp: DateTime<Utc>,
    },
}

impl OrderEvent {
    /// The `event_type` discriminator string stored alongside the payload.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::OrderCreated { .. } => "OrderCreated",
            Self::OrderConfirmed { .. } => "OrderConfirmed",
            Self::OrderCancelled { .. } => "OrderCancelled",
        }
    }
}

/// The Order aggregate, reconstructed by folding its event stream (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// The order's id.
    pub id: String,
    /// The customer's display name.
    pub customer_name: String,
    /// The product being ordered.
    pub product_id: String,
    /// The product's display name at order time.
    pub product_name: String,
    /// Units ordered.
    pub quantity: u32,
    /// Total charged for the order.
    pub total_price: f64,
    /// The order's current lifecycle status.
    pub status: OrderStatus,
    /// The version of the last event folded into this view.
    pub version: Version,
}

impl Order {
    /// Folds a stream of [`OrderEvent`]s paired with their stored version
    /// into an `Order`, or `None` if the stream is empty.
    #[must_use]
    pub fn fold(events: &[(OrderEvent, Version)]) -> Option<Self> {
        let mut order: Option<Self> = None;
        for (event, version) in events {
            order = Some(Self::apply(order, event, *version));
        }
        order
    }

    fn apply(current: Option<Self>, event: &OrderEvent, version: Version) -> Self {
        match (current, event) {
            (
                None,
                OrderEvent::OrderCreated {
                    order_id,
                    customer_name,
                    product_id,
                    product_name,
                    quantity,
                    total_price,
                    ..
                },
            ) => Self {
                id: order_id.clone(),
                customer_name: customer_name.clone(),
                product_id: product_id.clone(),
                product_name: product_name.clone(),
                quantity: *quantity,
                total_price: *total_price,
                status: OrderStatus::Pending,
                version,
            },
            (Some(mut order), OrderEvent::OrderConfirmed { .. }) => {
                order.status = OrderStatus::Confirmed;
                order.version = version;
                order
            }
            (Some(mut order), OrderEvent::OrderCancelled { .. }) => {
                order.status = OrderStatus::Cancelled;
                order.version = version;
                order
            }
            (Some(order), OrderEvent::OrderCreated { .. }) => {
                // A second OrderCreated on an existing stream cannot happen
                // through this service's commands; keep the existing view.
                order
            }
            (None, OrderEvent::OrderConfirmed { .. } | OrderEvent::OrderCancelled { .. }) => {
                unreachable!("first event in a stream is always OrderCreated")
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn created() -> OrderEvent {
        OrderEvent::OrderCreated {
            order_id: "order-1".to_string(),
            customer_name: "Ada".to_string(),
            product_id: "product-1".to_string(),
            product_name: "Widget".to_string(),
            quantity: 3,
            total_price: 29.97,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn fold_empty_is_none() {
        assert!(Order::fold(&[]).is_none());
    }

    #[test]
    fn fold_created_is_pending() {
        let order = Order::fold(&[(created(), Version::new(1))]).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.version, Version::new(1));
        assert_eq!(order.quantity, 3);
    }

    #[test]
    fn fold_created_then_confirmed() {
        let events = vec![
            (created(), Version::new(1)),
            (
                OrderEvent::OrderConfirmed {
                    order_id: "order-1".to_string(),
                    timestamp: Utc::now(),
                },
                Version::new(2),
            ),
        ];
        let order = Order::fold(&events).unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.version, Version::new(2));
    }

    #[test]
    fn fold_created_then_cancelled() {
        let events = vec![
            (created(), Version::new(1)),
            (
                OrderEvent::OrderCancelled {
                    order_id: "order-1".to_string(),
                    reason: "out of stock".to_string(),
                    timestamp: Utc::now(),
                },
                Version::new(2),
            ),
        ];
        let order = Order::fold(&events).unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[test]
    fn event_type_strings() {
        assert_eq!(created().event_type(), "OrderCreated");
    }

    proptest! {
        /// P2: folding `Created` followed by at most one terminal transition
        /// always yields a read-model row matching that last projected event
        /// — whatever the quantity, and whether or not a terminal event
        /// follows at all.
        #[test]
        fn fold_matches_the_latest_projected_event(
            quantity in 1u32..1_000,
            terminal in prop::option::of(prop::bool::ANY),
        ) {
            let mut events = vec![(created_with_quantity(quantity), Version::new(1))];
            if let Some(confirm) = terminal {
                let event = if confirm {
                    OrderEvent::OrderConfirmed {
                        order_id: "order-1".to_string(),
                        timestamp: Utc::now(),
                    }
                } else {
                    OrderEvent::OrderCancelled {
                        order_id: "order-1".to_string(),
                        reason: "test".to_string(),
                        timestamp: Utc::now(),
                    }
                };
                events.push((event, Version::new(2)));
            }

            let order = Order::fold(&events).expect("at least OrderCreated is always present");
            prop_assert_eq!(order.quantity, quantity);
            prop_assert_eq!(order.version, events.last().unwrap().1);

            let expected_status = match terminal {
                None => OrderStatus::Pending,
                Some(true) => OrderStatus::Confirmed,
                Some(false) => OrderStatus::Cancelled,
            };
            prop_assert_eq!(order.status, expected_status);
        }
    }

    fn created_with_quantity(quantity: u32) -> OrderEvent {
        OrderEvent::OrderCreated {
            order_id: "order-1".to_string(),
            customer_name: "Ada".to_string(),
            product_id: "product-1".to_string(),
            product_name: "Widget".to_string(),
            quantity,
            total_price: 29.97,
            timestamp: Utc::now(),
        }
    }
}
