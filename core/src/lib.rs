//! Shared abstractions for the order placement pipeline.
//!
//! This crate holds only what every authority needs in common: the event
//! store contract (§4.1), the message bus contract (§4.6), and the
//! `StreamId`/`Version` identifiers events are keyed by. Domain logic —
//! order lifecycle, inventory reservation, saga sequencing, marketing
//! projections — stays local to the binary that owns it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod event_bus;
pub mod event_store;
pub mod stream;

pub use clock::{Clock, SystemClock};
pub use event_bus::{event_envelope, EventBus, EventBusError, EventStream};
pub use event_store::{AggregateType, EventStore, EventStoreError, StoredEvent};
pub use stream::{StreamId, Version};
