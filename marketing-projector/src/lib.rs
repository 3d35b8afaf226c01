//! The marketing read model (§4.5): projects `order_events` into a set of
//! denormalized reporting tables, exposed behind `/queries/marketing*`.
//! Takes no commands — every write in this crate originates from
//! [`subscriber::run`], not from an HTTP handler.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod handlers;
pub mod projections;
pub mod read_model;
pub mod router;
pub mod state;
pub mod subscriber;

pub use router::build_router;
pub use state::AppState;
