//! The order authority (§4.2): owns order lifecycle events and the order
//! read model, behind `/commands/orders*` and `/queries/orders*`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod commands;
pub mod domain;
mod error;
pub mod handlers;
pub mod read_model;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
