//! The inventory authority (§4.3): owns product stock events and the
//! inventory read model, behind `/commands/inventory*` and `/queries/products*`.

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
