//! The saga orchestrator (§4.4): drives `CreateOrder` -> `ReserveInventory`
//! -> `ConfirmOrder` across the order and inventory authorities, running a
//! `CancelOrder` compensation when reservation fails. Stateless between
//! calls; holds no database.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod domain;
pub mod handlers;
pub mod router;
pub mod saga;
pub mod state;

pub use router::build_router;
pub use state::AppState;
