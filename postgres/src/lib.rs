//! `PostgreSQL`-backed [`EventStore`] for the order placement pipeline.
//!
//! Each of `order-service` and `inventory-service` owns one [`PostgresEventStore`]
//! against its own database (§3: "each authority exclusively owns its event
//! store") — this crate does not distinguish between them beyond the
//! `aggregate_type` column each stream's events carry.
//!
//! # Example
//!
//! ```ignore
//! use order_saga_postgres::PostgresEventStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresEventStore::connect("postgres://localhost/orders").await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod event_store;

pub use event_store::PostgresEventStore;
