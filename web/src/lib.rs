//! Axum web framework integration shared by every authority in the order
//! placement pipeline.
//!
//! Each binary (`order-service`, `inventory-service`, `saga-orchestrator`,
//! `marketing-projector`) builds its `Router` directly against its own
//! state and handlers; this crate supplies what they all need in common:
//! [`AppError`] (the uniform error-to-HTTP-response mapping, §7),
//! correlation-id extraction and propagation (§5's request tracing), and a
//! bare-liveness [`handlers::health::health_check`] (§6).
//!
//! # Example
//!
//! ```ignore
//! use order_saga_web::{AppError, middleware::correlation_id_layer};
//! use axum::{Router, routing::{get, post}};
//!
//! async fn place_order() -> Result<axum::Json<serde_json::Value>, AppError> {
//!     Ok(axum::Json(serde_json::json!({"status": "accepted"})))
//! }
//!
//! let app = Router::new()
//!     .route("/commands/orders", post(place_order))
//!     .layer(correlation_id_layer());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{ClientIp, CorrelationId, UserAgent};
pub use middleware::{correlation_id_layer, CorrelationIdExt, CORRELATION_ID_HEADER};
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
