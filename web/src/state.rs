//! Application state for Axum handlers.
//!
//! This module provides a generic `AppState` placeholder. Each binary in this
//! workspace (`order-service`, `inventory-service`, `saga-orchestrator`,
//! `marketing-projector`) defines its own state struct holding its
//! `Arc<dyn EventStore>`, `Arc<dyn EventBus>`, and `PgPool` instead of using
//! this type directly.

/// Application state shared across all HTTP handlers.
///
/// This is a placeholder type. Binaries define their own state struct
/// containing their domain-specific store/bus/pool handles.
///
/// # Examples
///
/// ```ignore
/// use axum::extract::State;
/// use order_saga_web::AppError;
/// use order_saga_core::EventStore;
/// use std::sync::Arc;
///
/// #[derive(Clone)]
/// struct OrderServiceState {
///     event_store: Arc<dyn EventStore>,
/// }
///
/// async fn handler(
///     State(state): State<OrderServiceState>,
/// ) -> Result<Json<Response>, AppError> {
///     state.event_store.load_events(&stream_id).await?;
///     Ok(Json(response))
/// }
/// ```
#[derive(Clone)]
pub struct AppState {
    // Placeholder - applications should define their own state
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone() {
        // Ensure AppState implements Clone (required for Axum)
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_state_default() {
        let _ = AppState::default();
    }
}
