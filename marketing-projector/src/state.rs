//! Shared application state for the marketing-projector binary.

use sqlx::PgPool;

/// State shared across every query handler. The projector takes no
/// commands, so this holds nothing but the read-model pool.
#[derive(Clone)]
pub struct AppState {
    /// Pool the query handlers read from.
    pub pool: PgPool,
}
