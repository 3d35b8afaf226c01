//! Maps this crate's command/query errors onto [`order_saga_web::AppError`].

use crate::commands::OrderCommandError;
use order_saga_web::AppError;

impl From<OrderCommandError> for AppError {
    fn from(err: OrderCommandError) -> Self {
        match err {
            OrderCommandError::NotFound(order_id) => Self::not_found("Order", order_id),
            OrderCommandError::ConcurrencyConflict(order_id) => {
                Self::conflict(format!("order '{order_id}' was modified concurrently"))
            }
            OrderCommandError::Database(reason) => {
                Self::internal("order storage error").with_source(anyhow::anyhow!(reason))
            }
        }
    }
}
