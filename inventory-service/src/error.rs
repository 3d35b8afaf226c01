//! Maps this crate's command errors onto [`order_saga_web::AppError`].

use crate::commands::InventoryCommandError;
use order_saga_web::AppError;

impl From<InventoryCommandError> for AppError {
    fn from(err: InventoryCommandError) -> Self {
        match err {
            InventoryCommandError::ConcurrencyConflict(product_id) => {
                Self::conflict(format!("product '{product_id}' was modified concurrently"))
            }
            InventoryCommandError::Database(reason) => {
                Self::internal("inventory storage error").with_source(anyhow::anyhow!(reason))
            }
        }
    }
}
