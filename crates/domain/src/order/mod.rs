//! Order document and related types.

mod model;
mod status;

pub use model::{Order, OrderLine, TOTAL_TOLERANCE, line_total};
pub use status::OrderStatus;

use thiserror::Error;

/// Errors that can occur when constructing or mutating an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order must contain at least one item.
    #[error("Order must contain at least one item")]
    NoItems,

    /// Item quantity must be at least 1.
    #[error("Invalid quantity for item {food_item_id}: {quantity} (must be at least 1)")]
    InvalidQuantity {
        food_item_id: common::FoodItemId,
        quantity: u32,
    },

    /// Item unit price must be positive.
    #[error("Invalid unit price for item {food_item_id}: {price}")]
    InvalidPrice {
        food_item_id: common::FoodItemId,
        price: f64,
    },

    /// Declared total does not match the computed item sum.
    #[error("Total amount {declared:.2} does not match computed sum {computed:.2}")]
    TotalMismatch { declared: f64, computed: f64 },

    /// The requested transition is not allowed from the current status.
    #[error("Cannot {action} from {current} status")]
    IllegalTransition {
        current: OrderStatus,
        action: &'static str,
    },
}
