use common::{FoodItemId, OrderId};
use thiserror::Error;

/// Errors that can occur at the storage boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Conditional update rejected: the document changed since it was read.
    #[error("Write conflict on order {order_id}: expected version {expected}, found {actual}")]
    Conflict {
        order_id: OrderId,
        expected: u64,
        actual: u64,
    },

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Inventory item not found.
    #[error("Food item not found: {0}")]
    ItemNotFound(FoodItemId),

    /// Reservation rejected: not enough stock.
    #[error("Insufficient stock for item {food_item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        food_item_id: FoodItemId,
        requested: u32,
        available: u32,
    },

    /// The backing store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
