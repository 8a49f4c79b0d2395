//! Order status state machine.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Transitions:
/// ```text
/// Validating ──┬──► Confirmed ──► Preparing ──► OutForDelivery ──► Delivered
///              │        │
///              │        └──► Cancelled          (also Validating ──► Cancelled)
///              └──► Failed ──► Validating       (on retried update)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order is being validated against the catalog; inventory not yet reserved.
    #[default]
    Validating,

    /// Inventory reserved, awaiting preparation.
    Confirmed,

    /// Restaurant is preparing the order.
    Preparing,

    /// Order has left the restaurant.
    OutForDelivery,

    /// Order was delivered (terminal).
    Delivered,

    /// Order was cancelled by its owner (terminal).
    Cancelled,

    /// Validation or reservation failed; may be retried via item update.
    Failed,
}

impl OrderStatus {
    /// Returns true if the owning user may cancel the order in this status.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Validating | OrderStatus::Confirmed)
    }

    /// Returns true if the owning user may update items or address in this status.
    pub fn can_update_items(&self) -> bool {
        matches!(
            self,
            OrderStatus::Validating | OrderStatus::Confirmed | OrderStatus::Failed
        )
    }

    /// Returns true if the restaurant operator may advance to `next` from this status.
    pub fn can_advance_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Confirmed, OrderStatus::Preparing)
                | (OrderStatus::Preparing, OrderStatus::OutForDelivery)
                | (OrderStatus::OutForDelivery, OrderStatus::Delivered)
        )
    }

    /// Returns true if this is a terminal status (no further writes accepted).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Validating => "Validating",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::OutForDelivery => "OutForDelivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
