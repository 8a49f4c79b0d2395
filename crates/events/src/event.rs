//! Order lifecycle events.

use chrono::{DateTime, Utc};
use common::{OrderId, RestaurantId, UserId};
use domain::{Order, OrderLine, OrderStatus};
use serde::{Deserialize, Serialize};

use crate::topics;

/// Events emitted by the order saga, plus the restaurant deletion event
/// consumed from the catalog side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DomainEvent {
    /// An order was confirmed after validation and reservation.
    OrderPlaced(OrderPlacedData),

    /// A confirmed order's items were replaced.
    OrderUpdated(OrderUpdatedData),

    /// An order moved along the fulfillment chain.
    OrderStatusUpdated(OrderStatusUpdatedData),

    /// An order was cancelled by its customer.
    OrderCancelled(OrderCancelledData),

    /// Order placement or update failed after compensation.
    OrderFailed(OrderFailedData),

    /// A restaurant was removed from the platform.
    RestaurantDeleted(RestaurantDeletedData),
}

/// Data for OrderPlaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedData {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub restaurant_id: RestaurantId,
    pub items: Vec<OrderLine>,
    pub total_amount: f64,
    pub timestamp: DateTime<Utc>,
}

/// Data for OrderUpdated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdatedData {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub restaurant_id: RestaurantId,
    pub items: Vec<OrderLine>,
    pub total_amount: f64,
    pub timestamp: DateTime<Utc>,
}

/// Data for OrderStatusUpdated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdatedData {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
}

/// Data for OrderCancelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelledData {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub restaurant_id: RestaurantId,
    pub items: Vec<OrderLine>,
    pub timestamp: DateTime<Utc>,
}

/// Data for OrderFailed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderFailedData {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// Data for RestaurantDeleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantDeletedData {
    pub restaurant_id: RestaurantId,
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    /// The topic this event is published on.
    pub fn topic(&self) -> &'static str {
        match self {
            DomainEvent::OrderPlaced(_) => topics::ORDER_PLACED,
            DomainEvent::OrderUpdated(_) => topics::ORDER_UPDATED,
            DomainEvent::OrderStatusUpdated(_) => topics::ORDER_STATUS_UPDATED,
            DomainEvent::OrderCancelled(_) => topics::ORDER_CANCELLED,
            DomainEvent::OrderFailed(_) => topics::ORDER_FAILED,
            DomainEvent::RestaurantDeleted(_) => topics::RESTAURANT_DELETED,
        }
    }

    /// The partition key: order ID for order events, restaurant ID for
    /// catalog events. Keeps all events of one entity on one partition.
    pub fn key(&self) -> String {
        match self {
            DomainEvent::OrderPlaced(data) => data.order_id.to_string(),
            DomainEvent::OrderUpdated(data) => data.order_id.to_string(),
            DomainEvent::OrderStatusUpdated(data) => data.order_id.to_string(),
            DomainEvent::OrderCancelled(data) => data.order_id.to_string(),
            DomainEvent::OrderFailed(data) => data.order_id.to_string(),
            DomainEvent::RestaurantDeleted(data) => data.restaurant_id.to_string(),
        }
    }

    /// Creates an OrderPlaced event from a confirmed order.
    pub fn order_placed(order: &Order) -> Self {
        DomainEvent::OrderPlaced(OrderPlacedData {
            order_id: order.id,
            user_id: order.user_id,
            restaurant_id: order.restaurant_id,
            items: order.items.clone(),
            total_amount: order.total_amount,
            timestamp: Utc::now(),
        })
    }

    /// Creates an OrderUpdated event from the updated order.
    pub fn order_updated(order: &Order) -> Self {
        DomainEvent::OrderUpdated(OrderUpdatedData {
            order_id: order.id,
            user_id: order.user_id,
            restaurant_id: order.restaurant_id,
            items: order.items.clone(),
            total_amount: order.total_amount,
            timestamp: Utc::now(),
        })
    }

    /// Creates an OrderStatusUpdated event.
    pub fn order_status_updated(order_id: OrderId, status: OrderStatus) -> Self {
        DomainEvent::OrderStatusUpdated(OrderStatusUpdatedData {
            order_id,
            status,
            timestamp: Utc::now(),
        })
    }

    /// Creates an OrderCancelled event carrying the items to release.
    pub fn order_cancelled(order: &Order) -> Self {
        DomainEvent::OrderCancelled(OrderCancelledData {
            order_id: order.id,
            user_id: order.user_id,
            restaurant_id: order.restaurant_id,
            items: order.items.clone(),
            timestamp: Utc::now(),
        })
    }

    /// Creates an OrderFailed event.
    pub fn order_failed(order_id: OrderId, user_id: UserId, reason: impl Into<String>) -> Self {
        DomainEvent::OrderFailed(OrderFailedData {
            order_id,
            user_id,
            reason: reason.into(),
            timestamp: Utc::now(),
        })
    }

    /// Creates a RestaurantDeleted event.
    pub fn restaurant_deleted(restaurant_id: RestaurantId) -> Self {
        DomainEvent::RestaurantDeleted(RestaurantDeletedData {
            restaurant_id,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::FoodItemId;

    fn sample_order() -> Order {
        Order::new(
            UserId::new(),
            RestaurantId::new(),
            vec![OrderLine::new(FoodItemId::new(), 10.0, 2)],
            20.0,
            "1 Main St".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn topics_match_variants() {
        let order = sample_order();
        assert_eq!(DomainEvent::order_placed(&order).topic(), "order.placed");
        assert_eq!(DomainEvent::order_updated(&order).topic(), "order.updated");
        assert_eq!(
            DomainEvent::order_status_updated(order.id, OrderStatus::Preparing).topic(),
            "order.status.updated"
        );
        assert_eq!(
            DomainEvent::order_cancelled(&order).topic(),
            "order.cancelled"
        );
        assert_eq!(
            DomainEvent::order_failed(order.id, order.user_id, "no stock").topic(),
            "order.failed"
        );
        assert_eq!(
            DomainEvent::restaurant_deleted(order.restaurant_id).topic(),
            "restaurant.deleted"
        );
    }

    #[test]
    fn key_follows_the_entity() {
        let order = sample_order();
        assert_eq!(
            DomainEvent::order_placed(&order).key(),
            order.id.to_string()
        );
        assert_eq!(
            DomainEvent::restaurant_deleted(order.restaurant_id).key(),
            order.restaurant_id.to_string()
        );
    }

    #[test]
    fn serialization_roundtrip_keeps_the_variant() {
        let order = sample_order();
        let events = vec![
            DomainEvent::order_placed(&order),
            DomainEvent::order_status_updated(order.id, OrderStatus::OutForDelivery),
            DomainEvent::order_cancelled(&order),
            DomainEvent::order_failed(order.id, order.user_id, "no stock"),
            DomainEvent::restaurant_deleted(order.restaurant_id),
        ];
        for event in events {
            let json = serde_json::to_string(&event).unwrap();
            let back: DomainEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(event.topic(), back.topic());
            assert_eq!(event.key(), back.key());
        }
    }

    #[test]
    fn cancelled_event_carries_the_reserved_items() {
        let order = sample_order();
        match DomainEvent::order_cancelled(&order) {
            DomainEvent::OrderCancelled(data) => {
                assert_eq!(data.items, order.items);
            }
            _ => unreachable!(),
        }
    }
}
