//! Order document.

use chrono::{DateTime, Utc};
use common::{FoodItemId, OrderId, RestaurantId, UserId};
use serde::{Deserialize, Serialize};

use super::{OrderError, OrderStatus};

/// Maximum allowed difference between the declared total and the computed
/// item sum.
pub const TOTAL_TOLERANCE: f64 = 0.01;

/// One line of an order.
///
/// `unit_price` is a point-in-time snapshot taken when the line first
/// entered the order; it is never re-derived from the catalog afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub food_item_id: FoodItemId,
    pub unit_price: f64,
    pub quantity: u32,
}

impl OrderLine {
    /// Creates a new order line.
    pub fn new(food_item_id: FoodItemId, unit_price: f64, quantity: u32) -> Self {
        Self {
            food_item_id,
            unit_price,
            quantity,
        }
    }
}

/// Returns the total for one line.
pub fn line_total(line: &OrderLine) -> f64 {
    line.unit_price * line.quantity as f64
}

/// An order document as persisted in the order store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub restaurant_id: RestaurantId,
    /// Learned from the catalog during validation; `None` until the order
    /// has been validated at least once.
    pub restaurant_owner_id: Option<UserId>,
    pub items: Vec<OrderLine>,
    pub total_amount: f64,
    pub delivery_address: String,
    pub status: OrderStatus,
    /// Populated only while `status == Failed`.
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency token, bumped by every store update.
    #[serde(default)]
    pub version: u64,
}

impl Order {
    /// Constructs a new order in `Validating` status.
    ///
    /// Validates that the order has at least one item, every line has a
    /// positive quantity and price, and `total_amount` matches the item
    /// sum within [`TOTAL_TOLERANCE`].
    pub fn new(
        user_id: UserId,
        restaurant_id: RestaurantId,
        items: Vec<OrderLine>,
        total_amount: f64,
        delivery_address: String,
    ) -> Result<Self, OrderError> {
        validate_lines(&items)?;
        check_total(total_amount, &items)?;

        let now = Utc::now();
        Ok(Self {
            id: OrderId::new(),
            user_id,
            restaurant_id,
            restaurant_owner_id: None,
            items,
            total_amount,
            delivery_address,
            status: OrderStatus::Validating,
            failure_reason: None,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// Returns the computed sum of all lines.
    pub fn computed_total(&self) -> f64 {
        self.items.iter().map(line_total).sum()
    }

    /// Replaces the item list and total, re-entering `Validating`.
    ///
    /// Permitted only from `Validating`, `Confirmed` or `Failed`. The same
    /// total law as creation applies to the new list.
    pub fn replace_items(
        &mut self,
        items: Vec<OrderLine>,
        total_amount: f64,
        delivery_address: Option<String>,
    ) -> Result<(), OrderError> {
        if !self.status.can_update_items() {
            return Err(OrderError::IllegalTransition {
                current: self.status,
                action: "update items",
            });
        }
        validate_lines(&items)?;
        check_total(total_amount, &items)?;

        self.items = items;
        self.total_amount = total_amount;
        if let Some(address) = delivery_address {
            self.delivery_address = address;
        }
        self.set_status(OrderStatus::Validating);
        Ok(())
    }

    /// Sets the status, clearing any stale failure reason.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        if status != OrderStatus::Failed {
            self.failure_reason = None;
        }
    }

    /// Marks the order failed with the given reason.
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.status = OrderStatus::Failed;
        self.failure_reason = Some(reason.into());
    }

    /// Returns the quantity currently ordered for a food item, 0 if absent.
    pub fn quantity_of(&self, food_item_id: FoodItemId) -> u32 {
        self.items
            .iter()
            .find(|line| line.food_item_id == food_item_id)
            .map(|line| line.quantity)
            .unwrap_or(0)
    }
}

fn validate_lines(items: &[OrderLine]) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::NoItems);
    }
    for line in items {
        if line.quantity == 0 {
            return Err(OrderError::InvalidQuantity {
                food_item_id: line.food_item_id,
                quantity: line.quantity,
            });
        }
        if line.unit_price <= 0.0 {
            return Err(OrderError::InvalidPrice {
                food_item_id: line.food_item_id,
                price: line.unit_price,
            });
        }
    }
    Ok(())
}

fn check_total(declared: f64, items: &[OrderLine]) -> Result<(), OrderError> {
    let computed: f64 = items.iter().map(line_total).sum();
    if (declared - computed).abs() > TOTAL_TOLERANCE {
        return Err(OrderError::TotalMismatch { declared, computed });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: f64, quantity: u32) -> OrderLine {
        OrderLine::new(FoodItemId::new(), price, quantity)
    }

    fn order_with(items: Vec<OrderLine>, total: f64) -> Result<Order, OrderError> {
        Order::new(
            UserId::new(),
            RestaurantId::new(),
            items,
            total,
            "1 Main St".to_string(),
        )
    }

    #[test]
    fn new_order_starts_validating() {
        let order = order_with(vec![line(9.5, 2)], 19.0).unwrap();
        assert_eq!(order.status, OrderStatus::Validating);
        assert!(order.failure_reason.is_none());
        assert!(order.restaurant_owner_id.is_none());
        assert_eq!(order.version, 0);
    }

    #[test]
    fn total_within_tolerance_accepted() {
        assert!(order_with(vec![line(3.33, 3)], 9.99).is_ok());
        assert!(order_with(vec![line(3.33, 3)], 10.0).is_ok());
    }

    #[test]
    fn total_mismatch_rejected() {
        let err = order_with(vec![line(3.33, 3)], 10.02).unwrap_err();
        assert!(matches!(err, OrderError::TotalMismatch { .. }));
    }

    #[test]
    fn empty_order_rejected() {
        assert!(matches!(order_with(vec![], 0.0), Err(OrderError::NoItems)));
    }

    #[test]
    fn zero_quantity_rejected() {
        let err = order_with(vec![line(5.0, 0)], 0.0).unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity { .. }));
    }

    #[test]
    fn non_positive_price_rejected() {
        let err = order_with(vec![line(0.0, 1)], 0.0).unwrap_err();
        assert!(matches!(err, OrderError::InvalidPrice { .. }));
    }

    #[test]
    fn replace_items_reenters_validating_and_checks_total() {
        let mut order = order_with(vec![line(4.0, 1)], 4.0).unwrap();
        order.set_status(OrderStatus::Confirmed);

        let new_items = vec![line(4.0, 2), line(2.5, 1)];
        order.replace_items(new_items, 10.5, None).unwrap();
        assert_eq!(order.status, OrderStatus::Validating);
        assert_eq!(order.items.len(), 2);
        assert!((order.total_amount - 10.5).abs() < f64::EPSILON);

        let bad = order.replace_items(vec![line(4.0, 1)], 9.0, None);
        assert!(matches!(bad, Err(OrderError::TotalMismatch { .. })));
    }

    #[test]
    fn replace_items_rejected_in_terminal_status() {
        let mut order = order_with(vec![line(4.0, 1)], 4.0).unwrap();
        order.set_status(OrderStatus::Delivered);

        let err = order
            .replace_items(vec![line(4.0, 2)], 8.0, None)
            .unwrap_err();
        assert!(matches!(err, OrderError::IllegalTransition { .. }));
    }

    #[test]
    fn replace_items_allowed_from_failed() {
        let mut order = order_with(vec![line(4.0, 1)], 4.0).unwrap();
        order.mark_failed("item out of stock");

        order.replace_items(vec![line(4.0, 1)], 4.0, None).unwrap();
        assert_eq!(order.status, OrderStatus::Validating);
        assert!(order.failure_reason.is_none());
    }

    #[test]
    fn failure_reason_cleared_on_non_failed_status() {
        let mut order = order_with(vec![line(4.0, 1)], 4.0).unwrap();
        order.mark_failed("upstream unavailable");
        assert_eq!(order.failure_reason.as_deref(), Some("upstream unavailable"));

        order.set_status(OrderStatus::Confirmed);
        assert!(order.failure_reason.is_none());
    }

    #[test]
    fn replace_items_updates_address_when_given() {
        let mut order = order_with(vec![line(4.0, 1)], 4.0).unwrap();
        order
            .replace_items(vec![line(4.0, 1)], 4.0, Some("9 Elm St".to_string()))
            .unwrap();
        assert_eq!(order.delivery_address, "9 Elm St");
    }

    #[test]
    fn quantity_of_missing_item_is_zero() {
        let food = FoodItemId::new();
        let order = order_with(vec![OrderLine::new(food, 2.0, 3)], 6.0).unwrap();
        assert_eq!(order.quantity_of(food), 3);
        assert_eq!(order.quantity_of(FoodItemId::new()), 0);
    }
}
