//! Catalog inventory item model.

use common::{FoodItemId, RestaurantId, UserId};
use serde::{Deserialize, Serialize};

/// A food item as held by the catalog service.
///
/// `is_available` is derived from `quantity` whenever stock changes; a
/// restaurant-deactivation event may force it `false` out of band, and
/// that override stands until the next stock mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: FoodItemId,
    pub restaurant_id: RestaurantId,
    pub owner_id: UserId,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    pub is_available: bool,
}

impl InventoryItem {
    /// Creates a new item with availability derived from the quantity.
    pub fn new(
        restaurant_id: RestaurantId,
        owner_id: UserId,
        name: impl Into<String>,
        price: f64,
        quantity: u32,
    ) -> Self {
        Self {
            id: FoodItemId::new(),
            restaurant_id,
            owner_id,
            name: name.into(),
            price,
            quantity,
            is_available: quantity > 0,
        }
    }

    /// Recomputes `is_available` from the current quantity.
    pub fn recompute_availability(&mut self) {
        self.is_available = self.quantity > 0;
    }
}
