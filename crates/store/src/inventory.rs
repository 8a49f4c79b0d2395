//! Inventory store trait.

use async_trait::async_trait;
use common::{FoodItemId, RestaurantId};
use domain::InventoryItem;

use crate::error::Result;

/// A recorded stock mutation, used by the in-memory store for exact-call
/// assertions in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryOp {
    Reserve { food_item_id: FoodItemId, quantity: u32 },
    Restore { food_item_id: FoodItemId, quantity: u32 },
}

/// Stock mutation boundary of the catalog service.
///
/// `reserve` and `restore` are each a single atomic conditional update
/// over the item's quantity field. Concurrent callers on the same item
/// are not serialized at the application level; lost-update avoidance is
/// delegated entirely to this atomicity.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Reads an inventory item.
    async fn get(&self, food_item_id: FoodItemId) -> Result<Option<InventoryItem>>;

    /// Atomically reserves stock.
    ///
    /// Succeeds only if the current quantity is at least `quantity`; on
    /// success decrements the stock and recomputes availability. Fails
    /// with `InsufficientStock` otherwise, leaving the item untouched.
    async fn reserve(&self, food_item_id: FoodItemId, quantity: u32) -> Result<()>;

    /// Atomically restores stock and marks the item available.
    ///
    /// A zero quantity is a no-op. The caller is responsible for not
    /// restoring more than was actually reserved.
    async fn restore(&self, food_item_id: FoodItemId, quantity: u32) -> Result<()>;

    /// Force-clears availability on every item of a restaurant.
    ///
    /// Idempotent: reapplying the same deactivation is a no-op. Returns
    /// the number of items affected.
    async fn deactivate_restaurant(&self, restaurant_id: RestaurantId) -> Result<u64>;
}
