//! In-memory catalog client backed by an inventory store.

use async_trait::async_trait;
use common::{FoodItemId, RestaurantId};
use store::InventoryStore;

use crate::client::{CatalogClient, FoodItemRecord, ValidationOutcome};

/// Catalog client that reads directly from an [`InventoryStore`].
///
/// Used in tests and single-process deployments; outcome classification
/// is identical to the HTTP client's.
#[derive(Debug, Clone)]
pub struct InMemoryCatalogClient<I> {
    inventory: I,
}

impl<I: InventoryStore> InMemoryCatalogClient<I> {
    /// Creates a client over the given inventory store.
    pub fn new(inventory: I) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl<I: InventoryStore> CatalogClient for InMemoryCatalogClient<I> {
    async fn validate_item(
        &self,
        food_item_id: FoodItemId,
        restaurant_id: RestaurantId,
        quantity: u32,
    ) -> ValidationOutcome {
        match self.inventory.get(food_item_id).await {
            Ok(Some(item)) => {
                let record = FoodItemRecord {
                    food_item_id: item.id,
                    restaurant_id: item.restaurant_id,
                    owner_id: Some(item.owner_id),
                    name: item.name,
                    price: item.price,
                    is_available: item.is_available,
                    quantity: item.quantity,
                };
                ValidationOutcome::classify(record, restaurant_id, quantity)
            }
            Ok(None) => ValidationOutcome::NotFound,
            Err(err) => {
                tracing::warn!(%food_item_id, error = %err, "catalog lookup failed");
                ValidationOutcome::UpstreamUnavailable
            }
        }
    }
}
