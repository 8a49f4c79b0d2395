//! Order document store trait.

use async_trait::async_trait;
use common::{OrderId, RestaurantId, UserId};
use domain::Order;

use crate::error::Result;

/// Persistence for order documents.
///
/// `update` is conditional on the document's `version` field: the write is
/// rejected with [`StoreError::Conflict`](crate::StoreError::Conflict) if
/// the stored version differs from the one carried by the given document.
/// This is the only serialization mechanism for concurrent writers on the
/// same order.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a new order document at version 1.
    async fn insert(&self, order: Order) -> Result<Order>;

    /// Loads an order by ID.
    async fn get(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// Lists a user's orders, newest first.
    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Lists a restaurant's orders, newest first.
    async fn find_by_restaurant(&self, restaurant_id: RestaurantId) -> Result<Vec<Order>>;

    /// Conditionally replaces an order document.
    ///
    /// Succeeds only if the stored version equals `order.version`; on
    /// success the stored document carries `version + 1` and a fresh
    /// `updated_at`, and the updated document is returned.
    async fn update(&self, order: Order) -> Result<Order>;
}
