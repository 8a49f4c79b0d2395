//! In-memory store implementations.
//!
//! These stand in for the external document stores and provide the same
//! conditional-update semantics. They double as test fixtures: the
//! inventory store records every stock mutation and can be made to fail
//! as if the backing service were unreachable.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use common::{FoodItemId, OrderId, RestaurantId, UserId};
use domain::{InventoryItem, Order};
use tokio::sync::RwLock as AsyncRwLock;

use crate::error::{Result, StoreError};
use crate::inventory::{InventoryOp, InventoryStore};
use crate::order::OrderStore;

/// In-memory order store with optimistic conditional updates.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<AsyncRwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, mut order: Order) -> Result<Order> {
        let mut orders = self.orders.write().await;
        order.version = 1;
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&order_id).cloned())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut found: Vec<Order> = orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn find_by_restaurant(&self, restaurant_id: RestaurantId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut found: Vec<Order> = orders
            .values()
            .filter(|o| o.restaurant_id == restaurant_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn update(&self, mut order: Order) -> Result<Order> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get(&order.id)
            .ok_or(StoreError::OrderNotFound(order.id))?;

        if stored.version != order.version {
            return Err(StoreError::Conflict {
                order_id: order.id,
                expected: order.version,
                actual: stored.version,
            });
        }

        order.version += 1;
        order.updated_at = Utc::now();
        orders.insert(order.id, order.clone());
        Ok(order)
    }
}

#[derive(Debug, Default)]
struct InventoryState {
    items: HashMap<FoodItemId, InventoryItem>,
    operations: Vec<InventoryOp>,
    unavailable: bool,
}

/// In-memory inventory store.
///
/// Each `reserve`/`restore` runs inside one write-lock critical section,
/// giving the atomic conditional-update semantics the trait requires.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryStore {
    state: Arc<RwLock<InventoryState>>,
}

impl InMemoryInventoryStore {
    /// Creates a new empty inventory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an item, returning its ID.
    pub fn insert_item(&self, item: InventoryItem) -> FoodItemId {
        let id = item.id;
        self.state.write().unwrap().items.insert(id, item);
        id
    }

    /// Simulates the backing service being unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }

    /// Returns the stock mutations issued so far, in order.
    pub fn operations(&self) -> Vec<InventoryOp> {
        self.state.read().unwrap().operations.clone()
    }

    /// Clears the recorded mutation log.
    pub fn clear_operations(&self) {
        self.state.write().unwrap().operations.clear();
    }

    /// Returns the current quantity of an item, if present.
    pub fn quantity(&self, food_item_id: FoodItemId) -> Option<u32> {
        self.state
            .read()
            .unwrap()
            .items
            .get(&food_item_id)
            .map(|item| item.quantity)
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn get(&self, food_item_id: FoodItemId) -> Result<Option<InventoryItem>> {
        let state = self.state.read().unwrap();
        if state.unavailable {
            return Err(StoreError::Unavailable("inventory store offline".into()));
        }
        Ok(state.items.get(&food_item_id).cloned())
    }

    async fn reserve(&self, food_item_id: FoodItemId, quantity: u32) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.unavailable {
            return Err(StoreError::Unavailable("inventory store offline".into()));
        }

        let item = state
            .items
            .get_mut(&food_item_id)
            .ok_or(StoreError::ItemNotFound(food_item_id))?;

        if item.quantity < quantity {
            return Err(StoreError::InsufficientStock {
                food_item_id,
                requested: quantity,
                available: item.quantity,
            });
        }

        item.quantity -= quantity;
        item.recompute_availability();
        state.operations.push(InventoryOp::Reserve {
            food_item_id,
            quantity,
        });
        Ok(())
    }

    async fn restore(&self, food_item_id: FoodItemId, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Ok(());
        }

        let mut state = self.state.write().unwrap();
        if state.unavailable {
            return Err(StoreError::Unavailable("inventory store offline".into()));
        }

        let item = state
            .items
            .get_mut(&food_item_id)
            .ok_or(StoreError::ItemNotFound(food_item_id))?;

        item.quantity += quantity;
        item.is_available = true;
        state.operations.push(InventoryOp::Restore {
            food_item_id,
            quantity,
        });
        Ok(())
    }

    async fn deactivate_restaurant(&self, restaurant_id: RestaurantId) -> Result<u64> {
        let mut state = self.state.write().unwrap();
        if state.unavailable {
            return Err(StoreError::Unavailable("inventory store offline".into()));
        }

        let mut affected = 0;
        for item in state.items.values_mut() {
            if item.restaurant_id == restaurant_id {
                item.is_available = false;
                affected += 1;
            }
        }
        Ok(affected)
    }
}
