//! Saga orchestrator.
//!
//! The only mutation entry points for orders: place, update, cancel and
//! advance-status. Place, update and cancel each split into a synchronous
//! phase (persist + respond) and an asynchronous phase (`run_placement`,
//! `run_update`, `release_reservations`) that the HTTP boundary spawns
//! after answering the caller.

use std::time::Instant;

use catalog::{CatalogClient, ValidationOutcome};
use common::{FoodItemId, OrderId, RestaurantId, UserId};
use domain::{Order, OrderError, OrderLine, OrderStatus};
use events::{DomainEvent, EventPublisher};
use futures_util::future::join_all;
use serde::Deserialize;
use store::{InventoryOp, InventoryStore, OrderStore, StoreError};

use crate::delta::compute_deltas;
use crate::error::{Result, SagaError};

/// Upper bound on attempts against the catalog and inventory collaborators
/// when a call fails with a transport error.
pub const MAX_UPSTREAM_ATTEMPTS: usize = 3;

/// Upper bound on re-reads when a conditional order write hits a conflict.
const MAX_CONFLICT_RETRIES: usize = 3;

/// Request body for placing an order.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    pub restaurant_id: RestaurantId,
    pub items: Vec<OrderLine>,
    pub total_amount: f64,
    pub delivery_address: String,
}

/// Request body for replacing an order's items.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderRequest {
    pub items: Vec<OrderLine>,
    pub total_amount: f64,
    #[serde(default)]
    pub delivery_address: Option<String>,
}

/// Orchestrates order placement, update, cancellation and status
/// advancement over the order store, the catalog and the event bus.
pub struct SagaOrchestrator<O, I, C, P> {
    orders: O,
    inventory: I,
    catalog: C,
    publisher: P,
}

impl<O, I, C, P> SagaOrchestrator<O, I, C, P>
where
    O: OrderStore,
    I: InventoryStore,
    C: CatalogClient,
    P: EventPublisher,
{
    pub fn new(orders: O, inventory: I, catalog: C, publisher: P) -> Self {
        Self {
            orders,
            inventory,
            catalog,
            publisher,
        }
    }

    /// Persists a new order in `Validating` and publishes `order.placed`.
    ///
    /// Returns as soon as the document is stored; the caller is expected
    /// to spawn [`run_placement`](Self::run_placement) and answer the HTTP
    /// request without waiting for it.
    #[tracing::instrument(skip(self, request), fields(%user_id))]
    pub async fn place_order(&self, user_id: UserId, request: PlaceOrderRequest) -> Result<Order> {
        let order = Order::new(
            user_id,
            request.restaurant_id,
            request.items,
            request.total_amount,
            request.delivery_address,
        )?;
        let order = self.orders.insert(order).await?;

        metrics::counter!("orders_placed_total").increment(1);
        tracing::info!(order_id = %order.id, "order accepted for validation");
        self.publish(DomainEvent::order_placed(&order)).await;
        Ok(order)
    }

    /// Asynchronous placement phase: validation fan-out, reservation,
    /// compensation on partial failure.
    #[tracing::instrument(skip(self))]
    pub async fn run_placement(&self, order_id: OrderId) -> Result<()> {
        let start = Instant::now();
        let order = self.load(order_id).await?;
        if order.status != OrderStatus::Validating {
            // Cancelled (or otherwise moved on) before the task ran.
            tracing::info!(%order_id, status = %order.status, "skipping stale placement task");
            return Ok(());
        }

        let outcomes = self.validate_all(&order).await;

        let mut owner_id = None;
        let mut reasons = Vec::new();
        for (line, outcome) in order.items.iter().zip(&outcomes) {
            if let ValidationOutcome::Valid(record) = outcome {
                owner_id = owner_id.or(record.owner_id);
            }
            if let Some(reason) = outcome.failure_reason(&line.food_item_id.to_string()) {
                reasons.push(reason);
            }
        }

        if !reasons.is_empty() {
            // Collect-all: the reason enumerates every offending item.
            self.fail_order(&order, reasons.join("; ")).await?;
            return Ok(());
        }

        let (reserved, failures) = self.reserve_all(&order.items).await;
        if !failures.is_empty() {
            self.release(&reserved).await;
            metrics::counter!("saga_compensations_total").increment(1);
            self.fail_order(&order, failures.join("; ")).await?;
            return Ok(());
        }

        let confirmed = self
            .transition(order_id, |order| {
                if order.status != OrderStatus::Validating {
                    return Err(illegal(order.status, "confirm"));
                }
                if order.restaurant_owner_id.is_none() {
                    order.restaurant_owner_id = owner_id;
                }
                order.set_status(OrderStatus::Confirmed);
                Ok(())
            })
            .await?;

        metrics::counter!("orders_confirmed_total").increment(1);
        metrics::histogram!("saga_duration_seconds").record(start.elapsed().as_secs_f64());
        tracing::info!(%order_id, "order confirmed");
        self.publish(DomainEvent::order_status_updated(
            confirmed.id,
            confirmed.status,
        ))
        .await;
        Ok(())
    }

    /// Replaces an order's items (owner-only), re-entering `Validating`.
    ///
    /// Carried-over lines keep their stored price snapshot; only wholly
    /// new lines take the price from the request. The declared total must
    /// match the resolved lines within tolerance.
    ///
    /// The delta baseline is what the order actually holds reserved:
    /// the stored list for a `Confirmed` order, nothing otherwise — a
    /// `Failed` order's reservations were compensated (or never made),
    /// so retrying one reserves the new list in full.
    ///
    /// Returns the updated order together with the delta operations the
    /// caller must hand to [`run_update`](Self::run_update).
    #[tracing::instrument(skip(self, request), fields(%user_id))]
    pub async fn update_order(
        &self,
        user_id: UserId,
        order_id: OrderId,
        request: UpdateOrderRequest,
    ) -> Result<(Order, Vec<InventoryOp>)> {
        let order = self.load(order_id).await?;
        if order.user_id != user_id {
            return Err(SagaError::Forbidden(
                "only the ordering user may update an order",
            ));
        }

        let mut reserved_baseline: Vec<OrderLine> = Vec::new();
        let updated = self
            .transition(order_id, |order| {
                let resolved: Vec<OrderLine> = request
                    .items
                    .iter()
                    .map(|line| {
                        let snapshot = order
                            .items
                            .iter()
                            .find(|old| old.food_item_id == line.food_item_id)
                            .map(|old| old.unit_price)
                            .unwrap_or(line.unit_price);
                        OrderLine::new(line.food_item_id, snapshot, line.quantity)
                    })
                    .collect();
                reserved_baseline = if order.status == OrderStatus::Confirmed {
                    order.items.clone()
                } else {
                    Vec::new()
                };
                order
                    .replace_items(
                        resolved,
                        request.total_amount,
                        request.delivery_address.clone(),
                    )
                    .map_err(SagaError::from)
            })
            .await?;

        let deltas = compute_deltas(&reserved_baseline, &updated.items);
        metrics::counter!("orders_updated_total").increment(1);
        self.publish(DomainEvent::order_updated(&updated)).await;
        Ok((updated, deltas))
    }

    /// Asynchronous update phase: applies the delta operations computed by
    /// [`update_order`](Self::update_order).
    ///
    /// Restores are operational (failures logged, never blocking); if any
    /// reserve fails, the reserves that did succeed are unwound and the
    /// order is marked `Failed` with the new list left authoritative.
    #[tracing::instrument(skip(self, deltas))]
    pub async fn run_update(&self, order_id: OrderId, deltas: Vec<InventoryOp>) -> Result<()> {
        let order = self.load(order_id).await?;
        if order.status != OrderStatus::Validating {
            tracing::info!(%order_id, status = %order.status, "skipping stale update task");
            return Ok(());
        }

        let mut reserved = Vec::new();
        let mut failures = Vec::new();
        for op in &deltas {
            match *op {
                InventoryOp::Reserve {
                    food_item_id,
                    quantity,
                } => match self.reserve_with_retry(food_item_id, quantity).await {
                    Ok(()) => reserved.push((food_item_id, quantity)),
                    Err(err) => failures.push(err.to_string()),
                },
                InventoryOp::Restore {
                    food_item_id,
                    quantity,
                } => {
                    if let Err(err) = self.restore_with_retry(food_item_id, quantity).await {
                        tracing::error!(
                            %order_id, %food_item_id, quantity, error = %err,
                            "delta restore failed, stock diverged"
                        );
                    }
                }
            }
        }

        if !failures.is_empty() {
            self.release(&reserved).await;
            metrics::counter!("saga_compensations_total").increment(1);
            self.fail_order(&order, failures.join("; ")).await?;
            return Ok(());
        }

        let confirmed = self
            .transition(order_id, |order| {
                if order.status != OrderStatus::Validating {
                    return Err(illegal(order.status, "confirm"));
                }
                order.set_status(OrderStatus::Confirmed);
                Ok(())
            })
            .await?;

        metrics::counter!("orders_confirmed_total").increment(1);
        self.publish(DomainEvent::order_status_updated(
            confirmed.id,
            confirmed.status,
        ))
        .await;
        Ok(())
    }

    /// Cancels an order (owner-only, from `Validating` or `Confirmed`).
    ///
    /// The status flips synchronously; the caller spawns
    /// [`release_reservations`](Self::release_reservations) with the
    /// returned reservations so the HTTP response never waits on
    /// inventory. Only a `Confirmed` order holds reservations to give
    /// back; one cancelled mid-validation returns an empty list.
    #[tracing::instrument(skip(self), fields(%user_id))]
    pub async fn cancel_order(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<(Order, Vec<(FoodItemId, u32)>)> {
        let order = self.load(order_id).await?;
        if order.user_id != user_id {
            return Err(SagaError::Forbidden(
                "only the ordering user may cancel an order",
            ));
        }
        if !order.status.can_cancel() {
            return Err(illegal(order.status, "cancel"));
        }

        let mut reserved: Vec<(FoodItemId, u32)> = Vec::new();
        let cancelled = self
            .transition(order_id, |order| {
                if !order.status.can_cancel() {
                    return Err(illegal(order.status, "cancel"));
                }
                reserved = if order.status == OrderStatus::Confirmed {
                    order
                        .items
                        .iter()
                        .map(|line| (line.food_item_id, line.quantity))
                        .collect()
                } else {
                    Vec::new()
                };
                order.set_status(OrderStatus::Cancelled);
                Ok(())
            })
            .await?;

        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!(%order_id, "order cancelled");
        self.publish(DomainEvent::order_cancelled(&cancelled)).await;
        Ok((cancelled, reserved))
    }

    /// Compensation phase of cancellation: restores the reservations the
    /// order held when it was cancelled. Failures are logged as
    /// operational incidents, never surfaced — cancellation must not fail
    /// on downstream errors.
    #[tracing::instrument(skip(self, reserved), fields(%order_id))]
    pub async fn release_reservations(&self, order_id: OrderId, reserved: &[(FoodItemId, u32)]) {
        self.release(reserved).await;
    }

    /// Advances fulfillment status (restaurant-operator-only).
    #[tracing::instrument(skip(self), fields(%operator_id))]
    pub async fn advance_status(
        &self,
        operator_id: UserId,
        order_id: OrderId,
        next: OrderStatus,
    ) -> Result<Order> {
        let order = self.load(order_id).await?;
        if order.restaurant_owner_id != Some(operator_id) {
            return Err(SagaError::Forbidden(
                "only the restaurant owner may advance order status",
            ));
        }
        if !order.status.can_advance_to(next) {
            return Err(illegal(order.status, "advance status"));
        }

        let updated = self
            .transition(order_id, |order| {
                if !order.status.can_advance_to(next) {
                    return Err(illegal(order.status, "advance status"));
                }
                order.set_status(next);
                Ok(())
            })
            .await?;

        self.publish(DomainEvent::order_status_updated(updated.id, updated.status))
            .await;
        Ok(updated)
    }

    /// Loads an order for a requester: the ordering user or the
    /// restaurant owner.
    pub async fn get_order(&self, requester: UserId, order_id: OrderId) -> Result<Order> {
        let order = self.load(order_id).await?;
        if order.user_id != requester && order.restaurant_owner_id != Some(requester) {
            return Err(SagaError::Forbidden("order belongs to another user"));
        }
        Ok(order)
    }

    /// Lists a user's orders, newest first.
    pub async fn orders_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        Ok(self.orders.find_by_user(user_id).await?)
    }

    /// Lists a restaurant's orders, newest first. Role enforcement happens
    /// at the HTTP boundary; restaurant ownership cannot be checked here
    /// without a restaurant registry.
    pub async fn orders_by_restaurant(&self, restaurant_id: RestaurantId) -> Result<Vec<Order>> {
        Ok(self.orders.find_by_restaurant(restaurant_id).await?)
    }

    async fn load(&self, order_id: OrderId) -> Result<Order> {
        self.orders
            .get(order_id)
            .await?
            .ok_or(SagaError::OrderNotFound(order_id))
    }

    /// Concurrent validation of every line, each with bounded retries on
    /// transport failure. Outcomes are positional with the item list.
    async fn validate_all(&self, order: &Order) -> Vec<ValidationOutcome> {
        join_all(
            order
                .items
                .iter()
                .map(|line| self.validate_line(order.restaurant_id, line)),
        )
        .await
    }

    async fn validate_line(
        &self,
        restaurant_id: RestaurantId,
        line: &OrderLine,
    ) -> ValidationOutcome {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let outcome = self
                .catalog
                .validate_item(line.food_item_id, restaurant_id, line.quantity)
                .await;
            if !outcome.is_transient() || attempts >= MAX_UPSTREAM_ATTEMPTS {
                return outcome;
            }
            tracing::warn!(
                food_item_id = %line.food_item_id,
                attempts,
                "catalog unavailable, retrying validation"
            );
        }
    }

    /// Attempts to reserve every line, recording successes and failures.
    /// All lines are attempted even after a failure, so the final reason
    /// can name every item that could not be reserved.
    async fn reserve_all(&self, items: &[OrderLine]) -> (Vec<(FoodItemId, u32)>, Vec<String>) {
        let mut reserved = Vec::new();
        let mut failures = Vec::new();
        for line in items {
            match self
                .reserve_with_retry(line.food_item_id, line.quantity)
                .await
            {
                Ok(()) => reserved.push((line.food_item_id, line.quantity)),
                Err(err) => failures.push(err.to_string()),
            }
        }
        (reserved, failures)
    }

    async fn reserve_with_retry(&self, food_item_id: FoodItemId, quantity: u32) -> Result<()> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.inventory.reserve(food_item_id, quantity).await {
                Ok(()) => return Ok(()),
                Err(StoreError::Unavailable(reason)) if attempts < MAX_UPSTREAM_ATTEMPTS => {
                    tracing::warn!(%food_item_id, attempts, reason, "inventory unavailable, retrying reserve");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn restore_with_retry(&self, food_item_id: FoodItemId, quantity: u32) -> Result<()> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.inventory.restore(food_item_id, quantity).await {
                Ok(()) => return Ok(()),
                Err(StoreError::Unavailable(reason)) if attempts < MAX_UPSTREAM_ATTEMPTS => {
                    tracing::warn!(%food_item_id, attempts, reason, "inventory unavailable, retrying restore");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Restores previously reserved quantities. Failures are logged, not
    /// propagated: the order is already on its failure/cancellation path.
    async fn release(&self, reserved: &[(FoodItemId, u32)]) {
        for &(food_item_id, quantity) in reserved {
            if let Err(err) = self.restore_with_retry(food_item_id, quantity).await {
                metrics::counter!("saga_compensation_failures_total").increment(1);
                tracing::error!(
                    %food_item_id, quantity, error = %err,
                    "compensation restore failed, stock diverged"
                );
            }
        }
    }

    /// Marks the order `Failed` and publishes `order.failed`.
    async fn fail_order(&self, order: &Order, reason: String) -> Result<()> {
        metrics::counter!("orders_failed_total").increment(1);
        tracing::warn!(order_id = %order.id, reason, "order failed");
        self.transition(order.id, |order| {
            if order.status.is_terminal() {
                return Err(illegal(order.status, "mark failed"));
            }
            order.mark_failed(reason.clone());
            Ok(())
        })
        .await?;
        self.publish(DomainEvent::order_failed(order.id, order.user_id, reason))
            .await;
        Ok(())
    }

    /// Read-modify-conditional-write with a bounded retry on conflicts.
    /// Serializes concurrent writers on the same order.
    async fn transition<F>(&self, order_id: OrderId, mut apply: F) -> Result<Order>
    where
        F: FnMut(&mut Order) -> Result<()>,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let mut order = self.load(order_id).await?;
            apply(&mut order)?;
            match self.orders.update(order).await {
                Ok(updated) => return Ok(updated),
                Err(StoreError::Conflict { .. }) if attempts < MAX_CONFLICT_RETRIES => {
                    tracing::debug!(%order_id, attempts, "write conflict, re-reading order");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Publishes an event; a broker failure is logged and dropped, the
    /// stored order document stays authoritative.
    async fn publish(&self, event: DomainEvent) {
        let topic = event.topic();
        if let Err(err) = self.publisher.publish(event).await {
            tracing::error!(topic, error = %err, "event publish failed");
        }
    }
}

fn illegal(current: OrderStatus, action: &'static str) -> SagaError {
    SagaError::Domain(OrderError::IllegalTransition { current, action })
}
