//! Order endpoints.
//!
//! Place, update and cancel answer as soon as the order document is
//! written; the saga phase (validation, reservation, compensation) runs
//! in a spawned task and its outcome is observed on subsequent reads.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use catalog::CatalogClient;
use common::{OrderId, RestaurantId};
use domain::{Order, OrderStatus};
use events::EventPublisher;
use saga::{PlaceOrderRequest, SagaOrchestrator, UpdateOrderRequest};
use serde::{Deserialize, Serialize};
use store::{InventoryStore, OrderStore};

use crate::error::ApiError;
use crate::identity::Identity;

/// Shared application state accessible from all handlers.
pub struct AppState<O, I, C, P> {
    pub saga: Arc<SagaOrchestrator<O, I, C, P>>,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub message: String,
    pub order: Order,
}

#[derive(Serialize)]
pub struct OrdersResponse {
    pub success: bool,
    pub message: String,
    pub orders: Vec<Order>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// POST /api/v1/orders/place-order
#[tracing::instrument(skip(state, identity, request))]
pub async fn place<O, I, C, P>(
    State(state): State<Arc<AppState<O, I, C, P>>>,
    identity: Identity,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError>
where
    O: OrderStore + 'static,
    I: InventoryStore + 'static,
    C: CatalogClient + 'static,
    P: EventPublisher + 'static,
{
    let user_id = identity.require_customer()?;
    let order = state.saga.place_order(user_id, request).await?;

    let saga = state.saga.clone();
    let order_id = order.id;
    tokio::spawn(async move {
        if let Err(err) = saga.run_placement(order_id).await {
            tracing::error!(%order_id, error = %err, "placement saga failed");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(OrderResponse {
            success: true,
            message: "Order received, validation in progress".to_string(),
            order,
        }),
    ))
}

/// GET /api/v1/orders/get-orders
pub async fn list<O, I, C, P>(
    State(state): State<Arc<AppState<O, I, C, P>>>,
    identity: Identity,
) -> Result<Json<OrdersResponse>, ApiError>
where
    O: OrderStore,
    I: InventoryStore,
    C: CatalogClient,
    P: EventPublisher,
{
    let user_id = identity.require_customer()?;
    let orders = state.saga.orders_by_user(user_id).await?;
    Ok(Json(OrdersResponse {
        success: true,
        message: "Orders fetched".to_string(),
        orders,
    }))
}

/// GET /api/v1/orders/get-order/{id}
pub async fn get<O, I, C, P>(
    State(state): State<Arc<AppState<O, I, C, P>>>,
    identity: Identity,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderResponse>, ApiError>
where
    O: OrderStore,
    I: InventoryStore,
    C: CatalogClient,
    P: EventPublisher,
{
    let order = state.saga.get_order(identity.user_id, order_id).await?;
    Ok(Json(OrderResponse {
        success: true,
        message: "Order fetched".to_string(),
        order,
    }))
}

/// PUT /api/v1/orders/update-order/{id}
#[tracing::instrument(skip(state, identity, request))]
pub async fn update<O, I, C, P>(
    State(state): State<Arc<AppState<O, I, C, P>>>,
    identity: Identity,
    Path(order_id): Path<OrderId>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError>
where
    O: OrderStore + 'static,
    I: InventoryStore + 'static,
    C: CatalogClient + 'static,
    P: EventPublisher + 'static,
{
    let user_id = identity.require_customer()?;
    let (order, deltas) = state.saga.update_order(user_id, order_id, request).await?;

    let saga = state.saga.clone();
    tokio::spawn(async move {
        if let Err(err) = saga.run_update(order_id, deltas).await {
            tracing::error!(%order_id, error = %err, "update saga failed");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(OrderResponse {
            success: true,
            message: "Order update received, validation in progress".to_string(),
            order,
        }),
    ))
}

/// PUT /api/v1/orders/cancel-order/{id}
#[tracing::instrument(skip(state, identity))]
pub async fn cancel<O, I, C, P>(
    State(state): State<Arc<AppState<O, I, C, P>>>,
    identity: Identity,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderResponse>, ApiError>
where
    O: OrderStore + 'static,
    I: InventoryStore + 'static,
    C: CatalogClient + 'static,
    P: EventPublisher + 'static,
{
    let user_id = identity.require_customer()?;
    let (order, reserved) = state.saga.cancel_order(user_id, order_id).await?;

    // Fire-and-forget: the response never waits on inventory restores.
    // An order cancelled mid-validation holds nothing to give back.
    if !reserved.is_empty() {
        let saga = state.saga.clone();
        tokio::spawn(async move {
            saga.release_reservations(order_id, &reserved).await;
        });
    }

    Ok(Json(OrderResponse {
        success: true,
        message: "Order cancelled".to_string(),
        order,
    }))
}

/// PUT /api/v1/orders/update-order-status/{id}
#[tracing::instrument(skip(state, identity, request))]
pub async fn update_status<O, I, C, P>(
    State(state): State<Arc<AppState<O, I, C, P>>>,
    identity: Identity,
    Path(order_id): Path<OrderId>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError>
where
    O: OrderStore,
    I: InventoryStore,
    C: CatalogClient,
    P: EventPublisher,
{
    let operator_id = identity.require_owner()?;
    let order = state
        .saga
        .advance_status(operator_id, order_id, request.status)
        .await?;
    Ok(Json(OrderResponse {
        success: true,
        message: format!("Order status updated to {}", order.status),
        order,
    }))
}

/// GET /api/v1/orders/restaurant-orders/{id}
pub async fn restaurant_orders<O, I, C, P>(
    State(state): State<Arc<AppState<O, I, C, P>>>,
    identity: Identity,
    Path(restaurant_id): Path<RestaurantId>,
) -> Result<Json<OrdersResponse>, ApiError>
where
    O: OrderStore,
    I: InventoryStore,
    C: CatalogClient,
    P: EventPublisher,
{
    identity.require_owner()?;
    let orders = state.saga.orders_by_restaurant(restaurant_id).await?;
    Ok(Json(OrdersResponse {
        success: true,
        message: "Restaurant orders fetched".to_string(),
        orders,
    }))
}
