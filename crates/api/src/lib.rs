//! HTTP boundary for the food-ordering saga platform.
//!
//! Maps the order routes onto the saga orchestrator, with identity taken
//! from gateway-forwarded headers, structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use catalog::{CatalogClient, InMemoryCatalogClient};
use events::{EventPublisher, InMemoryEventBus};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::SagaOrchestrator;
use store::{InMemoryInventoryStore, InMemoryOrderStore, InventoryStore, OrderStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Application state over the in-memory stores and event bus.
pub type DefaultState = AppState<
    InMemoryOrderStore,
    InMemoryInventoryStore,
    InMemoryCatalogClient<InMemoryInventoryStore>,
    InMemoryEventBus,
>;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<O, I, C, P>(
    state: Arc<AppState<O, I, C, P>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    O: OrderStore + 'static,
    I: InventoryStore + 'static,
    C: CatalogClient + 'static,
    P: EventPublisher + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let orders = Router::new()
        .route("/place-order", post(routes::orders::place::<O, I, C, P>))
        .route("/get-orders", get(routes::orders::list::<O, I, C, P>))
        .route("/get-order/{id}", get(routes::orders::get::<O, I, C, P>))
        .route(
            "/update-order/{id}",
            put(routes::orders::update::<O, I, C, P>),
        )
        .route(
            "/cancel-order/{id}",
            put(routes::orders::cancel::<O, I, C, P>),
        )
        .route(
            "/update-order-status/{id}",
            put(routes::orders::update_status::<O, I, C, P>),
        )
        .route(
            "/restaurant-orders/{id}",
            get(routes::orders::restaurant_orders::<O, I, C, P>),
        );

    Router::new()
        .route("/health", get(routes::health::check))
        .nest("/api/v1/orders", orders)
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state over in-memory stores, returning
/// the state plus the inventory store and event bus so the caller can
/// seed stock and wire the catalog consumer.
pub fn create_default_state() -> (Arc<DefaultState>, InMemoryInventoryStore, InMemoryEventBus) {
    let orders = InMemoryOrderStore::new();
    let inventory = InMemoryInventoryStore::new();
    let catalog = InMemoryCatalogClient::new(inventory.clone());
    let bus = InMemoryEventBus::new();

    let saga = Arc::new(SagaOrchestrator::new(
        orders,
        inventory.clone(),
        catalog,
        bus.clone(),
    ));

    (Arc::new(AppState { saga }), inventory, bus)
}
