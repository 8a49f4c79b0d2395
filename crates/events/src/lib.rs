//! Domain events for the order saga.
//!
//! Orders publish lifecycle events ([`DomainEvent`]) through an
//! [`EventPublisher`]; the catalog side consumes `restaurant.deleted`
//! to force items of a removed restaurant off the menu. The in-process
//! [`InMemoryEventBus`] stands in for the broker in tests and
//! single-node deployments.

mod bus;
mod consumer;
mod event;
mod publisher;
pub mod topics;

pub use bus::InMemoryEventBus;
pub use consumer::{handle_catalog_event, run_catalog_consumer};
pub use event::{
    DomainEvent, OrderCancelledData, OrderFailedData, OrderPlacedData, OrderStatusUpdatedData,
    OrderUpdatedData, RestaurantDeletedData,
};
pub use publisher::{EventPublisher, PublishError};
