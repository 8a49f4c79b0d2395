//! Order saga orchestration.
//!
//! Coordinates the order placement workflow across the order store, the
//! catalog service and the event bus: validation fan-out, atomic
//! inventory reservation and compensating restores on partial failure.

mod delta;
mod error;
mod orchestrator;

pub use delta::compute_deltas;
pub use error::{Result, SagaError};
pub use orchestrator::{
    MAX_UPSTREAM_ATTEMPTS, PlaceOrderRequest, SagaOrchestrator, UpdateOrderRequest,
};
