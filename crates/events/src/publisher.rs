//! Event publishing boundary.

use async_trait::async_trait;
use thiserror::Error;

use crate::event::DomainEvent;

/// Errors from the event broker.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The broker rejected or could not receive the event.
    #[error("Event broker unavailable: {0}")]
    BrokerUnavailable(String),
}

/// Publishes domain events after state changes have been persisted.
///
/// Publishing is best-effort: callers log a failed publish and move on,
/// the order document stays authoritative.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: DomainEvent) -> Result<(), PublishError>;
}
