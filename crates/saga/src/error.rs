use common::OrderId;
use domain::OrderError;
use store::StoreError;
use thiserror::Error;

/// Errors surfaced to callers of the saga orchestrator.
///
/// Failures discovered after the HTTP response has already gone out are
/// never represented here; they land in the order's `failure_reason` and
/// are observed on subsequent reads.
#[derive(Debug, Error)]
pub enum SagaError {
    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Caller does not own the order (or the restaurant, for status
    /// advancement).
    #[error("Not allowed: {0}")]
    Forbidden(&'static str),

    /// Domain rule violation: empty order, bad line, total mismatch or a
    /// disallowed status transition.
    #[error(transparent)]
    Domain(#[from] OrderError),

    /// Storage-level failure, including optimistic write conflicts.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for saga operations.
pub type Result<T> = std::result::Result<T, SagaError>;
