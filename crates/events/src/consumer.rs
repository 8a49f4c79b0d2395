//! Catalog-side event consumer.
//!
//! Reacts to `restaurant.deleted` by force-clearing availability on every
//! item of the removed restaurant. Order events pass through untouched;
//! the catalog does not care about them.

use store::InventoryStore;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::event::DomainEvent;

/// Applies one event to the catalog. Deactivation is idempotent, so a
/// redelivered event is harmless.
pub async fn handle_catalog_event<I: InventoryStore>(inventory: &I, event: &DomainEvent) {
    if let DomainEvent::RestaurantDeleted(data) = event {
        match inventory.deactivate_restaurant(data.restaurant_id).await {
            Ok(affected) => {
                tracing::info!(
                    restaurant_id = %data.restaurant_id,
                    affected,
                    "deactivated items of deleted restaurant"
                );
                metrics::counter!("catalog_restaurant_deactivations_total").increment(1);
            }
            Err(err) => {
                tracing::error!(
                    restaurant_id = %data.restaurant_id,
                    error = %err,
                    "failed to deactivate restaurant items"
                );
            }
        }
    }
}

/// Consumes events until the channel closes.
///
/// A lagged receiver logs the gap and keeps going; missed deletions are
/// recovered on the next redelivery.
pub async fn run_catalog_consumer<I: InventoryStore>(
    mut receiver: broadcast::Receiver<DomainEvent>,
    inventory: I,
) {
    loop {
        match receiver.recv().await {
            Ok(event) => handle_catalog_event(&inventory, &event).await,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "catalog consumer lagged, events dropped");
            }
            Err(RecvError::Closed) => {
                tracing::info!("event bus closed, catalog consumer stopping");
                return;
            }
        }
    }
}
