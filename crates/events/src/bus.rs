//! In-process event bus.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::event::DomainEvent;
use crate::publisher::{EventPublisher, PublishError};

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct BusState {
    published: Vec<DomainEvent>,
    fail_publish: bool,
}

/// Broadcast-backed event bus for tests and single-node deployments.
///
/// Every published event is appended to an inspection log and fanned out
/// to all live subscribers. Lagging subscribers lose old events, same as
/// a broker consumer that falls behind its retention window.
#[derive(Debug, Clone)]
pub struct InMemoryEventBus {
    state: Arc<Mutex<BusState>>,
    sender: broadcast::Sender<DomainEvent>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(BusState::default())),
            sender,
        }
    }

    /// Opens a new subscription receiving events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    /// All events published so far, in order.
    pub fn published(&self) -> Vec<DomainEvent> {
        self.state.lock().unwrap().published.clone()
    }

    /// Topics of all events published so far, in order.
    pub fn published_topics(&self) -> Vec<&'static str> {
        self.state
            .lock()
            .unwrap()
            .published
            .iter()
            .map(DomainEvent::topic)
            .collect()
    }

    /// Clears the inspection log.
    pub fn clear(&self) {
        self.state.lock().unwrap().published.clear();
    }

    /// Test hook: make subsequent publishes fail.
    pub fn set_fail_publish(&self, fail: bool) {
        self.state.lock().unwrap().fail_publish = fail;
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: DomainEvent) -> Result<(), PublishError> {
        {
            let mut state = self.state.lock().unwrap();
            if state.fail_publish {
                return Err(PublishError::BrokerUnavailable(
                    "publish failure injected".to_string(),
                ));
            }
            state.published.push(event.clone());
        }
        metrics::counter!("events_published_total", "topic" => event.topic()).increment(1);
        // No subscribers is fine; the log above is still authoritative.
        let _ = self.sender.send(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{OrderId, RestaurantId, UserId};
    use domain::OrderStatus;

    #[tokio::test]
    async fn publish_appends_to_log_and_fans_out() {
        let bus = InMemoryEventBus::new();
        let mut receiver = bus.subscribe();

        let event = DomainEvent::order_status_updated(OrderId::new(), OrderStatus::Preparing);
        bus.publish(event.clone()).await.unwrap();

        assert_eq!(bus.published_topics(), vec!["order.status.updated"]);
        let received = receiver.recv().await.unwrap();
        assert_eq!(received.key(), event.key());
    }

    #[tokio::test]
    async fn publish_without_subscribers_succeeds() {
        let bus = InMemoryEventBus::new();
        bus.publish(DomainEvent::restaurant_deleted(RestaurantId::new()))
            .await
            .unwrap();
        assert_eq!(bus.published().len(), 1);
    }

    #[tokio::test]
    async fn injected_failure_reaches_the_caller_and_skips_the_log() {
        let bus = InMemoryEventBus::new();
        bus.set_fail_publish(true);

        let result = bus
            .publish(DomainEvent::order_failed(
                OrderId::new(),
                UserId::new(),
                "no stock",
            ))
            .await;

        assert!(matches!(result, Err(PublishError::BrokerUnavailable(_))));
        assert!(bus.published().is_empty());
    }
}
