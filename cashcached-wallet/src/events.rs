//! Broadcast bus for UI events.

use tokio::sync::broadcast;

use cashcached_types::UiEvent;

/// Fans out [`UiEvent`]s to every subscriber.
///
/// Each receiver sees events in publish order. A receiver that falls more
/// than `capacity` events behind skips the oldest ones.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<UiEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: UiEvent) {
        tracing::debug!(event = event.name(), "publishing ui event");
        // No subscribers is fine.
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
