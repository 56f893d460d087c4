use std::sync::Arc;

use tokio::sync::broadcast;

use super::types::ContentEvent;

/// In-process event bus backed by `tokio::broadcast`. Single-node: the
/// rendering layer runs in the same process and subscribes directly.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<ContentEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish an event to all current subscribers. Fire-and-forget: an
    /// event with no listeners is dropped. Returns the number of
    /// subscribers it was delivered to.
    pub fn publish(&self, event: ContentEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ContentEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let delivered = bus.publish(ContentEvent::SettingsUpdated);
        assert_eq!(delivered, 1);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, ContentEvent::SettingsUpdated));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_dropped() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(ContentEvent::SocialLinksUpdated), 0);
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);
        bus.publish(ContentEvent::Deleted {
            id: 3,
            kind: crate::content::model::ContentKind::Recipe,
        });

        assert!(matches!(
            rx1.recv().await.unwrap(),
            ContentEvent::Deleted { id: 3, .. }
        ));
        assert!(matches!(
            rx2.recv().await.unwrap(),
            ContentEvent::Deleted { id: 3, .. }
        ));
    }
}
