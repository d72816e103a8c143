use tokio::sync::broadcast;

use super::types::RunNotification;
use crate::constants::NOTIFICATION_CHANNEL_CAPACITY;

/// Fan-out publisher for run notifications
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<PublishedNotification>,
}

/// Notification that has been published
#[derive(Debug, Clone)]
pub struct PublishedNotification {
    pub notification: RunNotification,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a notification to every current subscriber
    pub fn publish(&self, notification: RunNotification) {
        tracing::trace!(event = notification.name(), "Publishing run notification");
        let event = PublishedNotification {
            notification,
            published_at: chrono::Utc::now(),
        };

        // No subscribers is fine; a headless run has nobody listening
        let _ = self.sender.send(event);
    }

    /// Subscribe to notifications published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedNotification> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(NOTIFICATION_CHANNEL_CAPACITY)
    }
}
