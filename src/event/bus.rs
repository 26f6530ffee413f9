use tokio::sync::broadcast;
use tracing::debug;

use super::events::StatsEvent;

const DEFAULT_CAPACITY: usize = 100;

/// Broadcasts store change events to every subscriber
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StatsEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emits an event to all current subscribers
    pub fn emit(&self, event: StatsEvent) {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(
                    event_type,
                    receivers = receiver_count,
                    "Stats event emitted"
                );
            }
            Err(_) => {
                debug!(event_type, "Stats event emitted with no receivers");
            }
        }
    }

    /// Subscribe to all subsequent events
    pub fn subscribe(&self) -> broadcast::Receiver<StatsEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
