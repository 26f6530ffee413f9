use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{bus::EventBus, handler::StatsEventHandler};

/// Routes events from the bus to one handler on a background task
pub struct Subscription {
    handler: Arc<dyn StatsEventHandler>,
    event_bus: EventBus,
}

impl Subscription {
    pub fn new(handler: Arc<dyn StatsEventHandler>, event_bus: EventBus) -> Self {
        Self { handler, event_bus }
    }

    /// Subscribes immediately, then spawns the task that feeds the handler.
    /// Events emitted after this returns are guaranteed to be delivered.
    pub fn start(self) -> JoinHandle<()> {
        let Subscription { handler, event_bus } = self;
        let handler_name = handler.name();
        // Only the receiver is kept so the channel closes with the bus
        let mut receiver = event_bus.subscribe();
        drop(event_bus);

        info!(handler = handler_name, "Starting stats event subscription");

        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        debug!(
                            handler = handler_name,
                            event_id = event.event_id(),
                            "Received stats event"
                        );

                        handler.handle(&event).await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(handler = handler_name, skipped, "Subscription lagged behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            info!(handler = handler_name, "Stats event subscription ended");
        })
    }
}
