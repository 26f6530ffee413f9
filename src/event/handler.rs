use async_trait::async_trait;

use super::events::StatsEvent;

/// Trait for components that react to statistics store changes.
/// Handlers own their failures; the subscription only routes events.
#[async_trait]
pub trait StatsEventHandler: Send + Sync {
    async fn handle(&self, event: &StatsEvent);

    /// Get a human-readable name for this handler (for logging/debugging)
    fn name(&self) -> &'static str;
}
