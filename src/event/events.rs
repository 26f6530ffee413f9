use serde::{Deserialize, Serialize};

/// Facts about changes to the statistics store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StatsEvent {
    /// An upload replaced every record of one event
    #[serde(rename_all = "camelCase")]
    EventStatsReplaced {
        event_id: String,
        player_count: usize,
    },
}

impl StatsEvent {
    /// The event identifier this change concerns
    pub fn event_id(&self) -> &str {
        match self {
            StatsEvent::EventStatsReplaced { event_id, .. } => event_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            StatsEvent::EventStatsReplaced { .. } => "event_stats_replaced",
        }
    }
}
