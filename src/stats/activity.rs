use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::models::UploadRecord;
use crate::event::{StatsEvent, StatsEventHandler};

/// Remembers the most recent upload of every event
#[derive(Debug, Default)]
pub struct UploadActivityLog {
    uploads: RwLock<HashMap<String, UploadRecord>>,
}

impl UploadActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest upload per event, most recent first
    pub async fn recent_uploads(&self) -> Vec<UploadRecord> {
        let uploads = self.uploads.read().await;
        let mut records: Vec<UploadRecord> = uploads.values().cloned().collect();
        records.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| a.event_id.cmp(&b.event_id))
        });
        records
    }

    pub async fn last_upload(&self, event_id: &str) -> Option<UploadRecord> {
        self.uploads.read().await.get(event_id).cloned()
    }
}

#[async_trait]
impl StatsEventHandler for UploadActivityLog {
    #[instrument(skip(self))]
    async fn handle(&self, event: &StatsEvent) {
        match event {
            StatsEvent::EventStatsReplaced {
                event_id,
                player_count,
            } => {
                let record = UploadRecord {
                    event_id: event_id.clone(),
                    player_count: *player_count,
                    uploaded_at: Utc::now(),
                };
                self.uploads.write().await.insert(event_id.clone(), record);
                debug!(event_id = %event_id, "Recorded upload activity");
            }
        }
    }

    fn name(&self) -> &'static str {
        "UploadActivityLog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventBus, Subscription};
    use std::sync::Arc;
    use std::time::Duration;

    fn replaced(event_id: &str, player_count: usize) -> StatsEvent {
        StatsEvent::EventStatsReplaced {
            event_id: event_id.to_string(),
            player_count,
        }
    }

    #[tokio::test]
    async fn keeps_latest_upload_per_event() {
        let log = UploadActivityLog::new();

        log.handle(&replaced("Kvk-1", 3)).await;
        log.handle(&replaced("Kvk-2", 5)).await;
        log.handle(&replaced("Kvk-1", 4)).await;

        let uploads = log.recent_uploads().await;
        assert_eq!(uploads.len(), 2);
        assert_eq!(log.last_upload("Kvk-1").await.unwrap().player_count, 4);
        assert_eq!(uploads[0].event_id, "Kvk-1");
    }

    #[tokio::test]
    async fn receives_events_through_subscription() {
        let bus = EventBus::new(8);
        let log = Arc::new(UploadActivityLog::new());
        let _handle = Subscription::new(log.clone(), bus.clone()).start();

        bus.emit(replaced("Kvk-SoC-1", 7));

        let mut recorded = None;
        for _ in 0..50 {
            recorded = log.last_upload("Kvk-SoC-1").await;
            if recorded.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(recorded.unwrap().player_count, 7);
    }
}
