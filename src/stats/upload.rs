use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{models::UploadSummary, parser, store::StatsStore, UploadError};
use crate::event::{EventBus, StatsEvent};
use crate::player::PlayerRegistryService;

/// Turns an uploaded file into the new record set of one event
pub struct StatsUploader {
    store: Arc<StatsStore>,
    players: Arc<PlayerRegistryService>,
    event_bus: EventBus,
}

impl StatsUploader {
    pub fn new(
        store: Arc<StatsStore>,
        players: Arc<PlayerRegistryService>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            players,
            event_bus,
        }
    }

    /// Decodes and parses `raw_file`, links its rows to registered players,
    /// then replaces the records stored for `event_id`. Nothing is written
    /// unless at least one row is usable, and the records are left alone when
    /// the registry cannot be updated.
    #[instrument(skip(self, raw_file), fields(bytes = raw_file.len()))]
    pub async fn upload(
        &self,
        event_id: &str,
        raw_file: &[u8],
    ) -> Result<UploadSummary, UploadError> {
        let event_id = event_id.trim();
        if event_id.is_empty() {
            return Err(UploadError::MissingEventId);
        }

        let records = parser::parse_bytes(raw_file).map_err(|e| {
            warn!(event_id = %event_id, error = %e, "Uploaded file is not readable");
            UploadError::from(e)
        })?;

        if records.is_empty() {
            warn!(event_id = %event_id, "Could not parse any player stats from upload");
            return Err(UploadError::NoValidRows {
                event_id: event_id.to_string(),
            });
        }

        let player_count = records.len();
        self.players.record_event(event_id, &records).await?;
        self.store.replace_event(event_id, records).await?;

        self.event_bus.emit(StatsEvent::EventStatsReplaced {
            event_id: event_id.to_string(),
            player_count,
        });

        info!(event_id = %event_id, player_count, "Stats upload committed");

        Ok(UploadSummary {
            event_id: event_id.to_string(),
            player_count,
        })
    }
}
