use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{EventStatsSet, PlayerStat},
    repository::StatsRepository,
    StorageError,
};

pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Keyed statistics store. Hands out owned snapshots only; `replace_event`
/// is the single mutator.
pub struct StatsStore {
    repository: Arc<dyn StatsRepository>,
    timeout: Duration,
}

impl StatsStore {
    pub fn new(repository: Arc<dyn StatsRepository>) -> Self {
        Self::with_timeout(repository, DEFAULT_STORAGE_TIMEOUT)
    }

    pub fn with_timeout(repository: Arc<dyn StatsRepository>, timeout: Duration) -> Self {
        Self {
            repository,
            timeout,
        }
    }

    /// Every event with its full record sequence
    #[instrument(skip(self))]
    pub async fn get_all(&self) -> Result<EventStatsSet, StorageError> {
        let events = self.bounded(self.repository.list_events()).await?;
        debug!(event_count = events.len(), "Loaded all event stats");
        Ok(events.into_iter().collect())
    }

    /// Records for one event; empty when the event is unknown
    #[instrument(skip(self))]
    pub async fn get_event(&self, event_id: &str) -> Result<Vec<PlayerStat>, StorageError> {
        let records = self
            .bounded(self.repository.read_event(event_id))
            .await?
            .unwrap_or_default();
        debug!(event_id = %event_id, records = records.len(), "Loaded event stats");
        Ok(records)
    }

    /// Overwrites (or creates) the records of one event
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn replace_event(
        &self,
        event_id: &str,
        records: Vec<PlayerStat>,
    ) -> Result<(), StorageError> {
        self.bounded(self.repository.write_event(event_id, &records))
            .await?;
        info!(event_id = %event_id, records = records.len(), "Event stats replaced");
        Ok(())
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StorageError>>,
    ) -> Result<T, StorageError> {
        bounded(self.timeout, call).await
    }
}

/// Runs a storage call, failing with `StorageError::Timeout` once `timeout` passes
pub async fn bounded<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, StorageError>>,
) -> Result<T, StorageError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "Storage call timed out");
            Err(StorageError::Timeout(timeout))
        }
    }
}
