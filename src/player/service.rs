use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use super::{models::RegisteredPlayer, repository::PlayerRepository};
use crate::stats::{
    store::{bounded, DEFAULT_STORAGE_TIMEOUT},
    PlayerStat, StorageError,
};

/// Links governor ids and names across events to the players behind them
pub struct PlayerRegistryService {
    repository: Arc<dyn PlayerRepository>,
    // one load-resolve-save cycle at a time
    write_lock: Mutex<()>,
    timeout: Duration,
}

impl PlayerRegistryService {
    pub fn new(repository: Arc<dyn PlayerRepository>) -> Self {
        Self::with_timeout(repository, DEFAULT_STORAGE_TIMEOUT)
    }

    pub fn with_timeout(repository: Arc<dyn PlayerRepository>, timeout: Duration) -> Self {
        Self {
            repository,
            write_lock: Mutex::new(()),
            timeout,
        }
    }

    /// Resolves every record of `event_id` against the registry and stores
    /// the players it touched. Returns how many that was.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn record_event(
        &self,
        event_id: &str,
        records: &[PlayerStat],
    ) -> Result<usize, StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut registry = bounded(self.timeout, self.repository.load_registry()).await?;
        let known_before = registry.len();

        let touched = registry.record_event(event_id, records, Utc::now());
        let changed: Vec<RegisteredPlayer> = touched
            .iter()
            .filter_map(|player_id| registry.get(player_id))
            .cloned()
            .collect();

        bounded(self.timeout, self.repository.save_players(&changed)).await?;

        info!(
            event_id = %event_id,
            players = changed.len(),
            new_players = registry.len() - known_before,
            "Player registry updated"
        );
        Ok(changed.len())
    }

    /// The player who has used `governor_id`, if any
    pub async fn find_by_governor_id(
        &self,
        governor_id: &str,
    ) -> Result<Option<RegisteredPlayer>, StorageError> {
        let registry = bounded(self.timeout, self.repository.load_registry()).await?;
        Ok(registry.find_by_governor_id(governor_id).cloned())
    }

    /// Every registered player, by primary name
    pub async fn list_players(&self) -> Result<Vec<RegisteredPlayer>, StorageError> {
        let registry = bounded(self.timeout, self.repository.load_registry()).await?;
        let mut players: Vec<RegisteredPlayer> = registry.players().cloned().collect();
        players.sort_by(|a, b| {
            a.primary_name
                .cmp(&b.primary_name)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });
        Ok(players)
    }
}
