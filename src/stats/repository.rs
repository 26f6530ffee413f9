use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::{models::PlayerStat, StorageError};

/// Storage backend for per-event player statistics
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Every stored event with its records, in stored order
    async fn list_events(&self) -> Result<Vec<(String, Vec<PlayerStat>)>, StorageError>;

    /// Replaces all records of `event_id` in one step
    async fn write_event(&self, event_id: &str, records: &[PlayerStat])
        -> Result<(), StorageError>;

    async fn read_event(&self, event_id: &str) -> Result<Option<Vec<PlayerStat>>, StorageError> {
        Ok(self
            .list_events()
            .await?
            .into_iter()
            .find(|(id, _)| id == event_id)
            .map(|(_, records)| records))
    }
}

/// In-memory implementation of StatsRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryStatsRepository {
    events: Arc<RwLock<BTreeMap<String, Vec<PlayerStat>>>>,
}

impl InMemoryStatsRepository {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Creates a repository pre-populated with events
    pub fn with_events(events: Vec<(String, Vec<PlayerStat>)>) -> Self {
        Self {
            events: Arc::new(RwLock::new(events.into_iter().collect())),
        }
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    async fn list_events(&self) -> Result<Vec<(String, Vec<PlayerStat>)>, StorageError> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .map(|(id, records)| (id.clone(), records.clone()))
            .collect())
    }

    #[instrument(skip(self, records), fields(records = records.len()))]
    async fn write_event(
        &self,
        event_id: &str,
        records: &[PlayerStat],
    ) -> Result<(), StorageError> {
        let replacement = records.to_vec();
        let mut events = self.events.write().await;
        events.insert(event_id.to_string(), replacement);
        debug!(event_id = %event_id, "Event stats replaced in memory");
        Ok(())
    }

    async fn read_event(&self, event_id: &str) -> Result<Option<Vec<PlayerStat>>, StorageError> {
        let events = self.events.read().await;
        Ok(events.get(event_id).cloned())
    }
}

/// PostgreSQL implementation of stats repository
pub struct PostgresStatsRepository {
    pool: PgPool,
}

impl PostgresStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_db(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_db(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn backend_error(e: sqlx::Error) -> StorageError {
    StorageError::Backend(e.to_string())
}

#[async_trait]
impl StatsRepository for PostgresStatsRepository {
    #[instrument(skip(self))]
    async fn list_events(&self) -> Result<Vec<(String, Vec<PlayerStat>)>, StorageError> {
        let rows = sqlx::query(
            "SELECT event_id, governor_id, name, power, kills, deaths, t5_kills, dkp \
             FROM player_stats ORDER BY event_id, position",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list event stats from database");
            backend_error(e)
        })?;

        let mut events: BTreeMap<String, Vec<PlayerStat>> = BTreeMap::new();
        for row in rows {
            let event_id: String = row.get("event_id");
            let stat = PlayerStat {
                governor_id: row.get("governor_id"),
                name: row.get("name"),
                power: from_db(row.get("power")),
                kills: from_db(row.get("kills")),
                deaths: from_db(row.get("deaths")),
                t5_kills: from_db(row.get("t5_kills")),
                dkp: from_db(row.get("dkp")),
            };

            events.entry(event_id).or_default().push(stat);
        }

        debug!(event_count = events.len(), "Event stats listed from database");
        Ok(events.into_iter().collect())
    }

    #[instrument(skip(self, records), fields(records = records.len()))]
    async fn write_event(
        &self,
        event_id: &str,
        records: &[PlayerStat],
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(backend_error)?;

        // serializes writers of the same event until commit
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(event_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, event_id = %event_id, "Failed to lock event for replacement");
                backend_error(e)
            })?;

        sqlx::query("DELETE FROM player_stats WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, event_id = %event_id, "Failed to clear event stats");
                backend_error(e)
            })?;

        for (position, stat) in records.iter().enumerate() {
            sqlx::query(
                "INSERT INTO player_stats \
                 (event_id, position, governor_id, name, power, kills, deaths, t5_kills, dkp) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(event_id)
            .bind(position as i32)
            .bind(&stat.governor_id)
            .bind(&stat.name)
            .bind(to_db(stat.power))
            .bind(to_db(stat.kills))
            .bind(to_db(stat.deaths))
            .bind(to_db(stat.t5_kills))
            .bind(to_db(stat.dkp))
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, event_id = %event_id, "Failed to insert player stat");
                backend_error(e)
            })?;
        }

        tx.commit().await.map_err(backend_error)?;

        debug!(event_id = %event_id, "Event stats replaced in database");
        Ok(())
    }
}
