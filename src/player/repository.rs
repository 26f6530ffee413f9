use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::{models::RegisteredPlayer, registry::PlayerRegistry};
use crate::stats::StorageError;

/// Storage for the player registry
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn load_registry(&self) -> Result<PlayerRegistry, StorageError>;

    /// Inserts the given players or overwrites their stored versions
    async fn save_players(&self, players: &[RegisteredPlayer]) -> Result<(), StorageError>;
}

/// In-memory implementation of PlayerRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryPlayerRepository {
    players: RwLock<BTreeMap<String, RegisteredPlayer>>,
}

impl InMemoryPlayerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    async fn load_registry(&self) -> Result<PlayerRegistry, StorageError> {
        let players = self.players.read().await;
        Ok(players.values().cloned().collect())
    }

    #[instrument(skip(self, players), fields(players = players.len()))]
    async fn save_players(&self, players: &[RegisteredPlayer]) -> Result<(), StorageError> {
        let mut stored = self.players.write().await;
        for player in players {
            stored.insert(player.player_id.clone(), player.clone());
        }
        debug!("Players saved in memory");
        Ok(())
    }
}

/// PostgreSQL implementation of player repository
pub struct PostgresPlayerRepository {
    pool: PgPool,
}

impl PostgresPlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn player_from_row(row: &sqlx::postgres::PgRow) -> RegisteredPlayer {
        let active_events: Vec<String> = row.get("active_events");
        RegisteredPlayer {
            player_id: row.get("player_id"),
            primary_name: row.get("primary_name"),
            known_governor_ids: row.get("known_governor_ids"),
            known_governor_names: row.get("known_governor_names"),
            current_governor_id: row.get("current_governor_id"),
            current_governor_name: row.get("current_governor_name"),
            active_events: active_events.into_iter().collect(),
            first_seen_event: row.get("first_seen_event"),
            last_seen_event: row.get("last_seen_event"),
            last_updated: row.get("last_updated"),
        }
    }
}

fn backend_error(e: sqlx::Error) -> StorageError {
    StorageError::Backend(e.to_string())
}

#[async_trait]
impl PlayerRepository for PostgresPlayerRepository {
    #[instrument(skip(self))]
    async fn load_registry(&self) -> Result<PlayerRegistry, StorageError> {
        let rows = sqlx::query(
            "SELECT player_id, primary_name, known_governor_ids, known_governor_names, \
             current_governor_id, current_governor_name, active_events, \
             first_seen_event, last_seen_event, last_updated FROM players",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to load player registry from database");
            backend_error(e)
        })?;

        debug!(players = rows.len(), "Player registry loaded from database");
        Ok(rows.iter().map(Self::player_from_row).collect())
    }

    #[instrument(skip(self, players), fields(players = players.len()))]
    async fn save_players(&self, players: &[RegisteredPlayer]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(backend_error)?;

        for player in players {
            let active_events: Vec<String> = player.active_events.iter().cloned().collect();

            sqlx::query(
                "INSERT INTO players (player_id, primary_name, known_governor_ids, \
                 known_governor_names, current_governor_id, current_governor_name, \
                 active_events, first_seen_event, last_seen_event, last_updated) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
                 ON CONFLICT (player_id) DO UPDATE SET \
                 known_governor_ids = EXCLUDED.known_governor_ids, \
                 known_governor_names = EXCLUDED.known_governor_names, \
                 current_governor_id = EXCLUDED.current_governor_id, \
                 current_governor_name = EXCLUDED.current_governor_name, \
                 active_events = EXCLUDED.active_events, \
                 first_seen_event = EXCLUDED.first_seen_event, \
                 last_seen_event = EXCLUDED.last_seen_event, \
                 last_updated = EXCLUDED.last_updated",
            )
            .bind(&player.player_id)
            .bind(&player.primary_name)
            .bind(&player.known_governor_ids)
            .bind(&player.known_governor_names)
            .bind(&player.current_governor_id)
            .bind(&player.current_governor_name)
            .bind(&active_events)
            .bind(&player.first_seen_event)
            .bind(&player.last_seen_event)
            .bind(player.last_updated)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, player_id = %player.player_id, "Failed to save player");
                backend_error(e)
            })?;
        }

        tx.commit().await.map_err(backend_error)?;

        debug!("Players saved in database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn saved_players_load_back() {
        let repo = InMemoryPlayerRepository::new();
        let alice = RegisteredPlayer::new("1111", "Alice", "Kvk-1", Utc::now());

        repo.save_players(std::slice::from_ref(&alice)).await.unwrap();

        let registry = repo.load_registry().await.unwrap();
        assert_eq!(registry.get(&alice.player_id), Some(&alice));
    }

    #[tokio::test]
    async fn saving_again_overwrites() {
        let repo = InMemoryPlayerRepository::new();
        let mut alice = RegisteredPlayer::new("1111", "Alice", "Kvk-1", Utc::now());
        repo.save_players(std::slice::from_ref(&alice)).await.unwrap();

        alice.observe("9111", "Alice", "Kvk-2", Utc::now());
        repo.save_players(std::slice::from_ref(&alice)).await.unwrap();

        let registry = repo.load_registry().await.unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(&alice.player_id).unwrap().known_governor_ids,
            vec!["1111", "9111"]
        );
    }
}
