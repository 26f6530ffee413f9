use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::SessionModel;
use crate::shared::AppError;

const SESSION_COLUMNS: &str = "id, governor_id, created_at, expires_at, last_accessed";

/// Persistence for sign-in sessions. Expiry is judged by the caller; the
/// store only drops sessions when revoked or purged.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Fails with `Conflict` if the session id is already stored.
    async fn insert(&self, session: &SessionModel) -> Result<(), AppError>;

    /// Marks the session as used at `at` and returns it, or `None` if it is gone.
    async fn touch(
        &self,
        session_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<SessionModel>, AppError>;

    /// Whether a session was removed
    async fn revoke(&self, session_id: &str) -> Result<bool, AppError>;

    /// Removes every session that expired before `now`
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

fn duplicate_session() -> AppError {
    AppError::Conflict("Session already exists".to_string())
}

fn db_error(action: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        warn!(error = %e, action, "Session query failed");
        AppError::DatabaseError(e.to_string())
    }
}

/// Sessions kept in process memory, keyed by session id
#[derive(Default)]
pub struct InMemorySessionRepository {
    by_id: RwLock<HashMap<String, SessionModel>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sessions(sessions: impl IntoIterator<Item = SessionModel>) -> Self {
        Self {
            by_id: RwLock::new(
                sessions
                    .into_iter()
                    .map(|session| (session.id.clone(), session))
                    .collect(),
            ),
        }
    }

    pub async fn session_count(&self) -> usize {
        self.by_id.read().await.len()
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        self.by_id.read().await.contains_key(session_id)
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn insert(&self, session: &SessionModel) -> Result<(), AppError> {
        let mut by_id = self.by_id.write().await;
        if by_id.contains_key(&session.id) {
            return Err(duplicate_session());
        }
        by_id.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn touch(
        &self,
        session_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<SessionModel>, AppError> {
        let mut by_id = self.by_id.write().await;
        Ok(by_id.get_mut(session_id).map(|session| {
            session.touch(at);
            session.clone()
        }))
    }

    async fn revoke(&self, session_id: &str) -> Result<bool, AppError> {
        Ok(self.by_id.write().await.remove(session_id).is_some())
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut by_id = self.by_id.write().await;
        let before = by_id.len();
        by_id.retain(|_, session| session.expires_at > now);

        let purged = (before - by_id.len()) as u64;
        debug!(purged, "Expired sessions purged from memory");
        Ok(purged)
    }
}

/// Sessions stored in the `user_sessions` table
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    #[instrument(skip(self, session), fields(session_id = %session.id))]
    async fn insert(&self, session: &SessionModel) -> Result<(), AppError> {
        let sql = format!(
            "INSERT INTO user_sessions ({SESSION_COLUMNS}) VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (id) DO NOTHING"
        );
        let result = sqlx::query(&sql)
            .bind(&session.id)
            .bind(&session.governor_id)
            .bind(session.created_at)
            .bind(session.expires_at)
            .bind(session.last_accessed)
            .execute(&self.pool)
            .await
            .map_err(db_error("insert"))?;

        if result.rows_affected() == 0 {
            return Err(duplicate_session());
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn touch(
        &self,
        session_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<SessionModel>, AppError> {
        let sql = format!(
            "UPDATE user_sessions SET last_accessed = $2 WHERE id = $1 RETURNING {SESSION_COLUMNS}"
        );
        sqlx::query_as::<_, SessionModel>(&sql)
            .bind(session_id)
            .bind(at)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("touch"))
    }

    #[instrument(skip(self))]
    async fn revoke(&self, session_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("revoke"))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let purged = sqlx::query("DELETE FROM user_sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(db_error("purge"))?
            .rows_affected();

        debug!(purged, "Expired sessions purged from database");
        Ok(purged)
    }
}
