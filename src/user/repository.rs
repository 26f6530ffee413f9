use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::{
    models::{AooTeam, Role, User},
    password,
};
use crate::shared::AppError;

/// Trait for user account storage
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user with an already hashed password.
    /// Fails with `Conflict` when the governor id is taken.
    async fn create_user(&self, user: &User, password_hash: &str) -> Result<(), AppError>;

    async fn get_user(&self, governor_id: &str) -> Result<Option<User>, AppError>;

    /// The stored user and its password hash
    async fn get_credentials(&self, governor_id: &str)
        -> Result<Option<(User, String)>, AppError>;

    /// Returns the user when `password` matches the stored hash
    async fn verify_credentials(
        &self,
        governor_id: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let Some((user, hash)) = self.get_credentials(governor_id).await? else {
            return Ok(None);
        };

        if password::verify_password_blocking(password.to_string(), hash).await {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}

fn duplicate_user() -> AppError {
    AppError::Conflict("Governor ID already exists.".to_string())
}

/// In-memory implementation of UserRepository for development and testing
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, (User, String)>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user, password_hash), fields(governor_id = %user.governor_id))]
    async fn create_user(&self, user: &User, password_hash: &str) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.governor_id) {
            warn!("User already exists in memory");
            return Err(duplicate_user());
        }
        users.insert(
            user.governor_id.clone(),
            (user.clone(), password_hash.to_string()),
        );

        debug!("User created in memory");
        Ok(())
    }

    async fn get_user(&self, governor_id: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.get(governor_id).map(|(user, _)| user.clone()))
    }

    async fn get_credentials(
        &self,
        governor_id: &str,
    ) -> Result<Option<(User, String)>, AppError> {
        let users = self.users.read().await;
        Ok(users.get(governor_id).cloned())
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn user_from_row(row: &sqlx::postgres::PgRow) -> Result<User, AppError> {
        let role: String = row.get("role");
        let aoo_team: String = row.get("aoo_team");

        Ok(User {
            governor_id: row.get("governor_id"),
            role: Role::from_str(&role)
                .map_err(|_| AppError::DatabaseError(format!("Unknown role '{}'", role)))?,
            aoo_team: AooTeam::from_str(&aoo_team)
                .map_err(|_| AppError::DatabaseError(format!("Unknown team '{}'", aoo_team)))?,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user, password_hash), fields(governor_id = %user.governor_id))]
    async fn create_user(&self, user: &User, password_hash: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "INSERT INTO users (governor_id, password_hash, role, aoo_team) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (governor_id) DO NOTHING",
        )
        .bind(&user.governor_id)
        .bind(password_hash)
        .bind(user.role.to_string())
        .bind(user.aoo_team.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create user in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!("User already exists in database");
            return Err(duplicate_user());
        }

        debug!("User created in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, governor_id: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .get_credentials(governor_id)
            .await?
            .map(|(user, _)| user))
    }

    #[instrument(skip(self))]
    async fn get_credentials(
        &self,
        governor_id: &str,
    ) -> Result<Option<(User, String)>, AppError> {
        let row = sqlx::query(
            "SELECT governor_id, password_hash, role, aoo_team FROM users WHERE governor_id = $1",
        )
        .bind(governor_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user from database");
            AppError::DatabaseError(e.to_string())
        })?;

        match row {
            Some(row) => {
                let user = Self::user_from_row(&row)?;
                Ok(Some((user, row.get("password_hash"))))
            }
            None => Ok(None),
        }
    }
}
