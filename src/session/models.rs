use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for user sessions table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SessionModel {
    pub id: String,
    pub governor_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
}

impl SessionModel {
    /// Creates a new session for a governor with generated ID and timestamps
    pub fn new(governor_id: String, expiration_days: i64) -> Self {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(expiration_days);

        Self {
            id: Uuid::new_v4().to_string(),
            governor_id,
            created_at: now,
            expires_at,
            last_accessed: Some(now),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Records use of the session at `at`
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_accessed = Some(at);
    }
}
