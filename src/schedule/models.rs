use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An upcoming guild event shown on the events board
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub description: String,
}

impl ScheduledEvent {
    pub fn new(title: String, date: DateTime<Utc>, description: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            date,
            description,
        }
    }
}
