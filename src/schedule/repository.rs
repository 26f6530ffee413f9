use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::ScheduledEvent;
use crate::shared::AppError;

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn list_events(&self) -> Result<Vec<ScheduledEvent>, AppError>;
    async fn create_event(&self, event: &ScheduledEvent) -> Result<(), AppError>;
}

/// In-memory implementation of ScheduleRepository for development and testing
#[derive(Default)]
pub struct InMemoryScheduleRepository {
    events: RwLock<Vec<ScheduledEvent>>,
}

impl InMemoryScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<ScheduledEvent>) -> Self {
        Self {
            events: RwLock::new(events),
        }
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryScheduleRepository {
    async fn list_events(&self) -> Result<Vec<ScheduledEvent>, AppError> {
        Ok(self.events.read().await.clone())
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn create_event(&self, event: &ScheduledEvent) -> Result<(), AppError> {
        self.events.write().await.push(event.clone());
        debug!("Scheduled event stored in memory");
        Ok(())
    }
}

/// PostgreSQL implementation of schedule repository
pub struct PostgresScheduleRepository {
    pool: PgPool,
}

impl PostgresScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for PostgresScheduleRepository {
    #[instrument(skip(self))]
    async fn list_events(&self) -> Result<Vec<ScheduledEvent>, AppError> {
        sqlx::query_as::<_, ScheduledEvent>(
            "SELECT id, title, date, description FROM scheduled_events",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list scheduled events");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn create_event(&self, event: &ScheduledEvent) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO scheduled_events (id, title, date, description) VALUES ($1, $2, $3, $4)",
        )
        .bind(&event.id)
        .bind(&event.title)
        .bind(event.date)
        .bind(&event.description)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create scheduled event");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!("Scheduled event stored in database");
        Ok(())
    }
}
