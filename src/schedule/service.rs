use std::sync::Arc;
use tracing::{info, instrument};

use super::{models::ScheduledEvent, repository::ScheduleRepository, types::CreateEventRequest};
use crate::shared::AppError;

pub struct ScheduleService {
    repository: Arc<dyn ScheduleRepository>,
}

impl ScheduleService {
    pub fn new(repository: Arc<dyn ScheduleRepository>) -> Self {
        Self { repository }
    }

    /// All scheduled events, soonest first
    pub async fn list_events(&self) -> Result<Vec<ScheduledEvent>, AppError> {
        let mut events = self.repository.list_events().await?;
        events.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(events)
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create_event(
        &self,
        request: CreateEventRequest,
    ) -> Result<ScheduledEvent, AppError> {
        let title = request.title.trim();
        let description = request.description.trim();
        if title.is_empty() || description.is_empty() {
            return Err(AppError::BadRequest("Please fill all fields.".to_string()));
        }

        let event = ScheduledEvent::new(title.to_string(), request.date, description.to_string());
        self.repository.create_event(&event).await?;

        info!(event_id = %event.id, date = %event.date, "Scheduled event created");
        Ok(event)
    }
}
