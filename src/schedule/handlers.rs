use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, instrument};

use super::{
    models::ScheduledEvent,
    types::{CreateEventRequest, DescriptionRequest, DescriptionResponse},
};
use crate::shared::{AppError, AppState};

/// GET /events
#[instrument(name = "list_events", skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScheduledEvent>>, AppError> {
    Ok(Json(state.schedule_service.list_events().await?))
}

/// POST /events
#[instrument(name = "create_event", skip(state, request))]
pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<ScheduledEvent>), AppError> {
    let event = state.schedule_service.create_event(request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// POST /events/description
///
/// Always answers 200; generator failures come back as a readable message.
#[instrument(name = "generate_description", skip(state, request), fields(title = %request.title))]
pub async fn generate_description(
    State(state): State<AppState>,
    Json(request): Json<DescriptionRequest>,
) -> Result<Json<DescriptionResponse>, AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Please enter an event title first.".to_string(),
        ));
    }

    let description = state
        .description_generator
        .generate_description(request.title.trim())
        .await;

    info!("Generated event description");
    Ok(Json(DescriptionResponse { description }))
}
