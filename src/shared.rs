use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::ai::DescriptionGenerator;
use crate::event::EventBus;
use crate::player::PlayerRegistryService;
use crate::schedule::ScheduleService;
use crate::session::service::SessionService;
use crate::stats::{StatsStore, StatsUploader, StorageError, UploadActivityLog, UploadError};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub stats_store: Arc<StatsStore>,
    pub stats_uploader: Arc<StatsUploader>,
    pub upload_activity: Arc<UploadActivityLog>,
    pub player_registry: Arc<PlayerRegistryService>,
    pub session_service: Arc<SessionService>,
    pub schedule_service: Arc<ScheduleService>,
    pub description_generator: Arc<dyn DescriptionGenerator>,
    pub event_bus: EventBus,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::JwtError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Backend(msg) => AppError::DatabaseError(msg),
            timeout @ StorageError::Timeout(_) => AppError::Timeout(timeout.to_string()),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingEventId | UploadError::UnreadableFile(_) => {
                AppError::BadRequest(err.to_string())
            }
            UploadError::NoValidRows { .. } => AppError::Unprocessable(err.to_string()),
            UploadError::StorageFailure(msg) => AppError::DatabaseError(msg),
            UploadError::StorageTimeout(_) => AppError::Timeout(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn status_and_message(err: AppError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (status, json["error"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn upload_errors_map_to_statuses() {
        let (status, message) = status_and_message(
            UploadError::NoValidRows {
                event_id: "Kvk-1".to_string(),
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(message.contains("Kvk-1"));

        let (status, _) = status_and_message(UploadError::MissingEventId.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            status_and_message(UploadError::StorageTimeout(Duration::from_secs(5)).into()).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);

        let (status, message) =
            status_and_message(UploadError::StorageFailure("disk full".to_string()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Database error: disk full");
    }

    #[tokio::test]
    async fn storage_errors_map_to_statuses() {
        let (status, _) =
            status_and_message(StorageError::Timeout(Duration::from_millis(10)).into()).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);

        let (status, _) =
            status_and_message(StorageError::Backend("boom".to_string()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
