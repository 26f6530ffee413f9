use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::{
    models::{EventStatsSet, PlayerStat, StatMetric, UploadRecord, UploadSummary},
    views::{self, DashboardView, PlayerProfile},
};
use crate::session::SessionClaims;
use crate::shared::{AppError, AppState};

const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllStatsResponse {
    pub event_ids: Vec<String>,
    pub events: EventStatsSet,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub selected: Option<String>,
    pub top: Option<usize>,
    pub by: Option<StatMetric>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopQuery {
    pub n: Option<usize>,
    pub by: Option<StatMetric>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPlayersResponse {
    pub event_id: String,
    pub metric: StatMetric,
    pub players: Vec<PlayerStat>,
}

/// GET /stats
#[instrument(name = "get_all_stats", skip(state))]
pub async fn get_all_stats(
    State(state): State<AppState>,
) -> Result<Json<AllStatsResponse>, AppError> {
    let events = state.stats_store.get_all().await?;

    Ok(Json(AllStatsResponse {
        event_ids: views::sorted_event_ids(&events),
        events,
    }))
}

/// GET /stats/dashboard?selected=&top=&by=
///
/// `selected` is the caller's remembered event; it falls back to the newest
/// event when missing or stale.
#[instrument(name = "get_dashboard", skip(state))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, AppError> {
    let events = state.stats_store.get_all().await?;

    Ok(Json(views::dashboard_view(
        &events,
        query.selected.as_deref(),
        query.by.unwrap_or_default(),
        query.top.unwrap_or(DEFAULT_TOP_N),
    )))
}

/// GET /stats/events/:event_id
#[instrument(name = "get_event_stats", skip(state))]
pub async fn get_event_stats(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Vec<PlayerStat>>, AppError> {
    Ok(Json(state.stats_store.get_event(&event_id).await?))
}

/// GET /stats/events/:event_id/top?n=&by=
#[instrument(name = "get_top_players", skip(state))]
pub async fn get_top_players(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Query(query): Query<TopQuery>,
) -> Result<Json<TopPlayersResponse>, AppError> {
    let records = state.stats_store.get_event(&event_id).await?;
    let metric = query.by.unwrap_or_default();
    let players = views::top_n_by(&records, metric, query.n.unwrap_or(DEFAULT_TOP_N));

    Ok(Json(TopPlayersResponse {
        event_id,
        metric,
        players,
    }))
}

/// GET /stats/events/:event_id/export
#[instrument(name = "export_event_csv", skip(state))]
pub async fn export_event_csv(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Response, AppError> {
    let records = state.stats_store.get_event(&event_id).await?;
    if records.is_empty() {
        return Err(AppError::NotFound(
            "No data available to export.".to_string(),
        ));
    }

    info!(event_id = %event_id, rows = records.len(), "Exporting event stats");

    let disposition = format!(
        "attachment; filename=\"{}\"",
        views::export_filename(&event_id)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        views::to_csv(&records),
    )
        .into_response())
}

/// GET /stats/players/:governor_id
#[instrument(name = "get_player_profile", skip(state))]
pub async fn get_player_profile(
    State(state): State<AppState>,
    Path(governor_id): Path<String>,
) -> Result<Json<PlayerProfile>, AppError> {
    let events = state.stats_store.get_all().await?;
    let player = state.player_registry.find_by_governor_id(&governor_id).await?;

    Ok(Json(views::player_profile(
        &events,
        &governor_id,
        player.as_ref(),
    )))
}

/// GET /stats/uploads
#[instrument(name = "list_uploads", skip(state))]
pub async fn list_uploads(State(state): State<AppState>) -> Json<Vec<UploadRecord>> {
    Json(state.upload_activity.recent_uploads().await)
}

/// POST /stats/upload (multipart)
///
/// Expects a `file` part. The event identifier comes from an `eventId` part
/// when given, otherwise from the file name without its extension.
#[instrument(name = "upload_stats", skip(state, claims, multipart), fields(governor_id = %claims.governor_id))]
pub async fn upload_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    mut multipart: Multipart,
) -> Result<Json<UploadSummary>, AppError> {
    let mut explicit_event_id: Option<String> = None;
    let mut file: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!(error = %e, "Malformed multipart upload");
        AppError::BadRequest(e.to_string())
    })? {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((filename, bytes.to_vec()));
            }
            Some("eventId") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                explicit_event_id = Some(text);
            }
            _ => {}
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| AppError::BadRequest("Please select a file to upload.".to_string()))?;

    let event_id = explicit_event_id
        .filter(|id| !id.trim().is_empty())
        .or_else(|| filename.as_deref().map(event_id_from_filename))
        .unwrap_or_default();

    info!(event_id = %event_id, filename = ?filename, bytes = bytes.len(), "Received stats upload");

    let summary = state.stats_uploader.upload(&event_id, &bytes).await?;
    Ok(Json(summary))
}

/// Event identifier for an uploaded file: its name without directory or extension
pub fn event_id_from_filename(filename: &str) -> String {
    let base = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);

    match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => base.to_string(),
    }
}
