use axum::{extract::State, Json};
use tracing::instrument;

use super::models::RegisteredPlayer;
use crate::shared::{AppError, AppState};

/// GET /players
#[instrument(name = "list_players", skip(state))]
pub async fn list_players(
    State(state): State<AppState>,
) -> Result<Json<Vec<RegisteredPlayer>>, AppError> {
    Ok(Json(state.player_registry.list_players().await?))
}
