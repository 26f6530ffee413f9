use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::{info, instrument};

use super::types::{LoginRequest, RegisterRequest, SessionClaims, SessionResponse};
use crate::shared::{AppError, AppState};
use crate::user::User;

/// POST /auth/login
#[instrument(name = "login", skip(state, request), fields(governor_id = %request.governor_id))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .session_service
        .login(&request.governor_id, &request.password)
        .await?;

    info!("User signed in");
    Ok(Json(session))
}

/// POST /auth/register
#[instrument(name = "register", skip(state, request), fields(governor_id = %request.governor_id))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session = state.session_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /auth/session
#[instrument(name = "current_session", skip(state, claims))]
pub async fn current_session(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.session_service.current_user(&claims).await?))
}

/// POST /auth/logout
#[instrument(name = "logout", skip(state, claims))]
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<StatusCode, AppError> {
    state.session_service.logout(&claims.session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
