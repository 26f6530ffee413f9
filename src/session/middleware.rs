use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use crate::shared::{AppError, AppState};

/// JWT authentication middleware - validates Authorization Bearer header and adds SessionClaims to request.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), session::jwt_auth))
/// Handlers can then extract Extension(claims): Extension<SessionClaims>.
#[instrument(skip(state, req, next), fields(uri = %req.uri()))]
pub async fn jwt_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // no borrow of req may live across the await below
    let token = {
        let auth_header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .ok_or_else(|| {
                warn!("Missing Authorization header in request");
                AppError::Unauthorized("Missing authorization header".to_string())
            })?;

        auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                warn!("Invalid Authorization header format (expected Bearer token)");
                AppError::Unauthorized("Invalid authorization header format".to_string())
            })?
            .to_string()
    };

    let claims = match state.session_service.validate_session(&token).await {
        Ok(claims) => claims,
        Err(e) => {
            warn!("JWT authentication failed: {}", e);
            return Err(e);
        }
    };

    debug!(
        governor_id = %claims.governor_id,
        session_id = %claims.session_id,
        "Authentication successful, adding claims to request"
    );

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
