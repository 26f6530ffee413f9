use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::SessionModel,
    repository::SessionRepository,
    token::TokenConfig,
    types::{RegisterRequest, SessionClaims, SessionResponse},
};
use crate::shared::AppError;
use crate::user::{password, User, UserRepository};

const INVALID_CREDENTIALS: &str = "Invalid Governor ID or password.";

/// Service for handling sign-in, registration and session validation
pub struct SessionService {
    token_config: TokenConfig,
    repository: Arc<dyn SessionRepository>,
    users: Arc<dyn UserRepository>,
}

impl SessionService {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        users: Arc<dyn UserRepository>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            token_config,
            repository,
            users,
        }
    }

    /// Signs in with governor id and password
    #[instrument(skip(self, password))]
    pub async fn login(&self, governor_id: &str, password: &str) -> Result<SessionResponse, AppError> {
        let governor_id = governor_id.trim();
        require_credentials(governor_id, password)?;

        let user = self
            .users
            .verify_credentials(governor_id, password)
            .await?
            .ok_or_else(|| {
                warn!(governor_id = %governor_id, "Rejected login");
                AppError::Unauthorized(INVALID_CREDENTIALS.to_string())
            })?;

        self.open_session(user).await
    }

    /// Creates an account and signs it in
    #[instrument(skip(self, request), fields(governor_id = %request.governor_id))]
    pub async fn register(&self, request: RegisterRequest) -> Result<SessionResponse, AppError> {
        let governor_id = request.governor_id.trim();
        require_credentials(governor_id, &request.password)?;

        let user = User::new(governor_id, request.role, request.aoo_team);
        let hash = password::hash_password_blocking(request.password).await?;
        self.users.create_user(&user, &hash).await?;

        info!(governor_id = %user.governor_id, role = %user.role, "Registered new user");
        self.open_session(user).await
    }

    async fn open_session(&self, user: User) -> Result<SessionResponse, AppError> {
        let session = SessionModel::new(user.governor_id.clone(), self.token_config.expiration_days);
        self.repository.insert(&session).await?;

        let token = match self
            .token_config
            .create_token(session.id.clone(), user.governor_id.clone())
        {
            Ok(token) => token,
            Err(e) => {
                // no token means nobody can use the row
                if let Err(cleanup) = self.repository.revoke(&session.id).await {
                    warn!(error = %cleanup, "Failed to remove orphaned session");
                }
                return Err(e);
            }
        };

        info!(governor_id = %user.governor_id, session_id = %session.id, "Session opened");
        Ok(SessionResponse { token, user })
    }

    /// Validates a session token and returns the claims if valid
    #[instrument(skip(self, token))]
    pub async fn validate_session(&self, token: &str) -> Result<SessionClaims, AppError> {
        let claims = self.token_config.validate_token(token)?;

        match self.repository.touch(&claims.session_id, Utc::now()).await? {
            Some(session_model) => {
                if session_model.is_expired() {
                    warn!(
                        session_id = %claims.session_id,
                        "Session found in database but has expired"
                    );
                    return Err(AppError::Unauthorized("Session has expired".to_string()));
                }

                Ok(claims)
            }
            None => {
                warn!(
                    session_id = %claims.session_id,
                    "Session not found in database - may have been revoked"
                );
                Err(AppError::Unauthorized(
                    "Session not found or has been revoked".to_string(),
                ))
            }
        }
    }

    /// The user a validated session belongs to
    #[instrument(skip(self, claims), fields(governor_id = %claims.governor_id))]
    pub async fn current_user(&self, claims: &SessionClaims) -> Result<User, AppError> {
        self.users
            .get_user(&claims.governor_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("No active session.".to_string()))
    }

    /// Revokes a session by removing it from the database
    #[instrument(skip(self))]
    pub async fn logout(&self, session_id: &str) -> Result<(), AppError> {
        if !self.repository.revoke(session_id).await? {
            warn!(session_id = %session_id, "Session not found for logout");
            return Err(AppError::NotFound("Session not found".to_string()));
        }
        info!(session_id = %session_id, "Session revoked");
        Ok(())
    }

    /// Cleans up expired sessions from the database
    #[instrument(skip(self))]
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, AppError> {
        let removed_count = self.repository.purge_expired(Utc::now()).await?;

        info!(
            removed_sessions = removed_count,
            "Expired sessions cleanup completed"
        );
        Ok(removed_count)
    }
}

fn require_credentials(governor_id: &str, password: &str) -> Result<(), AppError> {
    if governor_id.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "Governor ID and password cannot be empty.".to_string(),
        ));
    }
    Ok(())
}
