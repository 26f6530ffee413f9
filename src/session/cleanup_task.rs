use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, instrument};

use super::service::SessionService;

/// Default pause between expired-session sweeps
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Periodically removes expired sessions. Runs until the task is aborted.
#[instrument(skip(session_service))]
pub async fn start_cleanup_task(session_service: Arc<SessionService>, cleanup_interval: Duration) {
    info!(
        cleanup_interval_secs = cleanup_interval.as_secs(),
        "Starting session cleanup background task"
    );

    let mut ticker = interval(cleanup_interval);

    loop {
        ticker.tick().await;

        match session_service.cleanup_expired_sessions().await {
            Ok(removed) => info!(removed, "Session cleanup completed"),
            Err(e) => error!(error = %e, "Session cleanup task failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{
        models::SessionModel,
        repository::InMemorySessionRepository,
        token::TokenConfig,
    };
    use crate::user::InMemoryUserRepository;

    #[tokio::test]
    async fn sweeps_expired_sessions_on_first_tick() {
        let expired = SessionModel::new("1111".to_string(), -1);
        let live = SessionModel::new("2222".to_string(), 7);
        let repo = Arc::new(InMemorySessionRepository::with_sessions(vec![
            expired.clone(),
            live.clone(),
        ]));
        let service = Arc::new(SessionService::new(
            repo.clone(),
            Arc::new(InMemoryUserRepository::new()),
            TokenConfig::new("test-secret", 7),
        ));

        let handle = tokio::spawn(start_cleanup_task(service, Duration::from_secs(3600)));

        for _ in 0..50 {
            if repo.session_count().await == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert!(!repo.contains(&expired.id).await);
        assert!(repo.contains(&live.id).await);
    }
}
