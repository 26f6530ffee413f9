use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use kingdom::{
    app::{create_router, start_upload_activity, AppStateBuilder},
    schedule::InMemoryScheduleRepository,
    seed,
    session::TokenConfig,
    stats::{InMemoryStatsRepository, PlayerStat, StatsRepository},
    user::InMemoryUserRepository,
    AppState,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: Router,
    pub state: AppState,
    pub _activity_handle: JoinHandle<()>,
}

pub struct TestSetupBuilder {
    demo_data: bool,
    events: Vec<(String, Vec<PlayerStat>)>,
    stats_repository: Option<Arc<dyn StatsRepository>>,
    storage_timeout: Option<Duration>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            demo_data: false,
            events: vec![],
            stats_repository: None,
            storage_timeout: None,
        }
    }

    /// Loads the demo kingdom: two KvK events and account 12345/password
    pub fn with_demo_data(mut self) -> Self {
        self.demo_data = true;
        self
    }

    pub fn with_event(mut self, event_id: &str, records: Vec<PlayerStat>) -> Self {
        self.events.push((event_id.to_string(), records));
        self
    }

    #[allow(dead_code)]
    pub fn with_stats_repository(mut self, repository: Arc<dyn StatsRepository>) -> Self {
        self.stats_repository = Some(repository);
        self
    }

    #[allow(dead_code)]
    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = Some(timeout);
        self
    }

    pub async fn build(self) -> TestSetup {
        let users = Arc::new(InMemoryUserRepository::new());
        let schedule = Arc::new(InMemoryScheduleRepository::new());
        let events = self.events;
        let stats_repository = self.stats_repository.unwrap_or_else(|| {
            Arc::new(InMemoryStatsRepository::with_events(events.clone()))
                as Arc<dyn StatsRepository>
        });

        let mut builder = AppStateBuilder::new()
            .with_stats_repository(stats_repository)
            .with_user_repository(users.clone())
            .with_schedule_repository(schedule.clone())
            .with_token_config(TokenConfig::new("integration-secret", 7));
        if let Some(timeout) = self.storage_timeout {
            builder = builder.with_storage_timeout(timeout);
        }
        let state = builder.build();

        for (event_id, records) in &events {
            state
                .player_registry
                .record_event(event_id, records)
                .await
                .unwrap();
        }

        if self.demo_data {
            seed::seed_demo_data(
                &state.stats_store,
                &state.player_registry,
                users.as_ref(),
                schedule.as_ref(),
            )
            .await
            .unwrap();
        }

        let activity_handle = start_upload_activity(&state);

        TestSetup {
            app: create_router(state.clone()),
            state,
            _activity_handle: activity_handle,
        }
    }
}
