use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::ai::{DescriptionGenerator, GeminiDescriptionGenerator, DEFAULT_GEMINI_MODEL};
use crate::event::{EventBus, Subscription};
use crate::player::{self, InMemoryPlayerRepository, PlayerRegistryService, PlayerRepository};
use crate::schedule::{self, InMemoryScheduleRepository, ScheduleRepository, ScheduleService};
use crate::session::{
    self,
    repository::{InMemorySessionRepository, SessionRepository},
    SessionService, TokenConfig,
};
use crate::shared::AppState;
use crate::stats::{
    handlers as stats_handlers, store::DEFAULT_STORAGE_TIMEOUT, InMemoryStatsRepository,
    StatsRepository, StatsStore, StatsUploader, UploadActivityLog,
};
use crate::user::{InMemoryUserRepository, UserRepository};

/// Wires repositories and services into an AppState.
/// Every collaborator defaults to its in-memory implementation.
pub struct AppStateBuilder {
    stats_repository: Arc<dyn StatsRepository>,
    player_repository: Arc<dyn PlayerRepository>,
    session_repository: Arc<dyn SessionRepository>,
    user_repository: Arc<dyn UserRepository>,
    schedule_repository: Arc<dyn ScheduleRepository>,
    description_generator: Option<Arc<dyn DescriptionGenerator>>,
    token_config: TokenConfig,
    storage_timeout: Duration,
    event_bus: EventBus,
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self {
            stats_repository: Arc::new(InMemoryStatsRepository::new()),
            player_repository: Arc::new(InMemoryPlayerRepository::new()),
            session_repository: Arc::new(InMemorySessionRepository::new()),
            user_repository: Arc::new(InMemoryUserRepository::new()),
            schedule_repository: Arc::new(InMemoryScheduleRepository::new()),
            description_generator: None,
            token_config: TokenConfig::from_env(),
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
            event_bus: EventBus::default(),
        }
    }

    pub fn with_stats_repository(mut self, repository: Arc<dyn StatsRepository>) -> Self {
        self.stats_repository = repository;
        self
    }

    pub fn with_player_repository(mut self, repository: Arc<dyn PlayerRepository>) -> Self {
        self.player_repository = repository;
        self
    }

    pub fn with_session_repository(mut self, repository: Arc<dyn SessionRepository>) -> Self {
        self.session_repository = repository;
        self
    }

    pub fn with_user_repository(mut self, repository: Arc<dyn UserRepository>) -> Self {
        self.user_repository = repository;
        self
    }

    pub fn with_schedule_repository(mut self, repository: Arc<dyn ScheduleRepository>) -> Self {
        self.schedule_repository = repository;
        self
    }

    pub fn with_description_generator(
        mut self,
        generator: Arc<dyn DescriptionGenerator>,
    ) -> Self {
        self.description_generator = Some(generator);
        self
    }

    pub fn with_token_config(mut self, token_config: TokenConfig) -> Self {
        self.token_config = token_config;
        self
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    pub fn build(self) -> AppState {
        let stats_store = Arc::new(StatsStore::with_timeout(
            self.stats_repository,
            self.storage_timeout,
        ));
        let player_registry = Arc::new(PlayerRegistryService::with_timeout(
            self.player_repository,
            self.storage_timeout,
        ));
        let stats_uploader = Arc::new(StatsUploader::new(
            stats_store.clone(),
            player_registry.clone(),
            self.event_bus.clone(),
        ));
        let description_generator = self.description_generator.unwrap_or_else(|| {
            Arc::new(GeminiDescriptionGenerator::new(None, DEFAULT_GEMINI_MODEL))
        });

        AppState {
            stats_store,
            stats_uploader,
            upload_activity: Arc::new(UploadActivityLog::new()),
            player_registry,
            session_service: Arc::new(SessionService::new(
                self.session_repository,
                self.user_repository,
                self.token_config,
            )),
            schedule_service: Arc::new(ScheduleService::new(self.schedule_repository)),
            description_generator,
            event_bus: self.event_bus,
        }
    }
}

/// Feeds upload notifications into the state's activity log
pub fn start_upload_activity(state: &AppState) -> JoinHandle<()> {
    Subscription::new(state.upload_activity.clone(), state.event_bus.clone()).start()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// The full HTTP surface. Writes require a bearer session token.
pub fn create_router(state: AppState) -> Router {
    let auth = middleware::from_fn_with_state(state.clone(), session::jwt_auth);

    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(session::login))
        .route("/auth/register", post(session::register))
        .route(
            "/auth/session",
            get(session::current_session).route_layer(auth.clone()),
        )
        .route(
            "/auth/logout",
            post(session::logout).route_layer(auth.clone()),
        )
        .route("/stats", get(stats_handlers::get_all_stats))
        .route("/stats/dashboard", get(stats_handlers::get_dashboard))
        .route("/stats/events/:event_id", get(stats_handlers::get_event_stats))
        .route(
            "/stats/events/:event_id/top",
            get(stats_handlers::get_top_players),
        )
        .route(
            "/stats/events/:event_id/export",
            get(stats_handlers::export_event_csv),
        )
        .route(
            "/stats/players/:governor_id",
            get(stats_handlers::get_player_profile),
        )
        .route("/stats/uploads", get(stats_handlers::list_uploads))
        .route("/players", get(player::list_players))
        .route(
            "/stats/upload",
            post(stats_handlers::upload_stats).route_layer(auth.clone()),
        )
        .route(
            "/events",
            get(schedule::handlers::list_events)
                .merge(post(schedule::handlers::create_event).route_layer(auth.clone())),
        )
        .route(
            "/events/description",
            post(schedule::handlers::generate_description).route_layer(auth),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
