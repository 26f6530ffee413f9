use kingdom::{
    ai::GeminiDescriptionGenerator,
    app::{create_router, start_upload_activity, AppStateBuilder},
    config::AppConfig,
    player::{InMemoryPlayerRepository, PlayerRepository, PostgresPlayerRepository},
    schedule::{InMemoryScheduleRepository, PostgresScheduleRepository, ScheduleRepository},
    seed,
    session::{
        cleanup_task::{start_cleanup_task, DEFAULT_CLEANUP_INTERVAL},
        repository::{InMemorySessionRepository, PostgresSessionRepository, SessionRepository},
    },
    stats::{InMemoryStatsRepository, PostgresStatsRepository, StatsRepository},
    user::{InMemoryUserRepository, PostgresUserRepository, UserRepository},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct Repositories {
    stats: Arc<dyn StatsRepository>,
    players: Arc<dyn PlayerRepository>,
    sessions: Arc<dyn SessionRepository>,
    users: Arc<dyn UserRepository>,
    schedule: Arc<dyn ScheduleRepository>,
}

async fn connect_repositories(
    database_url: Option<&str>,
) -> Result<Repositories, Box<dyn std::error::Error>> {
    let Some(database_url) = database_url else {
        info!("DATABASE_URL not set, using in-memory storage");
        return Ok(Repositories {
            stats: Arc::new(InMemoryStatsRepository::new()),
            players: Arc::new(InMemoryPlayerRepository::new()),
            sessions: Arc::new(InMemorySessionRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            schedule: Arc::new(InMemoryScheduleRepository::new()),
        });
    };

    let pool = sqlx::PgPool::connect(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Connected to PostgreSQL and applied migrations");

    Ok(Repositories {
        stats: Arc::new(PostgresStatsRepository::new(pool.clone())),
        players: Arc::new(PostgresPlayerRepository::new(pool.clone())),
        sessions: Arc::new(PostgresSessionRepository::new(pool.clone())),
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        schedule: Arc::new(PostgresScheduleRepository::new(pool)),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kingdom=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting kingdom stats server");

    let config = AppConfig::from_env();
    let repositories = connect_repositories(config.database_url.as_deref()).await?;

    let app_state = AppStateBuilder::new()
        .with_stats_repository(repositories.stats)
        .with_player_repository(repositories.players)
        .with_session_repository(repositories.sessions)
        .with_user_repository(repositories.users.clone())
        .with_schedule_repository(repositories.schedule.clone())
        .with_description_generator(Arc::new(GeminiDescriptionGenerator::new(
            config.api_key.clone(),
            config.gemini_model.clone(),
        )))
        .with_token_config(config.token_config())
        .with_storage_timeout(config.storage_timeout)
        .build();

    if config.seed_demo_data {
        if let Err(e) = seed::seed_demo_data(
            &app_state.stats_store,
            &app_state.player_registry,
            repositories.users.as_ref(),
            repositories.schedule.as_ref(),
        )
        .await
        {
            error!(error = %e, "Failed to load demo data");
        }
    }

    let _upload_activity = start_upload_activity(&app_state);
    tokio::spawn(start_cleanup_task(
        app_state.session_service.clone(),
        DEFAULT_CLEANUP_INTERVAL,
    ));

    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
