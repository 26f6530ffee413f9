// Library crate for the kingdom stats server
// This file exposes the public API for integration tests

pub mod ai;
pub mod app;
pub mod config;
pub mod event;
pub mod player;
pub mod schedule;
pub mod seed;
pub mod session;
pub mod shared;
pub mod stats;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use app::{create_router, start_upload_activity, AppStateBuilder};
pub use config::AppConfig;
pub use event::{EventBus, StatsEvent};
pub use shared::{AppError, AppState};
pub use stats::{EventStatsSet, PlayerStat, StatMetric, StatsStore, StatsUploader, UploadError};
