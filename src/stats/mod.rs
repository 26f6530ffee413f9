pub mod activity;
pub mod handlers;
pub mod parser;
pub mod store;
pub mod upload;
pub mod views;

mod errors;
pub mod models;
pub mod repository;

pub use activity::UploadActivityLog;
pub use errors::{ParseError, StorageError, UploadError};
pub use models::*;
pub use repository::{InMemoryStatsRepository, PostgresStatsRepository, StatsRepository};
pub use store::StatsStore;
pub use upload::StatsUploader;
