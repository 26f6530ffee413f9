pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;

pub use models::ScheduledEvent;
pub use repository::{InMemoryScheduleRepository, PostgresScheduleRepository, ScheduleRepository};
pub use service::ScheduleService;
