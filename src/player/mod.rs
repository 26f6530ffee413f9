pub mod handlers;
pub mod models;
pub mod registry;
pub mod repository;
pub mod service;

pub use handlers::list_players;
pub use models::RegisteredPlayer;
pub use registry::PlayerRegistry;
pub use repository::{InMemoryPlayerRepository, PlayerRepository, PostgresPlayerRepository};
pub use service::PlayerRegistryService;
