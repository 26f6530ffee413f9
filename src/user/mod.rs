pub mod models;
pub mod password;
pub mod repository;

pub use models::{AooTeam, Role, User};
pub use repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
