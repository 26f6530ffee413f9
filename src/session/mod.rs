// Public API - what other modules can use
pub use cleanup_task::start_cleanup_task;
pub use handlers::{current_session, login, logout, register};
pub use middleware::jwt_auth;
pub use service::SessionService;
pub use token::TokenConfig;
pub use types::{LoginRequest, RegisterRequest, SessionClaims, SessionResponse};

// Internal modules
pub mod cleanup_task;
mod handlers;
mod middleware;
pub mod models;
pub mod repository;
pub mod service;
pub mod token;
mod types;
