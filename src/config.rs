// Application configuration, loaded from environment variables.

use std::time::Duration;

use crate::ai::DEFAULT_GEMINI_MODEL;
use crate::session::{
    token::{DEFAULT_EXPIRATION_DAYS, DEV_SECRET},
    TokenConfig,
};
use crate::stats::store::DEFAULT_STORAGE_TIMEOUT;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Application configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Address the HTTP server listens on.
    pub bind_addr: String,
    /// Postgres connection string. In-memory storage is used when unset.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub session_expiration_days: i64,
    /// Gemini API key. AI descriptions are disabled when unset.
    pub api_key: Option<String>,
    pub gemini_model: String,
    /// Upper bound on every storage call made by the stats store.
    pub storage_timeout: Duration,
    /// Whether to load the demo kingdom on startup.
    pub seed_demo_data: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// - `BIND_ADDR` (default `0.0.0.0:3000`)
    /// - `DATABASE_URL` (unset: in-memory backends)
    /// - `JWT_SECRET`, `SESSION_EXPIRATION_DAYS` (default 365)
    /// - `API_KEY`, `GEMINI_MODEL` (default `gemini-2.5-flash`)
    /// - `STORAGE_TIMEOUT_MS` (default 5000)
    /// - `SEED_DEMO_DATA` (default on for in-memory storage, off for Postgres)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = non_blank("DATABASE_URL");

        let storage_timeout = non_blank("STORAGE_TIMEOUT_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_STORAGE_TIMEOUT);

        let seed_demo_data = non_blank("SEED_DEMO_DATA")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(database_url.is_none());

        AppConfig {
            bind_addr: non_blank("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url,
            jwt_secret: non_blank("JWT_SECRET").unwrap_or_else(|| DEV_SECRET.to_string()),
            session_expiration_days: non_blank("SESSION_EXPIRATION_DAYS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_EXPIRATION_DAYS),
            api_key: non_blank("API_KEY"),
            gemini_model: non_blank("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            storage_timeout,
            seed_demo_data,
        }
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig::new(self.jwt_secret.clone(), self.session_expiration_days)
    }
}
