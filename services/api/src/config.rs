//! Service configuration
//!
//! Settings come from `API_`-prefixed environment variables layered over
//! built-in defaults. Database settings are read separately through
//! [`common::database::DatabaseConfig`].

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::time::Duration;

use crate::rate_limiter::RateLimiterConfig;

/// Where records are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Attendance service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Socket address the HTTP server binds to
    pub bind_addr: String,
    /// Storage backend
    pub storage: StorageBackend,
    /// Expose `POST /api/reset`, which wipes every collection
    pub enable_reset: bool,
    /// Sign-in attempts allowed per email within the window
    pub signin_max_attempts: u32,
    /// Sign-in attempt window in seconds
    pub signin_window_seconds: u64,
    /// How long an email stays blocked after exceeding the limit, in seconds
    pub signin_ban_seconds: u64,
}

impl ApiConfig {
    /// Load configuration from the environment
    ///
    /// # Environment Variables
    /// - `API_BIND_ADDR` (default: `0.0.0.0:3001`)
    /// - `API_STORAGE`: `postgres` or `memory` (default: `postgres`)
    /// - `API_ENABLE_RESET` (default: `false`)
    /// - `API_SIGNIN_MAX_ATTEMPTS` (default: 5)
    /// - `API_SIGNIN_WINDOW_SECONDS` (default: 300)
    /// - `API_SIGNIN_BAN_SECONDS` (default: 900)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_addr", "0.0.0.0:3001")?
            .set_default("storage", "postgres")?
            .set_default("enable_reset", false)?
            .set_default("signin_max_attempts", 5_i64)?
            .set_default("signin_window_seconds", 300_i64)?
            .set_default("signin_ban_seconds", 900_i64)?
            .add_source(Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Sign-in throttling settings
    pub fn rate_limiter(&self) -> RateLimiterConfig {
        RateLimiterConfig {
            max_attempts: self.signin_max_attempts,
            window: Duration::from_secs(self.signin_window_seconds),
            ban_duration: Duration::from_secs(self.signin_ban_seconds),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3001".to_string(),
            storage: StorageBackend::Postgres,
            enable_reset: false,
            signin_max_attempts: 5,
            signin_window_seconds: 300,
            signin_ban_seconds: 900,
        }
    }
}
