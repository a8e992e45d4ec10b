//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    config::ApiConfig,
    rate_limiter::RateLimiter,
    repositories::{MemoryStore, Store},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub rate_limiter: RateLimiter,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: ApiConfig) -> Self {
        Self {
            store,
            rate_limiter: RateLimiter::new(config.rate_limiter()),
            config: Arc::new(config),
        }
    }

    /// State over a fresh [`MemoryStore`]
    pub fn in_memory(config: ApiConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), config)
    }
}
