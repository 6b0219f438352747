//! API Handlers
//!
//! Operational endpoints served next to the update resolver's routes.

use axum::{extract::State, Json};

use crate::cache::{CacheStore, UpdateCache};
use crate::config::Config;
use crate::models::{HealthResponse, StatsResponse};

/// Application state shared across all handlers.
///
/// The update resolver receives the same `cache` handle, so `/stats`
/// reflects its lookups and lock activity.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache and lock store
    pub cache: UpdateCache,
}

impl AppState {
    /// Creates a new AppState around the given store.
    pub fn new(store: CacheStore) -> Self {
        Self {
            cache: UpdateCache::new(store),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            cache: UpdateCache::from_config(config),
        }
    }
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().await.into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
