//! Cache Observability Endpoints
//!
//! Cumulative counters and the reset primitive used for deterministic test
//! setup. Resetting is not an operational cache-invalidation mechanism.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

/// Cumulative cache counters.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub puts: u64,
    pub hit_rate: f64,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /v1/cache/stats - Cumulative hit/miss/put counters
#[utoipa::path(
    get,
    path = "/v1/cache/stats",
    tag = "Cache",
    responses(
        (status = 200, description = "Cumulative cache counters", body = CacheStatsResponse),
    ),
)]
pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.coordinator.stats();
    Json(CacheStatsResponse {
        hits: stats.hits,
        misses: stats.misses,
        puts: stats.puts,
        hit_rate: stats.hit_rate(),
    })
}

/// POST /v1/cache/reset - Clear all rows and zero all counters
#[utoipa::path(
    post,
    path = "/v1/cache/reset",
    tag = "Cache",
    responses(
        (status = 204, description = "Cache cleared and counters zeroed"),
    ),
)]
pub async fn reset_cache(State(state): State<AppState>) -> impl IntoResponse {
    state.coordinator.reset_cache();
    tracing::info!("cache reset");
    StatusCode::NO_CONTENT
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/reset", post(reset_cache))
}
