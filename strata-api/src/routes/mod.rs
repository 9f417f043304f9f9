//! REST API Routes Module
//!
//! Route handlers and router assembly:
//! - Row read/write under /v1 (cache-aside GET, write-through PUT)
//! - Cache counters and reset under /v1/cache
//! - Health check endpoints (Kubernetes-compatible)
//! - OpenAPI spec at /openapi.json
//! - CORS for browser-based clients

pub mod cache_admin;
pub mod health;
pub mod row;

use axum::{
    http::{header, HeaderValue, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::openapi::ApiDoc;
use crate::state::AppState;

// Re-export route creation functions for convenience
pub use cache_admin::create_router as cache_admin_router;
pub use health::create_router as health_router;
pub use row::create_router as row_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// ROUTER ASSEMBLY
// ============================================================================

/// Create the complete API router.
///
/// Layer order (outer to inner): CORS handles preflights first, then the
/// HTTP trace layer, then the handlers.
pub fn create_api_router(state: AppState, config: &ApiConfig) -> Router {
    let v1 = Router::new()
        .merge(row::create_router())
        .nest("/cache", cache_admin::create_router());

    Router::new()
        .nest("/v1", v1)
        .nest("/health", health::create_router())
        .route("/openapi.json", get(openapi_json))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(config))
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// In development mode (empty origins), allows all origins.
/// In production mode, only allows configured origins.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::PUT, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: Production mode");
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}
