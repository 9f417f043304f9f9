//! Strata API Server Entry Point
//!
//! Bootstraps tracing and configuration, assembles the cache, the embedded
//! store, the merge engine, and the coordinator, then serves the Axum
//! router until interrupted.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use strata_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState};
use strata_storage::{
    CacheCoordinator, InMemoryColumnStore, MutationMergeEngine, ShardedRowCache, StoreAdapter,
};

#[tokio::main]
async fn main() -> ApiResult<()> {
    strata_api::telemetry::init_tracing();

    let config = ApiConfig::from_env();
    let schema = Arc::new(config.table_schema());

    // The cache is owned here and handed to both the coordinator and the
    // merge engine; the engine sees every mutation the store commits.
    let cache = Arc::new(ShardedRowCache::new());
    let store = Arc::new(InMemoryColumnStore::new(Arc::clone(&schema)));
    let engine = Arc::new(MutationMergeEngine::new(Arc::clone(&cache), schema));
    store.register_listener(engine);

    let coordinator = Arc::new(CacheCoordinator::new(cache, store.clone()));
    let state = AppState::new(coordinator, store);

    let app: Router = create_api_router(state, &config);

    let addr = resolve_bind_addr(&config)?;
    tracing::info!(%addr, table = %config.schema_table, "Starting Strata API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_bind_addr(config: &ApiConfig) -> ApiResult<SocketAddr> {
    let addr = format!("{}:{}", config.bind_host, config.bind_port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
