//! Shared application state for Axum routers.

use std::sync::Arc;

use strata_storage::{CacheCoordinator, ShardedRowCache, StoreAdapter};

/// Cache store implementation used by the API.
///
/// The sharded in-process map is the only backend the server ships; the
/// coordinator and merge engine are generic, so swapping this alias is the
/// whole migration.
pub type ApiCacheStore = ShardedRowCache;

/// Coordinator over the API's cache store.
pub type ApiCoordinator = CacheCoordinator<ApiCacheStore>;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Read-through / write-through façade over cache and store.
    pub coordinator: Arc<ApiCoordinator>,
    /// Store adapter handle, used directly by readiness probes.
    pub store: Arc<dyn StoreAdapter>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(coordinator: Arc<ApiCoordinator>, store: Arc<dyn StoreAdapter>) -> Self {
        Self {
            coordinator,
            store,
            start_time: std::time::Instant::now(),
        }
    }
}
