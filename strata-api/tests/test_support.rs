#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use strata_api::{create_api_router, ApiConfig, AppState};
use strata_core::CachedRow;
use strata_storage::{
    CacheCoordinator, InMemoryColumnStore, MutationMergeEngine, ShardedRowCache, StoreAdapter,
};
use strata_test_utils::{demo_schema, FailingStoreAdapter};

/// Fully wired system: cache + embedded store + merge engine + router.
pub struct TestSystem {
    pub app: Router,
    pub cache: Arc<ShardedRowCache>,
    pub store: Arc<InMemoryColumnStore>,
}

pub fn test_system() -> TestSystem {
    let schema = Arc::new(demo_schema());
    let cache = Arc::new(ShardedRowCache::new());
    let store = Arc::new(InMemoryColumnStore::new(Arc::clone(&schema)));
    let engine = Arc::new(MutationMergeEngine::new(Arc::clone(&cache), schema));
    store.register_listener(engine);

    let coordinator = Arc::new(CacheCoordinator::new(Arc::clone(&cache), store.clone()));
    let state = AppState::new(coordinator, store.clone());
    let app = create_api_router(state, &ApiConfig::default());

    TestSystem { app, cache, store }
}

/// Router over a store that fails every operation.
pub fn failing_system() -> Router {
    let cache = Arc::new(ShardedRowCache::new());
    let store: Arc<dyn StoreAdapter> = Arc::new(FailingStoreAdapter);
    let coordinator = Arc::new(CacheCoordinator::new(cache, Arc::clone(&store)));
    let state = AppState::new(coordinator, store);
    create_api_router(state, &ApiConfig::default())
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub async fn get_row(app: &Router, id: &str) -> (StatusCode, serde_json::Value) {
    get(app, &format!("/v1/get/{}", id)).await
}

pub async fn put_row(app: &Router, id: &str, row: &CachedRow) -> StatusCode {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/v1/put/{}", id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(row).expect("row encodes")))
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    response.status()
}

pub async fn post(app: &Router, uri: &str) -> StatusCode {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    response.status()
}

pub async fn stats(app: &Router) -> serde_json::Value {
    let (status, json) = get(app, "/v1/cache/stats").await;
    assert_eq!(status, StatusCode::OK);
    json
}
