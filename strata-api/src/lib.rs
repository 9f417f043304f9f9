//! Strata API - REST Layer
//!
//! This crate exposes the row cache over HTTP: whole-row reads and writes
//! under `/v1`, cache observability under `/v1/cache`, Kubernetes-style
//! health probes, and the OpenAPI document. The coherence rules themselves
//! live in `strata-storage`; this layer only maps them onto transport.

pub mod config;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::{ApiCacheStore, ApiCoordinator, AppState};
