//! OpenAPI Document
//!
//! Aggregates the annotated route handlers and wire-visible schemas into
//! the document served at /openapi.json.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::cache_admin::CacheStatsResponse;
use crate::routes::health::{ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use strata_core::{CachedColumn, ColumnValue};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Strata API",
        description = "Coherent row cache in front of a column-oriented store: \
                       cache-aside reads, write-through writes, and merge-based \
                       coherence for out-of-band store mutations."
    ),
    paths(
        crate::routes::row::get_row,
        crate::routes::row::put_row,
        crate::routes::cache_admin::get_stats,
        crate::routes::cache_admin::reset_cache,
        crate::routes::health::ping,
        crate::routes::health::liveness,
        crate::routes::health::readiness,
    ),
    components(schemas(
        CachedColumn,
        ColumnValue,
        ApiError,
        ErrorCode,
        CacheStatsResponse,
        HealthResponse,
        HealthStatus,
        HealthDetails,
        ComponentHealth,
    )),
    tags(
        (name = "Rows", description = "Whole-row cache-aside reads and write-through writes"),
        (name = "Cache", description = "Cache counters and reset"),
        (name = "Health", description = "Liveness and readiness probes"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("/v1/get/{id}"));
        assert!(json.contains("/v1/put/{id}"));
        assert!(json.contains("/v1/cache/stats"));
    }
}
