//! Row REST API Routes
//!
//! Whole-row reads and writes through the coordinator: cache-aside `GET`
//! and write-through `PUT`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use strata_core::{CachedRow, SUPPRESS_MERGE_COLUMN};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /v1/get/{id} - Read a row from cache, falling back to the store
#[utoipa::path(
    get,
    path = "/v1/get/{id}",
    tag = "Rows",
    params(
        ("id" = String, Path, description = "Row key")
    ),
    responses(
        (status = 200, description = "Row from cache or store", body = CachedRow),
        (status = 404, description = "Row absent from cache and store", body = ApiError),
        (status = 503, description = "Backing store unavailable", body = ApiError),
    ),
)]
pub async fn get_row(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let row = state
        .coordinator
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::row_not_found(&id))?;

    Ok(Json((*row).clone()))
}

/// PUT /v1/put/{id} - Write a row through to store and cache
#[utoipa::path(
    put,
    path = "/v1/put/{id}",
    tag = "Rows",
    params(
        ("id" = String, Path, description = "Row key")
    ),
    request_body = CachedRow,
    responses(
        (status = 200, description = "Row written to store and cache"),
        (status = 400, description = "Invalid row body", body = ApiError),
        (status = 503, description = "Backing store unavailable", body = ApiError),
    ),
)]
pub async fn put_row(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(row): Json<CachedRow>,
) -> ApiResult<impl IntoResponse> {
    validate_row(&row)?;
    state.coordinator.put(&id, row).await?;
    Ok(StatusCode::OK)
}

fn validate_row(row: &CachedRow) -> ApiResult<()> {
    if row.is_empty() {
        return Err(ApiError::invalid_input("row must contain at least one column"));
    }
    for (key, column) in row {
        if key == SUPPRESS_MERGE_COLUMN || column.name == SUPPRESS_MERGE_COLUMN {
            return Err(ApiError::invalid_input(
                "row may not name the reserved suppression column",
            ));
        }
        if *key != column.name {
            return Err(ApiError::invalid_input(format!(
                "column entry {:?} disagrees with its name {:?}",
                key, column.name
            )));
        }
    }
    Ok(())
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/get/:id", get(get_row))
        .route("/put/:id", put(put_row))
}
