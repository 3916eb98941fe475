//! Handlers for the `/apps/{app_id}/collections` resource.

use appdock_core::error::CoreError;
use appdock_core::types::DbId;
use appdock_db::models::collection::{Collection, CreateCollection, UpdateCollection};
use appdock_db::repositories::CollectionRepo;
use appdock_db::{clamp_limit, clamp_offset};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// Query parameters for the collection list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListCollectionsParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Load a collection or fail with 404. Shared with the document and
/// version handlers, which address collections by id.
pub(crate) async fn require_collection(
    state: &AppState,
    app_id: DbId,
    id: DbId,
) -> AppResult<Collection> {
    CollectionRepo::find_by_id(&state.pool, app_id, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found_id("Collection", id)))
}

/// GET /api/v1/apps/{app_id}/collections
pub async fn list(
    State(state): State<AppState>,
    Path(app_id): Path<DbId>,
    Query(params): Query<ListCollectionsParams>,
) -> AppResult<Json<PageResponse<Collection>>> {
    let search = params.search.as_deref().filter(|s| !s.is_empty());
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);

    let items = CollectionRepo::list(&state.pool, app_id, search, limit, offset).await?;
    let total = CollectionRepo::count(&state.pool, app_id, search).await?;
    Ok(Json(PageResponse { data: items, total }))
}

/// POST /api/v1/apps/{app_id}/collections
pub async fn create(
    State(state): State<AppState>,
    Path(app_id): Path<DbId>,
    Json(input): Json<CreateCollection>,
) -> AppResult<(StatusCode, Json<DataResponse<Collection>>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name must not be empty".into(),
        )));
    }

    let collection = CollectionRepo::create(&state.pool, app_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: collection })))
}

/// GET /api/v1/apps/{app_id}/collections/{id}
pub async fn get(
    State(state): State<AppState>,
    Path((app_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Collection>>> {
    let collection = require_collection(&state, app_id, id).await?;
    Ok(Json(DataResponse { data: collection }))
}

/// PUT /api/v1/apps/{app_id}/collections/{id}
pub async fn update(
    State(state): State<AppState>,
    Path((app_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateCollection>,
) -> AppResult<Json<DataResponse<Collection>>> {
    if input.name.as_deref() == Some("") {
        return Err(AppError::Core(CoreError::Validation(
            "name must not be empty".into(),
        )));
    }

    let collection = CollectionRepo::update(&state.pool, app_id, id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found_id("Collection", id)))?;
    Ok(Json(DataResponse { data: collection }))
}

/// DELETE /api/v1/apps/{app_id}/collections/{id}
///
/// Deletes the collection and, via the schema-level cascade, its documents.
pub async fn delete(
    State(state): State<AppState>,
    Path((app_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let removed = CollectionRepo::delete(&state.pool, app_id, id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::not_found_id("Collection", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
