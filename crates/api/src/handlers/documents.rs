//! Handlers for documents nested under a collection:
//! `/apps/{app_id}/collections/{collection_id}/documents[/{id}]`.

use appdock_core::error::CoreError;
use appdock_core::schema::{parse_field_definitions, unique_field_values, validate_document};
use appdock_core::types::DbId;
use appdock_db::models::document::{CreateDocument, Document};
use appdock_db::repositories::DocumentRepo;
use appdock_db::{clamp_limit, clamp_offset};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{Map, Value};

use crate::actor::Actor;
use crate::error::{AppError, AppResult};
use crate::handlers::collections::require_collection;
use crate::query::PaginationParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// Validate a document body against the collection schema and check unique
/// fields against stored documents. `exclude_id` is set on update so a
/// document does not collide with itself.
async fn check_document(
    state: &AppState,
    collection_fields: &Value,
    collection_id: DbId,
    data: &Value,
    exclude_id: Option<DbId>,
) -> AppResult<()> {
    let Some(object) = data.as_object() else {
        return Err(AppError::BadRequest(
            "document data must be a JSON object".into(),
        ));
    };

    let fields = parse_field_definitions(collection_fields);
    validate_document(&fields, object)?;
    check_unique_fields(state, &fields, object, collection_id, exclude_id).await
}

async fn check_unique_fields(
    state: &AppState,
    fields: &[appdock_core::schema::FieldDefinition],
    object: &Map<String, Value>,
    collection_id: DbId,
    exclude_id: Option<DbId>,
) -> AppResult<()> {
    for (name, value) in unique_field_values(fields, object) {
        let taken =
            DocumentRepo::exists_with_field_value(&state.pool, collection_id, name, value, exclude_id)
                .await?;
        if taken {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "{name}: value already exists"
            ))));
        }
    }
    Ok(())
}

/// GET /api/v1/apps/{app_id}/collections/{collection_id}/documents
pub async fn list(
    State(state): State<AppState>,
    Path((app_id, collection_id)): Path<(DbId, DbId)>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PageResponse<Document>>> {
    require_collection(&state, app_id, collection_id).await?;

    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);
    let items = DocumentRepo::list(&state.pool, collection_id, limit, offset).await?;
    let total = DocumentRepo::count(&state.pool, collection_id).await?;
    Ok(Json(PageResponse { data: items, total }))
}

/// POST /api/v1/apps/{app_id}/collections/{collection_id}/documents
pub async fn create(
    State(state): State<AppState>,
    Path((app_id, collection_id)): Path<(DbId, DbId)>,
    Actor(actor): Actor,
    Json(input): Json<CreateDocument>,
) -> AppResult<(StatusCode, Json<DataResponse<Document>>)> {
    let collection = require_collection(&state, app_id, collection_id).await?;
    check_document(&state, &collection.fields, collection_id, &input.data, None).await?;

    let document =
        DocumentRepo::create(&state.pool, collection_id, app_id, &input.data, &actor).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: document })))
}

/// GET /api/v1/apps/{app_id}/collections/{collection_id}/documents/{id}
pub async fn get(
    State(state): State<AppState>,
    Path((app_id, collection_id, id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<Json<DataResponse<Document>>> {
    require_collection(&state, app_id, collection_id).await?;
    let document = DocumentRepo::find_by_id(&state.pool, collection_id, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found_id("Document", id)))?;
    Ok(Json(DataResponse { data: document }))
}

/// PUT /api/v1/apps/{app_id}/collections/{collection_id}/documents/{id}
pub async fn update(
    State(state): State<AppState>,
    Path((app_id, collection_id, id)): Path<(DbId, DbId, DbId)>,
    Actor(actor): Actor,
    Json(input): Json<CreateDocument>,
) -> AppResult<Json<DataResponse<Document>>> {
    let collection = require_collection(&state, app_id, collection_id).await?;
    check_document(&state, &collection.fields, collection_id, &input.data, Some(id)).await?;

    let document = DocumentRepo::update(&state.pool, collection_id, id, &input.data, &actor)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found_id("Document", id)))?;
    Ok(Json(DataResponse { data: document }))
}

/// DELETE /api/v1/apps/{app_id}/collections/{collection_id}/documents/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path((app_id, collection_id, id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    require_collection(&state, app_id, collection_id).await?;
    let removed = DocumentRepo::delete(&state.pool, collection_id, id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::not_found_id("Document", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
