//! Handlers for the `/apps/{app_id}/modules` resource.
//!
//! A module row is the enablement of a platform module on one app, carrying
//! its live configuration payload. Config snapshots live in the version
//! handlers.

use appdock_core::error::CoreError;
use appdock_core::types::DbId;
use appdock_db::models::app_module::{
    AppModule, BatchEnableModules, EnableModule, SaveModuleConfig, UpdateModule,
};
use appdock_db::repositories::AppModuleRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Load a module or fail with 404. Shared with the version handlers,
/// which address modules by id.
pub(crate) async fn require_module(
    state: &AppState,
    app_id: DbId,
    id: DbId,
) -> AppResult<AppModule> {
    AppModuleRepo::find_by_id(&state.pool, app_id, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found_id("Module", id)))
}

/// GET /api/v1/apps/{app_id}/modules
pub async fn list(
    State(state): State<AppState>,
    Path(app_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AppModule>>>> {
    let modules = AppModuleRepo::list_by_app(&state.pool, app_id).await?;
    Ok(Json(DataResponse { data: modules }))
}

/// POST /api/v1/apps/{app_id}/modules
pub async fn enable(
    State(state): State<AppState>,
    Path(app_id): Path<DbId>,
    Json(input): Json<EnableModule>,
) -> AppResult<(StatusCode, Json<DataResponse<AppModule>>)> {
    if input.module_code.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "module_code must not be empty".into(),
        )));
    }

    let module = AppModuleRepo::create(&state.pool, app_id, &input.module_code).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: module })))
}

/// POST /api/v1/apps/{app_id}/modules/batch
///
/// Enables each listed module, skipping codes that are already enabled.
/// Returns only the newly enabled rows.
pub async fn batch_enable(
    State(state): State<AppState>,
    Path(app_id): Path<DbId>,
    Json(input): Json<BatchEnableModules>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<AppModule>>>)> {
    let mut enabled = Vec::new();
    for code in &input.module_codes {
        if code.trim().is_empty() {
            continue;
        }
        if AppModuleRepo::find_by_code(&state.pool, app_id, code)
            .await?
            .is_some()
        {
            continue;
        }
        enabled.push(AppModuleRepo::create(&state.pool, app_id, code).await?);
    }
    Ok((StatusCode::CREATED, Json(DataResponse { data: enabled })))
}

/// GET /api/v1/apps/{app_id}/modules/{id}
pub async fn get(
    State(state): State<AppState>,
    Path((app_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<AppModule>>> {
    let module = require_module(&state, app_id, id).await?;
    Ok(Json(DataResponse { data: module }))
}

/// PUT /api/v1/apps/{app_id}/modules/{id}
pub async fn update(
    State(state): State<AppState>,
    Path((app_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateModule>,
) -> AppResult<Json<DataResponse<AppModule>>> {
    let module = require_module(&state, app_id, id).await?;
    let status = input.status.unwrap_or(module.status);

    let module = AppModuleRepo::update_status(&state.pool, app_id, id, status)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found_id("Module", id)))?;
    Ok(Json(DataResponse { data: module }))
}

/// DELETE /api/v1/apps/{app_id}/modules/{id}
pub async fn disable(
    State(state): State<AppState>,
    Path((app_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let removed = AppModuleRepo::delete(&state.pool, app_id, id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::not_found_id("Module", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/apps/{app_id}/modules/{id}/config
pub async fn get_config(
    State(state): State<AppState>,
    Path((app_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let module = require_module(&state, app_id, id).await?;
    Ok(Json(DataResponse {
        data: module.config,
    }))
}

/// PUT /api/v1/apps/{app_id}/modules/{id}/config
pub async fn save_config(
    State(state): State<AppState>,
    Path((app_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<SaveModuleConfig>,
) -> AppResult<Json<DataResponse<AppModule>>> {
    if !input.config.is_object() {
        return Err(AppError::BadRequest(
            "module config must be a JSON object".into(),
        ));
    }

    let module = require_module(&state, app_id, id).await?;
    let module = AppModuleRepo::update_config(&state.pool, app_id, &module.module_code, &input.config)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found_id("Module", id)))?;
    Ok(Json(DataResponse { data: module }))
}

/// DELETE /api/v1/apps/{app_id}/modules/{id}/config
///
/// Resets the live configuration to the empty object. Snapshot history is
/// untouched, so the previous config remains recoverable by rollback.
pub async fn reset_config(
    State(state): State<AppState>,
    Path((app_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<AppModule>>> {
    let module = require_module(&state, app_id, id).await?;
    let module = AppModuleRepo::reset_config(&state.pool, app_id, &module.module_code)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found_id("Module", id)))?;
    Ok(Json(DataResponse { data: module }))
}
