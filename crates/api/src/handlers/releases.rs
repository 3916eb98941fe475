//! Handlers for the `/apps/{app_id}/releases` resource.
//!
//! Releases are the client-facing update channel. Their lifecycle
//! (`draft`, `published`, `offline`) is independent of resource version
//! snapshots, and several releases may be published at once.

use appdock_core::error::CoreError;
use appdock_core::types::DbId;
use appdock_db::models::release::{CreateRelease, Release, ReleaseStats, UpdateCheck, UpdateRelease};
use appdock_db::repositories::ReleaseRepo;
use appdock_db::{clamp_limit, clamp_offset};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

const RELEASE_STATUSES: &[&str] = &["draft", "published", "offline"];

/// Query parameters for the release list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListReleasesParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for the check-update endpoint: the client's current
/// version code.
#[derive(Debug, Deserialize)]
pub struct CheckUpdateParams {
    pub version_code: i32,
}

async fn require_release(state: &AppState, app_id: DbId, id: DbId) -> AppResult<Release> {
    ReleaseRepo::find_by_id(&state.pool, app_id, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found_id("Release", id)))
}

/// GET /api/v1/apps/{app_id}/releases
pub async fn list(
    State(state): State<AppState>,
    Path(app_id): Path<DbId>,
    Query(params): Query<ListReleasesParams>,
) -> AppResult<Json<PageResponse<Release>>> {
    let status = params.status.as_deref().filter(|s| !s.is_empty());
    if let Some(s) = status {
        if !RELEASE_STATUSES.contains(&s) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "unknown release status '{s}'"
            ))));
        }
    }

    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);
    let items = ReleaseRepo::list(&state.pool, app_id, status, limit, offset).await?;
    let total = ReleaseRepo::count(&state.pool, app_id, status).await?;
    Ok(Json(PageResponse { data: items, total }))
}

/// POST /api/v1/apps/{app_id}/releases
pub async fn create(
    State(state): State<AppState>,
    Path(app_id): Path<DbId>,
    Json(input): Json<CreateRelease>,
) -> AppResult<(StatusCode, Json<DataResponse<Release>>)> {
    if input.version_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "version_name must not be empty".into(),
        )));
    }

    let release = ReleaseRepo::create(&state.pool, app_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: release })))
}

/// GET /api/v1/apps/{app_id}/releases/stats
pub async fn stats(
    State(state): State<AppState>,
    Path(app_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ReleaseStats>>> {
    let stats = ReleaseRepo::stats(&state.pool, app_id).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/apps/{app_id}/releases/check-update
///
/// Compares the client's version code against the highest published release.
pub async fn check_update(
    State(state): State<AppState>,
    Path(app_id): Path<DbId>,
    Query(params): Query<CheckUpdateParams>,
) -> AppResult<Json<DataResponse<UpdateCheck>>> {
    let latest = ReleaseRepo::find_latest_published(&state.pool, app_id).await?;

    let check = match latest {
        Some(release) if release.version_code > params.version_code => UpdateCheck {
            has_update: true,
            version_name: Some(release.version_name),
            version_code: Some(release.version_code),
            description: Some(release.description),
            download_url: Some(release.download_url),
            force_update: Some(release.force_update),
        },
        _ => UpdateCheck {
            has_update: false,
            version_name: None,
            version_code: None,
            description: None,
            download_url: None,
            force_update: None,
        },
    };
    Ok(Json(DataResponse { data: check }))
}

/// GET /api/v1/apps/{app_id}/releases/{id}
pub async fn get(
    State(state): State<AppState>,
    Path((app_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Release>>> {
    let release = require_release(&state, app_id, id).await?;
    Ok(Json(DataResponse { data: release }))
}

/// PUT /api/v1/apps/{app_id}/releases/{id}
pub async fn update(
    State(state): State<AppState>,
    Path((app_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateRelease>,
) -> AppResult<Json<DataResponse<Release>>> {
    if input.version_name.as_deref() == Some("") {
        return Err(AppError::Core(CoreError::Validation(
            "version_name must not be empty".into(),
        )));
    }

    let release = ReleaseRepo::update(&state.pool, app_id, id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found_id("Release", id)))?;
    Ok(Json(DataResponse { data: release }))
}

/// POST /api/v1/apps/{app_id}/releases/{id}/publish
pub async fn publish(
    State(state): State<AppState>,
    Path((app_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Release>>> {
    let release = require_release(&state, app_id, id).await?;
    if release.status == "published" {
        return Err(AppError::Core(CoreError::InvalidState(
            "release is already published".into(),
        )));
    }

    let release = ReleaseRepo::publish(&state.pool, app_id, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found_id("Release", id)))?;
    Ok(Json(DataResponse { data: release }))
}

/// POST /api/v1/apps/{app_id}/releases/{id}/offline
pub async fn offline(
    State(state): State<AppState>,
    Path((app_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Release>>> {
    let release = require_release(&state, app_id, id).await?;
    if release.status != "published" {
        return Err(AppError::Core(CoreError::InvalidState(
            "only published releases can be taken offline".into(),
        )));
    }

    let release = ReleaseRepo::offline(&state.pool, app_id, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found_id("Release", id)))?;
    Ok(Json(DataResponse { data: release }))
}

/// DELETE /api/v1/apps/{app_id}/releases/{id}
///
/// Published releases must be taken offline before deletion.
pub async fn delete(
    State(state): State<AppState>,
    Path((app_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let release = require_release(&state, app_id, id).await?;
    if release.status == "published" {
        return Err(AppError::Core(CoreError::Conflict(
            "Cannot delete a published release. Take it offline first.".into(),
        )));
    }

    ReleaseRepo::delete(&state.pool, app_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
