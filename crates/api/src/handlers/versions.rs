//! Handlers for version snapshots, nested under the resource they version:
//!
//! - `/apps/{app_id}/collections/{id}/versions[...]`
//! - `/apps/{app_id}/modules/{id}/versions[...]`
//!
//! Both trees share one generic implementation; the thin wrappers in
//! [`collection`] and [`module`] resolve the path id to the resource code
//! the snapshot store is keyed by (collection name or module code).

use appdock_core::diff::{compare_snapshots, SnapshotDiff};
use appdock_core::types::DbId;
use appdock_core::version::VersionStatus;
use appdock_db::models::resource_version::{ResourceVersion, VersionFilter};
use appdock_db::versioning::{DefinitionAccess, VersionService};
use appdock_db::{clamp_limit, clamp_offset};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::PageResponse;
use crate::state::AppState;

/// Query parameters for the version list endpoint.
#[derive(Debug, Deserialize)]
pub struct VersionListParams {
    pub status: Option<String>,
    pub environment: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for the compare endpoint (`?base=&target=`).
#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub base: DbId,
    pub target: DbId,
}

/// Response payload for the compare endpoint.
#[derive(Debug, Serialize)]
pub struct VersionComparison {
    pub base_id: DbId,
    pub base_label: String,
    pub target_id: DbId,
    pub target_label: String,
    pub diff: SnapshotDiff,
}

async fn list_impl<A: DefinitionAccess>(
    service: &VersionService<A>,
    state: &AppState,
    app_id: DbId,
    code: &str,
    params: VersionListParams,
) -> AppResult<PageResponse<ResourceVersion>> {
    // Empty filter values mean "no filter". Unknown status strings are
    // rejected up front instead of silently matching nothing.
    let status = params.status.filter(|s| !s.is_empty());
    if let Some(status) = &status {
        status.parse::<VersionStatus>().map_err(AppError::Core)?;
    }

    let filter = VersionFilter {
        status,
        environment: params.environment.filter(|e| !e.is_empty()),
    };
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);

    let page = service
        .list(&state.pool, app_id, code, &filter, limit, offset)
        .await?;
    Ok(PageResponse {
        data: page.items,
        total: page.total,
    })
}

async fn compare_impl<A: DefinitionAccess>(
    service: &VersionService<A>,
    state: &AppState,
    app_id: DbId,
    code: &str,
    params: CompareParams,
) -> AppResult<VersionComparison> {
    let (base, target) = service
        .load_pair(&state.pool, app_id, code, params.base, params.target)
        .await?;
    let diff = compare_snapshots(service.kind(), &base.snapshot, &target.snapshot);
    Ok(VersionComparison {
        base_id: base.id,
        base_label: base.version_label,
        target_id: target.id,
        target_label: target.version_label,
        diff,
    })
}

/// Version endpoints for collection field schemas.
pub mod collection {
    use appdock_core::error::CoreError;
    use appdock_core::types::DbId;
    use appdock_db::models::resource_version::{CreateVersionRequest, ResourceVersion};
    use appdock_db::versioning::VersionService;
    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::Json;

    use super::{CompareParams, VersionComparison, VersionListParams};
    use crate::actor::Actor;
    use crate::error::{AppError, AppResult};
    use crate::handlers::collections::require_collection;
    use crate::response::{DataResponse, PageResponse};
    use crate::state::AppState;

    async fn resolve_code(state: &AppState, app_id: DbId, id: DbId) -> AppResult<String> {
        Ok(require_collection(state, app_id, id).await?.name)
    }

    /// GET /api/v1/apps/{app_id}/collections/{id}/versions
    pub async fn list(
        State(state): State<AppState>,
        Path((app_id, id)): Path<(DbId, DbId)>,
        Query(params): Query<VersionListParams>,
    ) -> AppResult<Json<PageResponse<ResourceVersion>>> {
        let code = resolve_code(&state, app_id, id).await?;
        let page =
            super::list_impl(&VersionService::collections(), &state, app_id, &code, params).await?;
        Ok(Json(page))
    }

    /// POST /api/v1/apps/{app_id}/collections/{id}/versions
    ///
    /// Freezes the collection's current field schema as a draft snapshot.
    pub async fn create(
        State(state): State<AppState>,
        Path((app_id, id)): Path<(DbId, DbId)>,
        Actor(actor): Actor,
        Json(input): Json<CreateVersionRequest>,
    ) -> AppResult<(StatusCode, Json<DataResponse<ResourceVersion>>)> {
        let code = resolve_code(&state, app_id, id).await?;
        let version = VersionService::collections()
            .create(&state.pool, app_id, &code, &input, &actor)
            .await?;
        Ok((StatusCode::CREATED, Json(DataResponse { data: version })))
    }

    /// GET /api/v1/apps/{app_id}/collections/{id}/versions/published
    pub async fn published(
        State(state): State<AppState>,
        Path((app_id, id)): Path<(DbId, DbId)>,
    ) -> AppResult<Json<DataResponse<ResourceVersion>>> {
        let code = resolve_code(&state, app_id, id).await?;
        let version = VersionService::collections()
            .published(&state.pool, app_id, &code)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "Published version",
                    key: code.clone(),
                })
            })?;
        Ok(Json(DataResponse { data: version }))
    }

    /// GET /api/v1/apps/{app_id}/collections/{id}/versions/compare
    pub async fn compare(
        State(state): State<AppState>,
        Path((app_id, id)): Path<(DbId, DbId)>,
        Query(params): Query<CompareParams>,
    ) -> AppResult<Json<DataResponse<VersionComparison>>> {
        let code = resolve_code(&state, app_id, id).await?;
        let comparison =
            super::compare_impl(&VersionService::collections(), &state, app_id, &code, params)
                .await?;
        Ok(Json(DataResponse { data: comparison }))
    }

    /// GET /api/v1/apps/{app_id}/collections/{id}/versions/{version_id}
    pub async fn get(
        State(state): State<AppState>,
        Path((app_id, id, version_id)): Path<(DbId, DbId, DbId)>,
    ) -> AppResult<Json<DataResponse<ResourceVersion>>> {
        let code = resolve_code(&state, app_id, id).await?;
        let version = VersionService::collections()
            .get(&state.pool, app_id, &code, version_id)
            .await?;
        Ok(Json(DataResponse { data: version }))
    }

    /// POST /api/v1/apps/{app_id}/collections/{id}/versions/{version_id}/publish
    pub async fn publish(
        State(state): State<AppState>,
        Path((app_id, id, version_id)): Path<(DbId, DbId, DbId)>,
    ) -> AppResult<Json<DataResponse<ResourceVersion>>> {
        let code = resolve_code(&state, app_id, id).await?;
        let version = VersionService::collections()
            .publish(&state.pool, app_id, &code, version_id)
            .await?;
        Ok(Json(DataResponse { data: version }))
    }

    /// POST /api/v1/apps/{app_id}/collections/{id}/versions/{version_id}/rollback
    pub async fn rollback(
        State(state): State<AppState>,
        Path((app_id, id, version_id)): Path<(DbId, DbId, DbId)>,
        Actor(actor): Actor,
    ) -> AppResult<Json<DataResponse<ResourceVersion>>> {
        let code = resolve_code(&state, app_id, id).await?;
        let version = VersionService::collections()
            .rollback(&state.pool, app_id, &code, version_id, &actor)
            .await?;
        Ok(Json(DataResponse { data: version }))
    }
}

/// Version endpoints for module config payloads.
pub mod module {
    use appdock_core::error::CoreError;
    use appdock_core::types::DbId;
    use appdock_db::models::resource_version::{CreateVersionRequest, ResourceVersion};
    use appdock_db::versioning::VersionService;
    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::Json;

    use super::{CompareParams, VersionComparison, VersionListParams};
    use crate::actor::Actor;
    use crate::error::{AppError, AppResult};
    use crate::handlers::modules::require_module;
    use crate::response::{DataResponse, PageResponse};
    use crate::state::AppState;

    async fn resolve_code(state: &AppState, app_id: DbId, id: DbId) -> AppResult<String> {
        Ok(require_module(state, app_id, id).await?.module_code)
    }

    /// GET /api/v1/apps/{app_id}/modules/{id}/versions
    pub async fn list(
        State(state): State<AppState>,
        Path((app_id, id)): Path<(DbId, DbId)>,
        Query(params): Query<VersionListParams>,
    ) -> AppResult<Json<PageResponse<ResourceVersion>>> {
        let code = resolve_code(&state, app_id, id).await?;
        let page =
            super::list_impl(&VersionService::modules(), &state, app_id, &code, params).await?;
        Ok(Json(page))
    }

    /// POST /api/v1/apps/{app_id}/modules/{id}/versions
    ///
    /// Freezes the module's current config as a draft snapshot.
    pub async fn create(
        State(state): State<AppState>,
        Path((app_id, id)): Path<(DbId, DbId)>,
        Actor(actor): Actor,
        Json(input): Json<CreateVersionRequest>,
    ) -> AppResult<(StatusCode, Json<DataResponse<ResourceVersion>>)> {
        let code = resolve_code(&state, app_id, id).await?;
        let version = VersionService::modules()
            .create(&state.pool, app_id, &code, &input, &actor)
            .await?;
        Ok((StatusCode::CREATED, Json(DataResponse { data: version })))
    }

    /// GET /api/v1/apps/{app_id}/modules/{id}/versions/published
    pub async fn published(
        State(state): State<AppState>,
        Path((app_id, id)): Path<(DbId, DbId)>,
    ) -> AppResult<Json<DataResponse<ResourceVersion>>> {
        let code = resolve_code(&state, app_id, id).await?;
        let version = VersionService::modules()
            .published(&state.pool, app_id, &code)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "Published version",
                    key: code.clone(),
                })
            })?;
        Ok(Json(DataResponse { data: version }))
    }

    /// GET /api/v1/apps/{app_id}/modules/{id}/versions/compare
    pub async fn compare(
        State(state): State<AppState>,
        Path((app_id, id)): Path<(DbId, DbId)>,
        Query(params): Query<CompareParams>,
    ) -> AppResult<Json<DataResponse<VersionComparison>>> {
        let code = resolve_code(&state, app_id, id).await?;
        let comparison =
            super::compare_impl(&VersionService::modules(), &state, app_id, &code, params).await?;
        Ok(Json(DataResponse { data: comparison }))
    }

    /// GET /api/v1/apps/{app_id}/modules/{id}/versions/{version_id}
    pub async fn get(
        State(state): State<AppState>,
        Path((app_id, id, version_id)): Path<(DbId, DbId, DbId)>,
    ) -> AppResult<Json<DataResponse<ResourceVersion>>> {
        let code = resolve_code(&state, app_id, id).await?;
        let version = VersionService::modules()
            .get(&state.pool, app_id, &code, version_id)
            .await?;
        Ok(Json(DataResponse { data: version }))
    }

    /// POST /api/v1/apps/{app_id}/modules/{id}/versions/{version_id}/publish
    pub async fn publish(
        State(state): State<AppState>,
        Path((app_id, id, version_id)): Path<(DbId, DbId, DbId)>,
    ) -> AppResult<Json<DataResponse<ResourceVersion>>> {
        let code = resolve_code(&state, app_id, id).await?;
        let version = VersionService::modules()
            .publish(&state.pool, app_id, &code, version_id)
            .await?;
        Ok(Json(DataResponse { data: version }))
    }

    /// POST /api/v1/apps/{app_id}/modules/{id}/versions/{version_id}/rollback
    pub async fn rollback(
        State(state): State<AppState>,
        Path((app_id, id, version_id)): Path<(DbId, DbId, DbId)>,
        Actor(actor): Actor,
    ) -> AppResult<Json<DataResponse<ResourceVersion>>> {
        let code = resolve_code(&state, app_id, id).await?;
        let version = VersionService::modules()
            .rollback(&state.pool, app_id, &code, version_id, &actor)
            .await?;
        Ok(Json(DataResponse { data: version }))
    }
}
