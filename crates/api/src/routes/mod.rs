pub mod collections;
pub mod health;
pub mod modules;
pub mod releases;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /apps/{app_id}/collections                                    list, create
/// /apps/{app_id}/collections/{id}                               get, update, delete
/// /apps/{app_id}/collections/{id}/documents                     list, create
/// /apps/{app_id}/collections/{id}/documents/{doc_id}            get, update, delete
/// /apps/{app_id}/collections/{id}/versions                      list, create
/// /apps/{app_id}/collections/{id}/versions/published            current published snapshot
/// /apps/{app_id}/collections/{id}/versions/compare              diff two snapshots (?base=&target=)
/// /apps/{app_id}/collections/{id}/versions/{version_id}         get
/// /apps/{app_id}/collections/{id}/versions/{version_id}/publish publish (POST)
/// /apps/{app_id}/collections/{id}/versions/{version_id}/rollback rollback (POST)
///
/// /apps/{app_id}/modules                                        list, enable
/// /apps/{app_id}/modules/batch                                  batch enable (POST)
/// /apps/{app_id}/modules/{id}                                   get, update status, disable
/// /apps/{app_id}/modules/{id}/config                            get, save, reset
/// /apps/{app_id}/modules/{id}/versions[...]                     same shape as collection versions
///
/// /apps/{app_id}/releases                                       list, create
/// /apps/{app_id}/releases/stats                                 per-status counts
/// /apps/{app_id}/releases/check-update                          client update check (?version_code=)
/// /apps/{app_id}/releases/{id}                                  get, update, delete
/// /apps/{app_id}/releases/{id}/publish                          publish (POST)
/// /apps/{app_id}/releases/{id}/offline                          take offline (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/apps/{app_id}/collections", collections::router())
        .nest("/apps/{app_id}/modules", modules::router())
        .nest("/apps/{app_id}/releases", releases::router())
}
