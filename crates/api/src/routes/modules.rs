//! Routes for app modules, their configs, and their config versions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::modules;
use crate::handlers::versions::module as versions;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(modules::list).post(modules::enable))
        .route("/batch", post(modules::batch_enable))
        .route(
            "/{id}",
            get(modules::get)
                .put(modules::update)
                .delete(modules::disable),
        )
        // Live configuration payload.
        .route(
            "/{id}/config",
            get(modules::get_config)
                .put(modules::save_config)
                .delete(modules::reset_config),
        )
        // Config version snapshots.
        .route("/{id}/versions", get(versions::list).post(versions::create))
        .route("/{id}/versions/published", get(versions::published))
        .route("/{id}/versions/compare", get(versions::compare))
        .route("/{id}/versions/{version_id}", get(versions::get))
        .route(
            "/{id}/versions/{version_id}/publish",
            post(versions::publish),
        )
        .route(
            "/{id}/versions/{version_id}/rollback",
            post(versions::rollback),
        )
}
