//! Routes for collections, their documents, and their schema versions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::versions::collection as versions;
use crate::handlers::{collections, documents};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(collections::list).post(collections::create))
        .route(
            "/{id}",
            get(collections::get)
                .put(collections::update)
                .delete(collections::delete),
        )
        // Documents stored in the collection.
        .route(
            "/{id}/documents",
            get(documents::list).post(documents::create),
        )
        .route(
            "/{id}/documents/{doc_id}",
            get(documents::get)
                .put(documents::update)
                .delete(documents::delete),
        )
        // Schema version snapshots.
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
