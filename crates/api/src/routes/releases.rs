//! Routes for the client release channel.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::releases;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(releases::list).post(releases::create))
        .route("/stats", get(releases::stats))
        .route("/check-update", get(releases::check_update))
        .route(
            "/{id}",
            get(releases::get)
                .put(releases::update)
                .delete(releases::delete),
        )
        .route("/{id}/publish", post(releases::publish))
        .route("/{id}/offline", post(releases::offline))
}
