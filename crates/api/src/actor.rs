//! Caller identity extraction.
//!
//! The platform in front of this service authenticates callers and forwards
//! the acting user in the `x-actor` header. Missing or non-UTF-8 values
//! degrade to the empty string rather than rejecting the request.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Header carrying the acting user's identifier.
pub const ACTOR_HEADER: &str = "x-actor";

/// The acting user, for attribution fields like `created_by`.
#[derive(Debug, Clone)]
pub struct Actor(pub String);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        Ok(Actor(actor))
    }
}
