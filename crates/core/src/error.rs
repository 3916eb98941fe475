use thiserror::Error;

/// Domain-level error taxonomy shared by all crates.
///
/// Every failure maps to a stable kind plus a human-readable message; the
/// API layer translates these into HTTP status codes.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Convenience constructor for not-found errors keyed by a numeric id.
    pub fn not_found_id(entity: &'static str, id: crate::types::DbId) -> Self {
        Self::NotFound {
            entity,
            key: id.to_string(),
        }
    }
}
