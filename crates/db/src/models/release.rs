//! App release models and DTOs (client release channel).

use appdock_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `app_releases` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Release {
    pub id: DbId,
    pub app_id: DbId,
    pub version_name: String,
    /// Auto-incremented per app; authoritative for update ordering.
    pub version_code: i32,
    pub description: String,
    pub download_url: String,
    pub force_update: bool,
    pub status: String,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a release. `version_code` is assigned automatically.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRelease {
    pub version_name: String,
    pub description: Option<String>,
    pub download_url: Option<String>,
    pub force_update: Option<bool>,
}

/// DTO for updating a release. All fields optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRelease {
    pub version_name: Option<String>,
    pub description: Option<String>,
    pub download_url: Option<String>,
    pub force_update: Option<bool>,
}

/// Per-status release counts for an app.
#[derive(Debug, Serialize)]
pub struct ReleaseStats {
    pub total: i64,
    pub published: i64,
    pub draft: i64,
    pub offline: i64,
}

/// Response payload for the check-update endpoint.
#[derive(Debug, Serialize)]
pub struct UpdateCheck {
    pub has_update: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_update: Option<bool>,
}
