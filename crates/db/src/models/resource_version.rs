//! Resource version snapshot models and DTOs.
//!
//! A snapshot is immutable once created: only its `status` (and, once,
//! `published_at`) ever change. Rollback and re-publish append new rows
//! instead of rewriting history.

use appdock_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `resource_versions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResourceVersion {
    pub id: DbId,
    pub app_id: DbId,
    pub resource_kind: String,
    pub resource_code: String,
    /// Strictly increasing per resource; authoritative for ordering.
    pub version_num: i32,
    /// Human-facing label; cosmetic, never used for sorting.
    pub version_label: String,
    /// Frozen copy of the live definition at creation time.
    pub snapshot: serde_json::Value,
    pub status: String,
    pub environment: String,
    pub changelog: String,
    pub created_by: String,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Request body for creating a version snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateVersionRequest {
    /// Optional label; defaults to a value derived from the version number.
    pub version_label: Option<String>,
    pub environment: Option<String>,
    pub changelog: Option<String>,
}

/// Fully-resolved snapshot insert, built by the versioning service once the
/// sequence number and label are known. Not exposed over HTTP.
#[derive(Debug, Clone)]
pub struct SnapshotInsert {
    pub version_num: i32,
    pub version_label: String,
    pub snapshot: serde_json::Value,
    pub status: appdock_core::version::VersionStatus,
    pub environment: String,
    pub changelog: String,
    pub created_by: String,
}

/// Filters for listing version snapshots.
#[derive(Debug, Clone, Default)]
pub struct VersionFilter {
    pub status: Option<String>,
    pub environment: Option<String>,
}

/// A page of version snapshots plus the unpaginated total.
#[derive(Debug, Serialize)]
pub struct VersionPage {
    pub items: Vec<ResourceVersion>,
    pub total: i64,
}
