//! Data collection models and DTOs.

use appdock_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `data_collections` table.
///
/// `fields` is the collection's live schema definition; version snapshots
/// capture frozen copies of it in `resource_versions`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Collection {
    pub id: DbId,
    pub app_id: DbId,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub fields: serde_json::Value,
    pub read_perm: String,
    pub create_perm: String,
    pub update_perm: String,
    pub delete_perm: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a collection. Permission fields default when absent:
/// read=`public`, create=`authenticated`, update=`creator`, delete=`creator`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCollection {
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub fields: Option<serde_json::Value>,
    pub read_perm: Option<String>,
    pub create_perm: Option<String>,
    pub update_perm: Option<String>,
    pub delete_perm: Option<String>,
}

/// DTO for updating a collection. All fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCollection {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub fields: Option<serde_json::Value>,
    pub read_perm: Option<String>,
    pub create_perm: Option<String>,
    pub update_perm: Option<String>,
    pub delete_perm: Option<String>,
}
