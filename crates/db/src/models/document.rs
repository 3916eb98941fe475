//! Data document models and DTOs.

use appdock_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `data_documents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub collection_id: DbId,
    pub app_id: DbId,
    pub data: serde_json::Value,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a document. `data` must be a JSON object; it is
/// validated against the collection's field definitions before insert.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocument {
    pub data: serde_json::Value,
}
