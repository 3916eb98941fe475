//! App module models and DTOs.

use appdock_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `app_modules` table.
///
/// `config` is the module's live configuration; version snapshots capture
/// frozen copies of it in `resource_versions`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppModule {
    pub id: DbId,
    pub app_id: DbId,
    pub module_code: String,
    pub config: serde_json::Value,
    pub status: i16,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for enabling a module on an app.
#[derive(Debug, Clone, Deserialize)]
pub struct EnableModule {
    pub module_code: String,
}

/// DTO for batch-enabling modules on an app.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchEnableModules {
    pub module_codes: Vec<String>,
}

/// DTO for updating a module's status flag.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateModule {
    pub status: Option<i16>,
}

/// DTO for saving a module's configuration payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveModuleConfig {
    pub config: serde_json::Value,
}
