//! Repository for the `app_modules` table.

use appdock_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::app_module::AppModule;

const COLUMNS: &str = "id, app_id, module_code, config, status, created_at, updated_at";

/// Provides operations over modules enabled on an app.
pub struct AppModuleRepo;

impl AppModuleRepo {
    /// Enable a module on an app with an empty config and active status.
    ///
    /// A duplicate `(app_id, module_code)` violates `uq_app_modules_app_code`.
    pub async fn create(
        pool: &PgPool,
        app_id: DbId,
        module_code: &str,
    ) -> Result<AppModule, sqlx::Error> {
        let query = format!(
            "INSERT INTO app_modules (app_id, module_code)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppModule>(&query)
            .bind(app_id)
            .bind(module_code)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        app_id: DbId,
        id: DbId,
    ) -> Result<Option<AppModule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM app_modules WHERE id = $1 AND app_id = $2");
        sqlx::query_as::<_, AppModule>(&query)
            .bind(id)
            .bind(app_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_code(
        pool: &PgPool,
        app_id: DbId,
        module_code: &str,
    ) -> Result<Option<AppModule>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM app_modules WHERE app_id = $1 AND module_code = $2");
        sqlx::query_as::<_, AppModule>(&query)
            .bind(app_id)
            .bind(module_code)
            .fetch_optional(pool)
            .await
    }

    /// All modules enabled on an app, in enable order.
    pub async fn list_by_app(pool: &PgPool, app_id: DbId) -> Result<Vec<AppModule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM app_modules WHERE app_id = $1 ORDER BY id");
        sqlx::query_as::<_, AppModule>(&query)
            .bind(app_id)
            .fetch_all(pool)
            .await
    }

    /// Update a module's status flag. Returns `None` if no row matches.
    pub async fn update_status(
        pool: &PgPool,
        app_id: DbId,
        id: DbId,
        status: i16,
    ) -> Result<Option<AppModule>, sqlx::Error> {
        let query = format!(
            "UPDATE app_modules SET status = $3, updated_at = NOW()
             WHERE id = $1 AND app_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppModule>(&query)
            .bind(id)
            .bind(app_id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Replace a module's live configuration payload.
    pub async fn update_config(
        pool: &PgPool,
        app_id: DbId,
        module_code: &str,
        config: &serde_json::Value,
    ) -> Result<Option<AppModule>, sqlx::Error> {
        let query = format!(
            "UPDATE app_modules SET config = $3, updated_at = NOW()
             WHERE app_id = $1 AND module_code = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppModule>(&query)
            .bind(app_id)
            .bind(module_code)
            .bind(config)
            .fetch_optional(pool)
            .await
    }

    /// Reset a module's configuration back to the empty object.
    pub async fn reset_config(
        pool: &PgPool,
        app_id: DbId,
        module_code: &str,
    ) -> Result<Option<AppModule>, sqlx::Error> {
        let query = format!(
            "UPDATE app_modules SET config = '{{}}'::jsonb, updated_at = NOW()
             WHERE app_id = $1 AND module_code = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppModule>(&query)
            .bind(app_id)
            .bind(module_code)
            .fetch_optional(pool)
            .await
    }

    /// Disable (remove) a module from an app. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, app_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM app_modules WHERE id = $1 AND app_id = $2")
            .bind(id)
            .bind(app_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Definition access (used by the versioning service) ───────────

    /// Read the live config, locking the module row for the duration of the
    /// surrounding transaction.
    pub async fn lock_config(
        conn: &mut PgConnection,
        app_id: DbId,
        module_code: &str,
    ) -> Result<Option<serde_json::Value>, sqlx::Error> {
        let row: Option<(serde_json::Value,)> = sqlx::query_as(
            "SELECT config FROM app_modules
             WHERE app_id = $1 AND module_code = $2
             FOR UPDATE",
        )
        .bind(app_id)
        .bind(module_code)
        .fetch_optional(conn)
        .await?;
        Ok(row.map(|r| r.0))
    }

    /// Overwrite the live config. Returns `true` if a row matched.
    pub async fn write_config(
        conn: &mut PgConnection,
        app_id: DbId,
        module_code: &str,
        config: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE app_modules SET config = $3, updated_at = NOW()
             WHERE app_id = $1 AND module_code = $2",
        )
        .bind(app_id)
        .bind(module_code)
        .bind(config)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
