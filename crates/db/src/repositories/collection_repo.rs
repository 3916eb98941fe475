//! Repository for the `data_collections` table.

use appdock_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::collection::{Collection, CreateCollection, UpdateCollection};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, app_id, name, display_name, description, fields, \
    read_perm, create_perm, update_perm, delete_perm, created_at, updated_at";

/// Provides CRUD operations for data collections.
pub struct CollectionRepo;

impl CollectionRepo {
    /// Insert a new collection, applying permission-field defaults.
    ///
    /// A duplicate `(app_id, name)` violates `uq_data_collections_app_name`.
    pub async fn create(
        pool: &PgPool,
        app_id: DbId,
        input: &CreateCollection,
    ) -> Result<Collection, sqlx::Error> {
        let query = format!(
            "INSERT INTO data_collections
                (app_id, name, display_name, description, fields,
                 read_perm, create_perm, update_perm, delete_perm)
             VALUES ($1, $2, COALESCE($3, ''), COALESCE($4, ''),
                     COALESCE($5, '{{\"fields\": []}}'::jsonb),
                     COALESCE($6, 'public'), COALESCE($7, 'authenticated'),
                     COALESCE($8, 'creator'), COALESCE($9, 'creator'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Collection>(&query)
            .bind(app_id)
            .bind(&input.name)
            .bind(&input.display_name)
            .bind(&input.description)
            .bind(&input.fields)
            .bind(&input.read_perm)
            .bind(&input.create_perm)
            .bind(&input.update_perm)
            .bind(&input.delete_perm)
            .fetch_one(pool)
            .await
    }

    /// Find a collection by id, scoped to its app.
    pub async fn find_by_id(
        pool: &PgPool,
        app_id: DbId,
        id: DbId,
    ) -> Result<Option<Collection>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM data_collections WHERE id = $1 AND app_id = $2");
        sqlx::query_as::<_, Collection>(&query)
            .bind(id)
            .bind(app_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a collection by name, scoped to its app.
    pub async fn find_by_name(
        pool: &PgPool,
        app_id: DbId,
        name: &str,
    ) -> Result<Option<Collection>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM data_collections WHERE app_id = $1 AND name = $2");
        sqlx::query_as::<_, Collection>(&query)
            .bind(app_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List collections for an app, newest first, with an optional search
    /// term matched against name, display name, and description.
    pub async fn list(
        pool: &PgPool,
        app_id: DbId,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Collection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM data_collections
             WHERE app_id = $1
               AND ($2::text IS NULL
                    OR name ILIKE '%' || $2 || '%'
                    OR display_name ILIKE '%' || $2 || '%'
                    OR description ILIKE '%' || $2 || '%')
             ORDER BY id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Collection>(&query)
            .bind(app_id)
            .bind(search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count collections matching the same filters as [`Self::list`].
    pub async fn count(
        pool: &PgPool,
        app_id: DbId,
        search: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM data_collections
             WHERE app_id = $1
               AND ($2::text IS NULL
                    OR name ILIKE '%' || $2 || '%'
                    OR display_name ILIKE '%' || $2 || '%'
                    OR description ILIKE '%' || $2 || '%')",
        )
        .bind(app_id)
        .bind(search)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Update a collection. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row matches.
    pub async fn update(
        pool: &PgPool,
        app_id: DbId,
        id: DbId,
        input: &UpdateCollection,
    ) -> Result<Option<Collection>, sqlx::Error> {
        let query = format!(
            "UPDATE data_collections SET
                name = COALESCE($3, name),
                display_name = COALESCE($4, display_name),
                description = COALESCE($5, description),
                fields = COALESCE($6, fields),
                read_perm = COALESCE($7, read_perm),
                create_perm = COALESCE($8, create_perm),
                update_perm = COALESCE($9, update_perm),
                delete_perm = COALESCE($10, delete_perm),
                updated_at = NOW()
             WHERE id = $1 AND app_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Collection>(&query)
            .bind(id)
            .bind(app_id)
            .bind(&input.name)
            .bind(&input.display_name)
            .bind(&input.description)
            .bind(&input.fields)
            .bind(&input.read_perm)
            .bind(&input.create_perm)
            .bind(&input.update_perm)
            .bind(&input.delete_perm)
            .fetch_optional(pool)
            .await
    }

    /// Delete a collection. Its documents cascade at the schema level.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, app_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM data_collections WHERE id = $1 AND app_id = $2")
            .bind(id)
            .bind(app_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Definition access (used by the versioning service) ───────────

    /// Read the live field definition, locking the collection row for the
    /// duration of the surrounding transaction.
    pub async fn lock_definition(
        conn: &mut PgConnection,
        app_id: DbId,
        name: &str,
    ) -> Result<Option<serde_json::Value>, sqlx::Error> {
        let row: Option<(serde_json::Value,)> = sqlx::query_as(
            "SELECT fields FROM data_collections
             WHERE app_id = $1 AND name = $2
             FOR UPDATE",
        )
        .bind(app_id)
        .bind(name)
        .fetch_optional(conn)
        .await?;
        Ok(row.map(|r| r.0))
    }

    /// Overwrite the live field definition. Returns `true` if a row matched.
    pub async fn write_definition(
        conn: &mut PgConnection,
        app_id: DbId,
        name: &str,
        fields: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE data_collections SET fields = $3, updated_at = NOW()
             WHERE app_id = $1 AND name = $2",
        )
        .bind(app_id)
        .bind(name)
        .bind(fields)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
