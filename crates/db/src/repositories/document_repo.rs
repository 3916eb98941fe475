//! Repository for the `data_documents` table.

use appdock_core::types::DbId;
use sqlx::PgPool;

use crate::models::document::Document;

const COLUMNS: &str =
    "id, collection_id, app_id, data, created_by, updated_by, created_at, updated_at";

/// Provides CRUD operations for documents stored inside a collection.
pub struct DocumentRepo;

impl DocumentRepo {
    pub async fn create(
        pool: &PgPool,
        collection_id: DbId,
        app_id: DbId,
        data: &serde_json::Value,
        actor: &str,
    ) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO data_documents (collection_id, app_id, data, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(collection_id)
            .bind(app_id)
            .bind(data)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        collection_id: DbId,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM data_documents WHERE id = $1 AND collection_id = $2");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(collection_id)
            .fetch_optional(pool)
            .await
    }

    /// List documents in a collection, newest first.
    pub async fn list(
        pool: &PgPool,
        collection_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM data_documents
             WHERE collection_id = $1
             ORDER BY id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(collection_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, collection_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM data_documents WHERE collection_id = $1")
                .bind(collection_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Replace a document's data. Returns `None` if no row matches.
    pub async fn update(
        pool: &PgPool,
        collection_id: DbId,
        id: DbId,
        data: &serde_json::Value,
        actor: &str,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE data_documents
             SET data = $3, updated_by = $4, updated_at = NOW()
             WHERE id = $1 AND collection_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(collection_id)
            .bind(data)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, collection_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM data_documents WHERE id = $1 AND collection_id = $2")
            .bind(id)
            .bind(collection_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether any document in the collection already carries `value` in the
    /// field `name`. `exclude_id` skips the document being updated.
    pub async fn exists_with_field_value(
        pool: &PgPool,
        collection_id: DbId,
        name: &str,
        value: &serde_json::Value,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(
                SELECT 1 FROM data_documents
                WHERE collection_id = $1
                  AND data -> $2 = $3
                  AND ($4::bigint IS NULL OR id <> $4)
             )",
        )
        .bind(collection_id)
        .bind(name)
        .bind(value)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
