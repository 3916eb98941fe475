//! Repository for the `app_releases` table (client release channel).
//!
//! Releases have their own lifecycle (`draft`, `published`, `offline`) and,
//! unlike resource versions, several releases may be published at once; the
//! check-update query picks the highest published `version_code`.

use appdock_core::types::DbId;
use sqlx::PgPool;

use crate::models::release::{CreateRelease, Release, ReleaseStats, UpdateRelease};

const COLUMNS: &str = "id, app_id, version_name, version_code, description, \
    download_url, force_update, status, published_at, created_at";

/// Provides operations over app releases.
pub struct ReleaseRepo;

impl ReleaseRepo {
    /// Insert a draft release, assigning the next `version_code` for the app.
    pub async fn create(
        pool: &PgPool,
        app_id: DbId,
        input: &CreateRelease,
    ) -> Result<Release, sqlx::Error> {
        let query = format!(
            "INSERT INTO app_releases
                (app_id, version_name, version_code, description, download_url, force_update)
             SELECT $1, $2,
                    COALESCE(MAX(version_code), 0) + 1,
                    COALESCE($3, ''), COALESCE($4, ''), COALESCE($5, FALSE)
             FROM app_releases WHERE app_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Release>(&query)
            .bind(app_id)
            .bind(&input.version_name)
            .bind(&input.description)
            .bind(&input.download_url)
            .bind(input.force_update)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        app_id: DbId,
        id: DbId,
    ) -> Result<Option<Release>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM app_releases WHERE id = $1 AND app_id = $2");
        sqlx::query_as::<_, Release>(&query)
            .bind(id)
            .bind(app_id)
            .fetch_optional(pool)
            .await
    }

    /// List releases for an app, newest first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        app_id: DbId,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Release>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM app_releases
             WHERE app_id = $1 AND ($2::text IS NULL OR status = $2)
             ORDER BY version_code DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Release>(&query)
            .bind(app_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(
        pool: &PgPool,
        app_id: DbId,
        status: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM app_releases
             WHERE app_id = $1 AND ($2::text IS NULL OR status = $2)",
        )
        .bind(app_id)
        .bind(status)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Update release metadata. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        app_id: DbId,
        id: DbId,
        input: &UpdateRelease,
    ) -> Result<Option<Release>, sqlx::Error> {
        let query = format!(
            "UPDATE app_releases SET
                version_name = COALESCE($3, version_name),
                description = COALESCE($4, description),
                download_url = COALESCE($5, download_url),
                force_update = COALESCE($6, force_update)
             WHERE id = $1 AND app_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Release>(&query)
            .bind(id)
            .bind(app_id)
            .bind(&input.version_name)
            .bind(&input.description)
            .bind(&input.download_url)
            .bind(input.force_update)
            .fetch_optional(pool)
            .await
    }

    /// Publish a release, stamping `published_at` on the first publish.
    pub async fn publish(
        pool: &PgPool,
        app_id: DbId,
        id: DbId,
    ) -> Result<Option<Release>, sqlx::Error> {
        let query = format!(
            "UPDATE app_releases
             SET status = 'published', published_at = COALESCE(published_at, NOW())
             WHERE id = $1 AND app_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Release>(&query)
            .bind(id)
            .bind(app_id)
            .fetch_optional(pool)
            .await
    }

    /// Take a release offline.
    pub async fn offline(
        pool: &PgPool,
        app_id: DbId,
        id: DbId,
    ) -> Result<Option<Release>, sqlx::Error> {
        let query = format!(
            "UPDATE app_releases SET status = 'offline'
             WHERE id = $1 AND app_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Release>(&query)
            .bind(id)
            .bind(app_id)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, app_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM app_releases WHERE id = $1 AND app_id = $2")
            .bind(id)
            .bind(app_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The published release with the highest `version_code`, if any.
    pub async fn find_latest_published(
        pool: &PgPool,
        app_id: DbId,
    ) -> Result<Option<Release>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM app_releases
             WHERE app_id = $1 AND status = 'published'
             ORDER BY version_code DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Release>(&query)
            .bind(app_id)
            .fetch_optional(pool)
            .await
    }

    /// Per-status counts for an app's releases.
    pub async fn stats(pool: &PgPool, app_id: DbId) -> Result<ReleaseStats, sqlx::Error> {
        let row: (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*),
                    COUNT(*) FILTER (WHERE status = 'published'),
                    COUNT(*) FILTER (WHERE status = 'draft'),
                    COUNT(*) FILTER (WHERE status = 'offline')
             FROM app_releases WHERE app_id = $1",
        )
        .bind(app_id)
        .fetch_one(pool)
        .await?;
        Ok(ReleaseStats {
            total: row.0,
            published: row.1,
            draft: row.2,
            offline: row.3,
        })
    }
}
