//! Repository for the `resource_versions` table: the snapshot store.
//!
//! Pure storage access; lifecycle rules live in [`crate::versioning`].
//! All queries are scoped by the full resource reference (app id, kind,
//! code) so one table serves both collection schemas and module configs.

use appdock_core::types::DbId;
use appdock_core::version::ResourceRef;
use sqlx::{PgConnection, PgPool};

use crate::models::resource_version::{ResourceVersion, SnapshotInsert, VersionFilter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, app_id, resource_kind, resource_code, version_num, \
    version_label, snapshot, status, environment, changelog, created_by, \
    published_at, created_at";

/// Provides storage operations for version snapshots.
pub struct ResourceVersionRepo;

impl ResourceVersionRepo {
    /// Insert a fully-resolved snapshot row.
    ///
    /// `published_at` is set iff the row is born `published` (rollback path).
    /// A duplicate `(resource, version_num)` violates
    /// `uq_resource_versions_num` and surfaces as a sqlx database error.
    pub async fn insert(
        conn: &mut PgConnection,
        resource: &ResourceRef,
        input: &SnapshotInsert,
    ) -> Result<ResourceVersion, sqlx::Error> {
        let query = format!(
            "INSERT INTO resource_versions
                (app_id, resource_kind, resource_code, version_num, version_label,
                 snapshot, status, environment, changelog, created_by, published_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                     CASE WHEN $7 = 'published' THEN NOW() END)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ResourceVersion>(&query)
            .bind(resource.app_id)
            .bind(resource.kind.as_str())
            .bind(&resource.code)
            .bind(input.version_num)
            .bind(&input.version_label)
            .bind(&input.snapshot)
            .bind(input.status.as_str())
            .bind(&input.environment)
            .bind(&input.changelog)
            .bind(&input.created_by)
            .fetch_one(conn)
            .await
    }

    /// Find a snapshot by primary key, scoped to its resource.
    pub async fn find_by_id(
        pool: &PgPool,
        resource: &ResourceRef,
        id: DbId,
    ) -> Result<Option<ResourceVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM resource_versions
             WHERE id = $1 AND app_id = $2 AND resource_kind = $3 AND resource_code = $4"
        );
        sqlx::query_as::<_, ResourceVersion>(&query)
            .bind(id)
            .bind(resource.app_id)
            .bind(resource.kind.as_str())
            .bind(&resource.code)
            .fetch_optional(pool)
            .await
    }

    /// Transaction-scoped variant of [`Self::find_by_id`] that locks the row.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        resource: &ResourceRef,
        id: DbId,
    ) -> Result<Option<ResourceVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM resource_versions
             WHERE id = $1 AND app_id = $2 AND resource_kind = $3 AND resource_code = $4
             FOR UPDATE"
        );
        sqlx::query_as::<_, ResourceVersion>(&query)
            .bind(id)
            .bind(resource.app_id)
            .bind(resource.kind.as_str())
            .bind(&resource.code)
            .fetch_optional(conn)
            .await
    }

    /// List snapshots for a resource, newest first (`version_num` DESC),
    /// with optional status/environment filters and pagination.
    pub async fn list(
        pool: &PgPool,
        resource: &ResourceRef,
        filter: &VersionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ResourceVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM resource_versions
             WHERE app_id = $1 AND resource_kind = $2 AND resource_code = $3
               AND ($4::text IS NULL OR status = $4)
               AND ($5::text IS NULL OR environment = $5)
             ORDER BY version_num DESC
             LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, ResourceVersion>(&query)
            .bind(resource.app_id)
            .bind(resource.kind.as_str())
            .bind(&resource.code)
            .bind(&filter.status)
            .bind(&filter.environment)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count snapshots matching the same filters as [`Self::list`].
    pub async fn count(
        pool: &PgPool,
        resource: &ResourceRef,
        filter: &VersionFilter,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM resource_versions
             WHERE app_id = $1 AND resource_kind = $2 AND resource_code = $3
               AND ($4::text IS NULL OR status = $4)
               AND ($5::text IS NULL OR environment = $5)",
        )
        .bind(resource.app_id)
        .bind(resource.kind.as_str())
        .bind(&resource.code)
        .bind(&filter.status)
        .bind(&filter.environment)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// The snapshot with the greatest `version_num`, if any exist.
    pub async fn latest(
        pool: &PgPool,
        resource: &ResourceRef,
    ) -> Result<Option<ResourceVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM resource_versions
             WHERE app_id = $1 AND resource_kind = $2 AND resource_code = $3
             ORDER BY version_num DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, ResourceVersion>(&query)
            .bind(resource.app_id)
            .bind(resource.kind.as_str())
            .bind(&resource.code)
            .fetch_optional(pool)
            .await
    }

    /// The currently published snapshot for a resource, if any.
    pub async fn find_published(
        pool: &PgPool,
        resource: &ResourceRef,
    ) -> Result<Option<ResourceVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM resource_versions
             WHERE app_id = $1 AND resource_kind = $2 AND resource_code = $3
               AND status = 'published'"
        );
        sqlx::query_as::<_, ResourceVersion>(&query)
            .bind(resource.app_id)
            .bind(resource.kind.as_str())
            .bind(&resource.code)
            .fetch_optional(pool)
            .await
    }

    /// Next sequence value: `max(version_num) + 1`, or 1 if none exist.
    ///
    /// Callers must hold the live-resource row lock (see the versioning
    /// service) so concurrent creates for the same resource serialize.
    pub async fn next_version_num(
        conn: &mut PgConnection,
        resource: &ResourceRef,
    ) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(version_num), 0) + 1 FROM resource_versions
             WHERE app_id = $1 AND resource_kind = $2 AND resource_code = $3",
        )
        .bind(resource.app_id)
        .bind(resource.kind.as_str())
        .bind(&resource.code)
        .fetch_one(conn)
        .await?;
        Ok(row.0)
    }

    /// Demote every published snapshot of a resource to `deprecated`.
    ///
    /// `published_at` is deliberately left intact: history is never erased.
    /// Returns the number of rows demoted (0 or 1 under the invariant).
    pub async fn demote_published(
        conn: &mut PgConnection,
        resource: &ResourceRef,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE resource_versions SET status = 'deprecated'
             WHERE app_id = $1 AND resource_kind = $2 AND resource_code = $3
               AND status = 'published'",
        )
        .bind(resource.app_id)
        .bind(resource.kind.as_str())
        .bind(&resource.code)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Promote a snapshot to `published`, stamping `published_at` once.
    pub async fn mark_published(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<ResourceVersion, sqlx::Error> {
        let query = format!(
            "UPDATE resource_versions
             SET status = 'published', published_at = COALESCE(published_at, NOW())
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ResourceVersion>(&query)
            .bind(id)
            .fetch_one(conn)
            .await
    }
}
