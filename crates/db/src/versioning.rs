//! Versioning service: snapshot creation, the publish state machine, and
//! rollback, generic over the resource kind.
//!
//! The service owns the transactions. Every mutating operation starts by
//! locking the live resource row (`FOR UPDATE` through [`DefinitionAccess`]),
//! which serializes concurrent writers per resource and makes
//! `max(version_num) + 1` safe; `uq_resource_versions_num` backstops the
//! lock and turns any remaining race into a conflict error instead of a
//! duplicate sequence number.

use appdock_core::error::CoreError;
use appdock_core::types::DbId;
use appdock_core::version::{ResourceKind, ResourceRef, VersionStatus};
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;
use tracing::info;

use crate::models::resource_version::{
    CreateVersionRequest, ResourceVersion, SnapshotInsert, VersionFilter, VersionPage,
};
use crate::repositories::{AppModuleRepo, CollectionRepo, ResourceVersionRepo};

/// Environment recorded on a snapshot when the caller supplies none.
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Errors surfaced by the versioning service.
#[derive(Debug, Error)]
pub enum VersionError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Access to a resource's live definition, the thing snapshots freeze and
/// rollback restores.
///
/// Implementations read with a row lock so the surrounding transaction
/// serializes writers for that resource.
#[async_trait]
pub trait DefinitionAccess: Send + Sync {
    fn kind(&self) -> ResourceKind;

    /// Read the live definition, locking its row. `None` means the resource
    /// itself does not exist.
    async fn read_definition(
        &self,
        conn: &mut PgConnection,
        app_id: DbId,
        code: &str,
    ) -> Result<Option<serde_json::Value>, sqlx::Error>;

    /// Overwrite the live definition. Returns `false` if the resource is gone.
    async fn write_definition(
        &self,
        conn: &mut PgConnection,
        app_id: DbId,
        code: &str,
        definition: &serde_json::Value,
    ) -> Result<bool, sqlx::Error>;
}

/// Binds the versioning core to collection field schemas. The resource code
/// is the collection name.
pub struct CollectionDefinitions;

#[async_trait]
impl DefinitionAccess for CollectionDefinitions {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Collection
    }

    async fn read_definition(
        &self,
        conn: &mut PgConnection,
        app_id: DbId,
        code: &str,
    ) -> Result<Option<serde_json::Value>, sqlx::Error> {
        CollectionRepo::lock_definition(conn, app_id, code).await
    }

    async fn write_definition(
        &self,
        conn: &mut PgConnection,
        app_id: DbId,
        code: &str,
        definition: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        CollectionRepo::write_definition(conn, app_id, code, definition).await
    }
}

/// Binds the versioning core to module config payloads. The resource code is
/// the module code.
pub struct ModuleDefinitions;

#[async_trait]
impl DefinitionAccess for ModuleDefinitions {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Module
    }

    async fn read_definition(
        &self,
        conn: &mut PgConnection,
        app_id: DbId,
        code: &str,
    ) -> Result<Option<serde_json::Value>, sqlx::Error> {
        AppModuleRepo::lock_config(conn, app_id, code).await
    }

    async fn write_definition(
        &self,
        conn: &mut PgConnection,
        app_id: DbId,
        code: &str,
        definition: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        AppModuleRepo::write_config(conn, app_id, code, definition).await
    }
}

/// Orchestrates version lifecycle operations for one resource kind.
pub struct VersionService<A: DefinitionAccess> {
    access: A,
}

impl VersionService<CollectionDefinitions> {
    pub fn collections() -> Self {
        Self {
            access: CollectionDefinitions,
        }
    }
}

impl VersionService<ModuleDefinitions> {
    pub fn modules() -> Self {
        Self {
            access: ModuleDefinitions,
        }
    }
}

impl<A: DefinitionAccess> VersionService<A> {
    pub fn kind(&self) -> ResourceKind {
        self.access.kind()
    }

    fn resource(&self, app_id: DbId, code: &str) -> ResourceRef {
        ResourceRef::new(app_id, self.access.kind(), code)
    }

    fn not_found(&self, code: &str) -> CoreError {
        CoreError::NotFound {
            entity: self.access.kind().entity_name(),
            key: code.to_string(),
        }
    }

    /// Create a draft snapshot of the live definition.
    ///
    /// The live row lock holds until commit, so the sequence read and the
    /// insert are atomic with respect to other creates for the resource.
    pub async fn create(
        &self,
        pool: &PgPool,
        app_id: DbId,
        code: &str,
        input: &CreateVersionRequest,
        actor: &str,
    ) -> Result<ResourceVersion, VersionError> {
        let resource = self.resource(app_id, code);
        let mut tx = pool.begin().await?;

        let definition = self
            .access
            .read_definition(&mut *tx, app_id, code)
            .await?
            .ok_or_else(|| self.not_found(code))?;

        let version_num = ResourceVersionRepo::next_version_num(&mut *tx, &resource).await?;
        let version_label = match &input.version_label {
            Some(label) if !label.is_empty() => label.clone(),
            _ => resource.kind.default_label(version_num),
        };

        let insert = SnapshotInsert {
            version_num,
            version_label,
            snapshot: definition,
            status: VersionStatus::Draft,
            environment: input
                .environment
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            changelog: input.changelog.clone().unwrap_or_default(),
            created_by: actor.to_string(),
        };
        let version = ResourceVersionRepo::insert(&mut *tx, &resource, &insert).await?;
        tx.commit().await?;

        info!(resource = %resource, version_num, "created version snapshot");
        Ok(version)
    }

    /// Publish a draft snapshot, demoting whatever was published before.
    pub async fn publish(
        &self,
        pool: &PgPool,
        app_id: DbId,
        code: &str,
        version_id: DbId,
    ) -> Result<ResourceVersion, VersionError> {
        let resource = self.resource(app_id, code);
        let mut tx = pool.begin().await?;

        let version = ResourceVersionRepo::find_by_id_for_update(&mut *tx, &resource, version_id)
            .await?
            .ok_or_else(|| CoreError::not_found_id("Version", version_id))?;
        let status: VersionStatus = version.status.parse()?;
        status.ensure_publishable()?;

        ResourceVersionRepo::demote_published(&mut *tx, &resource).await?;
        let published = ResourceVersionRepo::mark_published(&mut *tx, version.id).await?;
        tx.commit().await?;

        info!(resource = %resource, version_num = published.version_num, "published version");
        Ok(published)
    }

    /// Roll the live definition back to a historical snapshot.
    ///
    /// The target snapshot is left untouched. Its content is copied over the
    /// live definition and recorded as a new snapshot, born published, whose
    /// changelog names the source version.
    pub async fn rollback(
        &self,
        pool: &PgPool,
        app_id: DbId,
        code: &str,
        version_id: DbId,
        actor: &str,
    ) -> Result<ResourceVersion, VersionError> {
        let resource = self.resource(app_id, code);
        let mut tx = pool.begin().await?;

        let target = ResourceVersionRepo::find_by_id_for_update(&mut *tx, &resource, version_id)
            .await?
            .ok_or_else(|| CoreError::not_found_id("Version", version_id))?;

        // Locks the live row; also guards against the resource having been
        // deleted since the snapshot was taken.
        self.access
            .read_definition(&mut *tx, app_id, code)
            .await?
            .ok_or_else(|| self.not_found(code))?;

        let restored = self
            .access
            .write_definition(&mut *tx, app_id, code, &target.snapshot)
            .await?;
        if !restored {
            return Err(self.not_found(code).into());
        }

        let version_num = ResourceVersionRepo::next_version_num(&mut *tx, &resource).await?;
        ResourceVersionRepo::demote_published(&mut *tx, &resource).await?;
        let insert = SnapshotInsert {
            version_num,
            version_label: resource.kind.default_label(version_num),
            snapshot: target.snapshot.clone(),
            status: VersionStatus::Published,
            environment: target.environment.clone(),
            changelog: format!(
                "Rolled back to version {} ({})",
                target.version_num, target.version_label
            ),
            created_by: actor.to_string(),
        };
        let version = ResourceVersionRepo::insert(&mut *tx, &resource, &insert).await?;
        tx.commit().await?;

        info!(
            resource = %resource,
            from = target.version_num,
            version_num = version.version_num,
            "rolled back to historical snapshot"
        );
        Ok(version)
    }

    /// Fetch a single snapshot.
    pub async fn get(
        &self,
        pool: &PgPool,
        app_id: DbId,
        code: &str,
        version_id: DbId,
    ) -> Result<ResourceVersion, VersionError> {
        let resource = self.resource(app_id, code);
        ResourceVersionRepo::find_by_id(pool, &resource, version_id)
            .await?
            .ok_or_else(|| CoreError::not_found_id("Version", version_id).into())
    }

    /// List snapshots, newest first, with the unpaginated total.
    pub async fn list(
        &self,
        pool: &PgPool,
        app_id: DbId,
        code: &str,
        filter: &VersionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<VersionPage, VersionError> {
        let resource = self.resource(app_id, code);
        let items = ResourceVersionRepo::list(pool, &resource, filter, limit, offset).await?;
        let total = ResourceVersionRepo::count(pool, &resource, filter).await?;
        Ok(VersionPage { items, total })
    }

    /// Load two snapshots of the same resource for comparison.
    ///
    /// The diff itself is a pure computation in the core crate; this only
    /// resolves the ids.
    pub async fn load_pair(
        &self,
        pool: &PgPool,
        app_id: DbId,
        code: &str,
        base_id: DbId,
        target_id: DbId,
    ) -> Result<(ResourceVersion, ResourceVersion), VersionError> {
        let resource = self.resource(app_id, code);
        let base = ResourceVersionRepo::find_by_id(pool, &resource, base_id)
            .await?
            .ok_or_else(|| CoreError::not_found_id("Version", base_id))?;
        let target = ResourceVersionRepo::find_by_id(pool, &resource, target_id)
            .await?
            .ok_or_else(|| CoreError::not_found_id("Version", target_id))?;
        Ok((base, target))
    }

    /// The currently published snapshot, if any.
    pub async fn published(
        &self,
        pool: &PgPool,
        app_id: DbId,
        code: &str,
    ) -> Result<Option<ResourceVersion>, VersionError> {
        let resource = self.resource(app_id, code);
        Ok(ResourceVersionRepo::find_published(pool, &resource).await?)
    }
}
