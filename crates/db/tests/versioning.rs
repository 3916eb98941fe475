//! Integration tests for the versioning service against a real database:
//! - Snapshot creation with sequential version numbers and default labels
//! - Publish demotes the previously published snapshot
//! - Publish rejects already-published and deprecated snapshots
//! - Rollback restores the live definition and appends a published snapshot
//! - Listing order, filters, and totals
//! - Collection and module resources behave identically

use appdock_core::error::CoreError;
use appdock_db::models::collection::CreateCollection;
use appdock_db::models::resource_version::{CreateVersionRequest, VersionFilter};
use appdock_db::repositories::{AppModuleRepo, CollectionRepo};
use appdock_db::versioning::{VersionError, VersionService};
use assert_matches::assert_matches;
use serde_json::json;
use sqlx::PgPool;

const APP: i64 = 1;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_collection(name: &str, fields: serde_json::Value) -> CreateCollection {
    CreateCollection {
        name: name.to_string(),
        display_name: None,
        description: None,
        fields: Some(fields),
        read_perm: None,
        create_perm: None,
        update_perm: None,
        delete_perm: None,
    }
}

fn schema_v1() -> serde_json::Value {
    json!({ "fields": [
        {"name": "name", "type": "string", "required": true},
        {"name": "age", "type": "number"}
    ]})
}

fn schema_v2() -> serde_json::Value {
    json!({ "fields": [
        {"name": "name", "type": "string", "required": true},
        {"name": "age", "type": "number", "required": true},
        {"name": "email", "type": "string"}
    ]})
}

async fn setup_collection(pool: &PgPool, name: &str) -> String {
    CollectionRepo::create(pool, APP, &new_collection(name, schema_v1()))
        .await
        .unwrap();
    name.to_string()
}

// ---------------------------------------------------------------------------
// Test: create assigns sequential version numbers and draft status
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_version_defaults(pool: PgPool) {
    let code = setup_collection(&pool, "articles").await;
    let service = VersionService::collections();

    let v1 = service
        .create(&pool, APP, &code, &CreateVersionRequest::default(), "alice")
        .await
        .unwrap();

    assert!(v1.id > 0, "id should be auto-generated");
    assert_eq!(v1.version_num, 1);
    assert_eq!(v1.version_label, "1.0.1");
    assert_eq!(v1.status, "draft");
    assert_eq!(v1.environment, "dev");
    assert_eq!(v1.created_by, "alice");
    assert_eq!(v1.snapshot, schema_v1());
    assert!(v1.published_at.is_none(), "drafts carry no publish time");

    // Defaulted snapshots are visible to the default-environment filter.
    let filter = VersionFilter {
        status: None,
        environment: Some("dev".to_string()),
    };
    let page = service
        .list(&pool, APP, &code, &filter, 20, 0)
        .await
        .unwrap();
    assert_eq!(page.total, 1);

    let v2 = service
        .create(&pool, APP, &code, &CreateVersionRequest::default(), "alice")
        .await
        .unwrap();
    assert_eq!(v2.version_num, 2);
    assert_eq!(v2.version_label, "1.0.2");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_honors_caller_label_and_metadata(pool: PgPool) {
    let code = setup_collection(&pool, "articles").await;
    let service = VersionService::collections();

    let input = CreateVersionRequest {
        version_label: Some("2024-launch".to_string()),
        environment: Some("staging".to_string()),
        changelog: Some("initial schema".to_string()),
    };
    let version = service.create(&pool, APP, &code, &input, "bob").await.unwrap();

    assert_eq!(version.version_label, "2024-launch");
    assert_eq!(version.environment, "staging");
    assert_eq!(version.changelog, "initial schema");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_for_missing_resource_fails(pool: PgPool) {
    let service = VersionService::collections();

    let err = service
        .create(&pool, APP, "ghost", &CreateVersionRequest::default(), "")
        .await
        .unwrap_err();
    assert_matches!(err, VersionError::Core(CoreError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Test: publish state machine
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_publish_demotes_previous(pool: PgPool) {
    let code = setup_collection(&pool, "articles").await;
    let service = VersionService::collections();
    let req = CreateVersionRequest::default();

    let v1 = service.create(&pool, APP, &code, &req, "").await.unwrap();
    let v1 = service.publish(&pool, APP, &code, v1.id).await.unwrap();
    assert_eq!(v1.status, "published");
    assert!(v1.published_at.is_some());

    let v2 = service.create(&pool, APP, &code, &req, "").await.unwrap();
    let v2 = service.publish(&pool, APP, &code, v2.id).await.unwrap();
    assert_eq!(v2.status, "published");

    // v1 is demoted but keeps its publish timestamp.
    let v1_reloaded = service.get(&pool, APP, &code, v1.id).await.unwrap();
    assert_eq!(v1_reloaded.status, "deprecated");
    assert_eq!(v1_reloaded.published_at, v1.published_at);

    let published = service.published(&pool, APP, &code).await.unwrap().unwrap();
    assert_eq!(published.id, v2.id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_publish_rejects_already_published(pool: PgPool) {
    let code = setup_collection(&pool, "articles").await;
    let service = VersionService::collections();

    let v1 = service
        .create(&pool, APP, &code, &CreateVersionRequest::default(), "")
        .await
        .unwrap();
    service.publish(&pool, APP, &code, v1.id).await.unwrap();

    let err = service.publish(&pool, APP, &code, v1.id).await.unwrap_err();
    assert_matches!(err, VersionError::Core(CoreError::InvalidState(_)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_publish_rejects_deprecated(pool: PgPool) {
    let code = setup_collection(&pool, "articles").await;
    let service = VersionService::collections();
    let req = CreateVersionRequest::default();

    let v1 = service.create(&pool, APP, &code, &req, "").await.unwrap();
    service.publish(&pool, APP, &code, v1.id).await.unwrap();
    let v2 = service.create(&pool, APP, &code, &req, "").await.unwrap();
    service.publish(&pool, APP, &code, v2.id).await.unwrap();

    // v1 is now deprecated; it cannot be republished directly.
    let err = service.publish(&pool, APP, &code, v1.id).await.unwrap_err();
    assert_matches!(err, VersionError::Core(CoreError::InvalidState(_)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_publish_missing_version_fails(pool: PgPool) {
    let code = setup_collection(&pool, "articles").await;
    let service = VersionService::collections();

    let err = service.publish(&pool, APP, &code, 9999).await.unwrap_err();
    assert_matches!(err, VersionError::Core(CoreError::NotFound { .. }));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_at_most_one_published_version(pool: PgPool) {
    let code = setup_collection(&pool, "articles").await;
    let service = VersionService::collections();
    let req = CreateVersionRequest::default();

    for _ in 0..3 {
        let v = service.create(&pool, APP, &code, &req, "").await.unwrap();
        service.publish(&pool, APP, &code, v.id).await.unwrap();
    }

    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM resource_versions WHERE status = 'published'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(row.0, 1);
}

// ---------------------------------------------------------------------------
// Test: rollback
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_rollback_restores_live_definition(pool: PgPool) {
    let code = setup_collection(&pool, "articles").await;
    let service = VersionService::collections();
    let req = CreateVersionRequest::default();

    // v1 snapshots the original schema and is published.
    let v1 = service.create(&pool, APP, &code, &req, "alice").await.unwrap();
    service.publish(&pool, APP, &code, v1.id).await.unwrap();

    // The live schema evolves; v2 snapshots and publishes it.
    let collection = CollectionRepo::find_by_name(&pool, APP, &code)
        .await
        .unwrap()
        .unwrap();
    CollectionRepo::update(
        &pool,
        APP,
        collection.id,
        &appdock_db::models::collection::UpdateCollection {
            fields: Some(schema_v2()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let v2 = service.create(&pool, APP, &code, &req, "alice").await.unwrap();
    service.publish(&pool, APP, &code, v2.id).await.unwrap();

    // Roll back to v1.
    let v3 = service
        .rollback(&pool, APP, &code, v1.id, "carol")
        .await
        .unwrap();

    assert_eq!(v3.version_num, 3, "rollback appends, never rewrites");
    assert_eq!(v3.status, "published");
    assert_eq!(v3.snapshot, schema_v1());
    assert_eq!(v3.created_by, "carol");
    assert!(v3.changelog.contains("version 1"));

    // The live definition matches the restored snapshot.
    let collection = CollectionRepo::find_by_name(&pool, APP, &code)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(collection.fields, schema_v1());

    // v2 was demoted; v1 is untouched.
    let v2_reloaded = service.get(&pool, APP, &code, v2.id).await.unwrap();
    assert_eq!(v2_reloaded.status, "deprecated");
    let v1_reloaded = service.get(&pool, APP, &code, v1.id).await.unwrap();
    assert_eq!(v1_reloaded.status, "deprecated");
    assert_eq!(v1_reloaded.snapshot, schema_v1());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_rollback_to_missing_version_fails(pool: PgPool) {
    let code = setup_collection(&pool, "articles").await;
    let service = VersionService::collections();

    let err = service
        .rollback(&pool, APP, &code, 9999, "")
        .await
        .unwrap_err();
    assert_matches!(err, VersionError::Core(CoreError::NotFound { .. }));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_rollback_works_from_draft_target(pool: PgPool) {
    let code = setup_collection(&pool, "articles").await;
    let service = VersionService::collections();
    let req = CreateVersionRequest::default();

    // A draft snapshot can be a rollback target too.
    let v1 = service.create(&pool, APP, &code, &req, "").await.unwrap();
    let restored = service.rollback(&pool, APP, &code, v1.id, "").await.unwrap();

    assert_eq!(restored.version_num, 2);
    assert_eq!(restored.status, "published");
}

// ---------------------------------------------------------------------------
// Test: listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_orders_and_filters(pool: PgPool) {
    let code = setup_collection(&pool, "articles").await;
    let service = VersionService::collections();
    let req = CreateVersionRequest::default();

    let v1 = service.create(&pool, APP, &code, &req, "").await.unwrap();
    service.publish(&pool, APP, &code, v1.id).await.unwrap();
    service.create(&pool, APP, &code, &req, "").await.unwrap();
    service.create(&pool, APP, &code, &req, "").await.unwrap();

    let page = service
        .list(&pool, APP, &code, &VersionFilter::default(), 20, 0)
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    let nums: Vec<i32> = page.items.iter().map(|v| v.version_num).collect();
    assert_eq!(nums, vec![3, 2, 1], "newest first");

    let drafts = service
        .list(
            &pool,
            APP,
            &code,
            &VersionFilter {
                status: Some("draft".to_string()),
                environment: None,
            },
            20,
            0,
        )
        .await
        .unwrap();
    assert_eq!(drafts.total, 2);
    assert!(drafts.items.iter().all(|v| v.status == "draft"));

    let page_two = service
        .list(&pool, APP, &code, &VersionFilter::default(), 2, 2)
        .await
        .unwrap();
    assert_eq!(page_two.items.len(), 1);
    assert_eq!(page_two.total, 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_versions_are_scoped_per_resource(pool: PgPool) {
    let a = setup_collection(&pool, "articles").await;
    let b = setup_collection(&pool, "comments").await;
    let service = VersionService::collections();
    let req = CreateVersionRequest::default();

    service.create(&pool, APP, &a, &req, "").await.unwrap();
    service.create(&pool, APP, &a, &req, "").await.unwrap();
    let b1 = service.create(&pool, APP, &b, &req, "").await.unwrap();

    // Sequences are independent per resource.
    assert_eq!(b1.version_num, 1);

    let page = service
        .list(&pool, APP, &b, &VersionFilter::default(), 20, 0)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

// ---------------------------------------------------------------------------
// Test: module resources behave identically
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_module_version_lifecycle(pool: PgPool) {
    AppModuleRepo::create(&pool, APP, "push_service").await.unwrap();
    AppModuleRepo::update_config(&pool, APP, "push_service", &json!({"provider": "apns"}))
        .await
        .unwrap();

    let service = VersionService::modules();
    let req = CreateVersionRequest::default();

    let v1 = service
        .create(&pool, APP, "push_service", &req, "dave")
        .await
        .unwrap();
    assert_eq!(v1.version_label, "1.0.0", "module labels use the major slot");
    assert_eq!(v1.snapshot, json!({"provider": "apns"}));

    let v1 = service.publish(&pool, APP, "push_service", v1.id).await.unwrap();
    assert_eq!(v1.status, "published");

    // Change the live config, snapshot, publish, then roll back.
    AppModuleRepo::update_config(&pool, APP, "push_service", &json!({"provider": "fcm"}))
        .await
        .unwrap();
    let v2 = service
        .create(&pool, APP, "push_service", &req, "dave")
        .await
        .unwrap();
    service.publish(&pool, APP, "push_service", v2.id).await.unwrap();

    let v3 = service
        .rollback(&pool, APP, "push_service", v1.id, "dave")
        .await
        .unwrap();
    assert_eq!(v3.snapshot, json!({"provider": "apns"}));

    let module = AppModuleRepo::find_by_code(&pool, APP, "push_service")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(module.config, json!({"provider": "apns"}));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_collection_and_module_sequences_are_independent(pool: PgPool) {
    // Same app id and code across kinds must not share a sequence.
    setup_collection(&pool, "shared_code").await;
    AppModuleRepo::create(&pool, APP, "shared_code").await.unwrap();

    let col = VersionService::collections();
    let module = VersionService::modules();
    let req = CreateVersionRequest::default();

    col.create(&pool, APP, "shared_code", &req, "").await.unwrap();
    col.create(&pool, APP, "shared_code", &req, "").await.unwrap();
    let m1 = module.create(&pool, APP, "shared_code", &req, "").await.unwrap();

    assert_eq!(m1.version_num, 1);
}
