//! Integration tests for collection and document storage:
//! - Collection creation applies permission defaults
//! - `(app_id, name)` uniqueness is enforced by the schema
//! - Partial updates only touch provided fields
//! - Deleting a collection cascades to its documents
//! - Search matches name, display name, and description
//! - Field-value uniqueness probe for document writes

use appdock_db::models::collection::{CreateCollection, UpdateCollection};
use appdock_db::repositories::{CollectionRepo, DocumentRepo};
use serde_json::json;
use sqlx::PgPool;

const APP: i64 = 1;

fn minimal(name: &str) -> CreateCollection {
    CreateCollection {
        name: name.to_string(),
        display_name: None,
        description: None,
        fields: None,
        read_perm: None,
        create_perm: None,
        update_perm: None,
        delete_perm: None,
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_applies_defaults(pool: PgPool) {
    let collection = CollectionRepo::create(&pool, APP, &minimal("articles"))
        .await
        .unwrap();

    assert_eq!(collection.name, "articles");
    assert_eq!(collection.display_name, "");
    assert_eq!(collection.fields, json!({ "fields": [] }));
    assert_eq!(collection.read_perm, "public");
    assert_eq!(collection.create_perm, "authenticated");
    assert_eq!(collection.update_perm, "creator");
    assert_eq!(collection.delete_perm, "creator");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_duplicate_name_violates_unique_constraint(pool: PgPool) {
    CollectionRepo::create(&pool, APP, &minimal("articles"))
        .await
        .unwrap();

    let err = CollectionRepo::create(&pool, APP, &minimal("articles"))
        .await
        .unwrap_err();
    let db_err = err.as_database_error().expect("expected database error");
    assert_eq!(db_err.constraint(), Some("uq_data_collections_app_name"));

    // Same name under a different app is fine.
    CollectionRepo::create(&pool, 2, &minimal("articles"))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_partial_update(pool: PgPool) {
    let created = CollectionRepo::create(&pool, APP, &minimal("articles"))
        .await
        .unwrap();

    let updated = CollectionRepo::update(
        &pool,
        APP,
        created.id,
        &UpdateCollection {
            display_name: Some("Articles".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.display_name, "Articles");
    assert_eq!(updated.name, "articles", "untouched fields keep their values");
    assert_eq!(updated.read_perm, "public");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_missing_returns_none(pool: PgPool) {
    let result = CollectionRepo::update(&pool, APP, 9999, &UpdateCollection::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_cascades_documents(pool: PgPool) {
    let collection = CollectionRepo::create(&pool, APP, &minimal("articles"))
        .await
        .unwrap();
    DocumentRepo::create(&pool, collection.id, APP, &json!({"title": "a"}), "alice")
        .await
        .unwrap();
    DocumentRepo::create(&pool, collection.id, APP, &json!({"title": "b"}), "alice")
        .await
        .unwrap();
    assert_eq!(DocumentRepo::count(&pool, collection.id).await.unwrap(), 2);

    let removed = CollectionRepo::delete(&pool, APP, collection.id).await.unwrap();
    assert!(removed);
    assert_eq!(DocumentRepo::count(&pool, collection.id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_search_matches_multiple_columns(pool: PgPool) {
    let mut blog = minimal("blog_posts");
    blog.display_name = Some("Blog".to_string());
    CollectionRepo::create(&pool, APP, &blog).await.unwrap();

    let mut faq = minimal("faq");
    faq.description = Some("Questions about the blog".to_string());
    CollectionRepo::create(&pool, APP, &faq).await.unwrap();

    CollectionRepo::create(&pool, APP, &minimal("users")).await.unwrap();

    let hits = CollectionRepo::list(&pool, APP, Some("blog"), 20, 0)
        .await
        .unwrap();
    assert_eq!(hits.len(), 2, "matches name and description");
    assert_eq!(CollectionRepo::count(&pool, APP, Some("blog")).await.unwrap(), 2);

    let all = CollectionRepo::list(&pool, APP, None, 20, 0).await.unwrap();
    assert_eq!(all.len(), 3);
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_document_crud(pool: PgPool) {
    let collection = CollectionRepo::create(&pool, APP, &minimal("articles"))
        .await
        .unwrap();

    let doc = DocumentRepo::create(&pool, collection.id, APP, &json!({"title": "a"}), "alice")
        .await
        .unwrap();
    assert_eq!(doc.created_by, "alice");
    assert_eq!(doc.updated_by, "alice");

    let updated = DocumentRepo::update(&pool, collection.id, doc.id, &json!({"title": "b"}), "bob")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.data, json!({"title": "b"}));
    assert_eq!(updated.created_by, "alice", "creator attribution is preserved");
    assert_eq!(updated.updated_by, "bob");

    assert!(DocumentRepo::delete(&pool, collection.id, doc.id).await.unwrap());
    assert!(DocumentRepo::find_by_id(&pool, collection.id, doc.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_document_list_is_scoped_and_ordered(pool: PgPool) {
    let a = CollectionRepo::create(&pool, APP, &minimal("a")).await.unwrap();
    let b = CollectionRepo::create(&pool, APP, &minimal("b")).await.unwrap();

    let first = DocumentRepo::create(&pool, a.id, APP, &json!({"n": 1}), "").await.unwrap();
    let second = DocumentRepo::create(&pool, a.id, APP, &json!({"n": 2}), "").await.unwrap();
    DocumentRepo::create(&pool, b.id, APP, &json!({"n": 3}), "").await.unwrap();

    let docs = DocumentRepo::list(&pool, a.id, 20, 0).await.unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id, second.id, "newest first");
    assert_eq!(docs[1].id, first.id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_exists_with_field_value(pool: PgPool) {
    let collection = CollectionRepo::create(&pool, APP, &minimal("users"))
        .await
        .unwrap();
    let doc = DocumentRepo::create(
        &pool,
        collection.id,
        APP,
        &json!({"email": "a@example.com"}),
        "",
    )
    .await
    .unwrap();

    let taken = DocumentRepo::exists_with_field_value(
        &pool,
        collection.id,
        "email",
        &json!("a@example.com"),
        None,
    )
    .await
    .unwrap();
    assert!(taken);

    // The document itself is excluded when updating in place.
    let taken = DocumentRepo::exists_with_field_value(
        &pool,
        collection.id,
        "email",
        &json!("a@example.com"),
        Some(doc.id),
    )
    .await
    .unwrap();
    assert!(!taken);

    let taken = DocumentRepo::exists_with_field_value(
        &pool,
        collection.id,
        "email",
        &json!("other@example.com"),
        None,
    )
    .await
    .unwrap();
    assert!(!taken);
}
