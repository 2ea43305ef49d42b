use chrono::{TimeZone, Utc};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use serde_json::json;
use uuid::Uuid;

use quill_core::ContentRepository;
use quill_core::domain::{Post, PostStatus};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository};

use super::entity::post;
use super::postgres_repo::PostgresPostRepository;

fn model(title: &str, slug: &str, tags: Option<serde_json::Value>) -> post::Model {
    let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    post::Model {
        id: Uuid::new_v4(),
        title: title.to_owned(),
        slug: slug.to_owned(),
        content: "Content".to_owned(),
        excerpt: None,
        category: Some("rust".to_owned()),
        status: post::Status::Published,
        tags,
        featured_image: None,
        author: "Admin".to_owned(),
        views: 3,
        likes: 0,
        comments: None,
        created_at: created.into(),
        updated_at: created.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let row = model("Test Post", "test-post", Some(json!(["rust", "web"])));
    let post_id = row.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![row]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.status, PostStatus::Published);
    assert_eq!(post.tags, vec!["rust".to_string(), "web".to_string()]);
    assert_eq!(post.views, 3);
}

#[tokio::test]
async fn test_malformed_tags_load_as_empty() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model("Odd", "odd", Some(json!({"a": 1})))]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post = repo.find_published_by_slug("odd").await.unwrap().unwrap();

    assert!(post.tags.is_empty());
    assert!(post.comments.is_empty());
}

#[tokio::test]
async fn test_get_by_slug_missing_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();

    let content = ContentRepository::new(std::sync::Arc::new(PostgresPostRepository::new(db)));
    let err = content.get_by_slug("nope").await.unwrap_err();

    assert!(matches!(
        err,
        quill_core::DomainError::NotFound {
            entity_type: "post",
            ..
        }
    ));
}

#[tokio::test]
async fn test_delete_missing_row_reports_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_delete_is_idempotent_through_content_repository() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();

    let content = ContentRepository::new(std::sync::Arc::new(PostgresPostRepository::new(db)));
    let id = Uuid::new_v4();

    content.delete(id).await.unwrap();
    content.delete(id).await.unwrap();
}

#[tokio::test]
async fn test_increment_views_unknown_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = repo.increment_views(Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_query_error_maps_to_repo_error() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors(vec![sea_orm::DbErr::Custom("boom".to_owned())])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = repo.find_all().await;

    assert!(matches!(result, Err(RepoError::Query(_))));
}

#[test]
fn test_tag_list_conversion() {
    assert_eq!(
        post::tag_list(Some(json!(["a", 1, "b"]))),
        Some(vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(post::tag_list(Some(json!(null))), None);
    assert_eq!(post::tag_list(Some(json!("a,b"))), None);
    assert_eq!(post::tag_list(None), None);
}
