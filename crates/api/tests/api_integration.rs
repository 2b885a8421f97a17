//! API integration tests.
//!
//! These tests drive the read-side router end to end against a mocked
//! database and check that every failure collapses into the generic
//! not-found response.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use scribe_api::{AppState, router as api_router};
use scribe_common::config::ImagesConfig;
use scribe_core::{BlogService, ImagePathService, ImageStore};
use scribe_db::entities::{
    article,
    image::{self, ImageStatus, Resolution},
    tag,
};
use scribe_db::repositories::{
    ArticleRepository, CompiledDocumentRepository, ImageRepository, TagRepository,
};
use sea_orm::{DatabaseConnection, MockDatabase};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

const PAGE_SIZE: u64 = 10;

fn test_store() -> ImageStore {
    ImageStore::new(&ImagesConfig {
        opened_dir: PathBuf::from("/srv/img/opened"),
        protected_dir: PathBuf::from("/srv/img/protected"),
        opened_group_id: None,
        protected_group_id: None,
        route_prefix: "/img/".to_string(),
    })
}

fn test_app(db: DatabaseConnection) -> Router {
    let db = Arc::new(db);

    let blog_service = BlogService::new(
        ArticleRepository::new(Arc::clone(&db)),
        CompiledDocumentRepository::new(Arc::clone(&db)),
        TagRepository::new(Arc::clone(&db)),
        PAGE_SIZE,
    );
    let image_path_service = ImagePathService::new(ImageRepository::new(db), test_store());

    api_router().with_state(AppState {
        blog_service,
        image_path_service,
    })
}

fn create_test_article(id: &str, synonym: &str) -> article::Model {
    article::Model {
        id: id.to_string(),
        synonym: synonym.to_string(),
        title: format!("Title {id}"),
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_get_tag_list() {
    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[
            tag::Model {
                id: "t1".to_string(),
                name: "databases".to_string(),
            },
            tag::Model {
                id: "t2".to_string(),
                name: "rust".to_string(),
            },
        ]])
        .into_connection();

    let response = test_app(db)
        .oneshot(
            Request::builder()
                .uri("/get_tag_list")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"], serde_json::json!(["databases", "rust"]));
}

#[tokio::test]
async fn test_posts_by_page_first_page() {
    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[create_test_article("a1", "only-post")]])
        .append_query_results([Vec::<tag::Model>::new()])
        .into_connection();

    let response = test_app(db)
        .oneshot(
            Request::builder()
                .uri("/posts_by_page/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["hasNextPage"], serde_json::json!(false));
    assert_eq!(body["hasPrevPage"], serde_json::json!(false));
    assert_eq!(body["posts"][0]["synonym"], serde_json::json!("only-post"));
}

#[tokio::test]
async fn test_page_beyond_range_collapses_to_not_found() {
    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([Vec::<article::Model>::new()])
        .into_connection();

    let response = test_app(db)
        .oneshot(
            Request::builder()
                .uri("/posts_by_page/99")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        serde_json::json!("Can not find the requested data")
    );
}

#[tokio::test]
async fn test_unknown_article_collapses_to_not_found() {
    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([Vec::<article::Model>::new()])
        .into_connection();

    let response = test_app(db)
        .oneshot(
            Request::builder()
                .uri("/get_article_data/no-such-post")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_protected_original_is_not_served() {
    let protected = image::Model {
        id: "img1".to_string(),
        article_id: "a1".to_string(),
        alias: "cover".to_string(),
        extension: "png".to_string(),
        resolution: Resolution::Original,
        width: 2560,
        height: 1440,
        status: ImageStatus::Live,
        deleted_at: None,
        created_at: Utc::now().into(),
    };

    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[protected]])
        .into_connection();

    let response = test_app(db)
        .oneshot(
            Request::builder()
                .uri("/get_full_file_path/img1.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_derived_image_path_is_served() {
    let derived = image::Model {
        id: "img2".to_string(),
        article_id: "a1".to_string(),
        alias: "cover".to_string(),
        extension: "png".to_string(),
        resolution: Resolution::Low,
        width: 320,
        height: 180,
        status: ImageStatus::Live,
        deleted_at: None,
        created_at: Utc::now().into(),
    };

    let db = MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[derived]])
        .into_connection();

    let response = test_app(db)
        .oneshot(
            Request::builder()
                .uri("/get_full_file_path/img2.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["data"],
        serde_json::json!("/srv/img/opened/img2.png")
    );
}
