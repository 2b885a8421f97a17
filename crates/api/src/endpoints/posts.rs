//! Blog post endpoints.

use axum::{
    Router,
    extract::{Path, State},
    response::Response,
    routing::get,
};
use serde::Serialize;

use crate::response::json_or_not_found;
use crate::state::AppState;

/// Tag list response.
#[derive(Serialize)]
struct TagListResponse {
    data: Vec<String>,
}

/// Paginated post listing.
async fn posts_by_page(State(state): State<AppState>, Path(page): Path<u64>) -> Response {
    json_or_not_found(state.blog_service.posts_by_page(page, None).await)
}

/// Paginated post listing filtered by tag.
async fn posts_by_page_and_tag(
    State(state): State<AppState>,
    Path((page, tag)): Path<(u64, String)>,
) -> Response {
    json_or_not_found(state.blog_service.posts_by_page(page, Some(&tag)).await)
}

/// Single post by synonym.
async fn get_article_data(
    State(state): State<AppState>,
    Path(synonym): Path<String>,
) -> Response {
    json_or_not_found(state.blog_service.post_data(&synonym).await)
}

/// Full tag name list.
async fn get_tag_list(State(state): State<AppState>) -> Response {
    json_or_not_found(
        state
            .blog_service
            .all_tags()
            .await
            .map(|data| TagListResponse { data }),
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts_by_page/{page}", get(posts_by_page))
        .route(
            "/posts_by_page_and_tag/{page}/{tag}",
            get(posts_by_page_and_tag),
        )
        .route("/get_article_data/{synonym}", get(get_article_data))
        .route("/get_tag_list", get(get_tag_list))
}
