//! API endpoints.

pub mod images;
pub mod posts;

use axum::Router;

use crate::state::AppState;

/// Build the API router.
#[must_use]
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(posts::router())
        .merge(images::router())
}
