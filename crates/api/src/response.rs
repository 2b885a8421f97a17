//! API response helpers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scribe_common::AppError;
use serde::Serialize;
use serde_json::json;

/// Body of the generic not-found response.
pub const NOT_FOUND_MESSAGE: &str = "Can not find the requested data";

/// The generic not-found response every read-side failure collapses to.
#[must_use]
pub fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": NOT_FOUND_MESSAGE })),
    )
        .into_response()
}

/// Render a service result, collapsing any error to the generic not-found.
///
/// The read-side boundary never distinguishes "does not exist" from an
/// internal failure; server errors are still logged before collapsing.
pub fn json_or_not_found<T: Serialize>(result: Result<T, AppError>) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(error) => {
            if error.is_server_error() {
                tracing::error!(%error, "Read request failed");
            } else {
                tracing::debug!(%error, "Read request rejected");
            }
            not_found()
        }
    }
}
