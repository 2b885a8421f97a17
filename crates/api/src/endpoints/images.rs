//! Image lookup endpoints.

use axum::{
    Router,
    extract::{Path, State},
    response::Response,
    routing::get,
};
use serde::Serialize;

use crate::response::json_or_not_found;
use crate::state::AppState;

/// Image path response.
#[derive(Serialize)]
struct ImagePathResponse {
    data: String,
}

/// Filesystem path of a served image file.
///
/// Protected Original-resolution files never resolve.
async fn get_full_file_path(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Response {
    json_or_not_found(
        state
            .image_path_service
            .full_file_path(&file_name)
            .await
            .map(|path| ImagePathResponse {
                data: path.to_string_lossy().into_owned(),
            }),
    )
}

pub fn router() -> Router<AppState> {
    Router::new().route("/get_full_file_path/{file_name}", get(get_full_file_path))
}
