//! Shared API state.

use scribe_core::{BlogService, ImagePathService};

/// Application state shared across endpoints.
#[derive(Clone)]
pub struct AppState {
    /// Read-side blog service.
    pub blog_service: BlogService,
    /// Image path lookup service.
    pub image_path_service: ImagePathService,
}
