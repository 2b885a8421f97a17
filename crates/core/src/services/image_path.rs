//! Image file path lookup for the serving layer.

use std::path::PathBuf;

use scribe_common::{AppError, AppResult};
use scribe_db::entities::image::Resolution;
use scribe_db::repositories::ImageRepository;

use crate::services::image_store::ImageStore;

/// Resolves served file names to filesystem paths.
#[derive(Clone)]
pub struct ImagePathService {
    image_repo: ImageRepository,
    store: ImageStore,
}

impl ImagePathService {
    /// Create a new image path service.
    #[must_use]
    pub const fn new(image_repo: ImageRepository, store: ImageStore) -> Self {
        Self { image_repo, store }
    }

    /// Filesystem path of a served image file.
    ///
    /// File names are `<id>.<extension>`. Protected Original-resolution
    /// files are never resolved; lookups for them fail exactly like a
    /// missing file so the response does not reveal their existence.
    pub async fn full_file_path(&self, file_name: &str) -> AppResult<PathBuf> {
        let Some((id, extension)) = file_name.rsplit_once('.') else {
            return Err(AppError::NotFound(format!("image file: {file_name}")));
        };

        let image = self
            .image_repo
            .find_live_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("image file: {file_name}")))?;

        if image.extension != extension || image.resolution == Resolution::Original {
            return Err(AppError::NotFound(format!("image file: {file_name}")));
        }

        Ok(self.store.full_path(&image.file_name(), image.resolution))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scribe_common::config::ImagesConfig;
    use scribe_db::entities::image::{self, ImageStatus};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_store() -> ImageStore {
        ImageStore::new(&ImagesConfig {
            opened_dir: PathBuf::from("/srv/img/opened"),
            protected_dir: PathBuf::from("/srv/img/protected"),
            opened_group_id: None,
            protected_group_id: None,
            route_prefix: "/img/".to_string(),
        })
    }

    fn create_test_image(id: &str, resolution: Resolution) -> image::Model {
        image::Model {
            id: id.to_string(),
            article_id: "a1".to_string(),
            alias: "cover".to_string(),
            extension: "png".to_string(),
            resolution,
            width: 320,
            height: 180,
            status: ImageStatus::Live,
            deleted_at: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_resolves_derived_image() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_image("img1", Resolution::Low)]])
                .into_connection(),
        );

        let service = ImagePathService::new(ImageRepository::new(db), test_store());
        let path = service.full_file_path("img1.png").await.unwrap();

        assert_eq!(path, PathBuf::from("/srv/img/opened/img1.png"));
    }

    #[tokio::test]
    async fn test_refuses_protected_original() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_image("img1", Resolution::Original)]])
                .into_connection(),
        );

        let service = ImagePathService::new(ImageRepository::new(db), test_store());
        let result = service.full_file_path("img1.png").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_malformed_file_name_is_not_found() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = ImagePathService::new(ImageRepository::new(db), test_store());
        let result = service.full_file_path("no-extension").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
