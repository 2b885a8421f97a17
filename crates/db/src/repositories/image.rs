//! Image repository.

use std::sync::Arc;

use crate::entities::{
    Image,
    image::{self, ImageStatus, Resolution},
};
use scribe_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Image repository for database operations.
///
/// Rows are soft-deleted; the `find_live_*` methods exclude tombstones,
/// while `find_including_deleted_by_article` exposes them for audit and
/// cleanup. Listings exclude the protected `Original` resolution unless
/// explicitly asked for.
#[derive(Clone)]
pub struct ImageRepository {
    db: Arc<DatabaseConnection>,
}

impl ImageRepository {
    /// Create a new image repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a live image by its generated id.
    pub async fn find_live_by_id(&self, id: &str) -> AppResult<Option<image::Model>> {
        Image::find_by_id(id)
            .filter(image::Column::Status.eq(ImageStatus::Live))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Live Original-resolution rows of an article, one per alias.
    pub async fn find_live_originals(&self, article_id: &str) -> AppResult<Vec<image::Model>> {
        Image::find()
            .filter(image::Column::ArticleId.eq(article_id))
            .filter(image::Column::Resolution.eq(Resolution::Original))
            .filter(image::Column::Status.eq(ImageStatus::Live))
            .order_by_asc(image::Column::Alias)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Live rows of an article ordered by (alias, resolution).
    pub async fn find_live_by_article(
        &self,
        article_id: &str,
        include_original: bool,
    ) -> AppResult<Vec<image::Model>> {
        let mut query = Image::find()
            .filter(image::Column::ArticleId.eq(article_id))
            .filter(image::Column::Status.eq(ImageStatus::Live));

        if !include_original {
            query = query.filter(image::Column::Resolution.ne(Resolution::Original));
        }

        query
            .order_by_asc(image::Column::Alias)
            .order_by_asc(image::Column::Resolution)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Live rows of an article restricted to the given aliases.
    pub async fn find_live_by_aliases(
        &self,
        article_id: &str,
        aliases: &[String],
        include_original: bool,
    ) -> AppResult<Vec<image::Model>> {
        let mut query = Image::find()
            .filter(image::Column::ArticleId.eq(article_id))
            .filter(image::Column::Alias.is_in(aliases.to_vec()))
            .filter(image::Column::Status.eq(ImageStatus::Live));

        if !include_original {
            query = query.filter(image::Column::Resolution.ne(Resolution::Original));
        }

        query
            .order_by_asc(image::Column::Alias)
            .order_by_asc(image::Column::Resolution)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Live rows of an article excluding the given aliases, ordered by
    /// (alias, resolution).
    pub async fn find_live_excluding_aliases(
        &self,
        article_id: &str,
        aliases: &[String],
    ) -> AppResult<Vec<image::Model>> {
        let mut query = Image::find()
            .filter(image::Column::ArticleId.eq(article_id))
            .filter(image::Column::Status.eq(ImageStatus::Live));

        if !aliases.is_empty() {
            query = query.filter(image::Column::Alias.is_not_in(aliases.to_vec()));
        }

        query
            .order_by_asc(image::Column::Alias)
            .order_by_asc(image::Column::Resolution)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All rows of an article including soft-deleted ones.
    pub async fn find_including_deleted_by_article(
        &self,
        article_id: &str,
    ) -> AppResult<Vec<image::Model>> {
        Image::find()
            .filter(image::Column::ArticleId.eq(article_id))
            .order_by_asc(image::Column::Alias)
            .order_by_asc(image::Column::Resolution)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_image(id: &str, alias: &str, resolution: Resolution) -> image::Model {
        image::Model {
            id: id.to_string(),
            article_id: "a1".to_string(),
            alias: alias.to_string(),
            extension: "png".to_string(),
            resolution,
            width: 640,
            height: 480,
            status: ImageStatus::Live,
            deleted_at: None,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_file_name() {
        let img = create_test_image("img1", "diagram", Resolution::Medium);
        assert_eq!(img.file_name(), "img1.png");
    }

    #[tokio::test]
    async fn test_find_live_originals() {
        let img = create_test_image("img1", "diagram", Resolution::Original);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[img]])
                .into_connection(),
        );

        let repo = ImageRepository::new(db);
        let result = repo.find_live_originals("a1").await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].alias, "diagram");
    }

    #[tokio::test]
    async fn test_find_live_by_id_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<image::Model>::new()])
                .into_connection(),
        );

        let repo = ImageRepository::new(db);
        let result = repo.find_live_by_id("missing").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_find_including_deleted_surfaces_tombstones() {
        let live = create_test_image("img1", "diagram", Resolution::Low);
        let mut deleted = create_test_image("img2", "removed", Resolution::Low);
        deleted.status = ImageStatus::Deleted;
        deleted.deleted_at = Some(Utc::now().into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[live, deleted]])
                .into_connection(),
        );

        let repo = ImageRepository::new(db);
        let result = repo.find_including_deleted_by_article("a1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.iter().any(|i| i.status == ImageStatus::Deleted));
    }
}
