//! Article-tag relation repository.

use std::sync::Arc;

use crate::entities::{ArticleTag, article_tag, tag};
use scribe_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Article-tag relation repository for database operations.
#[derive(Clone)]
pub struct ArticleTagRepository {
    db: Arc<DatabaseConnection>,
}

impl ArticleTagRepository {
    /// Create a new article-tag relation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Tag relations of an article, each paired with its tag.
    pub async fn find_with_tags(
        &self,
        article_id: &str,
    ) -> AppResult<Vec<(article_tag::Model, Option<tag::Model>)>> {
        ArticleTag::find()
            .filter(article_tag::Column::ArticleId.eq(article_id))
            .find_also_related(tag::Entity)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
