//! Tag repository.

use std::sync::Arc;

use crate::entities::{Tag, article_tag, tag};
use scribe_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};

/// Tag repository for database operations.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a tag by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<tag::Model>> {
        Tag::find()
            .filter(tag::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All tag names, sorted alphabetically.
    pub async fn all_names(&self) -> AppResult<Vec<String>> {
        let tags = Tag::find()
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(tags.into_iter().map(|t| t.name).collect())
    }

    /// Tags attached to an article.
    pub async fn find_by_article(&self, article_id: &str) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .join(JoinType::InnerJoin, tag::Relation::ArticleTag.def())
            .filter(article_tag::Column::ArticleId.eq(article_id))
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
