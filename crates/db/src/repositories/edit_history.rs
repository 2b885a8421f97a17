//! Edit history repository.

use std::sync::Arc;

use crate::entities::{EditHistory, edit_history};
use scribe_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

/// Edit history repository for database operations.
#[derive(Clone)]
pub struct EditHistoryRepository {
    db: Arc<DatabaseConnection>,
}

impl EditHistoryRepository {
    /// Create a new edit history repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Edit history of an article, newest first.
    pub async fn find_by_article(&self, article_id: &str) -> AppResult<Vec<edit_history::Model>> {
        EditHistory::find()
            .filter(edit_history::Column::ArticleId.eq(article_id))
            .order_by_desc(edit_history::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of history entries recorded for an article.
    pub async fn count_by_article(&self, article_id: &str) -> AppResult<u64> {
        EditHistory::find()
            .filter(edit_history::Column::ArticleId.eq(article_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
