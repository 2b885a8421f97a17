//! Raw document repository.

use std::sync::Arc;

use crate::entities::{RawDocument, raw_document};
use scribe_common::{AppError, AppResult};
use sea_orm::{DatabaseConnection, EntityTrait};

/// Raw document repository for database operations.
#[derive(Clone)]
pub struct RawDocumentRepository {
    db: Arc<DatabaseConnection>,
}

impl RawDocumentRepository {
    /// Create a new raw document repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the raw document of an article.
    pub async fn find_by_article(&self, article_id: &str) -> AppResult<Option<raw_document::Model>> {
        RawDocument::find_by_id(article_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the raw document of an article, returning an error if absent.
    pub async fn get_by_article(&self, article_id: &str) -> AppResult<raw_document::Model> {
        self.find_by_article(article_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("RawDocument: {article_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_get_by_article() {
        let stored = raw_document::Model {
            article_id: "a1".to_string(),
            version: "v1".to_string(),
            body: "# Hello".to_string(),
            created_at: Utc::now().into(),
            last_update: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored]])
                .into_connection(),
        );

        let repo = RawDocumentRepository::new(db);
        let result = repo.get_by_article("a1").await.unwrap();

        assert_eq!(result.version, "v1");
        assert_eq!(result.body, "# Hello");
    }
}
