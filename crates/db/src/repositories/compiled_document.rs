//! Compiled document repository.

use std::sync::Arc;

use crate::entities::{CompiledDocument, compiled_document};
use scribe_common::{AppError, AppResult};
use sea_orm::{DatabaseConnection, EntityTrait};

/// Compiled document repository for database operations.
#[derive(Clone)]
pub struct CompiledDocumentRepository {
    db: Arc<DatabaseConnection>,
}

impl CompiledDocumentRepository {
    /// Create a new compiled document repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the compiled document of an article.
    pub async fn find_by_article(
        &self,
        article_id: &str,
    ) -> AppResult<Option<compiled_document::Model>> {
        CompiledDocument::find_by_id(article_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the compiled document of an article, returning an error if absent.
    pub async fn get_by_article(&self, article_id: &str) -> AppResult<compiled_document::Model> {
        self.find_by_article(article_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("CompiledDocument: {article_id}")))
    }
}
