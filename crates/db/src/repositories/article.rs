//! Article repository.

use std::sync::Arc;

use crate::entities::{Article, article, article_tag, tag};
use scribe_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};

/// Article repository for database operations.
#[derive(Clone)]
pub struct ArticleRepository {
    db: Arc<DatabaseConnection>,
}

impl ArticleRepository {
    /// Create a new article repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an article by its synonym.
    pub async fn find_by_synonym(&self, synonym: &str) -> AppResult<Option<article::Model>> {
        Article::find()
            .filter(article::Column::Synonym.eq(synonym))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an article by its synonym, returning an error if not found.
    pub async fn get_by_synonym(&self, synonym: &str) -> AppResult<article::Model> {
        self.find_by_synonym(synonym)
            .await?
            .ok_or_else(|| AppError::ArticleNotFound(synonym.to_string()))
    }

    /// Fetch one listing page of articles, newest first.
    ///
    /// Returns up to `page_size + 1` rows; the extra row tells the caller
    /// whether an older page exists.
    pub async fn find_page(
        &self,
        page: u64,
        page_size: u64,
        tag_name: Option<&str>,
    ) -> AppResult<Vec<article::Model>> {
        let offset = (page - 1) * page_size;

        let mut query = Article::find().order_by_desc(article::Column::Id);

        if let Some(name) = tag_name {
            query = query
                .join(JoinType::InnerJoin, article::Relation::ArticleTag.def())
                .join(JoinType::InnerJoin, article_tag::Relation::Tag.def())
                .filter(tag::Column::Name.eq(name));
        }

        query
            .offset(offset)
            .limit(page_size + 1)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Synonyms of the articles adjacent to the given one in id order.
    ///
    /// Returns `(previous, next)` where previous is the next-older article
    /// and next is the next-newer one.
    pub async fn find_adjacent_synonyms(
        &self,
        article: &article::Model,
    ) -> AppResult<(Option<String>, Option<String>)> {
        let prev = Article::find()
            .filter(article::Column::Id.lt(&article.id))
            .order_by_desc(article::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .map(|a| a.synonym);

        let next = Article::find()
            .filter(article::Column::Id.gt(&article.id))
            .order_by_asc(article::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .map(|a| a.synonym);

        Ok((prev, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_article(id: &str, synonym: &str, title: &str) -> article::Model {
        article::Model {
            id: id.to_string(),
            synonym: synonym.to_string(),
            title: title.to_string(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_synonym() {
        let stored = create_test_article("a1", "first-post", "First Post");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored.clone()]])
                .into_connection(),
        );

        let repo = ArticleRepository::new(db);
        let result = repo.find_by_synonym("first-post").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().title, "First Post");
    }

    #[tokio::test]
    async fn test_get_by_synonym_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<article::Model>::new()])
                .into_connection(),
        );

        let repo = ArticleRepository::new(db);
        let result = repo.get_by_synonym("missing").await;

        assert!(matches!(result, Err(AppError::ArticleNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_adjacent_synonyms() {
        let current = create_test_article("a2", "middle", "Middle");
        let older = create_test_article("a1", "older", "Older");
        let newer = create_test_article("a3", "newer", "Newer");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[older]])
                .append_query_results([[newer]])
                .into_connection(),
        );

        let repo = ArticleRepository::new(db);
        let (prev, next) = repo.find_adjacent_synonyms(&current).await.unwrap();

        assert_eq!(prev.as_deref(), Some("older"));
        assert_eq!(next.as_deref(), Some("newer"));
    }
}
