//! Read-side blog service: paginated listings, single posts, tag list.

use serde::Serialize;

use scribe_common::{AppError, AppResult};
use scribe_db::repositories::{ArticleRepository, CompiledDocumentRepository, TagRepository};

const DATE_FORMAT: &str = "%Y%m%d-%H%M%S";

/// One article in a listing page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    /// Article title.
    pub title: String,
    /// Article synonym.
    pub synonym: String,
    /// Creation timestamp, formatted.
    pub timestamp: String,
    /// Tag names of the article.
    pub tags: Vec<String>,
}

/// A listing page of articles, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    /// Requested page number, 1-based.
    pub page: u64,
    /// Tag filter the page was built with, if any.
    pub tag: Option<String>,
    /// Whether a newer page exists.
    pub has_next_page: bool,
    /// Whether an older page exists.
    pub has_prev_page: bool,
    /// Articles of the page.
    pub posts: Vec<PostSummary>,
}

/// A single post with its compiled content.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    /// Article title.
    pub title: String,
    /// Creation timestamp, formatted.
    pub timestamp: String,
    /// Compiled markup of the article.
    pub content: String,
    /// Tag names of the article.
    pub tags: Vec<String>,
    /// Synonym of the next-older article, if any.
    pub synonym_prev: Option<String>,
    /// Synonym of the next-newer article, if any.
    pub synonym_next: Option<String>,
}

/// Read-side blog service.
#[derive(Clone)]
pub struct BlogService {
    article_repo: ArticleRepository,
    compiled_repo: CompiledDocumentRepository,
    tag_repo: TagRepository,
    page_size: u64,
}

impl BlogService {
    /// Create a new blog service.
    #[must_use]
    pub const fn new(
        article_repo: ArticleRepository,
        compiled_repo: CompiledDocumentRepository,
        tag_repo: TagRepository,
        page_size: u64,
    ) -> Self {
        Self {
            article_repo,
            compiled_repo,
            tag_repo,
            page_size,
        }
    }

    /// One listing page, optionally filtered by tag.
    ///
    /// Page 1 holds the newest articles; "next" pages hold newer entries,
    /// "prev" pages older ones. A page number beyond the available range
    /// is a not-found.
    pub async fn posts_by_page(&self, page: u64, tag: Option<&str>) -> AppResult<PostPage> {
        if page == 0 {
            return Err(AppError::Validation(
                "page must be a positive integer".to_string(),
            ));
        }

        let mut articles = self.article_repo.find_page(page, self.page_size, tag).await?;

        // The query fetches one row past the page to detect an older page.
        let has_prev_page = articles.len() as u64 == self.page_size + 1;
        if has_prev_page {
            articles.truncate(self.page_size as usize);
        }

        if articles.is_empty() && page > 1 {
            return Err(AppError::NotFound(format!("post listing page {page}")));
        }

        let mut posts = Vec::with_capacity(articles.len());
        for article in articles {
            let tags = self.tag_repo.find_by_article(&article.id).await?;
            posts.push(PostSummary {
                title: article.title,
                synonym: article.synonym,
                timestamp: article.created_at.format(DATE_FORMAT).to_string(),
                tags: tags.into_iter().map(|t| t.name).collect(),
            });
        }

        Ok(PostPage {
            page,
            tag: tag.map(ToString::to_string),
            has_next_page: page != 1,
            has_prev_page,
            posts,
        })
    }

    /// A single post by synonym, with compiled content and neighbors.
    pub async fn post_data(&self, synonym: &str) -> AppResult<PostData> {
        let article = self.article_repo.get_by_synonym(synonym).await?;
        let (synonym_prev, synonym_next) =
            self.article_repo.find_adjacent_synonyms(&article).await?;
        let compiled = self.compiled_repo.get_by_article(&article.id).await?;
        let tags = self.tag_repo.find_by_article(&article.id).await?;

        Ok(PostData {
            title: article.title,
            timestamp: article.created_at.format(DATE_FORMAT).to_string(),
            content: compiled.content,
            tags: tags.into_iter().map(|t| t.name).collect(),
            synonym_prev,
            synonym_next,
        })
    }

    /// All tag names known to the system.
    pub async fn all_tags(&self) -> AppResult<Vec<String>> {
        self.tag_repo.all_names().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scribe_db::entities::{article, compiled_document, tag};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_article(id: &str, synonym: &str) -> article::Model {
        article::Model {
            id: id.to_string(),
            synonym: synonym.to_string(),
            title: format!("Title {id}"),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn service_with(db: Arc<sea_orm::DatabaseConnection>, page_size: u64) -> BlogService {
        BlogService::new(
            ArticleRepository::new(Arc::clone(&db)),
            CompiledDocumentRepository::new(Arc::clone(&db)),
            TagRepository::new(db),
            page_size,
        )
    }

    #[tokio::test]
    async fn test_first_page_with_older_entries() {
        // page_size 2, three rows back: prev page exists, next never does
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_article("a3", "third"),
                    create_test_article("a2", "second"),
                    create_test_article("a1", "first"),
                ]])
                .append_query_results([Vec::<tag::Model>::new()])
                .append_query_results([Vec::<tag::Model>::new()])
                .into_connection(),
        );

        let service = service_with(db, 2);
        let result = service.posts_by_page(1, None).await.unwrap();

        assert_eq!(result.posts.len(), 2);
        assert!(result.has_prev_page);
        assert!(!result.has_next_page);
        assert_eq!(result.posts[0].synonym, "third");
    }

    #[tokio::test]
    async fn test_last_page_has_next_but_no_prev() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_article("a1", "first")]])
                .append_query_results([Vec::<tag::Model>::new()])
                .into_connection(),
        );

        let service = service_with(db, 2);
        let result = service.posts_by_page(2, None).await.unwrap();

        assert_eq!(result.posts.len(), 1);
        assert!(!result.has_prev_page);
        assert!(result.has_next_page);
    }

    #[tokio::test]
    async fn test_page_beyond_range_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<article::Model>::new()])
                .into_connection(),
        );

        let service = service_with(db, 2);
        let result = service.posts_by_page(5, None).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_page_zero_is_rejected() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );

        let service = service_with(db, 2);
        let result = service.posts_by_page(0, None).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_post_data() {
        let article = create_test_article("a2", "middle");
        let compiled = compiled_document::Model {
            article_id: "a2".to_string(),
            content: "<article>compiled</article>".to_string(),
            last_update: Utc::now().into(),
        };
        let tags = vec![tag::Model {
            id: "t1".to_string(),
            name: "rust".to_string(),
        }];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[article]])
                .append_query_results([[create_test_article("a1", "older")]])
                .append_query_results([Vec::<article::Model>::new()])
                .append_query_results([[compiled]])
                .append_query_results([tags])
                .into_connection(),
        );

        let service = service_with(db, 10);
        let result = service.post_data("middle").await.unwrap();

        assert_eq!(result.content, "<article>compiled</article>");
        assert_eq!(result.tags, vec!["rust".to_string()]);
        assert_eq!(result.synonym_prev.as_deref(), Some("older"));
        assert_eq!(result.synonym_next, None);
    }
}
