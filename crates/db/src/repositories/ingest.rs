//! Transactional writer for article ingestion.
//!
//! The reconciliation engine stages every row change of one ingestion call
//! into a [`WritePlan`]; [`IngestRepository::commit`] executes the plan as a
//! single all-or-nothing transaction. Image file bytes are never written
//! here, only metadata rows; file materialization happens after the commit
//! succeeds.

use std::sync::Arc;

use crate::entities::{
    ArticleTag, Tag, article, article_tag, compiled_document, edit_history,
    image::{self, ImageStatus},
    raw_document, tag,
};
use chrono::Utc;
use scribe_common::{AppError, AppResult, IdGenerator};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};

/// Staged row changes of one ingestion call.
#[derive(Debug, Default)]
pub struct WritePlan {
    /// Id of the article every other row hangs off.
    pub article_id: String,
    /// Whether the article (and its raw/compiled documents) are inserts
    /// rather than updates.
    pub is_new_article: bool,
    /// Article row to insert or update.
    pub article: article::ActiveModel,
    /// Raw document row, staged only when version or body changed.
    pub raw_document: Option<raw_document::ActiveModel>,
    /// At most one history entry per ingestion call.
    pub edit_history: Option<edit_history::ActiveModel>,
    /// Full incoming tag set; each name is get-or-created.
    pub tag_names: Vec<String>,
    /// Tag names needing a new article link.
    pub link_tag_names: Vec<String>,
    /// Ids of article-tag links to remove.
    pub removed_link_ids: Vec<String>,
    /// Image rows to insert.
    pub images_created: Vec<image::ActiveModel>,
    /// Ids of image rows to soft-delete.
    pub image_ids_deleted: Vec<String>,
    /// Compiled document row, staged only when regeneration is required.
    pub compiled_document: Option<compiled_document::ActiveModel>,
}

/// Executes a [`WritePlan`] against the database.
#[derive(Clone)]
pub struct IngestRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl IngestRepository {
    /// Create a new ingest repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Commit the staged plan as one transaction.
    pub async fn commit(&self, plan: WritePlan) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.apply(&txn, plan).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn apply<C: ConnectionTrait>(&self, txn: &C, plan: WritePlan) -> AppResult<()> {
        if plan.is_new_article {
            plan.article
                .insert(txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        } else {
            plan.article
                .update(txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        if let Some(raw) = plan.raw_document {
            if plan.is_new_article {
                raw.insert(txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            } else {
                raw.update(txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
        }

        // History entries are append-only; existing rows are never touched.
        if let Some(history) = plan.edit_history {
            history
                .insert(txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        let mut tag_models: Vec<tag::Model> = Vec::with_capacity(plan.tag_names.len());
        for name in &plan.tag_names {
            tag_models.push(self.get_or_create_tag(txn, name).await?);
        }

        if !plan.removed_link_ids.is_empty() {
            ArticleTag::delete_many()
                .filter(article_tag::Column::Id.is_in(plan.removed_link_ids.clone()))
                .exec(txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        for name in &plan.link_tag_names {
            let Some(tag_model) = tag_models.iter().find(|t| &t.name == name) else {
                return Err(AppError::Internal(format!(
                    "staged link for unknown tag '{name}'"
                )));
            };
            let link = article_tag::ActiveModel {
                id: Set(self.id_gen.generate()),
                article_id: Set(plan.article_id.clone()),
                tag_id: Set(tag_model.id.clone()),
                created_at: Set(Utc::now().into()),
            };
            link.insert(txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        // Renewed aliases arrive as delete-old plus create-new, never as
        // an in-place update.
        let now = Utc::now();
        for id in &plan.image_ids_deleted {
            let tombstone = image::ActiveModel {
                id: Set(id.clone()),
                status: Set(ImageStatus::Deleted),
                deleted_at: Set(Some(now.into())),
                ..Default::default()
            };
            tombstone
                .update(txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        for created in plan.images_created {
            created
                .insert(txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        if let Some(compiled) = plan.compiled_document {
            if plan.is_new_article {
                compiled
                    .insert(txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            } else {
                compiled
                    .update(txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
        }

        Ok(())
    }

    async fn get_or_create_tag<C: ConnectionTrait>(
        &self,
        txn: &C,
        name: &str,
    ) -> AppResult<tag::Model> {
        let existing = Tag::find()
            .filter(tag::Column::Name.eq(name))
            .one(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(found) = existing {
            return Ok(found);
        }

        let model = tag::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
        };

        model
            .insert(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
