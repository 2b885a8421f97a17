//! Article edit history entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only record of an article edit.
///
/// An entry is created only when the title, version, or body changed in an
/// ingestion; at most one entry is written per ingestion call. The patches
/// allow rolling the raw document forward or back across the edit.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "edit_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub article_id: String,

    /// Title before this edit, if it changed
    #[sea_orm(nullable)]
    pub previous_title: Option<String>,

    /// Synonym before this edit. Reserved; ingestion never renames.
    #[sea_orm(nullable)]
    pub previous_synonym: Option<String>,

    /// Raw-document version before this edit, if it changed
    #[sea_orm(nullable)]
    pub previous_version: Option<String>,

    /// Patch converting the previous body into the new one
    #[sea_orm(column_type = "Text", nullable)]
    pub forward_patch: Option<String>,

    /// Patch converting the new body back into the previous one
    #[sea_orm(column_type = "Text", nullable)]
    pub reverse_patch: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::article::Entity",
        from = "Column::ArticleId",
        to = "super::article::Column::Id",
        on_delete = "Restrict"
    )]
    Article,
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Article.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
