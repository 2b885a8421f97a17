//! Raw article document entity (markdown source).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Markdown source of an article, one per article.
///
/// The version string is caller-supplied and opaque to the backend.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "raw_document")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub article_id: String,

    /// Caller-supplied document version
    pub version: String,

    /// Markdown text
    #[sea_orm(column_type = "Text")]
    pub body: String,

    pub created_at: DateTimeWithTimeZone,

    pub last_update: DateTimeWithTimeZone,
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
