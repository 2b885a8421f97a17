//! Compiled article document entity (rendered markup).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Rendered markup of an article with image references resolved to
/// concrete variant URLs. Regenerated whenever content affecting the
/// rendering changes.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "compiled_document")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub article_id: String,

    /// Rendered markup text
    #[sea_orm(column_type = "Text")]
    pub content: String,

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
