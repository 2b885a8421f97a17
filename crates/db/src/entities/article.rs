//! Article entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Top-level article record. The synonym is the article's URL slug and is
/// immutable once the article exists.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "article")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Unique human-readable slug used in URLs
    #[sea_orm(unique, indexed)]
    pub synonym: String,

    /// Display title
    pub title: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::raw_document::Entity")]
    RawDocument,

    #[sea_orm(has_one = "super::compiled_document::Entity")]
    CompiledDocument,

    #[sea_orm(has_many = "super::edit_history::Entity")]
    EditHistory,

    #[sea_orm(has_many = "super::article_tag::Entity")]
    ArticleTag,

    #[sea_orm(has_many = "super::image::Entity")]
    Image,
}

impl Related<super::raw_document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RawDocument.def()
    }
}

impl Related<super::compiled_document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CompiledDocument.def()
    }
}

impl Related<super::edit_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EditHistory.def()
    }
}

impl Related<super::article_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArticleTag.def()
    }
}

impl Related<super::image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Image.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
