//! Image entity (stored image variants).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Resolution variant of a stored image.
///
/// Only `Original` keeps the source dimensions; the remaining variants
/// scale by target width: Low 320px, Medium 640px, Large 960px,
/// High 1280px. `Original` is never exposed through derived listings.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "i16", db_type = "SmallInteger")]
pub enum Resolution {
    #[sea_orm(num_value = 1)]
    Original,
    #[sea_orm(num_value = 2)]
    Low,
    #[sea_orm(num_value = 3)]
    Medium,
    #[sea_orm(num_value = 4)]
    Large,
    #[sea_orm(num_value = 5)]
    High,
}

/// Lifecycle status of an image row.
///
/// Rows are soft-deleted: a `Deleted` row stays queryable through the
/// `including_deleted` repository surface for audit and cleanup but is
/// excluded from normal listings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i16", db_type = "SmallInteger")]
pub enum ImageStatus {
    #[sea_orm(num_value = 1)]
    Live,
    #[sea_orm(num_value = 2)]
    Deleted,
}

/// Stored image variant belonging to an article.
///
/// The alias is the human label used by the article markup; for a given
/// (article, alias) there is at most one live row per resolution.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "image")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub article_id: String,

    /// Human label unique within an article+resolution scope
    pub alias: String,

    /// File extension without the dot
    pub extension: String,

    pub resolution: Resolution,

    pub width: i32,

    pub height: i32,

    pub status: ImageStatus,

    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// File name the variant is served and stored under.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.id, self.extension)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::article::Entity",
        from = "Column::ArticleId",
        to = "super::article::Column::Id",
        on_delete = "Cascade"
    )]
    Article,
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Article.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
