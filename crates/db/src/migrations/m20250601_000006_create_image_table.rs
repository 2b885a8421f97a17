//! Create `image` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Image::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Image::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Image::ArticleId).string_len(32).not_null())
                    .col(ColumnDef::new(Image::Alias).string_len(100).not_null())
                    .col(ColumnDef::new(Image::Extension).string_len(10).not_null())
                    .col(ColumnDef::new(Image::Resolution).small_integer().not_null())
                    .col(ColumnDef::new(Image::Width).integer().not_null())
                    .col(ColumnDef::new(Image::Height).integer().not_null())
                    .col(
                        ColumnDef::new(Image::Status)
                            .small_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Image::DeletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Image::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_image_article")
                            .from(Image::Table, Image::ArticleId)
                            .to(Article::Table, Article::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Resolution-group lookup during ingestion
        manager
            .create_index(
                Index::create()
                    .name("idx_image_resolution_group")
                    .table(Image::Table)
                    .col(Image::ArticleId)
                    .col(Image::Alias)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_image_identity")
                    .table(Image::Table)
                    .col(Image::ArticleId)
                    .col(Image::Alias)
                    .col(Image::Resolution)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Image::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Image {
    Table,
    Id,
    ArticleId,
    Alias,
    Extension,
    Resolution,
    Width,
    Height,
    Status,
    DeletedAt,
    CreatedAt,
}

#[derive(Iden)]
enum Article {
    Table,
    Id,
}
