//! Create `raw_document` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RawDocument::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RawDocument::ArticleId)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RawDocument::Version)
                            .string_len(30)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RawDocument::Body).text().not_null())
                    .col(
                        ColumnDef::new(RawDocument::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(RawDocument::LastUpdate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_raw_document_article")
                            .from(RawDocument::Table, RawDocument::ArticleId)
                            .to(Article::Table, Article::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RawDocument::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RawDocument {
    Table,
    ArticleId,
    Version,
    Body,
    CreatedAt,
    LastUpdate,
}

#[derive(Iden)]
enum Article {
    Table,
    Id,
}
