//! Create `compiled_document` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CompiledDocument::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CompiledDocument::ArticleId)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CompiledDocument::Content).text().not_null())
                    .col(
                        ColumnDef::new(CompiledDocument::LastUpdate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_compiled_document_article")
                            .from(CompiledDocument::Table, CompiledDocument::ArticleId)
                            .to(Article::Table, Article::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CompiledDocument::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CompiledDocument {
    Table,
    ArticleId,
    Content,
    LastUpdate,
}

#[derive(Iden)]
enum Article {
    Table,
    Id,
}
