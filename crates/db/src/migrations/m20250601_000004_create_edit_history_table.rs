//! Create `edit_history` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EditHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EditHistory::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EditHistory::ArticleId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(EditHistory::PreviousTitle).string_len(200))
                    .col(ColumnDef::new(EditHistory::PreviousSynonym).string_len(100))
                    .col(ColumnDef::new(EditHistory::PreviousVersion).string_len(30))
                    .col(ColumnDef::new(EditHistory::ForwardPatch).text())
                    .col(ColumnDef::new(EditHistory::ReversePatch).text())
                    .col(
                        ColumnDef::new(EditHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_edit_history_article")
                            .from(EditHistory::Table, EditHistory::ArticleId)
                            .to(Article::Table, Article::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_edit_history_article_id")
                    .table(EditHistory::Table)
                    .col(EditHistory::ArticleId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EditHistory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EditHistory {
    Table,
    Id,
    ArticleId,
    PreviousTitle,
    PreviousSynonym,
    PreviousVersion,
    ForwardPatch,
    ReversePatch,
    CreatedAt,
}

#[derive(Iden)]
enum Article {
    Table,
    Id,
}
