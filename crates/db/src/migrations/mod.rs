//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_article_table;
mod m20250601_000002_create_raw_document_table;
mod m20250601_000003_create_compiled_document_table;
mod m20250601_000004_create_edit_history_table;
mod m20250601_000005_create_tag_tables;
mod m20250601_000006_create_image_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_article_table::Migration),
            Box::new(m20250601_000002_create_raw_document_table::Migration),
            Box::new(m20250601_000003_create_compiled_document_table::Migration),
            Box::new(m20250601_000004_create_edit_history_table::Migration),
            Box::new(m20250601_000005_create_tag_tables::Migration),
            Box::new(m20250601_000006_create_image_table::Migration),
        ]
    }
}
