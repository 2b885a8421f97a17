//! Repositories for database access.
//!
//! One repository per entity, plus the [`IngestRepository`] that executes a
//! staged ingestion write plan as a single transaction.

pub mod article;
pub mod article_tag;
pub mod compiled_document;
pub mod edit_history;
pub mod image;
pub mod ingest;
pub mod raw_document;
pub mod tag;

pub use article::ArticleRepository;
pub use article_tag::ArticleTagRepository;
pub use compiled_document::CompiledDocumentRepository;
pub use edit_history::EditHistoryRepository;
pub use image::ImageRepository;
pub use ingest::{IngestRepository, WritePlan};
pub use raw_document::RawDocumentRepository;
pub use tag::TagRepository;
