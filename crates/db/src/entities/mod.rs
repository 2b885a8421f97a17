//! Database entities.

pub mod article;
pub mod article_tag;
pub mod compiled_document;
pub mod edit_history;
pub mod image;
pub mod raw_document;
pub mod tag;

pub use article::Entity as Article;
pub use article_tag::Entity as ArticleTag;
pub use compiled_document::Entity as CompiledDocument;
pub use edit_history::Entity as EditHistory;
pub use image::Entity as Image;
pub use raw_document::Entity as RawDocument;
pub use tag::Entity as Tag;
