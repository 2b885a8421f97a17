//! Domain services.

pub mod archive;
pub mod blog;
pub mod image_path;
pub mod image_store;
pub mod ingest;
pub mod markup;
pub mod patch;
pub mod variant;

pub use archive::{ArchiveReader, ValidatedDocument};
pub use blog::{BlogService, PostData, PostPage, PostSummary};
pub use image_path::ImagePathService;
pub use image_store::ImageStore;
pub use ingest::{IngestOutcome, IngestService};
pub use markup::{Element, MarkupDocument};
pub use patch::{PatchPair, make_patch_pair};
pub use variant::{ImageVariant, generate_variants};
