//! Common utilities and shared types for scribe.
//!
//! This crate provides foundational components used across all scribe crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Synonym validation**: Article URL-slug rules via [`is_valid_synonym`]
//!
//! # Example
//!
//! ```no_run
//! use scribe_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod synonym;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use synonym::is_valid_synonym;
