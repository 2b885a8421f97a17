//! HTTP API layer for scribe.
//!
//! Read-side endpoints only: paginated post listings with optional tag
//! filter, single-post fetch, the tag list, and image path lookup. Every
//! lookup miss or internal failure collapses into one generic not-found
//! response so no internal error detail leaks to clients.

pub mod endpoints;
pub mod response;
pub mod state;

pub use endpoints::router;
pub use state::AppState;
