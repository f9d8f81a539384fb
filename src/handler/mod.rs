//! Request handler module
//!
//! Routing plus the download, upload and helper-route handlers.

pub mod download;
pub mod fixtures;
pub mod router;
pub mod upload;

// Re-export main entry point
pub use router::handle_request;
