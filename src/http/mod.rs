//! HTTP protocol layer module
//!
//! Content type detection and response builders, decoupled from the
//! file-serving logic.

pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{build_404_response, build_405_response, build_file_response};
