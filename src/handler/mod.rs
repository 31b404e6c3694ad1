//! Request handler module
//!
//! Request dispatch and the article handlers. Static files from the public
//! directory are answered before routing.

pub mod articles;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::{handle_request, RequestContext};
