//! HTTP protocol layer module
//!
//! Response builders, MIME detection and `ETag` handling, independent of
//! the article handlers.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_304_response, build_405_response, build_413_response, build_500_response,
    build_cached_response, build_html_response, build_options_response, build_redirect_response,
    build_text_response, HttpResponse,
};
