//! Static file serving module
//!
//! Maps request paths 1:1 onto the public directory, with MIME detection
//! and `ETag` revalidation.

use crate::http::{self, cache, mime, HttpResponse};
use crate::logger;
use hyper::body::Bytes;
use std::path::Path;
use tokio::fs;

/// Answer a GET/HEAD from the public directory
///
/// `None` means the path is not a servable file and routing should continue.
pub async fn serve_public(
    public_dir: &str,
    path: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Option<HttpResponse> {
    let (content, content_type) = load_from_directory(public_dir, path).await?;
    Some(build_static_file_response(
        content,
        content_type,
        if_none_match,
        is_head,
    ))
}

/// Load a regular file below `public_dir`
pub async fn load_from_directory(public_dir: &str, path: &str) -> Option<(Vec<u8>, &'static str)> {
    let relative = path.trim_start_matches('/');
    if relative.is_empty() {
        return None;
    }

    let dir_canonical = match fs::canonicalize(public_dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_debug(&format!(
                "Public directory not found or inaccessible '{public_dir}': {e}"
            ));
            return None;
        }
    };

    // Missing files are routine: most paths belong to the router
    let file_path = Path::new(public_dir).join(relative);
    let file_canonical = fs::canonicalize(&file_path).await.ok()?;
    if !is_within(&dir_canonical, &file_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_canonical.display()
        ));
        return None;
    }

    if !fs::metadata(&file_canonical).await.ok()?.is_file() {
        return None;
    }

    let content = match fs::read(&file_canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_canonical.display(),
                e
            ));
            return None;
        }
    };

    let content_type = mime::get_content_type(file_canonical.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}

fn is_within(root: &Path, candidate: &Path) -> bool {
    candidate.starts_with(root)
}

fn build_static_file_response(
    data: Vec<u8>,
    content_type: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> HttpResponse {
    let etag = cache::generate_etag(&data);

    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    http::build_cached_response(Bytes::from(data), content_type, &etag, is_head)
}
