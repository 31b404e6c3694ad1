//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: health probes, static files,
//! route matching, body limits, session cookie and handler dispatch.

use crate::config::AppState;
use crate::handler::{articles, static_files};
use crate::http::{self, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use crate::middleware::{body, BodyError, FormFields, Session};
use crate::routing::{self, Route, RouteMatch};
use hyper::body::Body;
use hyper::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, SERVER, SET_COOKIE};
use hyper::{Method, Request, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Per-request values the article handlers need
pub struct RequestContext {
    pub session: Session,
    pub is_head: bool,
}

/// Main entry point for HTTP request handling
///
/// Generic over the body so tests can drive it with in-memory requests.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: Option<SocketAddr>,
) -> Result<HttpResponse, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let start = Instant::now();
    let entry = state.config.logging.access_log.then(|| new_access_entry(&req, peer_addr));

    let mut response = route_request(req, &state).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().lower()).unwrap_or(0);
        entry.request_time_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn new_access_entry<B>(req: &Request<B>, peer_addr: Option<SocketAddr>) -> AccessLogEntry {
    let remote = peer_addr.map_or_else(|| "-".to_string(), |a| a.ip().to_string());
    let mut entry = AccessLogEntry::new(
        remote,
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.referer = header_str(req.headers(), "referer").map(ToString::to_string);
    entry.user_agent = header_str(req.headers(), "user-agent").map(ToString::to_string);
    entry
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn route_request<B>(req: Request<B>, state: &AppState) -> HttpResponse
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let is_head = method == Method::HEAD;
    let is_read = method == Method::GET || is_head;

    // 1. Health probes
    if is_read {
        if let Some(resp) = check_health(&path, is_head, state).await {
            return resp;
        }
    }

    // 2. Public directory, ahead of the router
    if is_read {
        let if_none_match = header_str(req.headers(), "if-none-match");
        if let Some(resp) = static_files::serve_public(
            &state.config.static_files.public_dir,
            &path,
            if_none_match,
            is_head,
        )
        .await
        {
            return resp;
        }
    }

    let session = Session::resolve(req.headers(), &state.config.session.cookie_name);
    let ctx = RequestContext { session, is_head };

    // 3. Route table
    let route = match routing::match_route(&method, &path) {
        RouteMatch::Found(route) => route,
        RouteMatch::Options(allow) => return http::build_options_response(&allow),
        RouteMatch::MethodNotAllowed(allow) => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            return http::build_405_response(&allow);
        }
        RouteMatch::NotFound => {
            let resp = articles::error_page(
                &ctx,
                state,
                StatusCode::NOT_FOUND,
                "The page you are looking for does not exist.",
            )
            .await;
            return with_session_cookie(resp, &ctx.session, state);
        }
    };

    // 4. Body size and parsing, write routes only
    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(req.headers(), max_body_size) {
        return resp;
    }

    let fields = if matches!(route, Route::CreateArticle | Route::UpdateArticle(_)) {
        let content_type = header_str(req.headers(), CONTENT_TYPE.as_str()).map(ToString::to_string);
        match body::read_body(req.into_body(), max_body_size).await {
            Ok(bytes) => body::parse_fields_or_empty(content_type.as_deref(), &bytes),
            Err(BodyError::TooLarge { limit }) => {
                logger::log_error(&format!("Request body too large (max: {limit})"));
                return http::build_413_response();
            }
            Err(e) => {
                logger::log_warning(&e.to_string());
                return http::build_text_response(StatusCode::BAD_REQUEST, "400 Bad Request", false);
            }
        }
    } else {
        FormFields::new()
    };

    // 5. Handler
    let resp = articles::dispatch(route, fields, &ctx, state).await;
    with_session_cookie(resp, &ctx.session, state)
}

/// Liveness answers unconditionally; readiness pings the store
async fn check_health(path: &str, is_head: bool, state: &AppState) -> Option<HttpResponse> {
    let health = &state.config.health;
    if !health.enabled {
        return None;
    }

    if path == health.liveness_path {
        return Some(http::build_text_response(StatusCode::OK, "ok", is_head));
    }

    if path == health.readiness_path {
        return Some(match state.store.ping().await {
            Ok(()) => http::build_text_response(StatusCode::OK, "ok", is_head),
            Err(e) => {
                logger::log_warning(&format!("Readiness check failed: {e}"));
                http::build_text_response(StatusCode::SERVICE_UNAVAILABLE, "unavailable", is_head)
            }
        });
    }

    None
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<HttpResponse> {
    let content_length = headers.get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn with_session_cookie(mut resp: HttpResponse, session: &Session, state: &AppState) -> HttpResponse {
    if session.is_new {
        let cookie = session.set_cookie_value(&state.config.session.cookie_name);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                resp.headers_mut().insert(SET_COOKIE, value);
            }
            Err(e) => logger::log_error(&format!("Invalid session cookie header: {e}")),
        }
    }
    resp
}
