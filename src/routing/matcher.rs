//! Route matching module
//!
//! Maps method + path to a `Route`, extracting `:id` segments.

use hyper::Method;

/// One handler per variant; ids are raw path segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    ListArticles,
    NewArticleForm,
    CreateArticle,
    ShowArticle(String),
    EditArticleForm(String),
    UpdateArticle(String),
    DeleteArticle(String),
}

/// Outcome of matching a request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    Found(Route),
    /// Path exists but not for this method; carries the `Allow` value
    MethodNotAllowed(String),
    /// `OPTIONS` on a known path; carries the `Allow` value
    Options(String),
    NotFound,
}

type Build = fn(Vec<String>) -> Route;

struct RouteEntry {
    method: Method,
    pattern: &'static str,
    build: Build,
}

fn first(mut params: Vec<String>) -> String {
    params.swap_remove(0)
}

fn table() -> [RouteEntry; 7] {
    [
        RouteEntry { method: Method::GET, pattern: "/", build: |_| Route::ListArticles },
        RouteEntry { method: Method::GET, pattern: "/articles/add", build: |_| Route::NewArticleForm },
        RouteEntry { method: Method::POST, pattern: "/articles/add", build: |_| Route::CreateArticle },
        RouteEntry { method: Method::GET, pattern: "/article/:id", build: |p| Route::ShowArticle(first(p)) },
        RouteEntry { method: Method::GET, pattern: "/article/edit/:id", build: |p| Route::EditArticleForm(first(p)) },
        RouteEntry { method: Method::POST, pattern: "/articles/edit/:id", build: |p| Route::UpdateArticle(first(p)) },
        RouteEntry { method: Method::DELETE, pattern: "/article/:id", build: |p| Route::DeleteArticle(first(p)) },
    ]
}

/// Match a path against a pattern, returning the `:param` segments in order
///
/// Segments compare exactly; a trailing slash on the path is ignored.
pub fn match_pattern(pattern: &str, path: &str) -> Option<Vec<String>> {
    let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };
    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');
    let mut params = Vec::new();

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return Some(params),
            (Some(p), Some(s)) if p.starts_with(':') => {
                if s.is_empty() {
                    return None;
                }
                params.push(s.to_string());
            }
            (Some(p), Some(s)) if p == s => {}
            _ => return None,
        }
    }
}

/// Resolve a request to a route
///
/// `HEAD` is served by the `GET` route of the same path.
pub fn match_route(method: &Method, path: &str) -> RouteMatch {
    let lookup = if method == Method::HEAD { &Method::GET } else { method };
    let mut allowed: Vec<String> = Vec::new();

    for entry in table() {
        let Some(params) = match_pattern(entry.pattern, path) else {
            continue;
        };
        if entry.method == *lookup {
            return RouteMatch::Found((entry.build)(params));
        }
        if entry.method == Method::GET {
            allowed.extend(["GET".to_string(), "HEAD".to_string()]);
        } else {
            allowed.push(entry.method.to_string());
        }
    }

    if allowed.is_empty() {
        return RouteMatch::NotFound;
    }
    allowed.push("OPTIONS".to_string());
    let allow = allowed.join(", ");
    if method == Method::OPTIONS {
        RouteMatch::Options(allow)
    } else {
        RouteMatch::MethodNotAllowed(allow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_pattern() {
        assert_eq!(match_pattern("/", "/"), Some(vec![]));
        assert_eq!(
            match_pattern("/article/:id", "/article/abc"),
            Some(vec!["abc".to_string()])
        );
        assert_eq!(
            match_pattern("/article/:id", "/article/abc/"),
            Some(vec!["abc".to_string()])
        );
        assert_eq!(match_pattern("/article/:id", "/article/"), None);
        assert_eq!(match_pattern("/article/:id", "/article/a/b"), None);
        assert_eq!(match_pattern("/articles/add", "/articles/added"), None);
    }

    #[test]
    fn test_route_table() {
        assert_eq!(
            match_route(&Method::GET, "/"),
            RouteMatch::Found(Route::ListArticles)
        );
        assert_eq!(
            match_route(&Method::GET, "/articles/add"),
            RouteMatch::Found(Route::NewArticleForm)
        );
        assert_eq!(
            match_route(&Method::POST, "/articles/add"),
            RouteMatch::Found(Route::CreateArticle)
        );
        assert_eq!(
            match_route(&Method::GET, "/article/42"),
            RouteMatch::Found(Route::ShowArticle("42".into()))
        );
        assert_eq!(
            match_route(&Method::GET, "/article/edit/42"),
            RouteMatch::Found(Route::EditArticleForm("42".into()))
        );
        assert_eq!(
            match_route(&Method::POST, "/articles/edit/42"),
            RouteMatch::Found(Route::UpdateArticle("42".into()))
        );
        assert_eq!(
            match_route(&Method::DELETE, "/article/42"),
            RouteMatch::Found(Route::DeleteArticle("42".into()))
        );
    }

    #[test]
    fn test_head_uses_get_route() {
        assert_eq!(
            match_route(&Method::HEAD, "/article/7"),
            RouteMatch::Found(Route::ShowArticle("7".into()))
        );
    }

    #[test]
    fn test_edit_path_is_not_an_id() {
        // "/article/edit" alone is the show route with id "edit"
        assert_eq!(
            match_route(&Method::GET, "/article/edit"),
            RouteMatch::Found(Route::ShowArticle("edit".into()))
        );
    }

    #[test]
    fn test_method_not_allowed() {
        assert_eq!(
            match_route(&Method::PUT, "/article/42"),
            RouteMatch::MethodNotAllowed("GET, HEAD, DELETE, OPTIONS".into())
        );
        assert_eq!(
            match_route(&Method::OPTIONS, "/articles/add"),
            RouteMatch::Options("GET, HEAD, POST, OPTIONS".into())
        );
        assert_eq!(
            match_route(&Method::DELETE, "/articles/edit/42"),
            RouteMatch::MethodNotAllowed("POST, OPTIONS".into())
        );
        assert_eq!(
            match_route(&Method::POST, "/"),
            RouteMatch::MethodNotAllowed("GET, HEAD, OPTIONS".into())
        );
    }

    #[test]
    fn test_unknown_path() {
        assert_eq!(match_route(&Method::GET, "/nope"), RouteMatch::NotFound);
        assert_eq!(match_route(&Method::DELETE, "/articles"), RouteMatch::NotFound);
    }
}
