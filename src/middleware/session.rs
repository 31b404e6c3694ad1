// Session cookie handling
// A session is only an id: the key under which a flash message waits

use hyper::header::{HeaderMap, COOKIE};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Session resolved for the current request
#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub id: SessionId,
    /// No usable cookie arrived; the response must set one
    pub is_new: bool,
}

impl Session {
    /// Read the session cookie, minting a new id when absent or malformed
    pub fn resolve(headers: &HeaderMap, cookie_name: &str) -> Self {
        match find_cookie(headers, cookie_name).and_then(|v| Uuid::parse_str(v).ok()) {
            Some(uuid) => Self {
                id: SessionId(uuid),
                is_new: false,
            },
            None => Self {
                id: SessionId::new(),
                is_new: true,
            },
        }
    }

    pub fn set_cookie_value(&self, cookie_name: &str) -> String {
        format!("{cookie_name}={}; Path=/; HttpOnly; SameSite=Lax", self.id)
    }
}

/// First value of `name` across all `Cookie` headers
fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    #[test]
    fn test_missing_cookie_creates_session() {
        let session = Session::resolve(&HeaderMap::new(), "kbase.sid");
        assert!(session.is_new);
        let cookie = session.set_cookie_value("kbase.sid");
        assert!(cookie.starts_with(&format!("kbase.sid={}", session.id)));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn test_existing_cookie_is_reused() {
        let id = SessionId::new();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; kbase.sid={id}")).unwrap(),
        );
        let session = Session::resolve(&headers, "kbase.sid");
        assert!(!session.is_new);
        assert_eq!(session.id, id);
    }

    #[test]
    fn test_malformed_cookie_is_replaced() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("kbase.sid=forged"));
        let session = Session::resolve(&headers, "kbase.sid");
        assert!(session.is_new);
    }
}
