//! Store error taxonomy

use hyper::StatusCode;
use thiserror::Error;

use super::model::ArticleId;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid article id: {0:?}")]
    InvalidId(String),

    #[error("article not found: {0}")]
    NotFound(ArticleId),

    #[error("invalid connection string: {0}")]
    InvalidConnection(String),
}

impl StoreError {
    /// HTTP status a handler answers with when this error reaches it
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) | Self::InvalidConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub(crate) fn io(context: &str, err: &std::io::Error) -> Self {
        Self::Unavailable(format!("{context}: {err}"))
    }
}
