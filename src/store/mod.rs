//! Article store module
//!
//! Persistence abstraction over a document collection:
//! - `ArticleStore` trait, one method per store operation
//! - `MemoryStore` for `memory://` connections
//! - `DocumentStore` for `file://<dir>` connections
//! - `connect()` turning a connection string into a shared store handle

mod document;
mod error;
mod memory;
mod model;

pub use document::DocumentStore;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use model::{Article, ArticleFields, ArticleId};

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::logger;

/// Operations over the article collection
///
/// Ids arrive as raw path segments; implementations reject malformed ones
/// with `StoreError::InvalidId` before touching the collection.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// All articles in insertion order
    async fn list(&self) -> StoreResult<Vec<Article>>;

    async fn get(&self, id: &str) -> StoreResult<Article>;

    /// Assign a fresh id and persist
    async fn create(&self, fields: ArticleFields) -> StoreResult<Article>;

    /// Overwrite all mutable fields; `NotFound` if nothing matches
    async fn replace_fields(&self, id: &str, fields: ArticleFields) -> StoreResult<Article>;

    /// Remove the article. `Ok(false)` when nothing matched.
    async fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Connectivity probe used by the readiness endpoint
    async fn ping(&self) -> StoreResult<()>;
}

pub type SharedStore = Arc<dyn ArticleStore>;

/// Parsed `store.uri`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionString {
    Memory,
    File(PathBuf),
}

impl ConnectionString {
    pub fn parse(uri: &str) -> StoreResult<Self> {
        let uri = uri.trim();
        if uri == "memory://" || uri == "memory" {
            return Ok(Self::Memory);
        }
        match uri.strip_prefix("file://") {
            Some(dir) if !dir.is_empty() => Ok(Self::File(PathBuf::from(dir))),
            _ => Err(StoreError::InvalidConnection(uri.to_string())),
        }
    }
}

impl std::fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory://"),
            Self::File(dir) => write!(f, "file://{}", dir.display()),
        }
    }
}

/// Open the configured collection
///
/// Connection state is logged either way; the caller owns the handle.
pub async fn connect(config: &StoreConfig) -> StoreResult<SharedStore> {
    let result = open(config).await;
    match &result {
        Ok(_) => logger::log_store_open(&config.uri, &config.collection),
        Err(e) => logger::log_store_error(&config.uri, e),
    }
    result
}

async fn open(config: &StoreConfig) -> StoreResult<SharedStore> {
    if config.collection.trim().is_empty()
        || config.collection.contains(['/', '\\'])
        || config.collection.contains("..")
    {
        return Err(StoreError::InvalidConnection(format!(
            "bad collection name '{}'",
            config.collection
        )));
    }

    match ConnectionString::parse(&config.uri)? {
        ConnectionString::Memory => Ok(Arc::new(MemoryStore::new())),
        ConnectionString::File(dir) => {
            let store = DocumentStore::open(&dir, &config.collection).await?;
            Ok(Arc::new(store))
        }
    }
}
