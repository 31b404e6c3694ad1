// File-backed document collection
// One JSON file per collection, cached in memory and rewritten on every change

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

use super::error::{StoreError, StoreResult};
use super::model::{Article, ArticleFields, ArticleId};
use super::ArticleStore;

/// On-disk shape of an article
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArticleDocument {
    #[serde(rename = "_id")]
    id: ArticleId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    body: String,
}

impl From<ArticleDocument> for Article {
    fn from(doc: ArticleDocument) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            author: doc.author,
            body: doc.body,
        }
    }
}

impl From<&Article> for ArticleDocument {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            author: article.author.clone(),
            body: article.body.clone(),
        }
    }
}

/// Collection persisted as `<dir>/<collection>.json`
pub struct DocumentStore {
    path: PathBuf,
    articles: RwLock<Vec<Article>>,
}

impl DocumentStore {
    /// Open a collection, creating the directory if needed
    ///
    /// A missing file is an empty collection. A file that cannot be read or
    /// parsed fails the connection.
    pub async fn open(dir: &Path, collection: &str) -> StoreResult<Self> {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| StoreError::io(&format!("cannot create {}", dir.display()), &e))?;

        let path = dir.join(format!("{collection}.json"));
        let articles = Self::load(&path).await?;

        Ok(Self {
            path,
            articles: RwLock::new(articles),
        })
    }

    async fn load(path: &Path) -> StoreResult<Vec<Article>> {
        let content = match fs::read(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&format!("cannot read {}", path.display()), &e)),
        };

        let docs: Vec<ArticleDocument> = serde_json::from_slice(&content).map_err(|e| {
            StoreError::Unavailable(format!("corrupt collection {}: {e}", path.display()))
        })?;

        Ok(docs.into_iter().map(Article::from).collect())
    }

    /// Write the whole collection through a temp file and rename it into place
    async fn persist(&self, articles: &[Article]) -> StoreResult<()> {
        let docs: Vec<ArticleDocument> = articles.iter().map(ArticleDocument::from).collect();
        let content = serde_json::to_vec_pretty(&docs)
            .map_err(|e| StoreError::Unavailable(format!("cannot encode collection: {e}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .map_err(|e| StoreError::io(&format!("cannot write {}", tmp_path.display()), &e))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| StoreError::io(&format!("cannot replace {}", self.path.display()), &e))
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ArticleStore for DocumentStore {
    async fn list(&self) -> StoreResult<Vec<Article>> {
        Ok(self.articles.read().await.clone())
    }

    async fn get(&self, id: &str) -> StoreResult<Article> {
        let id: ArticleId = id.parse()?;
        self.articles
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, fields: ArticleFields) -> StoreResult<Article> {
        let article = Article::new(ArticleId::new(), fields);

        let mut articles = self.articles.write().await;
        let mut next = articles.clone();
        next.push(article.clone());
        self.persist(&next).await?;
        *articles = next;

        Ok(article)
    }

    async fn replace_fields(&self, id: &str, fields: ArticleFields) -> StoreResult<Article> {
        let id: ArticleId = id.parse()?;

        let mut articles = self.articles.write().await;
        let mut next = articles.clone();
        let article = next
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound(id))?;
        article.replace_fields(fields);
        let updated = article.clone();
        self.persist(&next).await?;
        *articles = next;

        Ok(updated)
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let id: ArticleId = id.parse()?;

        let mut articles = self.articles.write().await;
        if !articles.iter().any(|a| a.id == id) {
            return Ok(false);
        }
        let next: Vec<Article> = articles.iter().filter(|a| a.id != id).cloned().collect();
        self.persist(&next).await?;
        *articles = next;

        Ok(true)
    }

    async fn ping(&self) -> StoreResult<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::metadata(dir)
            .await
            .map(|_| ())
            .map_err(|e| StoreError::io(&format!("cannot stat {}", dir.display()), &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fields(title: &str) -> ArticleFields {
        ArticleFields {
            title: title.to_string(),
            author: "Steve B".to_string(),
            body: "Body text".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_collection() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), "articles").await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(store.path(), dir.path().join("articles.json"));
    }

    #[tokio::test]
    async fn test_contents_survive_reopen() {
        let dir = tempdir().unwrap();
        let id = {
            let store = DocumentStore::open(dir.path(), "articles").await.unwrap();
            let a = store.create(fields("Kept")).await.unwrap();
            store.create(fields("Dropped")).await.unwrap();
            store.replace_fields(&a.id.to_string(), fields("Edited")).await.unwrap();
            let dropped = store.list().await.unwrap()[1].id.to_string();
            assert!(store.delete(&dropped).await.unwrap());
            a.id
        };

        let reopened = DocumentStore::open(dir.path(), "articles").await.unwrap();
        let all = reopened.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].title, "Edited");
    }

    #[tokio::test]
    async fn test_documents_use_underscore_id() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), "articles").await.unwrap();
        let a = store.create(fields("Doc")).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["_id"], a.id.to_string());
        assert_eq!(value[0]["title"], "Doc");
    }

    #[tokio::test]
    async fn test_corrupt_file_fails_open() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("articles.json"), b"{not json").unwrap();
        let result = DocumentStore::open(dir.path(), "articles").await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_replace_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), "articles").await.unwrap();
        let id = ArticleId::new().to_string();
        assert!(matches!(
            store.replace_fields(&id, fields("X")).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(!store.delete(&id).await.unwrap());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_collection_unchanged() {
        let root = tempdir().unwrap();
        let dir = root.path().join("data");
        let store = DocumentStore::open(&dir, "articles").await.unwrap();
        let a = store.create(fields("A")).await.unwrap();
        let id = a.id.to_string();

        std::fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(
            store.create(fields("B")).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.replace_fields(&id, fields("Changed")).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.delete(&id).await,
            Err(StoreError::Unavailable(_))
        ));

        let all = store.list().await.unwrap();
        assert_eq!(all, vec![a]);
        assert_eq!(all[0].title, "A");
        assert!(store.ping().await.is_err());
    }
}
