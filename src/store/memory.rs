// In-process document collection
// Backs `memory://` connections; contents live as long as the process

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::{StoreError, StoreResult};
use super::model::{Article, ArticleFields, ArticleId};
use super::ArticleStore;

/// Insertion-ordered in-memory collection
#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: RwLock<Vec<Article>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
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
        self.articles.write().await.push(article.clone());
        Ok(article)
    }

    async fn replace_fields(&self, id: &str, fields: ArticleFields) -> StoreResult<Article> {
        let id: ArticleId = id.parse()?;
        let mut articles = self.articles.write().await;
        let article = articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound(id))?;
        article.replace_fields(fields);
        Ok(article.clone())
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let id: ArticleId = id.parse()?;
        let mut articles = self.articles.write().await;
        let before = articles.len();
        articles.retain(|a| a.id != id);
        Ok(articles.len() != before)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
