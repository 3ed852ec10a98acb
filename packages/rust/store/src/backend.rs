//! The storage contract both backends implement.

use async_trait::async_trait;

use articleforge_shared::{Article, ArticleId, ArticleUpdate, DeleteOutcome, NewArticle, Result};

/// A place articles live.
///
/// Expected absence is reported as `Ok(None)` (or `success: false` for
/// deletes), never as an error.
#[async_trait]
pub trait ArticleBackend: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// All stored articles, in store order.
    async fn list(&self) -> Result<Vec<Article>>;

    /// The most recently published article, if any.
    async fn latest(&self) -> Result<Option<Article>>;

    async fn get(&self, id: ArticleId) -> Result<Option<Article>>;

    async fn create(&self, article: NewArticle) -> Result<Article>;

    /// Merge `update` into the article with `id`. Fails with `NotFound` if
    /// there is no such article.
    async fn update(&self, id: ArticleId, update: ArticleUpdate) -> Result<Article>;

    async fn delete(&self, id: ArticleId) -> Result<DeleteOutcome>;
}
