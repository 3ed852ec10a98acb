//! Flat JSON file backend.
//!
//! The whole store is one JSON array, read and rewritten wholesale on every
//! call. A sidecar `<store>.seq` file remembers the highest id ever issued so
//! deleting the newest article never frees its id for reuse.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use articleforge_shared::{
    Article, ArticleForgeError, ArticleId, ArticleUpdate, DeleteOutcome, NewArticle, Result,
};

use crate::backend::ArticleBackend;

/// Article store backed by a local JSON file.
pub struct LocalBackend {
    path: PathBuf,
    seq_path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl LocalBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut seq = path.clone().into_os_string();
        seq.push(".seq");

        Self {
            path,
            seq_path: PathBuf::from(seq),
            lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Vec<Article>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file absent, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(ArticleForgeError::io(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            ArticleForgeError::parse(format!(
                "{} is not a JSON array of articles: {e}",
                self.path.display()
            ))
        })
    }

    async fn write_all(&self, articles: &[Article]) -> Result<()> {
        ensure_parent(&self.path).await?;

        let json = serde_json::to_string_pretty(articles)
            .map_err(|e| ArticleForgeError::Storage(format!("failed to encode store: {e}")))?;

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| ArticleForgeError::io(&self.path, e))
    }

    async fn high_water_mark(&self) -> Result<u64> {
        match tokio::fs::read_to_string(&self.seq_path).await {
            Ok(text) => Ok(text.trim().parse().unwrap_or_else(|_| {
                warn!(path = %self.seq_path.display(), "ignoring unreadable id sequence file");
                0
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(ArticleForgeError::io(&self.seq_path, e)),
        }
    }

    async fn record_high_water_mark(&self, id: ArticleId) -> Result<()> {
        ensure_parent(&self.seq_path).await?;
        tokio::fs::write(&self.seq_path, id.0.to_string())
            .await
            .map_err(|e| ArticleForgeError::io(&self.seq_path, e))
    }
}

#[async_trait]
impl ArticleBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn list(&self) -> Result<Vec<Article>> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    async fn latest(&self) -> Result<Option<Article>> {
        let _guard = self.lock.lock().await;
        let articles = self.read_all().await?;
        Ok(pick_latest(&articles).cloned())
    }

    async fn get(&self, id: ArticleId) -> Result<Option<Article>> {
        let _guard = self.lock.lock().await;
        let articles = self.read_all().await?;
        Ok(articles.into_iter().find(|a| a.id == id))
    }

    async fn create(&self, article: NewArticle) -> Result<Article> {
        article.validate()?;

        let _guard = self.lock.lock().await;
        let mut articles = self.read_all().await?;

        let max_existing = articles.iter().map(|a| a.id.0).max().unwrap_or(0);
        let id = ArticleId(max_existing.max(self.high_water_mark().await?) + 1);

        let created = article.into_article(id, now_stamp());
        articles.push(created.clone());

        self.record_high_water_mark(id).await?;
        self.write_all(&articles).await?;

        debug!(%id, "created article in local store");
        Ok(created)
    }

    async fn update(&self, id: ArticleId, update: ArticleUpdate) -> Result<Article> {
        update.validate()?;

        let _guard = self.lock.lock().await;
        let mut articles = self.read_all().await?;

        let article = articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| ArticleForgeError::NotFound(format!("article {id}")))?;

        update.apply_to(article);
        article.updated_at = Some(now_stamp());
        let updated = article.clone();

        self.write_all(&articles).await?;
        debug!(%id, "updated article in local store");
        Ok(updated)
    }

    async fn delete(&self, id: ArticleId) -> Result<DeleteOutcome> {
        let _guard = self.lock.lock().await;
        let mut articles = self.read_all().await?;

        let before = articles.len();
        articles.retain(|a| a.id != id);
        if articles.len() == before {
            return Ok(DeleteOutcome {
                success: false,
                message: Some("Article not found".into()),
            });
        }

        self.write_all(&articles).await?;
        Ok(DeleteOutcome {
            success: true,
            message: Some("Article deleted successfully".into()),
        })
    }
}

/// Single pass over the records; no sort, so an inconsistent ordering among
/// unparseable timestamps can't panic.
fn pick_latest(articles: &[Article]) -> Option<&Article> {
    articles.iter().fold(None, |best, candidate| match best {
        Some(current) if !outranks(candidate, current) => Some(current),
        _ => Some(candidate),
    })
}

/// Newer publication time wins when both parse and differ; otherwise the
/// higher id wins.
fn outranks(a: &Article, b: &Article) -> bool {
    match (a.published_at_millis(), b.published_at_millis()) {
        (Some(x), Some(y)) if x != y => x > y,
        _ => a.id > b.id,
    }
}

fn now_stamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

async fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ArticleForgeError::io(parent, e)),
        _ => Ok(()),
    }
}
