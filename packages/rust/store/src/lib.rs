//! Record store client for ArticleForge.
//!
//! [`ArticleStore`] fronts two backends: the REST record service
//! ([`RemoteBackend`]) and a local JSON file ([`LocalBackend`]). In mock mode
//! only the local file is used. Otherwise every call goes to the service
//! first and is re-run against the local file when the service is
//! unreachable. Any other failure is returned as-is.

pub mod backend;
pub mod local;
pub mod remote;

use tracing::{info, warn};

use articleforge_shared::{
    Article, ArticleForgeError, ArticleId, ArticleUpdate, DeleteOutcome, NewArticle, Result,
    StoreConfig,
};

pub use backend::ArticleBackend;
pub use local::LocalBackend;
pub use remote::RemoteBackend;

/// Article store with failure-driven fallback to the local file.
pub struct ArticleStore {
    remote: Option<Box<dyn ArticleBackend>>,
    local: Box<dyn ArticleBackend>,
}

impl ArticleStore {
    /// Build the store described by `config`. In mock mode the remote client
    /// is never constructed.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let local = LocalBackend::new(&config.local_path);

        if config.mock_mode {
            info!(path = %config.local_path.display(), "store running in mock mode");
            return Ok(Self::local_only(local));
        }

        let remote = RemoteBackend::new(config)?;
        info!(base_url = remote.base_url(), "store using remote service");
        Ok(Self::with_fallback(remote, local))
    }

    /// A store that only ever touches `local`.
    pub fn local_only(local: impl ArticleBackend + 'static) -> Self {
        Self {
            remote: None,
            local: Box::new(local),
        }
    }

    /// A store that prefers `remote` and downgrades to `local` on network failure.
    pub fn with_fallback(
        remote: impl ArticleBackend + 'static,
        local: impl ArticleBackend + 'static,
    ) -> Self {
        Self {
            remote: Some(Box::new(remote)),
            local: Box::new(local),
        }
    }

    /// Name of the primary backend.
    pub fn mode(&self) -> &'static str {
        self.remote
            .as_ref()
            .map_or_else(|| self.local.name(), |r| r.name())
    }

    pub async fn list(&self) -> Result<Vec<Article>> {
        if let Some(remote) = &self.remote {
            match remote.list().await {
                Err(e) if e.is_network() => degrade("list", &e),
                other => return other,
            }
        }
        self.local.list().await
    }

    /// The most recently published article, or `None` on an empty store.
    pub async fn latest(&self) -> Result<Option<Article>> {
        if let Some(remote) = &self.remote {
            match remote.latest().await {
                Err(e) if e.is_network() => degrade("latest", &e),
                other => return other,
            }
        }
        self.local.latest().await
    }

    pub async fn get(&self, id: ArticleId) -> Result<Option<Article>> {
        if let Some(remote) = &self.remote {
            match remote.get(id).await {
                Err(e) if e.is_network() => degrade("get", &e),
                other => return other,
            }
        }
        self.local.get(id).await
    }

    pub async fn create(&self, article: NewArticle) -> Result<Article> {
        if let Some(remote) = &self.remote {
            match remote.create(article.clone()).await {
                Err(e) if e.is_network() => degrade("create", &e),
                other => return other,
            }
        }
        self.local.create(article).await
    }

    pub async fn update(&self, id: ArticleId, update: ArticleUpdate) -> Result<Article> {
        if let Some(remote) = &self.remote {
            match remote.update(id, update.clone()).await {
                Err(e) if e.is_network() => degrade("update", &e),
                other => return other,
            }
        }
        self.local.update(id, update).await
    }

    pub async fn delete(&self, id: ArticleId) -> Result<DeleteOutcome> {
        if let Some(remote) = &self.remote {
            match remote.delete(id).await {
                Err(e) if e.is_network() => degrade("delete", &e),
                other => return other,
            }
        }
        self.local.delete(id).await
    }
}

fn degrade(operation: &str, error: &ArticleForgeError) {
    warn!(
        operation,
        error = %error,
        "record service unreachable, falling back to local store"
    );
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn local_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("af-store-test-{}", Uuid::now_v7()))
            .join("articles.json")
    }

    /// A base URL nothing is listening on.
    fn dead_base_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}/api")
    }

    fn draft(title: &str) -> NewArticle {
        NewArticle {
            title: title.into(),
            content: "Body".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn mock_mode_uses_local_file_only() {
        let config = StoreConfig {
            base_url: dead_base_url(),
            mock_mode: true,
            local_path: local_path(),
            ..Default::default()
        };
        let store = ArticleStore::from_config(&config).unwrap();
        assert_eq!(store.mode(), "local");

        let created = store.create(draft("Local")).await.unwrap();
        assert_eq!(created.id, ArticleId(1));
        assert!(config.local_path.exists());
    }

    #[tokio::test]
    async fn unreachable_service_falls_back_to_local() {
        let config = StoreConfig {
            base_url: dead_base_url(),
            mock_mode: false,
            local_path: local_path(),
            timeout_secs: 5,
        };
        let store = ArticleStore::from_config(&config).unwrap();
        assert_eq!(store.mode(), "remote");

        assert!(store.latest().await.unwrap().is_none());

        let created = store.create(draft("Offline")).await.unwrap();
        let latest = store.latest().await.unwrap().unwrap();
        assert_eq!(latest.id, created.id);

        let updated = store
            .update(
                created.id,
                ArticleUpdate {
                    is_updated: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.is_updated);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn validation_failure_does_not_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/articles"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "success": false,
                "errors": {"content": ["The content field is required."]}
            })))
            .mount(&server)
            .await;

        let config = StoreConfig {
            base_url: format!("{}/api", server.uri()),
            local_path: local_path(),
            ..Default::default()
        };
        let store = ArticleStore::from_config(&config).unwrap();

        let err = store.create(draft("Rejected")).await.unwrap_err();
        assert!(matches!(err, ArticleForgeError::Validation { .. }));
        assert!(!config.local_path.exists());
    }

    #[tokio::test]
    async fn remote_not_found_does_not_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let local = LocalBackend::new(local_path());
        local.create(draft("Only local")).await.unwrap();

        let remote = RemoteBackend::new(&StoreConfig {
            base_url: format!("{}/api", server.uri()),
            ..Default::default()
        })
        .unwrap();
        let store = ArticleStore::with_fallback(remote, local);

        let err = store
            .update(ArticleId(1), ArticleUpdate::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
