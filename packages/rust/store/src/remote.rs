//! REST backend for the article record service.
//!
//! The service wraps payloads as `{success, data, message?}`; some endpoints
//! answer with the bare payload instead. Both shapes are accepted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use articleforge_shared::{
    Article, ArticleForgeError, ArticleId, ArticleUpdate, DeleteOutcome, NewArticle, Result,
    StoreConfig,
};

use crate::backend::ArticleBackend;

/// Client for the article REST service.
pub struct RemoteBackend {
    client: Client,
    base_url: String,
}

impl RemoteBackend {
    /// Build a client against `config.base_url`.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ArticleForgeError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(classify)
    }
}

#[async_trait]
impl ArticleBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    #[instrument(skip_all)]
    async fn list(&self) -> Result<Vec<Article>> {
        let resp = self.send(self.client.get(self.url("articles"))).await?;
        if !resp.status().is_success() {
            return Err(failure(resp).await);
        }
        payload(resp).await
    }

    #[instrument(skip_all)]
    async fn latest(&self) -> Result<Option<Article>> {
        let resp = self.send(self.client.get(self.url("articles/latest"))).await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => payload(resp).await,
            _ => Err(failure(resp).await),
        }
    }

    #[instrument(skip_all, fields(%id))]
    async fn get(&self, id: ArticleId) -> Result<Option<Article>> {
        let resp = self
            .send(self.client.get(self.url(&format!("articles/{id}"))))
            .await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => payload(resp).await.map(Some),
            _ => Err(failure(resp).await),
        }
    }

    #[instrument(skip_all)]
    async fn create(&self, article: NewArticle) -> Result<Article> {
        let resp = self
            .send(self.client.post(self.url("articles")).json(&article))
            .await?;
        if !resp.status().is_success() {
            return Err(failure(resp).await);
        }
        payload(resp).await
    }

    #[instrument(skip_all, fields(%id))]
    async fn update(&self, id: ArticleId, update: ArticleUpdate) -> Result<Article> {
        let resp = self
            .send(
                self.client
                    .put(self.url(&format!("articles/{id}")))
                    .json(&update),
            )
            .await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Err(ArticleForgeError::NotFound(format!("article {id}"))),
            s if s.is_success() => payload(resp).await,
            _ => Err(failure(resp).await),
        }
    }

    #[instrument(skip_all, fields(%id))]
    async fn delete(&self, id: ArticleId) -> Result<DeleteOutcome> {
        let resp = self
            .send(self.client.delete(self.url(&format!("articles/{id}"))))
            .await?;
        let status = resp.status();

        if status == StatusCode::NOT_FOUND {
            let body = body_json(resp).await;
            return Ok(DeleteOutcome {
                success: false,
                message: Some(message_of(&body).unwrap_or_else(|| "Article not found".into())),
            });
        }
        if !status.is_success() {
            return Err(failure(resp).await);
        }

        let body = body_json(resp).await;
        Ok(DeleteOutcome {
            success: body
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(true),
            message: message_of(&body),
        })
    }
}

/// Map a transport error onto the error taxonomy. Only failures that never
/// produced a response are network-class.
fn classify(e: reqwest::Error) -> ArticleForgeError {
    if e.is_builder() {
        ArticleForgeError::config(format!("invalid request: {e}"))
    } else if e.is_decode() {
        ArticleForgeError::parse(e.to_string())
    } else if e.is_connect() || e.is_timeout() || e.is_request() || e.is_body() {
        ArticleForgeError::Network(e.to_string())
    } else {
        ArticleForgeError::Remote {
            status: e.status().map_or(0, |s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

/// Decode a success body, unwrapping the `data` envelope when present.
async fn payload<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let text = resp.text().await.map_err(classify)?;
    let mut body: Value = serde_json::from_str(&text)
        .map_err(|e| ArticleForgeError::parse(format!("store returned invalid JSON: {e}")))?;

    let inner = if body.get("data").is_some() {
        body["data"].take()
    } else {
        body
    };

    serde_json::from_value(inner)
        .map_err(|e| ArticleForgeError::parse(format!("unexpected store payload: {e}")))
}

/// Read a body as JSON, or `Null` when it is empty or not JSON.
async fn body_json(resp: Response) -> Value {
    match resp.text().await {
        Ok(text) => serde_json::from_str(&text).unwrap_or(Value::Null),
        Err(_) => Value::Null,
    }
}

fn message_of(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(String::from)
}

/// Turn a non-success response into an error.
async fn failure(resp: Response) -> ArticleForgeError {
    let status = resp.status();
    let body = body_json(resp).await;
    debug!(status = status.as_u16(), %body, "store request failed");

    if status == StatusCode::UNPROCESSABLE_ENTITY {
        return ArticleForgeError::validation(validation_message(&body));
    }

    ArticleForgeError::Remote {
        status: status.as_u16(),
        message: message_of(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        }),
    }
}

/// Flatten a `{"errors": {"field": ["msg", ...]}}` map into one line.
fn validation_message(body: &Value) -> String {
    let Some(errors) = body.get("errors").and_then(Value::as_object) else {
        return message_of(body).unwrap_or_else(|| "validation failed".into());
    };

    errors
        .iter()
        .map(|(field, messages)| {
            let joined = match messages {
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{field}: {joined}")
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> RemoteBackend {
        RemoteBackend::new(&StoreConfig {
            base_url: format!("{}/api/", server.uri()),
            ..Default::default()
        })
        .unwrap()
    }

    fn article_json(id: u64) -> Value {
        json!({
            "id": id,
            "title": "Chatbots in 2025",
            "content": "Body",
            "url": "https://beyondchats.com/blogs/chatbots",
            "author": null,
            "published_at": "2024-12-20 00:00:00",
            "is_updated": false,
            "citations": null
        })
    }

    #[tokio::test]
    async fn latest_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles/latest"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "data": article_json(3)})),
            )
            .mount(&server)
            .await;

        let latest = backend(&server).latest().await.unwrap().unwrap();
        assert_eq!(latest.id, ArticleId(3));
        assert_eq!(latest.title, "Chatbots in 2025");
    }

    #[tokio::test]
    async fn bare_payload_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(article_json(3)))
            .mount(&server)
            .await;

        let article = backend(&server).get(ArticleId(3)).await.unwrap();
        assert_eq!(article.map(|a| a.id), Some(ArticleId(3)));
    }

    #[tokio::test]
    async fn missing_latest_and_get_are_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"success": false, "message": "No articles found"})),
            )
            .mount(&server)
            .await;

        let remote = backend(&server);
        assert!(remote.latest().await.unwrap().is_none());
        assert!(remote.get(ArticleId(9)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/articles/9"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = backend(&server)
            .update(ArticleId(9), ArticleUpdate::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn update_sends_citations_as_text() {
        let server = MockServer::start().await;
        let mut updated = article_json(3);
        updated["is_updated"] = json!(true);
        Mock::given(method("PUT"))
            .and(path("/api/articles/3"))
            .and(wiremock::matchers::body_partial_json(json!({"is_updated": true})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": updated})),
            )
            .mount(&server)
            .await;

        let update = ArticleUpdate {
            content: Some("New".into()),
            is_updated: Some(true),
            citations: Some(vec![]),
            ..Default::default()
        };
        let article = backend(&server).update(ArticleId(3), update).await.unwrap();
        assert!(article.is_updated);

        let requests = server.received_requests().await.unwrap();
        let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent["citations"], json!("[]"));
    }

    #[tokio::test]
    async fn validation_errors_are_flattened() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/articles"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "success": false,
                "message": "Validation failed",
                "errors": {"title": ["The title field is required."]}
            })))
            .mount(&server)
            .await;

        let err = backend(&server)
            .create(NewArticle::default())
            .await
            .unwrap_err();
        match err {
            ArticleForgeError::Validation { message } => {
                assert_eq!(message, "title: The title field is required.");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_errors_are_remote_not_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"message": "Server Error"})),
            )
            .mount(&server)
            .await;

        let err = backend(&server).list().await.unwrap_err();
        assert!(!err.is_network());
        assert!(matches!(err, ArticleForgeError::Remote { status: 500, .. }));
    }

    #[tokio::test]
    async fn delete_outcomes() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/articles/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"success": true, "message": "Article deleted successfully"}),
            ))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/articles/2"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"success": false, "message": "Article not found"})),
            )
            .mount(&server)
            .await;

        let remote = backend(&server);
        let ok = remote.delete(ArticleId(1)).await.unwrap();
        assert!(ok.success);

        let missing = remote.delete(ArticleId(2)).await.unwrap();
        assert!(!missing.success);
        assert_eq!(missing.message.as_deref(), Some("Article not found"));
    }
}
