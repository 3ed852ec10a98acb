//! Web search for ArticleForge.
//!
//! [`GoogleSearch`] queries the Custom Search JSON API. Search never fails:
//! missing credentials, transport errors and empty answers all produce the
//! deterministic [`fallback_results`] for the query.

pub mod filter;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use articleforge_shared::{ArticleForgeError, Result, SearchConfig, SearchResult, read_secret};

pub use filter::{candidate_links, select_candidates};

/// Largest page the Custom Search API serves per request.
const MAX_PAGE_SIZE: usize = 10;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Ranked web search.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Up to `max_results` results for `query`, provider order preserved.
    /// Never empty.
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult>;
}

/// API key plus custom search engine id.
#[derive(Clone)]
pub struct SearchCredentials {
    pub api_key: String,
    pub engine_id: String,
}

impl fmt::Debug for SearchCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchCredentials")
            .field("api_key", &"<redacted>")
            .field("engine_id", &self.engine_id)
            .finish()
    }
}

/// Google Custom Search client.
#[derive(Debug)]
pub struct GoogleSearch {
    client: Client,
    endpoint: String,
    credentials: Option<SearchCredentials>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

impl GoogleSearch {
    /// Build from config, reading credentials from the configured env vars.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let credentials = match (
            read_secret(&config.api_key_env),
            read_secret(&config.engine_id_env),
        ) {
            (Some(api_key), Some(engine_id)) => Some(SearchCredentials { api_key, engine_id }),
            _ => {
                info!(
                    key_env = %config.api_key_env,
                    engine_env = %config.engine_id_env,
                    "search API not configured, using fallback results"
                );
                None
            }
        };

        Self::new(&config.endpoint, credentials)
    }

    pub fn new(endpoint: &str, credentials: Option<SearchCredentials>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ArticleForgeError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            credentials,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn query_api(
        &self,
        credentials: &SearchCredentials,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>> {
        let num = max_results.clamp(1, MAX_PAGE_SIZE).to_string();

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", credentials.api_key.as_str()),
                ("cx", credentials.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ArticleForgeError::Network(format!("search request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ArticleForgeError::Remote {
                status: status.as_u16(),
                message: "search API rejected the request".into(),
            });
        }

        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| ArticleForgeError::parse(format!("malformed search response: {e}")))?;

        Ok(body
            .items
            .into_iter()
            .map(|item| SearchResult {
                title: item.title,
                link: item.link,
                snippet: item.snippet,
            })
            .collect())
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    fn name(&self) -> &str {
        "google"
    }

    #[instrument(skip_all, fields(query = %query, max_results = max_results))]
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        let Some(credentials) = &self.credentials else {
            return fallback_results(query, max_results);
        };

        match self.query_api(credentials, query, max_results).await {
            Ok(results) if !results.is_empty() => {
                debug!(count = results.len(), "search API answered");
                results
            }
            Ok(_) => {
                warn!("search API returned no items, using fallback results");
                fallback_results(query, max_results)
            }
            Err(e) => {
                warn!(error = %e, "search failed, using fallback results");
                fallback_results(query, max_results)
            }
        }
    }
}

/// Fixed result set derived from `query`, truncated to `max(max_results, 1)`.
pub fn fallback_results(query: &str, max_results: usize) -> Vec<SearchResult> {
    let results = [
        (
            format!("{query} - Complete Guide"),
            "https://example-blog1.com/article",
            format!("A comprehensive guide about {query}"),
        ),
        (
            format!("Understanding {query}"),
            "https://example-blog2.com/post",
            format!("Everything you need to know about {query}"),
        ),
        (
            format!("{query} Best Practices"),
            "https://medium.com/article-about-topic",
            format!("Best practices and tips for {query}"),
        ),
    ];

    results
        .into_iter()
        .take(max_results.max(1))
        .map(|(title, link, snippet)| SearchResult {
            title,
            link: link.to_string(),
            snippet,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> SearchCredentials {
        SearchCredentials {
            api_key: "test-key".into(),
            engine_id: "test-cx".into(),
        }
    }

    #[test]
    fn fallback_is_derived_from_query() {
        let results = fallback_results("Rust async", 10);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "Rust async - Complete Guide");
        assert_eq!(results[1].link, "https://example-blog2.com/post");
        assert_eq!(results[2].snippet, "Best practices and tips for Rust async");
    }

    #[test]
    fn fallback_is_never_empty() {
        assert_eq!(fallback_results("q", 0).len(), 1);
        assert_eq!(fallback_results("q", 2).len(), 2);
    }

    #[tokio::test]
    async fn unconfigured_search_uses_fallback() {
        // Nothing listens here; an unconfigured client must not even try.
        let search = GoogleSearch::new("http://127.0.0.1:9/customsearch/v1", None).unwrap();
        assert!(!search.is_configured());

        let results = search.search("chatbots", 10).await;
        assert_eq!(results, fallback_results("chatbots", 10));
    }

    #[tokio::test]
    async fn api_results_are_mapped_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .and(query_param("key", "test-key"))
            .and(query_param("cx", "test-cx"))
            .and(query_param("q", "chatbots"))
            .and(query_param("num", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"title": "First", "link": "https://a.example/blog/1", "snippet": "one"},
                    {"title": "Second", "link": "https://b.example/post/2"}
                ]
            })))
            .mount(&server)
            .await;

        let endpoint = format!("{}/customsearch/v1", server.uri());
        let search = GoogleSearch::new(&endpoint, Some(credentials())).unwrap();

        let results = search.search("chatbots", 25).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "First");
        assert_eq!(results[1].link, "https://b.example/post/2");
        assert_eq!(results[1].snippet, "");
    }

    #[tokio::test]
    async fn api_failures_use_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "quota"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("q", "empty"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"kind": "x"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("q", "garbled"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let search = GoogleSearch::new(&server.uri(), Some(credentials())).unwrap();

        for query in ["quota", "empty", "garbled"] {
            let results = search.search(query, 10).await;
            assert_eq!(results, fallback_results(query, 10), "query {query}");
        }
    }
}
