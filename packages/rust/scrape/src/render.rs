//! Page rendering: turn a URL into final document HTML.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use articleforge_shared::{ArticleForgeError, Result, ScrapeConfig};

/// A loaded page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL after redirects.
    pub final_url: String,
    pub status: u16,
    pub html: String,
}

/// Loads a page and hands back its HTML.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<RenderedPage>;
}

/// Renders pages with a plain HTTP fetch.
///
/// Each call builds its own client, so no connection pool or cookies are
/// shared between pages, and everything is dropped when the call returns.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    user_agent: String,
    timeout: Duration,
}

impl HttpRenderer {
    pub fn new(user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            user_agent: user_agent.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self::new(&config.user_agent, Duration::from_millis(config.timeout_ms))
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<RenderedPage> {
        let parsed = Url::parse(url)
            .map_err(|e| ArticleForgeError::validation(format!("invalid URL '{url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ArticleForgeError::validation(format!(
                "unsupported URL scheme '{}'",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| ArticleForgeError::Network(format!("failed to build HTTP client: {e}")))?;

        debug!(%url, timeout_ms = self.timeout.as_millis(), "loading page");

        let response = client
            .get(parsed)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await
            .map_err(|e| ArticleForgeError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "page answered with an error status");
        }
        let final_url = response.url().to_string();

        let html = response
            .text()
            .await
            .map_err(|e| ArticleForgeError::Network(format!("{url}: body read failed: {e}")))?;

        Ok(RenderedPage {
            final_url,
            status: status.as_u16(),
            html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_with_configured_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blog/post"))
            .and(header("user-agent", "TestAgent/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Hi</h1>"))
            .mount(&server)
            .await;

        let renderer = HttpRenderer::new("TestAgent/1.0", Duration::from_secs(5));
        let page = renderer
            .render(&format!("{}/blog/post", server.uri()))
            .await
            .unwrap();

        assert_eq!(page.status, 200);
        assert_eq!(page.html, "<h1>Hi</h1>");
        assert_eq!(page.final_url, format!("{}/blog/post", server.uri()));
    }

    #[tokio::test]
    async fn error_pages_are_still_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("<h1>Not Found</h1>"))
            .mount(&server)
            .await;

        let renderer = HttpRenderer::from_config(&ScrapeConfig::default());
        let page = renderer.render(&server.uri()).await.unwrap();
        assert_eq!(page.status, 404);
        assert!(page.html.contains("Not Found"));
    }

    #[tokio::test]
    async fn slow_pages_time_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let renderer = HttpRenderer::new("TestAgent/1.0", Duration::from_millis(50));
        let err = renderer.render(&server.uri()).await.unwrap_err();
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn rejects_non_http_urls() {
        let renderer = HttpRenderer::from_config(&ScrapeConfig::default());
        assert!(renderer.render("file:///etc/passwd").await.is_err());
        assert!(renderer.render("not a url").await.is_err());
    }
}
