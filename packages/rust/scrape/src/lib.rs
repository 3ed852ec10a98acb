//! Reference article scraping for ArticleForge.
//!
//! [`ContentScraper`] renders a page through a [`PageRenderer`] and extracts
//! its title and main text. Scraping never fails: a page that cannot be
//! loaded yields a fixed placeholder article so the run can continue.

pub mod extract;
pub mod render;

use tracing::{debug, info, instrument, warn};

use articleforge_shared::{ScrapeConfig, ScrapedArticle};

pub use extract::{Extracted, extract};
pub use render::{HttpRenderer, PageRenderer, RenderedPage};

/// Title substituted when a page could not be loaded.
pub const PLACEHOLDER_TITLE: &str = "Sample Article";

/// Content substituted when a page could not be loaded.
pub const PLACEHOLDER_CONTENT: &str = "This is sample content for demonstration purposes. \
     In production, this would contain the actual scraped article content.";

/// Fetches reference pages and reduces them to plain text.
pub struct ContentScraper {
    renderer: Box<dyn PageRenderer>,
}

impl ContentScraper {
    pub fn new(renderer: impl PageRenderer + 'static) -> Self {
        Self {
            renderer: Box::new(renderer),
        }
    }

    /// Scraper backed by [`HttpRenderer`].
    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self::new(HttpRenderer::from_config(config))
    }

    /// Scrape one page. Always returns an article.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn scrape(&self, url: &str) -> ScrapedArticle {
        match self.renderer.render(url).await {
            Ok(page) => {
                let Extracted { title, content } = extract(&page.html);
                if page.final_url != url {
                    debug!(final_url = %page.final_url, "followed redirects");
                }
                info!(
                    status = page.status,
                    chars = content.chars().count(),
                    "scraped reference"
                );
                ScrapedArticle {
                    url: url.to_string(),
                    title,
                    content,
                    placeholder: false,
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to load page, using placeholder content");
                placeholder(url)
            }
        }
    }

    /// Scrape `urls` one after another, calling `on_each` as each finishes.
    /// The output has exactly one entry per input URL, in order.
    pub async fn scrape_each<F>(&self, urls: &[String], mut on_each: F) -> Vec<ScrapedArticle>
    where
        F: FnMut(usize, &ScrapedArticle),
    {
        let mut scraped = Vec::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            let article = self.scrape(url).await;
            on_each(index, &article);
            scraped.push(article);
        }
        scraped
    }

    /// Scrape `urls` sequentially.
    pub async fn scrape_all(&self, urls: &[String]) -> Vec<ScrapedArticle> {
        self.scrape_each(urls, |_, _| {}).await
    }
}

fn placeholder(url: &str) -> ScrapedArticle {
    ScrapedArticle {
        url: url.to_string(),
        title: PLACEHOLDER_TITLE.to_string(),
        content: PLACEHOLDER_CONTENT.to_string(),
        placeholder: true,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn scraper() -> ContentScraper {
        ContentScraper::new(HttpRenderer::new("TestAgent/1.0", Duration::from_secs(5)))
    }

    #[tokio::test]
    async fn scrapes_title_and_content() {
        let server = MockServer::start().await;
        let body = "Chatbots answer questions around the clock. ".repeat(10);
        Mock::given(method("GET"))
            .and(path("/blog/chatbots"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<html><head><title>Site</title></head><body>\
                 <h1>Chatbots Explained</h1><article><p>{body}</p></article></body></html>"
            )))
            .mount(&server)
            .await;

        let url = format!("{}/blog/chatbots", server.uri());
        let article = scraper().scrape(&url).await;

        assert_eq!(article.url, url);
        assert_eq!(article.title, "Chatbots Explained");
        assert!(article.content.starts_with("Chatbots answer questions"));
        assert!(!article.placeholder);
    }

    #[tokio::test]
    async fn unreachable_page_yields_placeholder() {
        let article = scraper().scrape("http://127.0.0.1:9/nothing-here").await;

        assert_eq!(article.title, PLACEHOLDER_TITLE);
        assert_eq!(article.content, PLACEHOLDER_CONTENT);
        assert!(article.placeholder);
    }

    #[tokio::test]
    async fn scrape_all_is_one_to_one_and_ordered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/post/a"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<h1>A</h1><p>alpha</p>"),
            )
            .mount(&server)
            .await;

        let urls = vec![
            format!("{}/post/a", server.uri()),
            "not a url".to_string(),
        ];

        let mut seen = Vec::new();
        let scraped = scraper()
            .scrape_each(&urls, |i, article| seen.push((i, article.title.clone())))
            .await;

        assert_eq!(scraped.len(), 2);
        assert_eq!(scraped[0].title, "A");
        assert_eq!(scraped[0].content, "alpha");
        assert!(scraped[1].placeholder);
        assert_eq!(
            seen,
            vec![(0, "A".to_string()), (1, PLACEHOLDER_TITLE.to_string())]
        );
    }
}
