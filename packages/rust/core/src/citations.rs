//! Citation records linking a rewritten article to its references.

use url::Url;

use articleforge_shared::{Citation, ScrapedArticle};

/// One citation per reference, in reference order.
pub fn build_citations(references: &[ScrapedArticle]) -> Vec<Citation> {
    references
        .iter()
        .enumerate()
        .map(|(i, reference)| {
            let title = if reference.title.trim().is_empty() {
                format!("Reference Article {}", i + 1)
            } else {
                reference.title.clone()
            };

            Citation {
                title,
                url: reference.url.clone(),
                source: source_of(&reference.url),
            }
        })
        .collect()
}

/// Host component of `url`, or `"unknown"`.
fn source_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(String::from))
        .unwrap_or_else(|| "unknown".to_string())
}
