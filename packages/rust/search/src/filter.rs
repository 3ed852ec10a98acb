//! Picks blog-like pages out of a ranked result list.

use articleforge_shared::SearchResult;

/// Link fragments that disqualify a result (video and social platforms).
const EXCLUDED: &[&str] = &[
    "youtube.com",
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "linkedin.com/posts",
    "reddit.com",
];

/// Link fragments that mark a result as an article.
const ARTICLE_LINK_HINTS: &[&str] = &[
    "blog",
    "article",
    "post",
    "news",
    "medium.com",
    "wordpress",
    "blogger",
    "substack",
    "hashnode",
];

/// Title words that mark a result as an article.
const ARTICLE_TITLE_HINTS: &[&str] = &["blog", "article"];

/// Whether a single result looks like a readable article.
pub fn is_candidate(result: &SearchResult) -> bool {
    let link = result.link.to_lowercase();

    if EXCLUDED.iter().any(|k| link.contains(k)) {
        return false;
    }

    let title = result.title.to_lowercase();
    ARTICLE_LINK_HINTS.iter().any(|k| link.contains(k))
        || ARTICLE_TITLE_HINTS.iter().any(|k| title.contains(k))
}

/// The first `limit` candidate results, in ranking order.
pub fn select_candidates(results: &[SearchResult], limit: usize) -> Vec<SearchResult> {
    results
        .iter()
        .filter(|r| is_candidate(r))
        .take(limit)
        .cloned()
        .collect()
}

/// Links of the first `limit` candidate results.
pub fn candidate_links(results: &[SearchResult], limit: usize) -> Vec<String> {
    select_candidates(results, limit)
        .into_iter()
        .map(|r| r.link)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str, link: &str) -> SearchResult {
        SearchResult {
            title: title.into(),
            link: link.into(),
            snippet: String::new(),
        }
    }

    #[test]
    fn skips_video_and_keeps_order() {
        let results = vec![
            result("A", "https://x.com/blog/a"),
            result("B", "https://youtube.com/watch?v=1"),
            result("C", "https://medium.com/p/c"),
        ];

        assert_eq!(
            candidate_links(&results, 2),
            vec!["https://x.com/blog/a", "https://medium.com/p/c"]
        );
    }

    #[test]
    fn exclusion_beats_inclusion() {
        let r = result("My blog", "https://www.reddit.com/r/rust/blog_post");
        assert!(!is_candidate(&r));

        let r = result("Post", "https://LinkedIn.com/posts/someone");
        assert!(!is_candidate(&r));
    }

    #[test]
    fn title_can_qualify_a_plain_link() {
        assert!(is_candidate(&result("Engineering Blog", "https://example.com/x")));
        assert!(is_candidate(&result("An ARTICLE", "https://example.com/y")));
        assert!(!is_candidate(&result("Docs", "https://example.com/docs")));
    }

    #[test]
    fn truncates_to_limit() {
        let results: Vec<_> = (0..5)
            .map(|i| result("t", &format!("https://news.example.com/{i}")))
            .collect();
        assert_eq!(select_candidates(&results, 2).len(), 2);
        assert!(select_candidates(&results, 0).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let results = vec![
            result("A", "https://x.com/blog/a"),
            result("B", "https://facebook.com/page"),
            result("C", "https://substack.com/c"),
            result("D", "https://example.org/d"),
        ];

        let once = select_candidates(&results, 10);
        let twice = select_candidates(&once, 10);
        assert_eq!(once, twice);
    }
}
