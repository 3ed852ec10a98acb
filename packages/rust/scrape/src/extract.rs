//! Title and main-text extraction from article HTML.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

/// Title used when a page has neither an `h1` nor a `<title>`.
pub const UNTITLED: &str = "Untitled Article";

/// Content used when nothing readable was found.
pub const NO_CONTENT: &str = "No content extracted.";

/// Maximum extracted content length, in characters.
pub const MAX_CONTENT_CHARS: usize = 5000;

/// Minimum length for a content container to be trusted.
const MIN_CONTAINER_CHARS: usize = 200;

/// Candidate main-content containers, most specific first.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".content",
    "main",
    ".post-body",
    r#"[role="main"]"#,
];

/// Subtrees that never count as article text.
const STRIPPED_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "aside"];

static CONTAINERS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    CONTENT_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).expect("static selector"))
        .collect()
});
static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("static selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("static selector"));
static PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("static selector"));

/// Title and text pulled from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub title: String,
    pub content: String,
}

/// Extract title and main text from a full HTML document.
pub fn extract(html: &str) -> Extracted {
    let doc = Html::parse_document(html);
    Extracted {
        title: extract_title(&doc),
        content: extract_content(&doc),
    }
}

/// Text of the first `h1` when non-empty, else `<title>`, else [`UNTITLED`].
pub fn extract_title(doc: &Html) -> String {
    doc.select(&H1)
        .next()
        .into_iter()
        .chain(doc.select(&TITLE).next())
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .find(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Main article text, whitespace-collapsed and capped.
pub fn extract_content(doc: &Html) -> String {
    let from_container = CONTAINERS.iter().find_map(|selector| {
        let text = doc
            .select(selector)
            .map(|el| {
                let mut out = String::new();
                visible_text(el, &mut out);
                out
            })
            .collect::<Vec<_>>()
            .join(" ");
        let text = normalize_whitespace(&text);
        (text.chars().count() > MIN_CONTAINER_CHARS).then_some(text)
    });

    let text = from_container.unwrap_or_else(|| {
        let paragraphs = doc
            .select(&PARAGRAPH)
            .filter(|p| !stripped_inside_container(*p))
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>()
            .join(" ");
        normalize_whitespace(&paragraphs)
    });

    if text.is_empty() {
        return NO_CONTENT.to_string();
    }
    truncate_chars(text, MAX_CONTENT_CHARS)
}

/// Text under `el`, skipping [`STRIPPED_TAGS`] subtrees.
fn visible_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if !STRIPPED_TAGS.contains(&child_el.value().name()) {
                visible_text(child_el, out);
            }
        }
    }
}

/// Whether `el` sits in a [`STRIPPED_TAGS`] subtree nested under a content
/// container. Those subtrees are discarded before paragraphs are collected.
fn stripped_inside_container(el: ElementRef<'_>) -> bool {
    let mut seen_stripped = false;
    for ancestor in el.ancestors().filter_map(ElementRef::wrap) {
        if seen_stripped && CONTAINERS.iter().any(|c| c.matches(&ancestor)) {
            return true;
        }
        if STRIPPED_TAGS.contains(&ancestor.value().name()) {
            seen_stripped = true;
        }
    }
    false
}

/// Collapse whitespace runs into single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text,
    }
}
