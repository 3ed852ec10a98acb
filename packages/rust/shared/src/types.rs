//! Core domain types for ArticleForge.
//!
//! Records arrive from two backends (REST service and local JSON file) whose
//! shapes drift slightly; everything is normalized into [`Article`] here so
//! the ambiguity never travels further up.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ArticleForgeError, Result};

/// Maximum title length accepted by the record store.
pub const TITLE_MAX_CHARS: usize = 500;

/// Maximum source URL length accepted by the record store.
pub const URL_MAX_CHARS: usize = 1000;

/// Maximum author length accepted by the record store.
pub const AUTHOR_MAX_CHARS: usize = 255;

// ---------------------------------------------------------------------------
// ArticleId
// ---------------------------------------------------------------------------

/// Store-assigned article identifier (monotonic within one store).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(pub u64);

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ArticleId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// A persisted article record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub content: String,
    /// Original source URL.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Publication timestamp, kept as the store sent it.
    #[serde(default)]
    pub published_at: Option<String>,
    /// Set once the pipeline has rewritten this article.
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_updated: bool,
    /// Reference citations, carried as JSON text on the wire.
    #[serde(default, with = "citations_text")]
    pub citations: Option<Vec<Citation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Article {
    /// Publication time in epoch milliseconds.
    ///
    /// A missing timestamp counts as the epoch; a present but unparseable
    /// one yields `None`.
    pub fn published_at_millis(&self) -> Option<i64> {
        match self.published_at.as_deref().map(str::trim) {
            None | Some("") => Some(0),
            Some(raw) => parse_timestamp(raw).map(|dt| dt.timestamp_millis()),
        }
    }

    /// Number of attached citations (0 when none were ever set).
    pub fn citation_count(&self) -> usize {
        self.citations.as_ref().map_or(0, Vec::len)
    }
}

/// Parse the timestamp formats the record store is known to emit.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Create / update payloads
// ---------------------------------------------------------------------------

/// Fields for creating an article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub is_updated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "citations_text")]
    pub citations: Option<Vec<Citation>>,
}

impl NewArticle {
    /// Check field constraints; every violation is listed in the error.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.title.trim().is_empty() {
            problems.push("title: required".to_string());
        }
        if self.content.trim().is_empty() {
            problems.push("content: required".to_string());
        }
        check_optional_fields(
            Some(&self.title),
            self.url.as_deref(),
            self.author.as_deref(),
            self.published_at.as_deref(),
            &mut problems,
        );

        into_validation(problems)
    }

    /// Materialize as a stored record.
    pub fn into_article(self, id: ArticleId, created_at: String) -> Article {
        Article {
            id,
            title: self.title,
            content: self.content,
            url: self.url,
            author: self.author,
            published_at: self.published_at,
            is_updated: self.is_updated,
            citations: self.citations,
            created_at: Some(created_at),
            updated_at: None,
        }
    }
}

/// Partial update of an article; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_updated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "citations_text")]
    pub citations: Option<Vec<Citation>>,
}

impl ArticleUpdate {
    /// Check constraints on the fields that are present.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if matches!(self.title.as_deref(), Some(t) if t.trim().is_empty()) {
            problems.push("title: must not be empty".to_string());
        }
        if matches!(self.content.as_deref(), Some(c) if c.trim().is_empty()) {
            problems.push("content: must not be empty".to_string());
        }
        check_optional_fields(
            self.title.as_ref(),
            self.url.as_deref(),
            self.author.as_deref(),
            self.published_at.as_deref(),
            &mut problems,
        );

        into_validation(problems)
    }

    /// Merge the present fields into `article`.
    pub fn apply_to(self, article: &mut Article) {
        if let Some(title) = self.title {
            article.title = title;
        }
        if let Some(content) = self.content {
            article.content = content;
        }
        if self.url.is_some() {
            article.url = self.url;
        }
        if self.author.is_some() {
            article.author = self.author;
        }
        if self.published_at.is_some() {
            article.published_at = self.published_at;
        }
        if let Some(flag) = self.is_updated {
            article.is_updated = flag;
        }
        if self.citations.is_some() {
            article.citations = self.citations;
        }
    }
}

fn check_optional_fields(
    title: Option<&String>,
    url: Option<&str>,
    author: Option<&str>,
    published_at: Option<&str>,
    problems: &mut Vec<String>,
) {
    if title.is_some_and(|t| t.chars().count() > TITLE_MAX_CHARS) {
        problems.push(format!("title: may not exceed {TITLE_MAX_CHARS} characters"));
    }
    if url.is_some_and(|u| u.chars().count() > URL_MAX_CHARS) {
        problems.push(format!("url: may not exceed {URL_MAX_CHARS} characters"));
    }
    if author.is_some_and(|a| a.chars().count() > AUTHOR_MAX_CHARS) {
        problems.push(format!("author: may not exceed {AUTHOR_MAX_CHARS} characters"));
    }
    if let Some(raw) = published_at.filter(|raw| parse_timestamp(raw).is_none()) {
        problems.push(format!("published_at: '{raw}' is not a valid date"));
    }
}

fn into_validation(problems: Vec<String>) -> Result<()> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(ArticleForgeError::validation(problems.join("; ")))
    }
}

/// Result of a delete call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Pipeline-transient types
// ---------------------------------------------------------------------------

/// One ranked web search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

/// A reference page after rendering and extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedArticle {
    pub url: String,
    pub title: String,
    pub content: String,
    /// True when rendering failed and the fixed fallback payload was used.
    #[serde(default)]
    pub placeholder: bool,
}

/// A pointer from a rewritten article back to a reference page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub url: String,
    /// Host component of `url`.
    pub source: String,
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// Accept `true`/`false`, `0`/`1`, or their string forms.
fn flexible_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            other => Err(D::Error::custom(format!("invalid boolean: {other}"))),
        },
        other => Err(D::Error::custom(format!("invalid boolean: {other}"))),
    }
}

/// Citations travel as a JSON string holding an array; older records may
/// hold the array itself.
mod citations_text {
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    use super::Citation;

    pub fn serialize<S>(value: &Option<Vec<Citation>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(citations) => {
                let text = serde_json::to_string(citations).map_err(S::Error::custom)?;
                serializer.serialize_str(&text)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<Citation>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::String(text) if text.trim().is_empty() => Ok(None),
            Value::String(text) => serde_json::from_str(&text).map(Some).map_err(D::Error::custom),
            value @ Value::Array(_) => serde_json::from_value(value)
                .map(Some)
                .map_err(D::Error::custom),
            other => Err(D::Error::custom(format!(
                "expected a citation list, got {other}"
            ))),
        }
    }
}
