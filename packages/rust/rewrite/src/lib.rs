//! Article rewriting for ArticleForge.
//!
//! [`RewriteEngine`] sends one chat completion request per article to an
//! OpenAI-compatible endpoint. Without an API key, or when the call fails in
//! any way, it returns the offline template from [`mock_rewrite`] instead.

pub mod prompt;

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use articleforge_shared::{
    Article, ArticleForgeError, LlmConfig, Result, ScrapedArticle, read_secret,
};

pub use prompt::{SYSTEM_PROMPT, build_prompt, mock_rewrite};

// ---------------------------------------------------------------------------
// Chat completion wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// RewriteEngine
// ---------------------------------------------------------------------------

/// Rewrites articles in the style of reference pages.
pub struct RewriteEngine {
    client: Client,
    config: LlmConfig,
    api_key: Option<String>,
}

impl fmt::Debug for RewriteEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewriteEngine")
            .field("model", &self.config.model)
            .field("endpoint", &self.config.endpoint)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

impl RewriteEngine {
    /// Build from config, reading the API key from `config.api_key_env`.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = read_secret(&config.api_key_env);
        if api_key.is_none() {
            info!(
                key_env = %config.api_key_env,
                "language model not configured, using offline rewrite"
            );
        }
        Self::new(config.clone(), api_key)
    }

    pub fn new(config: LlmConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ArticleForgeError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Whether rewrites go to a real model.
    pub fn is_live(&self) -> bool {
        self.api_key.is_some()
    }

    /// Rewrite `original` using `references` as style guides. Never fails.
    #[instrument(skip_all, fields(article_id = %original.id, references = references.len()))]
    pub async fn optimize(&self, original: &Article, references: &[ScrapedArticle]) -> String {
        let Some(api_key) = &self.api_key else {
            return mock_rewrite(original);
        };

        let prompt = build_prompt(original, references);
        match self.complete(api_key, &prompt).await {
            Ok(text) => {
                info!(chars = text.chars().count(), "model rewrite complete");
                text
            }
            Err(e) => {
                warn!(error = %e, "model call failed, using offline rewrite");
                mock_rewrite(original)
            }
        }
    }

    async fn complete(&self, api_key: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!(model = %self.config.model, prompt_chars = prompt.len(), "sending chat request");

        let resp = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ArticleForgeError::Network(format!("chat request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ArticleForgeError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ArticleForgeError::parse(format!("malformed chat response: {e}")))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ArticleForgeError::parse("chat response had no content"))
    }
}
