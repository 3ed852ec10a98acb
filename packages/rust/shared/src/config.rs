//! Application configuration for ArticleForge.
//!
//! User config lives at `~/.articleforge/articleforge.toml`.
//! CLI flags (and their env vars) override config file values, which
//! override defaults. Credentials are never stored here, only the names of
//! the environment variables that hold them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ArticleForgeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "articleforge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".articleforge";

/// Values shipped in sample `.env` files that mean "not configured".
const PLACEHOLDER_SECRETS: &[&str] = &[
    "your_google_api_key_here",
    "your_custom_search_engine_id_here",
    "your_openai_api_key_here",
];

// ---------------------------------------------------------------------------
// Config structs (matching articleforge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Record store backend selection.
    #[serde(default)]
    pub store: StoreConfig,

    /// Web search provider.
    #[serde(default)]
    pub search: SearchConfig,

    /// Reference page scraping.
    #[serde(default)]
    pub scrape: ScrapeConfig,

    /// Rewrite model.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Pipeline knobs.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// `[store]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the article REST service (e.g. `http://localhost:8000/api`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bypass the REST service entirely and use the local JSON store.
    #[serde(default)]
    pub mock_mode: bool,

    /// Path of the local JSON store file.
    #[serde(default = "default_local_path")]
    pub local_path: PathBuf,

    /// Request timeout for the REST service, in seconds.
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            mock_mode: false,
            local_path: default_local_path(),
            timeout_secs: default_store_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api".into()
}
fn default_local_path() -> PathBuf {
    PathBuf::from("data").join("articles.json")
}
fn default_store_timeout() -> u64 {
    15
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Name of the env var holding the search API key.
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,

    /// Name of the env var holding the custom search engine id.
    #[serde(default = "default_engine_id_env")]
    pub engine_id_env: String,

    /// Search API endpoint.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_search_key_env(),
            engine_id_env: default_engine_id_env(),
            endpoint: default_search_endpoint(),
        }
    }
}

fn default_search_key_env() -> String {
    "GOOGLE_API_KEY".into()
}
fn default_engine_id_env() -> String {
    "GOOGLE_CSE_ID".into()
}
fn default_search_endpoint() -> String {
    "https://www.googleapis.com/customsearch/v1".into()
}

/// `[scrape]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Per-page navigation timeout in milliseconds.
    #[serde(default = "default_scrape_timeout")]
    pub timeout_ms: u64,

    /// User-Agent presented to reference sites.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_scrape_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_scrape_timeout() -> u64 {
    30_000
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36"
        .into()
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_llm_key_env")]
    pub api_key_env: String,

    /// Chat model id.
    #[serde(default = "default_model")]
    pub model: String,

    /// OpenAI-compatible chat completions endpoint.
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_llm_key_env(),
            model: default_model(),
            endpoint: default_llm_endpoint(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_model() -> String {
    "gpt-4".into()
}
fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    2000
}
fn default_llm_timeout() -> u64 {
    120
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of reference articles to scrape.
    #[serde(default = "default_reference_limit")]
    pub reference_limit: usize,

    /// Number of search results requested per run.
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reference_limit: default_reference_limit(),
            max_search_results: default_max_search_results(),
        }
    }
}

fn default_reference_limit() -> usize {
    2
}
fn default_max_search_results() -> usize {
    10
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.articleforge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ArticleForgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.articleforge/articleforge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ArticleForgeError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ArticleForgeError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ArticleForgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ArticleForgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ArticleForgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read a credential from the named env var.
///
/// Unset, blank, and sample-placeholder values all read as `None`.
pub fn read_secret(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(val) => {
            let val = val.trim();
            if val.is_empty() || PLACEHOLDER_SECRETS.contains(&val) {
                None
            } else {
                Some(val.to_string())
            }
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("OPENAI_API_KEY"));
        assert!(toml_str.contains("GOOGLE_CSE_ID"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.scrape.timeout_ms, 30_000);
        assert_eq!(parsed.pipeline.reference_limit, 2);
        assert!(!parsed.store.mock_mode);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[store]
mock_mode = true
local_path = "/tmp/articles.json"

[llm]
model = "gpt-4o-mini"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert!(config.store.mock_mode);
        assert_eq!(config.store.local_path, PathBuf::from("/tmp/articles.json"));
        assert_eq!(config.store.base_url, "http://localhost:8000/api");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, 2000);
        assert_eq!(config.search.api_key_env, "GOOGLE_API_KEY");
    }

    #[test]
    fn missing_secret_reads_as_none() {
        // Use a unique env var name to avoid interfering with other tests
        assert!(read_secret("AF_TEST_NONEXISTENT_KEY_12345").is_none());
    }
}
