//! Shared types, error model, and configuration for ArticleForge.
//!
//! This crate is the foundation depended on by all other ArticleForge crates.
//! It provides:
//! - [`ArticleForgeError`], the unified error type
//! - Domain types ([`Article`], [`Citation`], [`SearchResult`], [`ScrapedArticle`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, LlmConfig, PipelineConfig, ScrapeConfig, SearchConfig, StoreConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, read_secret,
};
pub use error::{ArticleForgeError, Result};
pub use types::{
    Article, ArticleId, ArticleUpdate, Citation, DeleteOutcome, NewArticle, ScrapedArticle,
    SearchResult,
};
