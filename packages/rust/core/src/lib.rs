//! Article optimization pipeline for ArticleForge.
//!
//! Ties the record store, web search, scraping and rewriting together into a
//! single run: latest article in, rewritten article with citations out.

pub mod citations;
pub mod pipeline;

pub use citations::build_citations;
pub use pipeline::{Optimizer, ProgressReporter, RunOutcome, SilentProgress};
