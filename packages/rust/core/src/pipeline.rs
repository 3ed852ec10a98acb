//! The optimization run: latest article → search → filter → scrape → rewrite → persist.

use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};
use uuid::Uuid;

use articleforge_rewrite::RewriteEngine;
use articleforge_scrape::ContentScraper;
use articleforge_search::{GoogleSearch, SearchProvider, candidate_links};
use articleforge_shared::{
    AppConfig, Article, ArticleUpdate, Citation, PipelineConfig, Result, ScrapedArticle,
};
use articleforge_store::ArticleStore;

use crate::citations::build_citations;

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The store holds no articles; nothing was changed.
    NoArticle,
    /// Search turned up no usable reference pages; nothing was changed.
    NoCandidates {
        /// The article that would have been rewritten.
        article: Article,
    },
    /// The article was rewritten and saved.
    Updated {
        article: Article,
        citations: Vec<Citation>,
        references: Vec<ScrapedArticle>,
        elapsed: Duration,
    },
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new stage.
    fn phase(&self, name: &str);
    /// Called after each reference page is scraped.
    fn reference_scraped(&self, url: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, outcome: &RunOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn reference_scraped(&self, _url: &str, _current: usize, _total: usize) {}
    fn done(&self, _outcome: &RunOutcome) {}
}

/// Owns every collaborator a run needs.
pub struct Optimizer {
    store: ArticleStore,
    search: Box<dyn SearchProvider>,
    scraper: ContentScraper,
    rewriter: RewriteEngine,
    settings: PipelineConfig,
}

impl Optimizer {
    pub fn new(
        store: ArticleStore,
        search: impl SearchProvider + 'static,
        scraper: ContentScraper,
        rewriter: RewriteEngine,
        settings: PipelineConfig,
    ) -> Self {
        Self {
            store,
            search: Box::new(search),
            scraper,
            rewriter,
            settings,
        }
    }

    /// Wire up the default collaborators from config.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            ArticleStore::from_config(&config.store)?,
            GoogleSearch::from_config(&config.search)?,
            ContentScraper::from_config(&config.scrape),
            RewriteEngine::from_config(&config.llm)?,
            config.pipeline.clone(),
        ))
    }

    pub fn store(&self) -> &ArticleStore {
        &self.store
    }

    /// Rewrite the latest article after the top reference pages for its title.
    ///
    /// Stages run strictly in sequence. A missing article or an empty
    /// candidate list ends the run early without touching the store; a
    /// failure to fetch or persist aborts it.
    #[instrument(skip_all, fields(run_id = %Uuid::now_v7()))]
    pub async fn run(&self, progress: &dyn ProgressReporter) -> Result<RunOutcome> {
        let start = Instant::now();

        // --- Stage 1: latest article ---
        progress.phase("Fetching latest article");
        let Some(article) = self.store.latest().await? else {
            warn!("no articles in store, nothing to optimize");
            let outcome = RunOutcome::NoArticle;
            progress.done(&outcome);
            return Ok(outcome);
        };
        info!(
            article_id = %article.id,
            title = %article.title,
            store = self.store.mode(),
            "found article"
        );

        // --- Stage 2: search ---
        progress.phase("Searching for reference articles");
        let results = self
            .search
            .search(&article.title, self.settings.max_search_results)
            .await;
        info!(provider = self.search.name(), count = results.len(), "search complete");

        // --- Stage 3: filter ---
        progress.phase("Selecting reference articles");
        let links = candidate_links(&results, self.settings.reference_limit);
        if links.is_empty() {
            warn!("no blog or article links in search results");
            let outcome = RunOutcome::NoCandidates { article };
            progress.done(&outcome);
            return Ok(outcome);
        }
        for (i, link) in links.iter().enumerate() {
            info!(rank = i + 1, %link, "selected reference");
        }

        // --- Stage 4: scrape ---
        progress.phase("Scraping reference articles");
        let total = links.len();
        let references = self
            .scraper
            .scrape_each(&links, |i, scraped| {
                progress.reference_scraped(&scraped.url, i + 1, total)
            })
            .await;
        let placeholders = references.iter().filter(|r| r.placeholder).count();
        info!(count = references.len(), placeholders, "scraping complete");

        // --- Stage 5: rewrite ---
        progress.phase("Rewriting article");
        let content = self.rewriter.optimize(&article, &references).await;
        info!(
            live = self.rewriter.is_live(),
            chars = content.chars().count(),
            "rewrite complete"
        );

        // --- Stage 6: citations ---
        progress.phase("Building citations");
        let citations = build_citations(&references);
        info!(count = citations.len(), "citations built");

        // --- Stage 7: persist ---
        progress.phase("Saving optimized article");
        let update = ArticleUpdate {
            content: Some(content),
            is_updated: Some(true),
            citations: Some(citations.clone()),
            ..Default::default()
        };
        let updated = self.store.update(article.id, update).await?;

        let elapsed = start.elapsed();
        info!(
            article_id = %updated.id,
            citations = citations.len(),
            elapsed_ms = elapsed.as_millis(),
            "article updated"
        );

        let outcome = RunOutcome::Updated {
            article: updated,
            citations,
            references,
            elapsed,
        };
        progress.done(&outcome);
        Ok(outcome)
    }
}
