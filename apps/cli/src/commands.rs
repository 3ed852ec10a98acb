//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use articleforge_core::{Optimizer, ProgressReporter, RunOutcome};
use articleforge_shared::{
    AppConfig, Article, ArticleId, NewArticle, init_config, load_config, load_config_from,
};
use articleforge_store::ArticleStore;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ArticleForge: rewrite your latest article in the style of top-ranking pages.
#[derive(Parser)]
#[command(
    name = "articleforge",
    version,
    about = "Rewrite stored articles after the web pages that outrank them.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.articleforge/articleforge.toml).
    #[arg(long, global = true, env = "ARTICLEFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Use the local JSON store only, never the record service.
    #[arg(
        long,
        global = true,
        env = "MOCK_MODE",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = parse_mock_mode,
    )]
    pub mock_mode: Option<bool>,

    /// Base URL of the article record service.
    #[arg(long, global = true, env = "ARTICLE_API_URL")]
    pub api_url: Option<String>,

    /// Per-page scrape timeout in milliseconds.
    #[arg(long, global = true, env = "SCRAPE_TIMEOUT")]
    pub scrape_timeout_ms: Option<u64>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Only `true` (any case) turns mock mode on. Empty or other values mean off.
fn parse_mock_mode(raw: &str) -> std::result::Result<bool, std::convert::Infallible> {
    Ok(raw.trim().eq_ignore_ascii_case("true"))
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Rewrite the latest article using the top search results for its title.
    Optimize,

    /// Show the most recently published article.
    Latest,

    /// List all stored articles.
    List,

    /// Show one article.
    Show {
        /// Article id.
        id: ArticleId,
    },

    /// Store a new article.
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        content: String,

        /// Original source URL.
        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        author: Option<String>,

        /// Publication date (e.g. 2024-12-20 or RFC 3339).
        #[arg(long)]
        published_at: Option<String>,
    },

    /// Delete an article.
    Delete {
        /// Article id.
        id: ArticleId,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "articleforge=info",
        1 => "articleforge=debug",
        _ => "articleforge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Config resolution
// ---------------------------------------------------------------------------

/// Load the config file and layer CLI flags (and their env vars) on top.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    apply_overrides(&mut config, cli);
    Ok(config)
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(mock) = cli.mock_mode {
        config.store.mock_mode = mock;
    }
    if let Some(url) = &cli.api_url {
        config.store.base_url = url.clone();
    }
    if let Some(ms) = cli.scrape_timeout_ms {
        config.scrape.timeout_ms = ms;
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&cli),
        };
    }

    let config = resolve_config(&cli)?;

    match cli.command {
        Command::Optimize => cmd_optimize(&config).await,
        Command::Latest => cmd_latest(&config).await,
        Command::List => cmd_list(&config).await,
        Command::Show { id } => cmd_show(&config, id).await,
        Command::Add {
            title,
            content,
            url,
            author,
            published_at,
        } => {
            let article = NewArticle {
                title,
                content,
                url,
                author,
                published_at,
                ..Default::default()
            };
            cmd_add(&config, article).await
        }
        Command::Delete { id } => cmd_delete(&config, id).await,
        Command::Config { .. } => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_optimize(config: &AppConfig) -> Result<()> {
    let optimizer = Optimizer::from_config(config)?;
    info!(store = optimizer.store().mode(), "starting article optimization");

    let reporter = CliProgress::new();
    let outcome = optimizer.run(&reporter).await?;

    println!();
    match outcome {
        RunOutcome::NoArticle => {
            println!("  No articles found. Add one with `articleforge add` first.");
        }
        RunOutcome::NoCandidates { article } => {
            println!("  No blog or article pages found for \"{}\".", article.title);
            println!("  Article {} was left unchanged.", article.id);
        }
        RunOutcome::Updated {
            article,
            citations,
            references,
            elapsed,
        } => {
            println!("  Article optimized successfully!");
            println!("  ID:         {}", article.id);
            println!("  Title:      {}", article.title);
            println!("  References: {}", references.len());
            for (i, citation) in citations.iter().enumerate() {
                println!("    {}. {} ({})", i + 1, citation.title, citation.url);
            }
            let placeholders = references.iter().filter(|r| r.placeholder).count();
            if placeholders > 0 {
                println!("  Unreachable references replaced with sample content: {placeholders}");
            }
            println!("  Time:       {:.1}s", elapsed.as_secs_f64());
        }
    }
    println!();

    Ok(())
}

async fn cmd_latest(config: &AppConfig) -> Result<()> {
    let store = ArticleStore::from_config(&config.store)?;
    match store.latest().await? {
        Some(article) => print_article(&article),
        None => println!("No articles found."),
    }
    Ok(())
}

async fn cmd_list(config: &AppConfig) -> Result<()> {
    let store = ArticleStore::from_config(&config.store)?;
    let articles = store.list().await?;

    if articles.is_empty() {
        println!("No articles found.");
        return Ok(());
    }

    println!("{:>5}  {:<8}  {:<20}  TITLE", "ID", "UPDATED", "PUBLISHED");
    for article in &articles {
        println!(
            "{:>5}  {:<8}  {:<20}  {}",
            article.id,
            if article.is_updated { "yes" } else { "no" },
            article.published_at.as_deref().unwrap_or("-"),
            article.title
        );
    }
    println!("\n{} article(s)", articles.len());
    Ok(())
}

async fn cmd_show(config: &AppConfig, id: ArticleId) -> Result<()> {
    let store = ArticleStore::from_config(&config.store)?;
    let article = store
        .get(id)
        .await?
        .ok_or_else(|| eyre!("article {id} not found"))?;
    print_article(&article);
    Ok(())
}

async fn cmd_add(config: &AppConfig, article: NewArticle) -> Result<()> {
    article.validate()?;

    let store = ArticleStore::from_config(&config.store)?;
    let created = store.create(article).await?;
    info!(id = %created.id, "article created");
    println!("Created article {}: {}", created.id, created.title);
    Ok(())
}

async fn cmd_delete(config: &AppConfig, id: ArticleId) -> Result<()> {
    let store = ArticleStore::from_config(&config.store)?;
    let outcome = store.delete(id).await?;
    let message = outcome.message.unwrap_or_default();

    if !outcome.success {
        return Err(eyre!("could not delete article {id}: {message}"));
    }
    println!("Deleted article {id}. {message}");
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

fn print_article(article: &Article) {
    println!("# {} (id {})", article.title, article.id);
    if let Some(author) = &article.author {
        println!("Author:    {author}");
    }
    if let Some(published) = &article.published_at {
        println!("Published: {published}");
    }
    if let Some(url) = &article.url {
        println!("Source:    {url}");
    }
    println!("Updated:   {}", if article.is_updated { "yes" } else { "no" });
    println!();
    println!("{}", article.content);

    if let Some(citations) = article.citations.as_ref().filter(|c| !c.is_empty()) {
        println!();
        println!("References:");
        for (i, citation) in citations.iter().enumerate() {
            println!("  {}. {} [{}] {}", i + 1, citation.title, citation.source, citation.url);
        }
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn reference_scraped(&self, url: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Scraped [{current}/{total}] {url}"));
    }

    fn done(&self, _outcome: &RunOutcome) {
        self.spinner.finish_and_clear();
    }
}
