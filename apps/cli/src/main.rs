//! ArticleForge CLI: rewrite stored articles after the pages that outrank them.
//!
//! Runs the optimization pipeline against the latest article and offers a few
//! record store maintenance commands.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
