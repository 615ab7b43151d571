//! SiteContext CLI: crawl a website into a bounded text context.
//!
//! Fetches a start page plus a few related same-origin pages and prints the
//! context block ready to hand to a text-generation service.

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
