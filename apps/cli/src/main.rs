//! sitecache CLI: build-time content fetching for a content-driven site.
//!
//! Fetches from the content API through an in-memory batch cache and emits
//! the search index and route list the site's client consumes.

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
