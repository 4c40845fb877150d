//! navtree CLI: capture a documentation site's navigation tree as JSON.
//!
//! Renders the page, walks its left-hand navigation list, and writes the
//! resulting section tree to `documentation.json`.

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
