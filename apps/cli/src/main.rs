//! DSA Master CLI: look up data-structure and algorithm topics from a
//! periodically refreshed local knowledge base.

mod commands;
mod display;

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
