//! serving-bench: load-generation benchmark for OpenAI-compatible
//! text-generation endpoints

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod factory;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    args.run().await
}
