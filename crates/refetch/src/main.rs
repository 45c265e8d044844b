use anyhow::Context;
use clap::Parser;
use refetch_fetch::{Fetcher, ReqwestClient};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .init();

    let options = args.fetch_options()?;
    let client = ReqwestClient::new().context("failed to build HTTP client")?;
    let fetcher = Fetcher::new(client, options);

    let changed = fetcher
        .fetch(&args.url)
        .await
        .with_context(|| format!("failed to fetch {} to {}", args.url, args.dest.display()))?;

    println!("{}", if changed { "changed" } else { "unchanged" });
    Ok(())
}
