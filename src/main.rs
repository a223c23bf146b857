//! GitHub crawler CLI - runs one search described by a JSON input file.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use github_crawler::{CrawlerConfig, GithubCrawler};

/// GitHub search crawler
#[derive(Parser)]
#[command(name = "github-crawler")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file with keywords, proxies and type
    config: PathBuf,

    /// Number of attempts before giving up (overrides the input file)
    #[arg(short, long)]
    attempts: Option<u32>,

    /// Pause between attempts in milliseconds (overrides the input file)
    #[arg(long)]
    retry_interval_ms: Option<u64>,

    /// Repository pages fetched at the same time (overrides the input file)
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    let mut config = CrawlerConfig::from_file(&cli.config)?;
    if let Some(attempts) = cli.attempts {
        config.attempts = attempts;
    }
    if let Some(interval) = cli.retry_interval_ms {
        config.retry_interval_ms = interval;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }

    let request = config.into_request()?;
    let crawler = GithubCrawler::new(request)?;
    let started = Instant::now();
    let results = crawler.run().await;
    tracing::debug!("Crawl finished in {:?}", started.elapsed());

    let output = if cli.pretty {
        serde_json::to_string_pretty(&results)?
    } else {
        serde_json::to_string(&results)?
    };
    println!("{}", output);

    Ok(())
}
