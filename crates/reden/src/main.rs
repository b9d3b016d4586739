use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use futures::TryStreamExt;
use reden::{CrawlConfig, Crawler, OutputFormat, SpeechWriter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "reden", version, about = "Crawl speeches from the Bundesregierung speech search")]
struct Cli {
    /// Log every page visited
    #[arg(short, long)]
    verbose: bool,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    outfile: Option<PathBuf>,
    /// csv writes once the crawl is complete, jsonl writes each speech as it is extracted
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
    /// Search result page to start from
    #[arg(long)]
    start_url: Option<String>,
    /// Pause before each request, in milliseconds
    #[arg(long)]
    pause_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = CrawlConfig::from_env()?;
    if let Some(url) = &cli.start_url {
        config = config.with_start_url(url)?;
    }
    if let Some(ms) = cli.pause_ms {
        config = config.with_pause(Duration::from_millis(ms));
    }

    let sink: Box<dyn Write> = match &cli.outfile {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };

    let crawler = Crawler::http(config)?;
    let mut writer = SpeechWriter::new(cli.format, sink)?;

    match cli.format {
        OutputFormat::Csv => {
            let speeches = crawler.crawl().await?;
            tracing::debug!("writing output");
            for speech in &speeches {
                writer.write(speech)?;
            }
        }
        OutputFormat::Jsonl => {
            let mut speeches = std::pin::pin!(crawler.speeches());
            while let Some(speech) = speeches.try_next().await? {
                writer.write(&speech)?;
            }
        }
    }

    writer.finish()?;
    tracing::debug!("done");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "error,reden=debug" } else { "error" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
