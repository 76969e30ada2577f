use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use profile_scraper::config::Settings;
use profile_scraper::export;
use profile_scraper::fetch::{HttpFetcher, LocalFileFetcher};
use profile_scraper::runner::{self, BatchOptions, BatchReport};

#[derive(Parser)]
#[command(
    name = "profile_scraper",
    about = "Extract public profile data into JSON"
)]
struct Cli {
    /// Text file with one profile URL per line
    #[arg(short, long, default_value = "data/input_urls.txt")]
    input: PathBuf,
    /// Where to write the JSON results (default: data/output_<timestamp>.json)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Settings file (default: config/settings.* if present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of profiles fetched at once
    #[arg(long, default_value = "1")]
    concurrency: usize,
    /// Per-request timeout in seconds; overrides settings
    #[arg(long)]
    timeout: Option<u64>,
    /// Custom User-Agent; overrides settings
    #[arg(long)]
    user_agent: Option<String>,
    /// Delay in seconds between requests; overrides settings
    #[arg(long)]
    delay: Option<f64>,
    /// Process inputs and log results without writing the output file
    #[arg(long)]
    dry_run: bool,
    /// Parse this local HTML file for every input URL instead of fetching
    #[arg(long)]
    html_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(timeout) = cli.timeout {
        settings.network.timeout_secs = timeout;
    }
    if let Some(ua) = cli.user_agent.clone() {
        settings.network.user_agent = ua;
    }
    if let Some(delay) = cli.delay {
        settings.throttling.delay_seconds = delay;
    }

    init_tracing(&settings.logging.level);

    let urls = runner::read_input_urls(&cli.input)?;
    if urls.is_empty() {
        warn!(
            "No input URLs found in {}. Provide at least one profile URL per line.",
            cli.input.display()
        );
        return Ok(());
    }

    let options = BatchOptions {
        concurrency: cli.concurrency,
        delay: settings.delay(),
        show_progress: true,
    };

    println!("Processing {} profiles...", urls.len());
    let report = match &cli.html_file {
        Some(path) => runner::run_batch(Arc::new(LocalFileFetcher::new(path)), urls, &options).await?,
        None => {
            let fetcher = HttpFetcher::new(settings.fetch_config())
                .context("Failed to build HTTP client")?;
            runner::run_batch(Arc::new(fetcher), urls, &options).await?
        }
    };

    write_output(&cli, &report)?;
    println!(
        "Done: {} processed ({} ok, {} failed).",
        report.total(),
        report.records.len(),
        report.failed.len()
    );

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }
    Ok(())
}

fn init_tracing(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .try_init();
}

fn write_output(cli: &Cli, report: &BatchReport) -> anyhow::Result<()> {
    if cli.dry_run {
        info!("Dry-run enabled; not writing output file.");
        info!("{}", export::to_json_string(&report.records)?);
        return Ok(());
    }

    let path = cli.output.clone().unwrap_or_else(default_output_path);
    export::write_json(&path, &report.records)?;
    info!("Saved {} profiles to {}", report.records.len(), path.display());
    Ok(())
}

fn default_output_path() -> PathBuf {
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
    PathBuf::from("data").join(format!("output_{stamp}.json"))
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
