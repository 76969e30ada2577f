use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::fetch::Fetch;
use crate::parser::extract_profile;
use crate::record::ProfileRecord;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub concurrency: usize,
    /// Pause after each URL except the last.
    pub delay: Duration,
    pub show_progress: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            concurrency: 1,
            delay: Duration::from_secs(1),
            show_progress: true,
        }
    }
}

/// Batch outcome: records in input order plus the URLs that were skipped.
pub struct BatchReport {
    pub records: Vec<ProfileRecord>,
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.records.len() + self.failed.len()
    }
}

/// One URL per line; blank lines skipped. A missing file yields no URLs.
pub fn read_input_urls(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Fetch and parse every URL. A failing URL is logged and skipped; it never
/// aborts the batch.
pub async fn run_batch<F>(fetcher: Arc<F>, urls: Vec<String>, options: &BatchOptions) -> Result<BatchReport>
where
    F: Fetch + Send + Sync + 'static,
{
    let total = urls.len();
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));

    let pb = if options.show_progress {
        ProgressBar::new(total as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let (tx, mut rx) = tokio::sync::mpsc::channel::<(usize, String, Result<ProfileRecord>)>(
        options.concurrency.max(1) * 2,
    );

    let mut handles = Vec::with_capacity(total);
    for (idx, url) in urls.into_iter().enumerate() {
        let fetcher = Arc::clone(&fetcher);
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();
        let delay = options.delay;

        let label = url.clone();
        let handle = tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            info!("[{}/{}] Processing: {}", idx + 1, total, url);
            let outcome = process_one(fetcher.as_ref(), &url).await;
            let _ = tx.send((idx, url, outcome)).await;
            if idx + 1 < total && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        });
        handles.push((idx, label, handle));
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut done = Vec::with_capacity(total);
    while let Some(item) = rx.recv().await {
        done.push(item);
        pb.inc(1);
    }
    pb.finish_and_clear();

    // A task that died before reporting (panic or cancellation) still counts
    // as a failed URL.
    if done.len() < total {
        let reported: HashSet<usize> = done.iter().map(|(idx, ..)| *idx).collect();
        for (idx, url, handle) in handles {
            if reported.contains(&idx) {
                continue;
            }
            let reason = match handle.await {
                Err(e) if e.is_panic() => anyhow!("worker panicked while processing {url}"),
                Err(e) => anyhow!("worker cancelled while processing {url}: {e}"),
                Ok(()) => anyhow!("worker exited without a result for {url}"),
            };
            done.push((idx, url, Err(reason)));
        }
    }

    done.sort_by_key(|(idx, ..)| *idx);

    let mut records = Vec::new();
    let mut failed = Vec::new();
    for (_, url, outcome) in done {
        match outcome {
            Ok(record) => {
                info!(
                    "Parsed profile: {} from {}",
                    record.full_name.as_deref().unwrap_or("(name not found)"),
                    url
                );
                records.push(record);
            }
            Err(e) => {
                error!("Failed to process {}: {:#}", url, e);
                failed.push((url, format!("{e:#}")));
            }
        }
    }

    Ok(BatchReport { records, failed })
}

async fn process_one<F: Fetch>(fetcher: &F, url: &str) -> Result<ProfileRecord> {
    let html = fetcher
        .fetch(url)
        .await
        .with_context(|| format!("fetch failed for {url}"))?;
    let record = extract_profile(url, &html).with_context(|| format!("parse failed for {url}"))?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    /// Serves canned pages; URLs containing "broken" fail like an exhausted
    /// retry loop would.
    struct CannedFetcher;

    impl Fetch for CannedFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            if url.contains("broken") {
                return Err(FetchError::Status {
                    status: 503,
                    snippet: "unavailable".into(),
                });
            }
            let name = url.rsplit('/').next().unwrap_or_default();
            Ok(format!("<html><body><h1>{name}</h1></body></html>"))
        }
    }

    fn quick(concurrency: usize) -> BatchOptions {
        BatchOptions {
            concurrency,
            delay: Duration::ZERO,
            show_progress: false,
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn failed_fetch_is_skipped_and_order_kept() {
        let report = run_batch(
            Arc::new(CannedFetcher),
            urls(&["https://x.test/in/first", "https://x.test/in/broken", "https://x.test/in/third"]),
            &quick(1),
        )
        .await
        .unwrap();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].profile_url, "https://x.test/in/first");
        assert_eq!(report.records[0].full_name.as_deref(), Some("first"));
        assert_eq!(report.records[1].profile_url, "https://x.test/in/third");
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "https://x.test/in/broken");
        assert_eq!(report.total(), 3);
    }

    #[tokio::test]
    async fn concurrent_batch_preserves_input_order() {
        let list: Vec<String> = (0..20).map(|i| format!("https://x.test/in/p{i}")).collect();
        let report = run_batch(Arc::new(CannedFetcher), list.clone(), &quick(4)).await.unwrap();
        let got: Vec<_> = report.records.iter().map(|r| r.profile_url.clone()).collect();
        assert_eq!(got, list);
    }

    #[tokio::test]
    async fn parse_failure_is_skipped() {
        struct Blank;
        impl Fetch for Blank {
            async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
                Ok("   ".into())
            }
        }
        let report = run_batch(Arc::new(Blank), urls(&["https://x.test/in/a"]), &quick(1))
            .await
            .unwrap();
        assert!(report.records.is_empty());
        assert!(report.failed[0].1.contains("empty"));
    }

    #[tokio::test]
    async fn panicking_worker_is_reported_as_failed() {
        struct Explosive;
        impl Fetch for Explosive {
            async fn fetch(&self, url: &str) -> Result<String, FetchError> {
                if url.contains("boom") {
                    panic!("fetcher blew up");
                }
                CannedFetcher.fetch(url).await
            }
        }
        let list = urls(&["https://x.test/in/a", "https://x.test/in/boom", "https://x.test/in/c"]);
        let report = run_batch(Arc::new(Explosive), list, &quick(2)).await.unwrap();

        assert_eq!(report.total(), 3);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "https://x.test/in/boom");
        assert!(report.failed[0].1.contains("panicked"));
    }

    #[tokio::test]
    async fn empty_batch() {
        let report = run_batch(Arc::new(CannedFetcher), Vec::new(), &quick(1)).await.unwrap();
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn input_file_parsing() {
        assert!(read_input_urls(Path::new("tests/fixtures/missing.txt")).unwrap().is_empty());
        let got = read_input_urls(Path::new("tests/fixtures/input_urls.txt")).unwrap();
        assert_eq!(
            got,
            vec![
                "https://www.linkedin.com/in/jane-doe".to_string(),
                "https://www.linkedin.com/in/zoe-mueller".to_string(),
            ]
        );
    }
}
