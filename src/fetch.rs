//! Document retrieval: HTTP with retry, or a local file for offline runs.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::retry::{self, RetryPolicy};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

const SNIPPET_CHARS: usize = 200;

/// Anything that can turn a profile URL into raw HTML.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

#[derive(Debug)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub retry: RetryPolicy<FetchError>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            timeout: Duration::from_secs(20),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    retry: RetryPolicy<FetchError>,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .gzip(true)
            .build()?;
        Ok(HttpFetcher {
            client,
            timeout: config.timeout,
            retry: config.retry,
        })
    }

    async fn get_once(&self, url: Url) -> Result<String, FetchError> {
        debug!("GET {}", url);
        let resp = self.client.get(url.clone()).send().await.map_err(|e| self.classify(e))?;

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = resp.text().await.map_err(|e| self.classify(e))?;

        if status.as_u16() >= 400 {
            return Err(FetchError::Status {
                status: status.as_u16(),
                snippet: body.chars().take(SNIPPET_CHARS).collect(),
            });
        }
        if !is_html_content_type(&content_type) {
            warn!("Unexpected content type for {}: {:?}", url, content_type);
        }
        Ok(body)
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(e)
        }
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        let label = format!("GET {url}");
        retry::execute(&self.retry, &label, |_| self.get_once(parsed.clone())).await
    }
}

/// Serves one local HTML file for every URL, for testing the parser
/// without network access.
#[derive(Debug, Clone)]
pub struct LocalFileFetcher {
    path: PathBuf,
}

impl LocalFileFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalFileFetcher { path: path.into() }
    }
}

impl Fetch for LocalFileFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!("Parsing local HTML file for URL {}: {}", url, self.path.display());
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.display().to_string(),
                source,
            })
    }
}

pub fn is_html_content_type(content_type: &str) -> bool {
    let ct = content_type.to_ascii_lowercase();
    ct.contains("text/html") || ct.contains("application/xhtml+xml")
}
