use std::time::Duration;

use thiserror::Error;

/// Terminal failure for one document. No record is produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("document is empty")]
    EmptyDocument,
    #[error("document contains no markup")]
    NotMarkup,
}

/// Recovered failure inside a single extraction step. Logged, never returned
/// to callers of `extract_profile`.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("malformed structured-data block: {0}")]
    MalformedBlock(#[from] serde_json::Error),
    #[error("unparseable count {raw:?}")]
    BadCount { raw: String },
    #[error("invalid selector {css:?}: {reason}")]
    InvalidSelector { css: String, reason: String },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {snippet}")]
    Status { status: u16, snippet: String },
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Transport hiccups, timeouts, rate limiting and server errors are worth
    /// another attempt. Client errors and local failures are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(e) => !e.is_builder() && !e.is_redirect(),
            FetchError::Timeout(_) => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::InvalidUrl(_) | FetchError::Io { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_retry_classes() {
        let status = |s| FetchError::Status { status: s, snippet: String::new() };
        assert!(status(429).is_retryable());
        assert!(status(503).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(!status(403).is_retryable());
    }

    #[test]
    fn local_failures_are_final() {
        assert!(!FetchError::InvalidUrl("nope".into()).is_retryable());
        assert!(FetchError::Timeout(Duration::from_secs(1)).is_retryable());
    }
}
