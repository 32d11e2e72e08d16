//! Outcome taxonomy for price extraction.
//!
//! Expected failures are values, not panics: callers branch on the variant to
//! decide whether a retry makes sense.

use thiserror::Error;

/// Why a single extraction did not produce a price.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionFailure {
    /// Network error, timeout, non-2xx status or an unusable URL.
    /// Retrying later may succeed.
    #[error("failed to fetch page: {reason}")]
    FetchFailed { reason: String },

    /// The host is a known redirector that never yields a scrapable page.
    #[error("host cannot be scraped: {host}")]
    Blocked { host: String },

    /// The page was fetched but no rule captured a token.
    /// `attempted` lists the rule sets tried, in order.
    #[error("no price found (tried: {})", attempted.join(", "))]
    NoMatch { attempted: Vec<String> },
}

impl ExtractionFailure {
    /// Short machine-friendly label used in logs and batch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionFailure::FetchFailed { .. } => "fetch_failed",
            ExtractionFailure::Blocked { .. } => "blocked",
            ExtractionFailure::NoMatch { .. } => "no_match",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ExtractionFailure::FetchFailed { .. })
    }
}

/// Errors raised by a [`PageFetcher`](super::fetch_page::PageFetcher).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("timeout fetching {url}")]
    Timeout { url: String },

    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<FetchError> for ExtractionFailure {
    fn from(err: FetchError) -> Self {
        ExtractionFailure::FetchFailed {
            reason: err.to_string(),
        }
    }
}
