//! Price extraction entry point.
//!
//! One call runs: URL validation, blocked-host check, fetch, classification,
//! rule evaluation (retailer rules then generic rules) and normalization. Each
//! call is independent; nothing is cached or retried here.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::config::ScraperConfig;
use crate::scraping::classify_domain::{classify_domain, hostname, Classification};
use crate::scraping::error::ExtractionFailure;
use crate::scraping::evaluate_rules::evaluate_rules;
use crate::scraping::extract_image_url::{check_image_rules, extract_image_url};
use crate::scraping::fetch_page::{HttpFetcher, PageFetcher};
use crate::scraping::normalize_price::normalize_price;
use crate::scraping::rule_set::RuleBook;

/// A successfully extracted price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    /// Token as captured, trimmed.
    pub raw_token: String,
    /// Display string, e.g. `129,00€`.
    pub normalized_price: String,
    /// Rule set that produced the token.
    pub rule_set: String,
    /// Position of the winning pattern inside that rule set.
    pub pattern_index: usize,
}

#[derive(Clone)]
pub struct PriceExtractor {
    book: Arc<RuleBook>,
    fetcher: Arc<dyn PageFetcher>,
}

impl PriceExtractor {
    pub fn new(book: RuleBook, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            book: Arc::new(book),
            fetcher,
        }
    }

    /// Built-in rules plus configured blocked hosts, fetching over HTTP.
    pub fn from_config(config: &ScraperConfig) -> anyhow::Result<Self> {
        let book = RuleBook::builtin()?.with_blocked_hosts(config.blocked_hosts.iter().cloned());
        check_image_rules()?;
        let fetcher = HttpFetcher::new(config)?;

        Ok(Self::new(book, Arc::new(fetcher)))
    }

    /// Fetch `url` and extract its price.
    pub async fn fetch_price(&self, url: &str) -> Result<ExtractionResult, ExtractionFailure> {
        let (url, classification) = self.prepare(url)?;

        let html = self.fetcher.fetch(&url).await.map_err(|e| {
            warn!(url = %url, error = %e, "Fetch failed");
            ExtractionFailure::from(e)
        })?;

        let result = self.extract_classified(classification, &html);
        match &result {
            Ok(found) => info!(
                url = %url,
                price = %found.normalized_price,
                rule_set = %found.rule_set,
                pattern = found.pattern_index,
                "Price extracted"
            ),
            Err(failure) => warn!(url = %url, failure = %failure, "No price extracted"),
        }
        result
    }

    /// Extract a price from an already fetched page. Performs no I/O.
    pub fn extract_from_html(&self, url: &str, html: &str) -> Result<ExtractionResult, ExtractionFailure> {
        let (_, classification) = self.prepare(url)?;
        self.extract_classified(classification, html)
    }

    /// Fetch `url` and return the product image URL found in it.
    pub async fn fetch_image(&self, url: &str) -> Result<String, ExtractionFailure> {
        let (url, _) = self.prepare(url)?;

        let html = self.fetcher.fetch(&url).await?;

        extract_image_url(&html).ok_or_else(|| ExtractionFailure::NoMatch {
            attempted: vec!["image".to_string()],
        })
    }

    /// Validate the URL and reject blocked hosts before any network traffic.
    fn prepare(&self, raw: &str) -> Result<(Url, Classification<'_>), ExtractionFailure> {
        let url = parse_target_url(raw)?;

        let host = hostname(&url).ok_or_else(|| ExtractionFailure::FetchFailed {
            reason: format!("URL has no host: {}", raw),
        })?;

        match classify_domain(&self.book, &host) {
            Classification::Blocked { .. } => {
                info!(host = %host, "Blocked host, skipping fetch");
                Err(ExtractionFailure::Blocked { host })
            }
            classification => Ok((url, classification)),
        }
    }

    fn extract_classified(
        &self,
        classification: Classification<'_>,
        html: &str,
    ) -> Result<ExtractionResult, ExtractionFailure> {
        let evaluation = evaluate_rules(&self.book, classification, html);

        match evaluation.matched {
            Some(matched) => Ok(ExtractionResult {
                normalized_price: normalize_price(&matched.token),
                raw_token: matched.token,
                rule_set: matched.rule_set,
                pattern_index: matched.pattern_index,
            }),
            None => Err(ExtractionFailure::NoMatch {
                attempted: evaluation.attempted,
            }),
        }
    }
}

/// Parse an absolute http(s) URL.
pub fn parse_target_url(raw: &str) -> Result<Url, ExtractionFailure> {
    let url = Url::parse(raw.trim()).map_err(|e| ExtractionFailure::FetchFailed {
        reason: format!("invalid URL {}: {}", raw, e),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ExtractionFailure::FetchFailed {
            reason: format!("unsupported URL scheme: {}", other),
        }),
    }
}
