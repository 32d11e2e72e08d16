//! Fetches remote product images for the frontend.
//!
//! Failures of any kind surface as [`ImageProxyError::NotFound`] so the caller
//! can fall back to a placeholder.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;
use thiserror::Error;
use tracing::warn;

use crate::config::ScraperConfig;

/// Bodies smaller than this are error pages or tracking pixels, not images.
const MIN_IMAGE_BYTES: usize = 100;

const IMAGE_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxiedImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ImageProxyError {
    #[error("image not found: {url}")]
    NotFound { url: String },
}

#[async_trait]
pub trait ImageProxy: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ProxiedImage, ImageProxyError>;
}

#[derive(Clone)]
pub struct HttpImageProxy {
    client: Client,
}

impl HttpImageProxy {
    pub fn new(config: &ScraperConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8"),
        );
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_str(&config.accept_language)?);
        headers.insert("sec-fetch-dest", HeaderValue::from_static("image"));
        headers.insert("sec-fetch-mode", HeaderValue::from_static("no-cors"));

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(IMAGE_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client })
    }
}

/// Plain-http image links are upgraded; mixed content is blocked by browsers.
pub fn upgrade_to_https(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

#[async_trait]
impl ImageProxy for HttpImageProxy {
    async fn fetch(&self, url: &str) -> Result<ProxiedImage, ImageProxyError> {
        let target = upgrade_to_https(url.trim());
        let not_found = || ImageProxyError::NotFound { url: target.clone() };

        let response = self.client.get(&target).send().await.map_err(|e| {
            warn!(url = %target, error = %e, "Image request failed");
            not_found()
        })?;

        if !response.status().is_success() {
            warn!(url = %target, status = response.status().as_u16(), "Image upstream error");
            return Err(not_found());
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = response.bytes().await.map_err(|_| not_found())?;
        if bytes.len() < MIN_IMAGE_BYTES {
            return Err(not_found());
        }

        Ok(ProxiedImage {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}
