//! In-memory [`PageFetcher`] with canned responses.
//!
//! Records every requested URL so callers can assert how many network calls an
//! operation made.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use url::Url;

use crate::scraping::error::FetchError;
use crate::scraping::fetch_page::PageFetcher;

#[derive(Debug, Clone)]
enum Canned {
    Body(String),
    Status(u16),
}

#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    pages: Arc<RwLock<HashMap<String, Canned>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` with a 200 for `url`.
    pub fn with_page(self, url: &str, html: impl Into<String>) -> Self {
        self.insert(url, Canned::Body(html.into()));
        self
    }

    /// Answer `url` with the given HTTP status.
    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.insert(url, Canned::Status(status));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().map(|c| c.len()).unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.read().map(|c| c.clone()).unwrap_or_default()
    }

    fn insert(&self, url: &str, canned: Canned) {
        // Store under the parsed form so lookups match `Url::to_string`
        let key = Url::parse(url)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string());
        if let Ok(mut pages) = self.pages.write() {
            pages.insert(key, canned);
        }
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let key = url.to_string();
        if let Ok(mut calls) = self.calls.write() {
            calls.push(key.clone());
        }

        let canned = self
            .pages
            .read()
            .ok()
            .and_then(|pages| pages.get(&key).cloned());

        match canned {
            Some(Canned::Body(html)) => Ok(html),
            Some(Canned::Status(status)) => Err(FetchError::Status { status }),
            None => Err(FetchError::Status { status: 404 }),
        }
    }
}
