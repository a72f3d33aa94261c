//! In-memory collaborators for unit tests

use crate::error::Error;
use crate::fetchers::{is_web_url, HtmlFetcher};
use crate::tabs::TabSource;
use crate::types::TabRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

/// Serves fixed HTML per URL and counts fetches
#[derive(Default)]
pub(crate) struct MapFetcher {
    pages: HashMap<String, String>,
    failures: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl MapFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub(crate) fn failing(mut self, url: &str, message: &str) -> Self {
        self.failures.insert(url.to_string(), message.to_string());
        self
    }

    pub(crate) fn delayed(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HtmlFetcher for MapFetcher {
    fn name(&self) -> &'static str {
        "map"
    }

    fn matches(&self, url: &Url) -> bool {
        is_web_url(url)
    }

    async fn fetch_html(&self, url: &Url) -> Result<String, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(url.as_str()) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(message) = self.failures.get(url.as_str()) {
            return Err(Error::RequestError(message.clone()));
        }
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| Error::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}

/// Fixed tab listing that counts enumerations
#[derive(Default)]
pub(crate) struct StaticTabs {
    records: Vec<TabRecord>,
    calls: AtomicUsize,
}

impl StaticTabs {
    pub(crate) fn new(records: Vec<TabRecord>) -> Self {
        Self {
            records,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TabSource for StaticTabs {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn enumerate(&self) -> Result<Vec<TabRecord>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.clone())
    }
}
