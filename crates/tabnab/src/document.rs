//! Documents: one open tab with lazily fetched source and parsed tree

use crate::error::Error;
use crate::fetchers::HtmlFetcher;
use crate::types::{DocumentRef, TabRecord};
use scraper::Html;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

/// One open tab
///
/// The HTML source is fetched at most once through the document's fetcher,
/// and the tree is parsed at most once from that source. Both caches are
/// private to the instance.
pub struct Document {
    title: String,
    url: Url,
    is_active: bool,
    fetcher: Arc<dyn HtmlFetcher>,
    source: OnceCell<String>,
    tree: std::cell::OnceCell<Html>,
}

impl Document {
    /// Create a document that fetches its source through `fetcher`
    pub fn new(
        title: impl Into<String>,
        url: Url,
        is_active: bool,
        fetcher: Arc<dyn HtmlFetcher>,
    ) -> Self {
        Self {
            title: title.into(),
            url,
            is_active,
            fetcher,
            source: OnceCell::new(),
            tree: std::cell::OnceCell::new(),
        }
    }

    /// Build a document from an enumeration record
    pub fn from_record(record: TabRecord, fetcher: Arc<dyn HtmlFetcher>) -> Result<Self, Error> {
        let url = Url::parse(&record.url)
            .map_err(|e| Error::InvalidListing(format!("bad URL '{}': {e}", record.url)))?;
        Ok(Self::new(record.title, url, record.is_active, fetcher))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Title and URL for attributing results
    pub fn reference(&self) -> DocumentRef {
        DocumentRef {
            title: self.title.clone(),
            url: self.url.to_string(),
        }
    }

    /// Enumeration record for this document
    pub fn record(&self) -> TabRecord {
        TabRecord::new(self.title.clone(), self.url.to_string(), self.is_active)
    }

    /// True once the source has been fetched
    pub fn is_fetched(&self) -> bool {
        self.source.initialized()
    }

    /// HTML source, fetched on first use
    ///
    /// A failed fetch leaves the cache empty, so a later call tries again.
    pub async fn html(&self) -> Result<&str, Error> {
        let source = self
            .source
            .get_or_try_init(|| async {
                if !self.fetcher.matches(&self.url) {
                    return Err(Error::UnsupportedScheme(self.url.to_string()));
                }
                debug!(fetcher = self.fetcher.name(), url = %self.url, "Fetching document source");
                self.fetcher.fetch_html(&self.url).await
            })
            .await?;
        Ok(source.as_str())
    }

    /// Parsed tree, built from the cached source on first use
    pub async fn tree(&self) -> Result<&Html, Error> {
        if let Some(tree) = self.tree.get() {
            return Ok(tree);
        }
        let source = self.html().await?;
        Ok(self.tree.get_or_init(|| Html::parse_document(source)))
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("title", &self.title)
            .field("url", &self.url.as_str())
            .field("is_active", &self.is_active)
            .field("fetcher", &self.fetcher.name())
            .field("fetched", &self.is_fetched())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MapFetcher;
    use scraper::Selector;

    #[tokio::test]
    async fn test_source_is_fetched_once() {
        let fetcher = Arc::new(
            MapFetcher::new().page("https://example.com/", "<html><h1>Hi</h1></html>"),
        );
        let doc = Document::new(
            "Example",
            Url::parse("https://example.com/").unwrap(),
            false,
            fetcher.clone(),
        );

        assert!(!doc.is_fetched());
        assert_eq!(doc.html().await.unwrap(), "<html><h1>Hi</h1></html>");
        assert!(doc.is_fetched());
        doc.html().await.unwrap();
        doc.tree().await.unwrap();
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_tree_is_parsed_from_source() {
        let fetcher = Arc::new(MapFetcher::new().page("https://example.com/", "<h1>Title</h1>"));
        let doc = Document::new("E", Url::parse("https://example.com/").unwrap(), true, fetcher);

        let tree = doc.tree().await.unwrap();
        let h1 = Selector::parse("h1").unwrap();
        let text: String = tree.select(&h1).next().unwrap().text().collect();
        assert_eq!(text, "Title");

        let again = doc.tree().await.unwrap();
        assert!(std::ptr::eq(tree, again));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let fetcher = Arc::new(MapFetcher::new());
        let doc = Document::new("E", Url::parse("https://missing.test/").unwrap(), false, fetcher.clone());

        assert!(doc.html().await.is_err());
        assert!(doc.html().await.is_err());
        assert!(!doc.is_fetched());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_unsupported_scheme_skips_fetcher() {
        let fetcher = Arc::new(MapFetcher::new());
        let doc = Document::new("New Tab", Url::parse("chrome://newtab/").unwrap(), false, fetcher.clone());

        let err = doc.html().await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedScheme(_)));
        assert_eq!(fetcher.calls(), 0);
    }

    #[test]
    fn test_from_record() {
        let fetcher: Arc<dyn HtmlFetcher> = Arc::new(MapFetcher::new());
        let doc = Document::from_record(
            TabRecord::new("Docs", "https://docs.rs", true),
            fetcher.clone(),
        )
        .unwrap();
        assert_eq!(doc.title(), "Docs");
        assert_eq!(doc.url().as_str(), "https://docs.rs/");
        assert!(doc.is_active());
        assert_eq!(doc.reference().url, "https://docs.rs/");

        let err = Document::from_record(TabRecord::new("Bad", "not a url", false), fetcher);
        assert!(matches!(err, Err(Error::InvalidListing(_))));
    }
}
