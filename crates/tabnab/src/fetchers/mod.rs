//! HTML fetchers that populate a document's source
//!
//! Design: a document asks its fetcher for HTML the first time the source
//! is needed. The fetcher decides whether it can handle the URL at all via
//! `matches()`; documents it cannot handle fail with
//! [`Error::UnsupportedScheme`](crate::Error::UnsupportedScheme).

mod chrome;
mod http;

pub use chrome::ChromeFetcher;
pub use http::HttpFetcher;

use crate::error::Error;
use async_trait::async_trait;
use url::Url;

/// Trait for retrieving the HTML source of a document
#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    /// Unique identifier for this fetcher (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Returns true if this fetcher can retrieve the given URL
    fn matches(&self, url: &Url) -> bool;

    /// Fetch the HTML source
    ///
    /// Called only if `matches()` returned true.
    async fn fetch_html(&self, url: &Url) -> Result<String, Error>;
}

/// True for `http` and `https` URLs
pub(crate) fn is_web_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_web_url() {
        assert!(is_web_url(&Url::parse("https://example.com").unwrap()));
        assert!(is_web_url(&Url::parse("http://example.com/a?b=c").unwrap()));
        assert!(!is_web_url(&Url::parse("chrome://newtab/").unwrap()));
        assert!(!is_web_url(&Url::parse("file:///tmp/index.html").unwrap()));
    }

    #[test]
    fn test_fetcher_names() {
        assert_eq!(HttpFetcher::new().name(), "http");
        assert_eq!(ChromeFetcher::new().name(), "chrome");
    }
}
