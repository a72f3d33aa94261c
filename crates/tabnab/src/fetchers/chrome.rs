//! Chrome fetcher
//!
//! Reads the live DOM of the tab itself, so pages behind a login or built
//! by scripts come back as the user sees them.

use crate::browser::{render_script, run_osascript, TAB_SOURCE_SCRIPT};
use crate::error::Error;
use crate::fetchers::{is_web_url, HtmlFetcher};
use async_trait::async_trait;
use url::Url;

/// Fetches document HTML from the open Google Chrome tab
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeFetcher;

impl ChromeFetcher {
    /// Create a new Chrome fetcher
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HtmlFetcher for ChromeFetcher {
    fn name(&self) -> &'static str {
        "chrome"
    }

    fn matches(&self, url: &Url) -> bool {
        // chrome:// and devtools pages refuse script execution
        is_web_url(url) || url.scheme() == "file"
    }

    async fn fetch_html(&self, url: &Url) -> Result<String, Error> {
        let script = render_script(TAB_SOURCE_SCRIPT, &[("target_url", url.as_str())]);
        run_osascript(&script).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_fetcher_matches() {
        let fetcher = ChromeFetcher::new();
        assert!(fetcher.matches(&Url::parse("https://example.com").unwrap()));
        assert!(fetcher.matches(&Url::parse("file:///tmp/page.html").unwrap()));
        assert!(!fetcher.matches(&Url::parse("chrome://newtab/").unwrap()));
        assert!(!fetcher.matches(&Url::parse("view-source:https://example.com").unwrap()));
    }
}
