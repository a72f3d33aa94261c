//! HTTP fetcher
//!
//! Re-downloads a tab's URL instead of asking the browser for its live
//! DOM. Works without browser automation but sees the page as an
//! anonymous client would.

use crate::error::Error;
use crate::fetchers::{is_web_url, HtmlFetcher};
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// Binary content type prefixes
const BINARY_PREFIXES: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "application/octet-stream",
    "application/pdf",
    "application/zip",
    "application/gzip",
    "application/x-tar",
    "application/x-rar",
    "application/x-7z",
    "application/vnd.ms-",
    "application/vnd.openxmlformats",
    "font/",
];

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Body timeout (total)
const BODY_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches document HTML over HTTP(S)
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    user_agent: Option<String>,
}

impl HttpFetcher {
    /// Create a fetcher with the default User-Agent
    pub fn new() -> Self {
        Self { user_agent: None }
    }

    /// Use a custom User-Agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

#[async_trait]
impl HtmlFetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    fn matches(&self, url: &Url) -> bool {
        is_web_url(url)
    }

    async fn fetch_html(&self, url: &Url) -> Result<String, Error> {
        let mut headers = HeaderMap::new();
        let user_agent = self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html, application/xhtml+xml, */*;q=0.8"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(Error::ClientBuildError)?;

        let response = client
            .get(url.as_str())
            .send()
            .await
            .map_err(Error::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if let Some(ref ct) = content_type {
            if is_binary_content_type(ct) {
                return Err(Error::BinaryContent(ct.clone()));
            }
        }

        let (body, truncated) = read_body_with_timeout(response, BODY_TIMEOUT).await?;
        if truncated {
            warn!(url = %url, bytes = body.len(), "Using partial document source");
        }
        debug!(url = %url, bytes = body.len(), "Fetched document source");

        Ok(String::from_utf8_lossy(&body).to_string())
    }
}

/// Check if content type indicates binary content
fn is_binary_content_type(content_type: &str) -> bool {
    let ct_lower = content_type.to_lowercase();
    BINARY_PREFIXES
        .iter()
        .any(|prefix| ct_lower.starts_with(prefix))
}

/// Read response body with timeout, returning partial content if timeout occurs
///
/// A stream error after some bytes keeps what arrived. A stream error before
/// any bytes is a failed fetch.
async fn read_body_with_timeout(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<(Bytes, bool), Error> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let chunk_future = stream.next();
        let timeout_future = tokio::time::sleep_until(deadline);

        tokio::select! {
            chunk = chunk_future => {
                match chunk {
                    Some(Ok(bytes)) => {
                        body.extend_from_slice(&bytes);
                    }
                    Some(Err(e)) => {
                        error!("Error reading body chunk: {}", e);
                        if body.is_empty() {
                            return Err(Error::RequestError(format!("body read failed: {e}")));
                        }
                        return Ok((Bytes::from(body), true));
                    }
                    None => {
                        return Ok((Bytes::from(body), false));
                    }
                }
            }
            _ = timeout_future => {
                warn!("Body timeout reached, returning partial content");
                return Ok((Bytes::from(body), true));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_binary_content_type() {
        assert!(is_binary_content_type("image/png"));
        assert!(is_binary_content_type("application/pdf"));
        assert!(is_binary_content_type("application/vnd.ms-excel"));
        assert!(is_binary_content_type("font/woff2"));
        assert!(is_binary_content_type("Image/JPEG"));

        assert!(!is_binary_content_type("text/html"));
        assert!(!is_binary_content_type("text/html; charset=utf-8"));
        assert!(!is_binary_content_type("application/xhtml+xml"));
    }

    #[test]
    fn test_http_fetcher_matches_web_urls_only() {
        let fetcher = HttpFetcher::new();
        assert!(fetcher.matches(&Url::parse("https://example.com").unwrap()));
        assert!(!fetcher.matches(&Url::parse("chrome://settings").unwrap()));
    }

    #[test]
    fn test_custom_user_agent() {
        let fetcher = HttpFetcher::new().with_user_agent("TestAgent/1.0");
        assert_eq!(fetcher.user_agent.as_deref(), Some("TestAgent/1.0"));
    }
}
