//! Main-article extraction

use super::ExtractionStrategy;
use crate::document::Document;
use crate::error::Error;
use crate::types::{Article, Content, ResultKind};
use async_trait::async_trait;
use dom_smoothie::Readability;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Finds the main article in page source
pub trait ReadabilityExtractor: Send + Sync {
    /// `Ok(None)` when the page has no recognisable article
    fn extract(&self, html: &str, url: &Url) -> Result<Option<Article>, Error>;
}

/// Mozilla Readability port
#[derive(Debug, Clone, Default)]
pub struct SmoothieReadability;

impl SmoothieReadability {
    pub fn new() -> Self {
        Self
    }
}

impl ReadabilityExtractor for SmoothieReadability {
    fn extract(&self, html: &str, url: &Url) -> Result<Option<Article>, Error> {
        let mut reader = Readability::new(html, Some(url.as_str()), None)
            .map_err(|e| Error::Readability(e.to_string()))?;

        let article = match reader.parse() {
            Ok(article) => article,
            Err(e) => {
                debug!(url = %url, error = %e, "No article found");
                return Ok(None);
            }
        };

        Ok(Some(Article {
            title: article.title.trim().to_string(),
            author: article
                .byline
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty()),
            text: article.text_content.trim().to_string(),
        }))
    }
}

/// Main article of the page
pub struct ReadabilityStrategy {
    extractor: Arc<dyn ReadabilityExtractor>,
}

impl ReadabilityStrategy {
    pub fn new(extractor: Arc<dyn ReadabilityExtractor>) -> Self {
        Self { extractor }
    }
}

/// Run `extractor` over the document's cached source
pub(crate) async fn read_article(
    extractor: &dyn ReadabilityExtractor,
    document: &Document,
) -> Result<Option<Article>, Error> {
    let html = document.html().await?;
    extractor.extract(html, document.url())
}

#[async_trait(?Send)]
impl ExtractionStrategy for ReadabilityStrategy {
    fn name(&self) -> &'static str {
        "readability"
    }

    fn kind(&self) -> ResultKind {
        ResultKind::Article
    }

    async fn extract(&self, document: &Document) -> Result<Option<Content>, Error> {
        let article = read_article(self.extractor.as_ref(), document).await?;
        Ok(article.map(Content::Article))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fetchers::HtmlFetcher;
    use crate::testing::MapFetcher;

    /// Returns the page's `<h1>` as the article, or nothing
    pub(crate) struct HeadingExtractor;

    impl ReadabilityExtractor for HeadingExtractor {
        fn extract(&self, html: &str, _url: &Url) -> Result<Option<Article>, Error> {
            let tree = scraper::Html::parse_document(html);
            let h1 = scraper::Selector::parse("h1").unwrap();
            Ok(tree.select(&h1).next().map(|h| Article {
                title: h.text().collect(),
                author: Some("Ferris".to_string()),
                text: "Body text".to_string(),
            }))
        }
    }

    fn document(html: &str) -> Document {
        let fetcher: Arc<dyn HtmlFetcher> =
            Arc::new(MapFetcher::new().page("https://example.com/post", html));
        Document::new(
            "Post",
            Url::parse("https://example.com/post").unwrap(),
            false,
            fetcher,
        )
    }

    #[tokio::test]
    async fn test_strategy_wraps_article() {
        let strategy = ReadabilityStrategy::new(Arc::new(HeadingExtractor));
        let content = strategy
            .extract(&document("<h1>Ownership</h1>"))
            .await
            .unwrap();
        assert_eq!(
            content,
            Some(Content::Article(Article {
                title: "Ownership".to_string(),
                author: Some("Ferris".to_string()),
                text: "Body text".to_string(),
            }))
        );
    }

    #[tokio::test]
    async fn test_no_article_is_not_found() {
        let strategy = ReadabilityStrategy::new(Arc::new(HeadingExtractor));
        let content = strategy.extract(&document("<p>nothing</p>")).await.unwrap();
        assert_eq!(content, None);
    }

    #[test]
    fn test_smoothie_extracts_article() {
        let paragraph = "Ownership is the set of rules that govern how a Rust program \
            manages memory. Every value has a single owner, and when the owner goes \
            out of scope the value is dropped. Borrowing lets code use a value \
            without taking ownership of it. ";
        let body = format!(
            "<article><h1>Understanding Ownership</h1><p>{}</p><p>{}</p><p>{}</p></article>",
            paragraph.repeat(3),
            paragraph.repeat(3),
            paragraph.repeat(3)
        );
        let html = format!(
            "<html><head><title>Understanding Ownership</title></head>\
             <body><nav><a href=\"/\">Home</a></nav>{body}</body></html>"
        );

        let article = SmoothieReadability::new()
            .extract(&html, &Url::parse("https://example.com/ownership").unwrap())
            .unwrap()
            .expect("article");
        assert_eq!(article.title, "Understanding Ownership");
        assert!(article.text.contains("Every value has a single owner"));
    }
}
