//! CSS selector extraction

use super::{ExtractionStrategy, Property};
use crate::document::Document;
use crate::error::Error;
use crate::types::{Content, ResultKind};
use async_trait::async_trait;
use scraper::Selector;
use std::collections::BTreeMap;

/// Reads one property of the first element matching a selector
#[derive(Debug, Clone)]
pub struct SelectorStrategy {
    selector: String,
    property: Property,
}

impl SelectorStrategy {
    pub fn new(selector: impl Into<String>, property: Property) -> Self {
        Self {
            selector: selector.into(),
            property,
        }
    }

    fn parse_selector(&self) -> Result<Selector, Error> {
        Selector::parse(&self.selector).map_err(|e| Error::InvalidSelector {
            selector: self.selector.clone(),
            message: e.to_string(),
        })
    }
}

#[async_trait(?Send)]
impl ExtractionStrategy for SelectorStrategy {
    fn name(&self) -> &'static str {
        "selector"
    }

    fn kind(&self) -> ResultKind {
        ResultKind::Text
    }

    async fn extract(&self, document: &Document) -> Result<Option<Content>, Error> {
        let selector = self.parse_selector()?;
        let tree = document.tree().await?;

        let Some(element) = tree.select(&selector).next() else {
            return Ok(None);
        };

        let value = match &self.property {
            Property::Html => Some(element.inner_html()),
            Property::Attributes => {
                let attrs: BTreeMap<&str, &str> = element.value().attrs().collect();
                Some(serde_json::to_string(&attrs).unwrap_or_default())
            }
            Property::Attribute(name) => element
                .value()
                .attr(name)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            Property::Text => Some(element.text().collect::<String>().trim().to_string()),
        };

        Ok(value.map(Content::Text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::HtmlFetcher;
    use crate::testing::MapFetcher;
    use std::sync::Arc;
    use url::Url;

    const PAGE: &str = r#"<html><body>
        <h1 class="title" id="main">  Hello <em>World</em>  </h1>
        <a href="/one" data-x="">One</a>
        <a href="/two">Two</a>
    </body></html>"#;

    fn document() -> Document {
        let fetcher: Arc<dyn HtmlFetcher> =
            Arc::new(MapFetcher::new().page("https://example.com/", PAGE));
        Document::new("Example", Url::parse("https://example.com/").unwrap(), true, fetcher)
    }

    async fn extract(selector: &str, property: Property) -> Result<Option<Content>, Error> {
        SelectorStrategy::new(selector, property)
            .extract(&document())
            .await
    }

    fn text(value: &str) -> Option<Content> {
        Some(Content::Text(value.to_string()))
    }

    #[tokio::test]
    async fn test_text_is_trimmed() {
        assert_eq!(extract("h1", Property::Text).await.unwrap(), text("Hello World"));
    }

    #[tokio::test]
    async fn test_first_match_only() {
        assert_eq!(extract("a", Property::Text).await.unwrap(), text("One"));
    }

    #[tokio::test]
    async fn test_inner_html() {
        assert_eq!(
            extract("h1", Property::Html).await.unwrap(),
            text("  Hello <em>World</em>  ")
        );
    }

    #[tokio::test]
    async fn test_all_attributes_as_json() {
        let content = extract("h1", Property::Attributes).await.unwrap();
        assert_eq!(content, text(r#"{"class":"title","id":"main"}"#));
    }

    #[tokio::test]
    async fn test_named_attribute() {
        assert_eq!(
            extract("a", Property::Attribute("href".to_string())).await.unwrap(),
            text("/one")
        );
        assert_eq!(
            extract("a", Property::Attribute("rel".to_string())).await.unwrap(),
            None
        );
        assert_eq!(
            extract("a", Property::Attribute("data-x".to_string())).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_no_match_is_not_an_error() {
        assert_eq!(extract("h2", Property::Text).await.unwrap(), None);
        assert_eq!(extract("table td", Property::Html).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_selector() {
        let err = extract("h1[", Property::Text).await.unwrap_err();
        assert!(matches!(err, Error::InvalidSelector { .. }));
    }
}
