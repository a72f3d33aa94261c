//! Page metadata extraction
//!
//! The default scraper reads Open Graph, Twitter card and standard meta
//! tags, falling back to ordinary DOM elements. Each key takes the first
//! non-empty value in rule order.

use super::ExtractionStrategy;
use crate::document::Document;
use crate::error::Error;
use crate::types::{Content, Metadata, ResultKind};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::Arc;
use url::Url;

/// Produces a metadata map from page source
#[async_trait]
pub trait MetadataScraper: Send + Sync {
    async fn scrape(&self, html: &str, url: &Url) -> Result<Metadata, Error>;
}

/// Where a rule reads its value from
#[derive(Clone, Copy)]
enum Source {
    Attr(&'static str),
    Text,
}

struct Rule {
    selector: &'static str,
    source: Source,
}

const fn attr(selector: &'static str, name: &'static str) -> Rule {
    Rule {
        selector,
        source: Source::Attr(name),
    }
}

const fn text(selector: &'static str) -> Rule {
    Rule {
        selector,
        source: Source::Text,
    }
}

const AUTHOR: &[Rule] = &[
    attr("meta[name='author']", "content"),
    attr("meta[property='article:author']", "content"),
    attr("meta[name='twitter:creator']", "content"),
    text("[rel='author']"),
    text("[itemprop='author'] [itemprop='name']"),
];

const DATE: &[Rule] = &[
    attr("meta[property='article:published_time']", "content"),
    attr("meta[name='date']", "content"),
    attr("meta[itemprop='datePublished']", "content"),
    attr("meta[property='og:updated_time']", "content"),
    attr("time[datetime]", "datetime"),
];

const DESCRIPTION: &[Rule] = &[
    attr("meta[property='og:description']", "content"),
    attr("meta[name='twitter:description']", "content"),
    attr("meta[name='description']", "content"),
];

const IMAGE: &[Rule] = &[
    attr("meta[property='og:image']", "content"),
    attr("meta[property='og:image:url']", "content"),
    attr("meta[name='twitter:image']", "content"),
    attr("meta[name='twitter:image:src']", "content"),
];

const LOGO: &[Rule] = &[
    attr("meta[property='og:logo']", "content"),
    attr("link[rel='apple-touch-icon']", "href"),
    attr("link[rel~='icon']", "href"),
];

const PUBLISHER: &[Rule] = &[
    attr("meta[property='og:site_name']", "content"),
    attr("meta[name='application-name']", "content"),
    attr("meta[name='publisher']", "content"),
];

const TITLE: &[Rule] = &[
    attr("meta[property='og:title']", "content"),
    attr("meta[name='twitter:title']", "content"),
    text("title"),
    text("h1"),
];

const URL: &[Rule] = &[
    attr("meta[property='og:url']", "content"),
    attr("link[rel='canonical']", "href"),
];

/// Keys whose values are resolved against the page URL
const RESOLVED_KEYS: &[&str] = &["image", "logo", "url"];

/// Meta tag scraper with DOM fallbacks
#[derive(Debug, Clone, Default)]
pub struct MetaTagScraper;

impl MetaTagScraper {
    pub fn new() -> Self {
        Self
    }

    /// Scrape an already parsed tree
    pub fn scrape_tree(&self, tree: &Html, url: &Url) -> Metadata {
        let rules: [(&str, &[Rule]); 8] = [
            ("author", AUTHOR),
            ("date", DATE),
            ("description", DESCRIPTION),
            ("image", IMAGE),
            ("logo", LOGO),
            ("publisher", PUBLISHER),
            ("title", TITLE),
            ("url", URL),
        ];

        let mut metadata = Metadata::new();
        for (key, rules) in rules {
            let mut value = first_value(tree, rules);
            if RESOLVED_KEYS.contains(&key) {
                value = value.map(|v| resolve(url, &v));
            }
            // a page without a canonical URL is its own
            if key == "url" && value.is_none() {
                value = Some(url.to_string());
            }
            metadata.insert(key.to_string(), value);
        }
        metadata
    }
}

#[async_trait]
impl MetadataScraper for MetaTagScraper {
    async fn scrape(&self, html: &str, url: &Url) -> Result<Metadata, Error> {
        let tree = Html::parse_document(html);
        Ok(self.scrape_tree(&tree, url))
    }
}

fn first_value(tree: &Html, rules: &[Rule]) -> Option<String> {
    rules.iter().find_map(|rule| {
        let selector = Selector::parse(rule.selector).ok()?;
        tree.select(&selector).find_map(|element| {
            let value = match rule.source {
                Source::Attr(name) => element.value().attr(name)?.to_string(),
                Source::Text => element.text().collect::<String>(),
            };
            let value = collapse_whitespace(&value);
            (!value.is_empty()).then_some(value)
        })
    })
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn resolve(base: &Url, value: &str) -> String {
    base.join(value)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| value.to_string())
}

/// Metadata map of the page
pub struct MetadataStrategy {
    scraper: Arc<dyn MetadataScraper>,
}

impl MetadataStrategy {
    pub fn new(scraper: Arc<dyn MetadataScraper>) -> Self {
        Self { scraper }
    }
}

#[async_trait(?Send)]
impl ExtractionStrategy for MetadataStrategy {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn kind(&self) -> ResultKind {
        ResultKind::Metadata
    }

    async fn extract(&self, document: &Document) -> Result<Option<Content>, Error> {
        let html = document.html().await?;
        let metadata = self.scraper.scrape(html, document.url()).await?;
        Ok(Some(Content::Metadata(metadata)))
    }
}
