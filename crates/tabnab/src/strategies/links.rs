//! Hyperlink extraction

use super::{ExtractionStrategy, LinkScope};
use crate::document::Document;
use crate::error::Error;
use crate::filter::compile_pattern;
use crate::types::{Content, Link, ResultKind};
use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

/// Collects every `a[href]`, resolved against the document URL
#[derive(Debug, Clone)]
pub struct LinksStrategy {
    scope: LinkScope,
    pattern: Option<Regex>,
}

impl LinksStrategy {
    /// Create a strategy; an invalid pattern fails here, before extraction starts
    pub fn new(scope: LinkScope, pattern: Option<&str>) -> Result<Self, Error> {
        let pattern = pattern
            .filter(|p| !p.is_empty())
            .map(compile_pattern)
            .transpose()?;
        Ok(Self { scope, pattern })
    }

    fn keep(&self, resolved: &Url, base: &Url) -> bool {
        let internal = resolved.host_str() == base.host_str();
        let in_scope = match self.scope {
            LinkScope::All => true,
            LinkScope::InternalOnly => internal,
            LinkScope::ExternalOnly => !internal,
        };
        in_scope
            && self
                .pattern
                .as_ref()
                .map_or(true, |re| re.is_match(resolved.as_str()))
    }

    /// Links of `tree` in document order, without deduplication
    pub fn collect(&self, tree: &Html, base: &Url) -> Vec<Link> {
        let Ok(anchors) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        tree.select(&anchors)
            .filter_map(|anchor| {
                let href = anchor.value().attr("href")?;
                // unresolvable hrefs are dropped silently
                let resolved = base.join(href).ok()?;
                if !self.keep(&resolved, base) {
                    return None;
                }
                let text = anchor.text().collect::<String>().trim().to_string();
                Some(Link {
                    href: resolved.to_string(),
                    text: if text.is_empty() { href.to_string() } else { text },
                })
            })
            .collect()
    }
}

#[async_trait(?Send)]
impl ExtractionStrategy for LinksStrategy {
    fn name(&self) -> &'static str {
        "links"
    }

    fn kind(&self) -> ResultKind {
        ResultKind::Links
    }

    async fn extract(&self, document: &Document) -> Result<Option<Content>, Error> {
        let tree = document.tree().await?;
        Ok(Some(Content::Links(self.collect(tree, document.url()))))
    }
}
