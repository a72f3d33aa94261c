//! Extraction strategies
//!
//! Design: each strategy turns one document into one piece of content.
//! `Ok(None)` means the strategy found nothing, which is a successful
//! outcome; `Err` is captured into the document's result by the
//! aggregator. Strategies run on the caller's task, so they need not be
//! `Send`.

mod links;
mod metadata;
mod prompt;
pub(crate) mod readability;
mod selector;
mod source;

pub use links::LinksStrategy;
pub use metadata::{MetaTagScraper, MetadataScraper, MetadataStrategy};
pub use prompt::PromptStrategy;
pub use readability::{ReadabilityExtractor, ReadabilityStrategy, SmoothieReadability};
pub use selector::SelectorStrategy;
pub use source::SourceStrategy;

use crate::completion::CompletionOptions;
use crate::document::Document;
use crate::error::Error;
use crate::types::{Content, ResultKind};
use async_trait::async_trait;
use std::str::FromStr;
use std::time::Duration;

/// Algorithm producing content from a single document
#[async_trait(?Send)]
pub trait ExtractionStrategy {
    /// Unique identifier for this strategy (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Shape of the content this strategy produces
    fn kind(&self) -> ResultKind;

    /// Deadline for one document, given the configured per-document one
    ///
    /// Strategies that wait on slow services beyond fetching and parsing
    /// extend it.
    fn deadline(&self, base: Duration) -> Duration {
        base
    }

    /// Extract content; `Ok(None)` when nothing was found
    async fn extract(&self, document: &Document) -> Result<Option<Content>, Error>;
}

/// What to read from the first element a selector matches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Property {
    /// Trimmed text content
    #[default]
    Text,
    /// Inner HTML
    Html,
    /// All attributes as a JSON object
    Attributes,
    /// One attribute's value
    Attribute(String),
}

impl FromStr for Property {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "text" => Ok(Property::Text),
            "html" => Ok(Property::Html),
            "attr" => Ok(Property::Attributes),
            _ => match s.strip_prefix("attr:") {
                Some(name) if !name.is_empty() => Ok(Property::Attribute(name.to_string())),
                _ => Err(format!(
                    "Invalid property '{s}': must be text, html, attr or attr:<name>"
                )),
            },
        }
    }
}

/// Which links to keep, relative to the document's host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkScope {
    #[default]
    All,
    InternalOnly,
    ExternalOnly,
}

/// Strategy selection with its parameters
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionRequest {
    Selector {
        selector: String,
        property: Property,
    },
    Links {
        scope: LinkScope,
        /// Case-insensitive pattern over the resolved link URL
        pattern: Option<String>,
    },
    Metadata,
    Readability,
    RawSource {
        pretty: bool,
    },
    AiPrompt {
        template: String,
        question: Option<String>,
        options: CompletionOptions,
    },
}

impl ExtractionRequest {
    /// Shape of the content the request produces
    pub fn kind(&self) -> ResultKind {
        match self {
            ExtractionRequest::Selector { .. } | ExtractionRequest::RawSource { .. } => {
                ResultKind::Text
            }
            ExtractionRequest::Links { .. } => ResultKind::Links,
            ExtractionRequest::Metadata => ResultKind::Metadata,
            ExtractionRequest::Readability | ExtractionRequest::AiPrompt { .. } => {
                ResultKind::Article
            }
        }
    }
}
