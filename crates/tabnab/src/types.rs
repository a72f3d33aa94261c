//! Core types for tabnab

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Raw tab record as reported by the browser
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    /// Tab title
    pub title: String,
    /// Tab URL, unparsed
    pub url: String,
    /// Whether this is the active tab of the front window
    #[serde(default)]
    pub is_active: bool,
}

impl TabRecord {
    /// Create a new record
    pub fn new(title: impl Into<String>, url: impl Into<String>, is_active: bool) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            is_active,
        }
    }
}

/// Title and URL of the document a result belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub title: String,
    pub url: String,
}

/// A resolved hyperlink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Absolute URL
    pub href: String,
    /// Anchor text, or the raw href when the anchor has none
    pub text: String,
}

/// Main article of a page, or an AI answer about it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    pub text: String,
}

/// Metadata map with deterministic key order
pub type Metadata = BTreeMap<String, Option<String>>;

/// Successful extraction payload
///
/// Serialized without a tag: a string, a list of links, an article record
/// or a metadata map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Links(Vec<Link>),
    Article(Article),
    Metadata(Metadata),
}

impl Content {
    /// Shape of this payload
    pub fn kind(&self) -> ResultKind {
        match self {
            Content::Text(_) => ResultKind::Text,
            Content::Links(_) => ResultKind::Links,
            Content::Article(_) => ResultKind::Article,
            Content::Metadata(_) => ResultKind::Metadata,
        }
    }
}

/// Shape of the content a strategy produces, used to render empty and failed results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Text,
    Links,
    Metadata,
    Article,
}

/// Per-document outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Found(Content),
    /// Selector or extractor matched nothing
    NotFound,
    Failed(String),
}

/// Result of applying one strategy to one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ResultRecord", from = "ResultRecord")]
pub struct ExtractionResult {
    pub document: DocumentRef,
    pub outcome: Outcome,
}

impl ExtractionResult {
    pub fn found(document: DocumentRef, content: Content) -> Self {
        Self {
            document,
            outcome: Outcome::Found(content),
        }
    }

    pub fn not_found(document: DocumentRef) -> Self {
        Self {
            document,
            outcome: Outcome::NotFound,
        }
    }

    pub fn failed(document: DocumentRef, error: impl Into<String>) -> Self {
        Self {
            document,
            outcome: Outcome::Failed(error.into()),
        }
    }

    /// Extracted content, if any
    pub fn content(&self) -> Option<&Content> {
        match &self.outcome {
            Outcome::Found(content) => Some(content),
            _ => None,
        }
    }

    /// Error message, if extraction failed
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// True unless extraction failed
    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, Outcome::Failed(_))
    }
}

/// Wire shape of [`ExtractionResult`]
#[derive(Serialize, Deserialize)]
struct ResultRecord {
    title: String,
    url: String,
    #[serde(default)]
    content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<ExtractionResult> for ResultRecord {
    fn from(result: ExtractionResult) -> Self {
        let DocumentRef { title, url } = result.document;
        let (content, error) = match result.outcome {
            Outcome::Found(content) => (Some(content), None),
            Outcome::NotFound => (None, None),
            Outcome::Failed(error) => (None, Some(error)),
        };
        Self {
            title,
            url,
            content,
            error,
        }
    }
}

impl From<ResultRecord> for ExtractionResult {
    fn from(record: ResultRecord) -> Self {
        let outcome = match (record.error, record.content) {
            (Some(error), _) => Outcome::Failed(error),
            (None, Some(content)) => Outcome::Found(content),
            (None, None) => Outcome::NotFound,
        };
        Self {
            document: DocumentRef {
                title: record.title,
                url: record.url,
            },
            outcome,
        }
    }
}

/// Output format for rendered results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Markdown,
    #[default]
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "text" | "txt" => Ok(OutputFormat::Text),
            _ => Err("Invalid format: must be json, markdown or text".to_string()),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

/// Which document fields appear in rendered output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub include_url: bool,
    pub include_title: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            include_url: true,
            include_title: true,
        }
    }
}
