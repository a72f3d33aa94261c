//! Error types for tabnab

use std::time::Duration;
use thiserror::Error;

/// Broad category of an [`Error`]
///
/// Fetch, parse and upstream errors raised while extracting a single
/// document are captured into that document's result. Config and sink
/// errors end the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Document HTML could not be retrieved
    Fetch,
    /// Tree construction or selector evaluation failed
    Parse,
    /// AI or metadata collaborator failed
    Upstream,
    /// Missing credential, invalid pattern, unknown template
    Config,
    /// Output could not be written
    Sink,
}

/// Errors that can occur while collecting, extracting or writing tab content
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Request timed out
    #[error("Request timed out")]
    RequestTimeout,

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Response body is not text
    #[error("Binary content is not supported: {0}")]
    BinaryContent(String),

    /// Fetcher cannot handle the URL
    #[error("Cannot fetch {0}: unsupported URL scheme")]
    UnsupportedScheme(String),

    /// Browser automation call failed
    #[error("Browser automation failed: {0}")]
    Automation(String),

    /// Per-document deadline expired
    #[error("Extraction timed out after {0:?}")]
    Timeout(Duration),

    /// CSS selector could not be parsed
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    /// Tab listing could not be read
    #[error("Invalid tab listing: {0}")]
    InvalidListing(String),

    /// Article extractor failed outright
    #[error("Readability extraction failed: {0}")]
    Readability(String),

    /// Extraction panicked
    #[error("Extraction aborted: {0}")]
    Panicked(String),

    /// AI completion request failed
    #[error("AI request failed: {0}")]
    Upstream(String),

    /// No API key configured
    #[error("No Anthropic API key found. Set the ANTHROPIC_API_KEY or CLAUDE_API_KEY environment variable")]
    MissingApiKey,

    /// Regular expression could not be compiled
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Prompt template does not exist
    #[error("Prompt template '{0}' not found")]
    TemplateNotFound(String),

    /// Prompt template needs a question that was not given
    #[error("Prompt template '{0}' requires a question")]
    MissingQuestion(String),

    /// Prompt template directory could not be read or written
    #[error("Prompt store error: {0}")]
    PromptStore(String),

    /// Filters left nothing to extract from
    #[error("No matching tabs found")]
    NoDocuments,

    /// Browser reported no active tab
    #[error("No active tab found")]
    NoActiveTab,

    /// Output sink failed
    #[error("Failed to write output: {0}")]
    Sink(String),
}

impl Error {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::RequestTimeout
        } else if err.is_connect() {
            Error::ConnectError(err)
        } else {
            Error::RequestError(err.to_string())
        }
    }

    /// Category used to decide between per-document capture and aborting the run
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ClientBuildError(_)
            | Error::RequestTimeout
            | Error::ConnectError(_)
            | Error::RequestError(_)
            | Error::HttpStatus { .. }
            | Error::BinaryContent(_)
            | Error::UnsupportedScheme(_)
            | Error::Automation(_)
            | Error::Timeout(_)
            | Error::InvalidListing(_)
            | Error::NoActiveTab => ErrorKind::Fetch,
            Error::InvalidSelector { .. } | Error::Readability(_) | Error::Panicked(_) => {
                ErrorKind::Parse
            }
            Error::Upstream(_) => ErrorKind::Upstream,
            Error::MissingApiKey
            | Error::InvalidPattern { .. }
            | Error::TemplateNotFound(_)
            | Error::MissingQuestion(_)
            | Error::PromptStore(_)
            | Error::NoDocuments => ErrorKind::Config,
            Error::Sink(_) => ErrorKind::Sink,
        }
    }

    /// True when the error must end the run instead of being captured per document
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Config | ErrorKind::Sink)
    }
}
