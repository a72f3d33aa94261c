//! Tabnab - extract and format content from open browser tabs
//!
//! This crate turns the tabs of a running browser into documents, applies
//! one extraction strategy to each of them concurrently, and renders the
//! results as JSON, Markdown or plain text. A failure on one tab is
//! recorded in that tab's result and never aborts the batch.
//!
//! ## Pipeline
//!
//! - [`TabSource`] lists the open tabs ([`ChromeTabs`], [`JsonTabs`])
//! - [`FilterSpec`] narrows them by URL pattern and title
//! - [`HtmlFetcher`] retrieves each document's source on first use
//!   ([`ChromeFetcher`], [`HttpFetcher`])
//! - [`ExtractionStrategy`] produces content from one document: CSS
//!   selector, links, metadata, readability, raw source or an AI prompt
//! - [`Aggregator`] runs the strategy over every document in input order
//! - [`render`] formats the results; a [`Sink`] writes them out
//!
//! [`Pipeline`] wires the default collaborators together.
//!
//! ```no_run
//! use tabnab::{render, DisplayOptions, ExtractionRequest, OutputFormat, Pipeline, TabSelection};
//!
//! # async fn example() -> Result<(), tabnab::Error> {
//! let pipeline = Pipeline::default();
//! let request = ExtractionRequest::Selector {
//!     selector: "h1".to_string(),
//!     property: Default::default(),
//! };
//! let results = pipeline.run(&TabSelection::all(), &request).await?;
//! println!(
//!     "{}",
//!     render(&results, request.kind(), OutputFormat::Text, &DisplayOptions::default())
//! );
//! # Ok(())
//! # }
//! ```

mod aggregator;
mod browser;
pub mod cite;
mod completion;
mod config;
mod document;
mod error;
pub mod fetchers;
mod filter;
mod format;
mod pipeline;
mod prompts;
mod sink;
pub mod strategies;
mod tabs;
#[cfg(test)]
mod testing;
mod types;

pub use aggregator::Aggregator;
pub use cite::{clean_url, CiteFormat};
pub use completion::{render_prompt, AnthropicClient, CompletionClient, CompletionOptions};
pub use config::{
    Config, ConfigBuilder, DEFAULT_API_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_TASK_TIMEOUT, DEFAULT_TEMPERATURE,
};
pub use document::Document;
pub use error::{Error, ErrorKind};
pub use fetchers::{ChromeFetcher, HtmlFetcher, HttpFetcher};
pub use filter::{Filter, FilterSpec};
pub use format::{render, render_documents};
pub use pipeline::{Pipeline, PipelineBuilder, TabSelection};
pub use prompts::{builtin_templates, PromptStore, PromptTemplate, ASK_TEMPLATE, SUMMARIZE_TEMPLATE};
pub use sink::{ClipboardSink, Sink, StdoutSink, DEFAULT_CLIPBOARD_COMMAND};
pub use strategies::{
    ExtractionRequest, ExtractionStrategy, LinkScope, MetaTagScraper, MetadataScraper, Property,
    ReadabilityExtractor, SmoothieReadability,
};
pub use tabs::{parse_tab_listing, ChromeTabs, JsonTabs, TabSource};
pub use types::{
    Article, Content, DisplayOptions, DocumentRef, ExtractionResult, Link, Metadata, Outcome,
    OutputFormat, ResultKind, TabRecord,
};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "tabnab/1.0";
