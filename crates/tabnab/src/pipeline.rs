//! End-to-end extraction pipeline
//!
//! A [`Pipeline`] owns the collaborators (tab source, fetcher, metadata
//! scraper, readability extractor, completion client, prompt store) and the
//! read-only [`Config`]. It turns a tab selection into documents, checks a
//! request's preconditions, and fans the chosen strategy out over the
//! documents.

use crate::aggregator::Aggregator;
use crate::completion::{AnthropicClient, CompletionClient, CompletionOptions};
use crate::config::Config;
use crate::document::Document;
use crate::error::Error;
use crate::fetchers::{ChromeFetcher, HtmlFetcher};
use crate::filter::FilterSpec;
use crate::prompts::PromptStore;
use crate::strategies::{
    ExtractionRequest, ExtractionStrategy, LinksStrategy, MetaTagScraper, MetadataScraper,
    MetadataStrategy, PromptStrategy, ReadabilityExtractor, ReadabilityStrategy,
    SelectorStrategy, SmoothieReadability, SourceStrategy,
};
use crate::tabs::{ChromeTabs, TabSource};
use crate::types::ExtractionResult;
use std::sync::Arc;
use tracing::{debug, warn};

/// Which tabs to work on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabSelection {
    /// Only the active tab of the front window
    pub active_only: bool,
    pub filter: FilterSpec,
}

impl TabSelection {
    /// Every open tab
    pub fn all() -> Self {
        Self::default()
    }

    /// The active tab only
    pub fn active() -> Self {
        Self {
            active_only: true,
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = filter;
        self
    }
}

/// Builder for [`Pipeline`]; unset collaborators get the Chrome-backed defaults
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<Config>,
    tabs: Option<Arc<dyn TabSource>>,
    fetcher: Option<Arc<dyn HtmlFetcher>>,
    metadata: Option<Arc<dyn MetadataScraper>>,
    readability: Option<Arc<dyn ReadabilityExtractor>>,
    completion: Option<Arc<dyn CompletionClient>>,
    prompts: Option<PromptStore>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set where the tab list comes from
    pub fn tabs(mut self, tabs: Arc<dyn TabSource>) -> Self {
        self.tabs = Some(tabs);
        self
    }

    /// Set how document HTML is fetched
    pub fn fetcher(mut self, fetcher: Arc<dyn HtmlFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn metadata_scraper(mut self, scraper: Arc<dyn MetadataScraper>) -> Self {
        self.metadata = Some(scraper);
        self
    }

    pub fn readability(mut self, extractor: Arc<dyn ReadabilityExtractor>) -> Self {
        self.readability = Some(extractor);
        self
    }

    pub fn completion(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.completion = Some(client);
        self
    }

    pub fn prompts(mut self, store: PromptStore) -> Self {
        self.prompts = Some(store);
        self
    }

    pub fn build(self) -> Pipeline {
        let config = self.config.unwrap_or_default();
        let prompts = self.prompts.unwrap_or_else(|| match config.prompts_dir() {
            Some(dir) => PromptStore::new(dir),
            None => PromptStore::without_dir(),
        });
        let completion = self
            .completion
            .unwrap_or_else(|| Arc::new(AnthropicClient::new(config.clone())));
        let aggregator = Aggregator::new().with_task_timeout(config.task_timeout());

        Pipeline {
            tabs: self.tabs.unwrap_or_else(|| Arc::new(ChromeTabs::new())),
            fetcher: self.fetcher.unwrap_or_else(|| Arc::new(ChromeFetcher::new())),
            metadata: self
                .metadata
                .unwrap_or_else(|| Arc::new(MetaTagScraper::new())),
            readability: self
                .readability
                .unwrap_or_else(|| Arc::new(SmoothieReadability::new())),
            completion,
            prompts,
            aggregator,
            config,
        }
    }
}

/// Configured extraction pipeline
pub struct Pipeline {
    config: Config,
    tabs: Arc<dyn TabSource>,
    fetcher: Arc<dyn HtmlFetcher>,
    metadata: Arc<dyn MetadataScraper>,
    readability: Arc<dyn ReadabilityExtractor>,
    completion: Arc<dyn CompletionClient>,
    prompts: PromptStore,
    aggregator: Aggregator,
}

impl Default for Pipeline {
    fn default() -> Self {
        PipelineBuilder::new().build()
    }
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn prompts(&self) -> &PromptStore {
        &self.prompts
    }

    /// Documents for the selected tabs, in browser order
    ///
    /// The filter is validated before the browser is asked for anything.
    /// Tabs whose URL does not parse are skipped.
    pub async fn documents(&self, selection: &TabSelection) -> Result<Vec<Document>, Error> {
        let filter = selection.filter.compile()?;
        let records = self.tabs.enumerate().await?;
        debug!(source = self.tabs.name(), tabs = records.len(), "Enumerated tabs");

        let mut documents: Vec<Document> = records
            .into_iter()
            .filter_map(
                |record| match Document::from_record(record, self.fetcher.clone()) {
                    Ok(document) => Some(document),
                    Err(e) => {
                        warn!(error = %e, "Skipping tab");
                        None
                    }
                },
            )
            .collect();

        if selection.active_only {
            let active = documents
                .into_iter()
                .find(Document::is_active)
                .ok_or(Error::NoActiveTab)?;
            documents = vec![active];
        }

        Ok(filter.apply(documents))
    }

    /// Strategy for `request`, after checking everything that must hold before extraction
    pub fn strategy(
        &self,
        request: &ExtractionRequest,
    ) -> Result<Box<dyn ExtractionStrategy>, Error> {
        let strategy: Box<dyn ExtractionStrategy> = match request {
            ExtractionRequest::Selector { selector, property } => {
                Box::new(SelectorStrategy::new(selector.clone(), property.clone()))
            }
            ExtractionRequest::Links { scope, pattern } => {
                Box::new(LinksStrategy::new(*scope, pattern.as_deref())?)
            }
            ExtractionRequest::Metadata => Box::new(MetadataStrategy::new(self.metadata.clone())),
            ExtractionRequest::Readability => {
                Box::new(ReadabilityStrategy::new(self.readability.clone()))
            }
            ExtractionRequest::RawSource { pretty } => Box::new(SourceStrategy::new(*pretty)),
            ExtractionRequest::AiPrompt {
                template,
                question,
                options,
            } => {
                if !self.config.has_credential() {
                    return Err(Error::MissingApiKey);
                }
                let template = self.prompts.resolve(template)?;
                let prompt = template.with_question(question.as_deref())?;
                let defaults = CompletionOptions {
                    model: template.model.clone(),
                    temperature: template.temperature,
                    max_tokens: template.max_tokens,
                };
                Box::new(PromptStrategy::new(
                    self.readability.clone(),
                    self.completion.clone(),
                    prompt,
                    options.clone().or(&defaults),
                ))
            }
        };
        Ok(strategy)
    }

    /// Apply `request` to every document
    ///
    /// Returns one result per document, in input order. Only precondition
    /// failures are returned as `Err`.
    pub async fn extract(
        &self,
        documents: &[Document],
        request: &ExtractionRequest,
    ) -> Result<Vec<ExtractionResult>, Error> {
        let strategy = self.strategy(request)?;
        self.run_strategy(documents, strategy.as_ref()).await
    }

    /// Select tabs and extract from them
    pub async fn run(
        &self,
        selection: &TabSelection,
        request: &ExtractionRequest,
    ) -> Result<Vec<ExtractionResult>, Error> {
        // fail on bad requests before touching the browser
        let strategy = self.strategy(request)?;
        let documents = self.documents(selection).await?;
        self.run_strategy(&documents, strategy.as_ref()).await
    }

    async fn run_strategy(
        &self,
        documents: &[Document],
        strategy: &dyn ExtractionStrategy,
    ) -> Result<Vec<ExtractionResult>, Error> {
        if documents.is_empty() {
            return Err(Error::NoDocuments);
        }
        debug!(strategy = strategy.name(), documents = documents.len(), "Starting extraction");
        Ok(self.aggregator.run(documents, strategy).await)
    }
}
