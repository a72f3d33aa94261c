//! Fan-out of one strategy over many documents

use crate::document::Document;
use crate::error::Error;
use crate::strategies::ExtractionStrategy;
use crate::types::{ExtractionResult, Outcome};
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Runs a strategy over every document concurrently
///
/// All extractions share the caller's task: they are created up front and
/// joined, so results come back in input order. A failure, timeout or
/// panic only affects its own document's slot.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    task_timeout: Option<Duration>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deadline for each document's extraction
    pub fn with_task_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.task_timeout = timeout;
        self
    }

    pub async fn run(
        &self,
        documents: &[Document],
        strategy: &dyn ExtractionStrategy,
    ) -> Vec<ExtractionResult> {
        let started = Instant::now();
        let tasks = documents
            .iter()
            .map(|document| self.run_one(document, strategy));
        let results = join_all(tasks).await;

        let failed = results.iter().filter(|r| !r.is_success()).count();
        let found = results.iter().filter(|r| r.content().is_some()).count();
        info!(
            strategy = strategy.name(),
            documents = results.len(),
            found,
            failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Extraction complete"
        );
        results
    }

    async fn run_one(
        &self,
        document: &Document,
        strategy: &dyn ExtractionStrategy,
    ) -> ExtractionResult {
        let extraction = AssertUnwindSafe(strategy.extract(document)).catch_unwind();

        let deadline = self.task_timeout.map(|base| strategy.deadline(base));
        let result = match deadline {
            Some(limit) => match tokio::time::timeout(limit, extraction).await {
                Ok(caught) => flatten(caught),
                Err(_) => Err(Error::Timeout(limit)),
            },
            None => flatten(extraction.await),
        };

        let outcome = match result {
            Ok(Some(content)) => Outcome::Found(content),
            Ok(None) => Outcome::NotFound,
            Err(e) => {
                warn!(
                    strategy = strategy.name(),
                    url = %document.url(),
                    error = %e,
                    "Extraction failed"
                );
                Outcome::Failed(e.to_string())
            }
        };

        ExtractionResult {
            document: document.reference(),
            outcome,
        }
    }
}

type Caught<T> = Result<Result<T, Error>, Box<dyn Any + Send>>;

fn flatten<T>(caught: Caught<T>) -> Result<T, Error> {
    caught.unwrap_or_else(|panic| Err(Error::Panicked(panic_message(panic.as_ref()))))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
