//! Raw page source

use super::ExtractionStrategy;
use crate::document::Document;
use crate::error::Error;
use crate::types::{Content, ResultKind};
use async_trait::async_trait;

/// HTML source as fetched, or re-serialised from the parsed tree
#[derive(Debug, Clone, Default)]
pub struct SourceStrategy {
    pretty: bool,
}

impl SourceStrategy {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

#[async_trait(?Send)]
impl ExtractionStrategy for SourceStrategy {
    fn name(&self) -> &'static str {
        "source"
    }

    fn kind(&self) -> ResultKind {
        ResultKind::Text
    }

    async fn extract(&self, document: &Document) -> Result<Option<Content>, Error> {
        let source = if self.pretty {
            document.tree().await?.html()
        } else {
            document.html().await?.to_string()
        };
        Ok(Some(Content::Text(source)))
    }
}
