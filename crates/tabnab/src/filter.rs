//! Tab filtering by URL pattern and title search

use crate::document::Document;
use crate::error::Error;
use regex::{Regex, RegexBuilder};
use url::Url;

/// Filter criteria; absent criteria match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Case-insensitive regular expression tested against the full URL
    pub url_pattern: Option<String>,
    /// Case-insensitive substring tested against the title
    pub title_search: Option<String>,
}

impl FilterSpec {
    /// Match everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the URL pattern
    pub fn url_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.url_pattern = Some(pattern.into());
        self
    }

    /// Set the title search
    pub fn title_search(mut self, search: impl Into<String>) -> Self {
        self.title_search = Some(search.into());
        self
    }

    /// Validate the criteria
    ///
    /// An invalid pattern is reported here, before any document is touched.
    pub fn compile(&self) -> Result<Filter, Error> {
        let url_pattern = self
            .url_pattern
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(compile_pattern)
            .transpose()?;
        let title_search = self
            .title_search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        Ok(Filter {
            url_pattern,
            title_search,
        })
    }
}

/// Compiled [`FilterSpec`]
#[derive(Debug, Clone)]
pub struct Filter {
    url_pattern: Option<Regex>,
    title_search: Option<String>,
}

impl Filter {
    /// Both predicates must hold
    pub fn matches(&self, title: &str, url: &Url) -> bool {
        let url_ok = self
            .url_pattern
            .as_ref()
            .map_or(true, |re| re.is_match(url.as_str()));
        let title_ok = self
            .title_search
            .as_ref()
            .map_or(true, |needle| title.to_lowercase().contains(needle.as_str()));
        url_ok && title_ok
    }

    /// Keep matching documents in their original order
    pub fn apply(&self, documents: Vec<Document>) -> Vec<Document> {
        documents
            .into_iter()
            .filter(|doc| self.matches(doc.title(), doc.url()))
            .collect()
    }
}

/// Compile a case-insensitive pattern
pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}
