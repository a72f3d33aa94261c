//! AI prompt over the page's main article

use super::readability::{read_article, ReadabilityExtractor};
use super::ExtractionStrategy;
use crate::completion::{CompletionClient, CompletionOptions, API_TIMEOUT};
use crate::document::Document;
use crate::error::Error;
use crate::types::{Article, Content, ResultKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Runs readability, then sends the article text through a prompt
///
/// The result keeps the article's title and byline with the completion as
/// its text.
pub struct PromptStrategy {
    extractor: Arc<dyn ReadabilityExtractor>,
    client: Arc<dyn CompletionClient>,
    prompt: String,
    options: CompletionOptions,
}

impl PromptStrategy {
    pub fn new(
        extractor: Arc<dyn ReadabilityExtractor>,
        client: Arc<dyn CompletionClient>,
        prompt: impl Into<String>,
        options: CompletionOptions,
    ) -> Self {
        Self {
            extractor,
            client,
            prompt: prompt.into(),
            options,
        }
    }
}

#[async_trait(?Send)]
impl ExtractionStrategy for PromptStrategy {
    fn name(&self) -> &'static str {
        "prompt"
    }

    fn kind(&self) -> ResultKind {
        ResultKind::Article
    }

    /// Fetching and parsing keep the base deadline; the completion gets its own
    fn deadline(&self, base: Duration) -> Duration {
        base + API_TIMEOUT
    }

    async fn extract(&self, document: &Document) -> Result<Option<Content>, Error> {
        let Some(article) = read_article(self.extractor.as_ref(), document).await? else {
            return Ok(None);
        };

        debug!(url = %document.url(), chars = article.text.len(), "Sending article to completion");
        let completion = self
            .client
            .complete(&article.text, &self.prompt, &self.options)
            .await?;

        Ok(Some(Content::Article(Article {
            title: article.title,
            author: article.author,
            text: completion.trim().to_string(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::render_prompt;
    use crate::fetchers::HtmlFetcher;
    use crate::strategies::readability::tests::HeadingExtractor;
    use crate::testing::MapFetcher;
    use std::sync::Mutex;
    use url::Url;

    /// Echoes the rendered prompt and records the options it saw
    #[derive(Default)]
    struct EchoClient {
        seen: Mutex<Vec<CompletionOptions>>,
    }

    #[async_trait]
    impl CompletionClient for EchoClient {
        async fn complete(
            &self,
            text: &str,
            prompt_template: &str,
            options: &CompletionOptions,
        ) -> Result<String, Error> {
            self.seen.lock().unwrap().push(options.clone());
            Ok(format!("  {}\n", render_prompt(prompt_template, text)))
        }
    }

    struct FailingClient;

    #[async_trait]
    impl CompletionClient for FailingClient {
        async fn complete(&self, _: &str, _: &str, _: &CompletionOptions) -> Result<String, Error> {
            Err(Error::Upstream("HTTP 529: overloaded".to_string()))
        }
    }

    fn document(html: &str) -> Document {
        let fetcher: Arc<dyn HtmlFetcher> =
            Arc::new(MapFetcher::new().page("https://example.com/post", html));
        Document::new(
            "Post",
            Url::parse("https://example.com/post").unwrap(),
            true,
            fetcher,
        )
    }

    #[tokio::test]
    async fn test_completion_replaces_article_text() {
        let client = Arc::new(EchoClient::default());
        let options = CompletionOptions {
            temperature: Some(0.2),
            ..Default::default()
        };
        let strategy = PromptStrategy::new(
            Arc::new(HeadingExtractor),
            client.clone(),
            "Summarize: {content}",
            options.clone(),
        );

        let content = strategy.extract(&document("<h1>Ownership</h1>")).await.unwrap();
        assert_eq!(
            content,
            Some(Content::Article(Article {
                title: "Ownership".to_string(),
                author: Some("Ferris".to_string()),
                text: "Summarize: Body text".to_string(),
            }))
        );
        assert_eq!(client.seen.lock().unwrap().as_slice(), &[options]);
    }

    #[tokio::test]
    async fn test_no_article_skips_completion() {
        let client = Arc::new(EchoClient::default());
        let strategy = PromptStrategy::new(
            Arc::new(HeadingExtractor),
            client.clone(),
            "{content}",
            CompletionOptions::default(),
        );

        let content = strategy.extract(&document("<p>no heading</p>")).await.unwrap();
        assert_eq!(content, None);
        assert!(client.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_error_propagates() {
        let strategy = PromptStrategy::new(
            Arc::new(HeadingExtractor),
            Arc::new(FailingClient),
            "{content}",
            CompletionOptions::default(),
        );

        let err = strategy
            .extract(&document("<h1>Ownership</h1>"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[test]
    fn test_deadline_covers_completion() {
        let strategy = PromptStrategy::new(
            Arc::new(HeadingExtractor),
            Arc::new(FailingClient),
            "{content}",
            CompletionOptions::default(),
        );
        assert_eq!(
            strategy.deadline(Duration::from_secs(30)),
            Duration::from_secs(150)
        );
    }
}
