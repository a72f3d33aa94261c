//! Rendering of extraction results and tab listings
//!
//! Rendering is pure: the same input always produces the same string.
//! Markdown and text layouts depend on the shape of each result's content.
//! Results without content take the shape of the strategy that produced
//! them.

use crate::types::{
    Article, Content, DisplayOptions, ExtractionResult, Link, Metadata, Outcome, OutputFormat,
    ResultKind, TabRecord,
};
use std::fmt::Write;

/// Render a batch of results produced by a strategy of shape `kind`
pub fn render(
    results: &[ExtractionResult],
    kind: ResultKind,
    format: OutputFormat,
    options: &DisplayOptions,
) -> String {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(results).unwrap_or_default();
    }

    let markdown = format == OutputFormat::Markdown;
    results
        .iter()
        .map(|result| {
            let shape = result.content().map_or(kind, Content::kind);
            let block = Block {
                result,
                options,
                out: String::new(),
            };
            match (shape, markdown) {
                (ResultKind::Text, true) => block.text_markdown(),
                (ResultKind::Text, false) => block.text_plain(),
                (ResultKind::Links, true) => block.links_markdown(),
                (ResultKind::Links, false) => block.links_plain(),
                (ResultKind::Metadata, true) => block.metadata_markdown(),
                (ResultKind::Metadata, false) => block.metadata_plain(),
                (ResultKind::Article, true) => block.article_markdown(),
                (ResultKind::Article, false) => block.article_plain(),
            }
        })
        .collect::<Vec<_>>()
        .join(separator(kind, markdown))
}

fn separator(kind: ResultKind, markdown: bool) -> &'static str {
    match (kind, markdown) {
        (ResultKind::Links, _) => "\n",
        (ResultKind::Article, true) => "\n\n---\n\n",
        (ResultKind::Text | ResultKind::Metadata, true) => "---\n\n",
        (_, false) => "\n---\n\n",
    }
}

/// One result being rendered
struct Block<'a> {
    result: &'a ExtractionResult,
    options: &'a DisplayOptions,
    out: String,
}

// `write!` into a String cannot fail
impl<'a> Block<'a> {
    fn title(&self) -> &'a str {
        &self.result.document.title
    }

    fn url(&self) -> &'a str {
        &self.result.document.url
    }

    fn heading(&mut self, prefix: &str) {
        if self.options.include_title {
            let _ = write!(self.out, "{prefix}{}\n\n", self.result.document.title);
        }
    }

    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn underlined(&mut self, title: &str) {
        if self.options.include_title {
            let _ = writeln!(self.out, "{title}\n{}", "=".repeat(title.chars().count()));
        }
    }

    fn text_markdown(mut self) -> String {
        self.heading("## ");
        if self.options.include_url {
            let url = self.url();
            let _ = write!(self.out, "**URL:** {url}\n\n");
        }
        let result = self.result;
        match &result.outcome {
            Outcome::Failed(e) => {
                let _ = write!(self.out, "**Error:** {e}\n\n");
            }
            Outcome::Found(Content::Text(c)) if !c.is_empty() => {
                let _ = write!(self.out, "**Content:**\n```\n{c}\n```\n\n");
            }
            _ => self.out.push_str("**Content:** (not found)\n\n"),
        }
        self.out
    }

    fn text_plain(mut self) -> String {
        if self.options.include_title {
            let title = self.title();
            self.line(title);
        }
        if self.options.include_url {
            let url = self.url();
            self.line(url);
        }
        let result = self.result;
        match &result.outcome {
            Outcome::Failed(e) => {
                let _ = writeln!(self.out, "Error: {e}");
            }
            Outcome::Found(Content::Text(c)) if !c.is_empty() => {
                let _ = writeln!(self.out, "{c}");
            }
            _ => self.out.push_str("(content not found)\n"),
        }
        self.out
    }

    fn links_markdown(mut self) -> String {
        self.heading("## ");
        let result = self.result;
        match &result.outcome {
            Outcome::Failed(e) => {
                let _ = writeln!(self.out, "**Error:** {e}");
            }
            Outcome::Found(Content::Links(links)) => {
                for Link { href, text } in links {
                    let _ = writeln!(self.out, "- [{text}]({href})");
                }
            }
            _ => {}
        }
        self.out
    }

    fn links_plain(mut self) -> String {
        let title = self.title();
        self.underlined(title);
        let result = self.result;
        match &result.outcome {
            Outcome::Failed(e) => {
                let _ = write!(self.out, "Error: {e}\n\n");
            }
            Outcome::Found(Content::Links(links)) => {
                for Link { href, text } in links {
                    let _ = write!(self.out, "{text}\n{href}\n\n");
                }
            }
            _ => {}
        }
        self.out
    }

    fn metadata_markdown(mut self) -> String {
        self.heading("## ");
        if self.options.include_url {
            let url = self.url();
            let _ = write!(self.out, "**URL:** {url}\n\n");
        }
        let result = self.result;
        match &result.outcome {
            Outcome::Failed(e) => {
                let _ = write!(self.out, "**Error:** {e}\n\n");
            }
            Outcome::Found(Content::Metadata(metadata)) => {
                for (key, value) in present(metadata) {
                    let _ = writeln!(self.out, "- **{key}:** {value}");
                }
                self.out.push('\n');
            }
            _ => {}
        }
        self.out
    }

    fn metadata_plain(mut self) -> String {
        if self.options.include_title {
            let title = self.title();
            self.line(title);
        }
        if self.options.include_url {
            let url = self.url();
            self.line(url);
        }
        let result = self.result;
        match &result.outcome {
            Outcome::Failed(e) => {
                let _ = writeln!(self.out, "Error: {e}");
            }
            Outcome::Found(Content::Metadata(metadata)) => {
                for (key, value) in present(metadata) {
                    let _ = writeln!(self.out, "{key}: {value}");
                }
            }
            _ => {}
        }
        self.out
    }

    fn article_markdown(mut self) -> String {
        let result = self.result;
        match &result.outcome {
            Outcome::Found(Content::Article(Article {
                title,
                author,
                text,
            })) => {
                if self.options.include_title {
                    let _ = write!(self.out, "# {title}\n\n");
                }
                let _ = writeln!(
                    self.out,
                    "**Author:** {}",
                    author.as_deref().unwrap_or("Unknown")
                );
                if self.options.include_url {
                    let url = self.url();
                    let _ = writeln!(self.out, "**URL:** {url}");
                }
                self.out.push('\n');
                self.out.push_str(text);
            }
            Outcome::Failed(e) => {
                self.heading("## ");
                let _ = write!(self.out, "**Error:** {e}\n\n");
            }
            _ => {
                self.heading("## ");
                self.out.push_str("*Could not extract article content*\n\n");
            }
        }
        self.out
    }

    fn article_plain(mut self) -> String {
        let result = self.result;
        match &result.outcome {
            Outcome::Found(Content::Article(Article {
                title,
                author,
                text,
            })) => {
                self.underlined(title);
                if let Some(author) = author {
                    let _ = writeln!(self.out, "By {author}");
                }
                let _ = write!(self.out, "\n{text}\n");
            }
            Outcome::Failed(e) => {
                if self.options.include_title {
                    let title = self.title();
                    self.line(title);
                }
                let _ = write!(self.out, "\nError: {e}\n\n");
            }
            _ => {
                if self.options.include_title {
                    let title = self.title();
                    self.line(title);
                }
                self.out.push_str("\nCould not extract article content\n\n");
            }
        }
        self.out
    }
}

fn present(metadata: &Metadata) -> impl Iterator<Item = (&String, &String)> {
    metadata
        .iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key, v)))
}

/// Render a tab listing without extracting anything
pub fn render_documents(tabs: &[TabRecord], format: OutputFormat, options: &DisplayOptions) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(tabs).unwrap_or_default(),
        OutputFormat::Markdown => tabs
            .iter()
            .map(|tab| {
                let active = if tab.is_active { " (active)" } else { "" };
                match (options.include_title, options.include_url) {
                    (true, true) => format!("- [{}]({}){active}", tab.title, tab.url),
                    (true, false) => format!("- {}{active}", tab.title),
                    _ => format!("- {}{active}", tab.url),
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Text => tabs
            .iter()
            .map(|tab| {
                let mut parts = Vec::with_capacity(2);
                if options.include_title {
                    parts.push(tab.title.as_str());
                }
                if options.include_url {
                    parts.push(tab.url.as_str());
                }
                parts.join(" - ")
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentRef;

    fn doc(title: &str, url: &str) -> DocumentRef {
        DocumentRef {
            title: title.to_string(),
            url: url.to_string(),
        }
    }

    fn text(value: &str) -> Content {
        Content::Text(value.to_string())
    }

    fn h1_results() -> Vec<ExtractionResult> {
        vec![
            ExtractionResult::found(doc("A", "https://a.test/"), text("Alpha")),
            ExtractionResult::not_found(doc("B", "https://b.test/")),
            ExtractionResult::found(doc("C", "https://c.test/"), text("Gamma")),
        ]
    }

    fn opts() -> DisplayOptions {
        DisplayOptions::default()
    }

    #[test]
    fn test_text_scenario() {
        let output = render(&h1_results(), ResultKind::Text, OutputFormat::Text, &opts());
        assert_eq!(
            output,
            "A\nhttps://a.test/\nAlpha\n\
             \n---\n\n\
             B\nhttps://b.test/\n(content not found)\n\
             \n---\n\n\
             C\nhttps://c.test/\nGamma\n"
        );
        assert_eq!(output.matches("(content not found)").count(), 1);
    }

    #[test]
    fn test_text_markdown() {
        let results = vec![
            ExtractionResult::found(doc("A", "https://a.test/"), text("Alpha")),
            ExtractionResult::failed(doc("B", "https://b.test/"), "HTTP 500 for https://b.test/"),
            ExtractionResult::not_found(doc("C", "https://c.test/")),
        ];
        let output = render(&results, ResultKind::Text, OutputFormat::Markdown, &opts());
        assert_eq!(
            output,
            "## A\n\n**URL:** https://a.test/\n\n**Content:**\n```\nAlpha\n```\n\n\
             ---\n\n\
             ## B\n\n**URL:** https://b.test/\n\n**Error:** HTTP 500 for https://b.test/\n\n\
             ---\n\n\
             ## C\n\n**URL:** https://c.test/\n\n**Content:** (not found)\n\n"
        );
    }

    #[test]
    fn test_empty_text_renders_as_not_found() {
        let results = vec![ExtractionResult::found(doc("A", "https://a.test/"), text(""))];
        let output = render(&results, ResultKind::Text, OutputFormat::Text, &opts());
        assert_eq!(output, "A\nhttps://a.test/\n(content not found)\n");
    }

    #[test]
    fn test_display_options_drop_lines() {
        let only_content = DisplayOptions {
            include_url: false,
            include_title: false,
        };
        let output = render(&h1_results()[..1], ResultKind::Text, OutputFormat::Text, &only_content);
        assert_eq!(output, "Alpha\n");

        let no_url = DisplayOptions {
            include_url: false,
            include_title: true,
        };
        let output = render(&h1_results()[..1], ResultKind::Text, OutputFormat::Markdown, &no_url);
        assert_eq!(output, "## A\n\n**Content:**\n```\nAlpha\n```\n\n");
    }

    #[test]
    fn test_links() {
        let links = Content::Links(vec![
            Link {
                href: "https://example.com/about".to_string(),
                text: "About".to_string(),
            },
            Link {
                href: "https://other.com/x".to_string(),
                text: "Other".to_string(),
            },
        ]);
        let results = vec![
            ExtractionResult::found(doc("Home", "https://example.com/"), links),
            ExtractionResult::found(doc("Empty", "https://e.test/"), Content::Links(vec![])),
        ];

        assert_eq!(
            render(&results, ResultKind::Links, OutputFormat::Markdown, &opts()),
            "## Home\n\n- [About](https://example.com/about)\n- [Other](https://other.com/x)\n\
             \n## Empty\n\n"
        );
        assert_eq!(
            render(&results, ResultKind::Links, OutputFormat::Text, &opts()),
            "Home\n====\nAbout\nhttps://example.com/about\n\nOther\nhttps://other.com/x\n\n\
             \nEmpty\n=====\n"
        );
    }

    #[test]
    fn test_metadata_skips_missing_values() {
        let mut metadata = Metadata::new();
        metadata.insert("author".to_string(), None);
        metadata.insert("title".to_string(), Some("Ownership".to_string()));
        metadata.insert("description".to_string(), Some("Rules".to_string()));
        let results = vec![ExtractionResult::found(
            doc("Post", "https://blog.test/"),
            Content::Metadata(metadata),
        )];

        assert_eq!(
            render(&results, ResultKind::Metadata, OutputFormat::Markdown, &opts()),
            "## Post\n\n**URL:** https://blog.test/\n\n- **description:** Rules\n- **title:** Ownership\n\n"
        );
        assert_eq!(
            render(&results, ResultKind::Metadata, OutputFormat::Text, &opts()),
            "Post\nhttps://blog.test/\ndescription: Rules\ntitle: Ownership\n"
        );
    }

    #[test]
    fn test_article() {
        let article = Content::Article(Article {
            title: "Ownership".to_string(),
            author: None,
            text: "Every value has an owner.".to_string(),
        });
        let results = vec![
            ExtractionResult::found(doc("Rust Blog", "https://blog.test/"), article),
            ExtractionResult::not_found(doc("Index", "https://index.test/")),
        ];

        assert_eq!(
            render(&results, ResultKind::Article, OutputFormat::Markdown, &opts()),
            "# Ownership\n\n**Author:** Unknown\n**URL:** https://blog.test/\n\nEvery value has an owner.\
             \n\n---\n\n\
             ## Index\n\n*Could not extract article content*\n\n"
        );
        assert_eq!(
            render(&results, ResultKind::Article, OutputFormat::Text, &opts()),
            "Ownership\n=========\n\nEvery value has an owner.\n\
             \n---\n\n\
             Index\n\nCould not extract article content\n\n"
        );
    }

    #[test]
    fn test_article_byline() {
        let results = vec![ExtractionResult::found(
            doc("Rust Blog", "https://blog.test/"),
            Content::Article(Article {
                title: "Ownership".to_string(),
                author: Some("Ferris".to_string()),
                text: "Body".to_string(),
            }),
        )];
        let output = render(&results, ResultKind::Article, OutputFormat::Text, &opts());
        assert_eq!(output, "Ownership\n=========\nBy Ferris\n\nBody\n");
    }

    #[test]
    fn test_json_round_trip() {
        let results = h1_results();
        let json = render(&results, ResultKind::Text, OutputFormat::Json, &opts());
        let parsed: Vec<ExtractionResult> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, results);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[1]["content"], serde_json::Value::Null);
        assert!(value[1].get("error").is_none());
    }

    #[test]
    fn test_render_is_deterministic() {
        for format in [OutputFormat::Json, OutputFormat::Markdown, OutputFormat::Text] {
            let first = render(&h1_results(), ResultKind::Text, format, &opts());
            let second = render(&h1_results(), ResultKind::Text, format, &opts());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_render_documents() {
        let tabs = vec![
            TabRecord::new("Docs", "https://docs.rs/", false),
            TabRecord::new("Crates", "https://crates.io/", true),
        ];

        assert_eq!(
            render_documents(&tabs, OutputFormat::Markdown, &opts()),
            "- [Docs](https://docs.rs/)\n- [Crates](https://crates.io/) (active)"
        );
        assert_eq!(
            render_documents(&tabs, OutputFormat::Text, &opts()),
            "Docs - https://docs.rs/\nCrates - https://crates.io/"
        );

        let url_only = DisplayOptions {
            include_url: true,
            include_title: false,
        };
        assert_eq!(
            render_documents(&tabs, OutputFormat::Markdown, &url_only),
            "- https://docs.rs/\n- https://crates.io/ (active)"
        );
        assert_eq!(
            render_documents(&tabs, OutputFormat::Text, &url_only),
            "https://docs.rs/\nhttps://crates.io/"
        );

        let json: serde_json::Value =
            serde_json::from_str(&render_documents(&tabs, OutputFormat::Json, &opts())).unwrap();
        assert_eq!(json[1]["isActive"], true);
        assert_eq!(json[0]["url"], "https://docs.rs/");
    }
}
