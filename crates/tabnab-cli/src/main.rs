//! Tabnab CLI - Extract and format content from open Chrome tabs

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tabnab::{
    cite, render, render_documents, ChromeFetcher, ChromeTabs, CiteFormat, ClipboardSink,
    CompletionOptions, ConfigBuilder, DisplayOptions, Error, ExtractionRequest, ExtractionResult,
    FilterSpec, HtmlFetcher, HttpFetcher, JsonTabs, LinkScope, Pipeline, Property,
    Sink, StdoutSink, TabSelection, TabSource, ASK_TEMPLATE, SUMMARIZE_TEMPLATE,
};
use tracing::debug;

/// Output format for rendered results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    #[value(alias = "md")]
    Markdown,
    #[value(alias = "txt")]
    Text,
}

impl From<Format> for tabnab::OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => tabnab::OutputFormat::Json,
            Format::Markdown => tabnab::OutputFormat::Markdown,
            Format::Text => tabnab::OutputFormat::Text,
        }
    }
}

/// How page HTML is retrieved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum Fetch {
    /// Ask Chrome for the live DOM
    #[default]
    Browser,
    /// Download the URL again
    Http,
}

/// Tabnab - get and extract content from Chrome tabs
#[derive(Parser, Debug)]
#[command(name = "tabnab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Read tabs from a JSON file instead of Chrome
    #[arg(long, global = true, value_name = "PATH")]
    tabs_file: Option<PathBuf>,

    /// How page HTML is retrieved
    #[arg(long, global = true, value_enum, default_value_t = Fetch::Browser)]
    fetch: Fetch,

    /// Per-tab extraction deadline in seconds (0 disables it)
    #[arg(long, global = true, value_name = "SECS", default_value_t = 30)]
    timeout: u64,

    /// User-Agent for --fetch http
    #[arg(long, global = true)]
    user_agent: Option<String>,
}

/// Tab selection shared by the extraction commands
#[derive(Args, Debug, Clone, Default)]
struct TabArgs {
    /// Only use the active tab
    #[arg(long, short)]
    active_only: bool,

    /// Filter tabs by URL pattern (regex)
    #[arg(long, value_name = "PATTERN")]
    filter: Option<String>,

    /// Search tabs by title (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,
}

impl TabArgs {
    fn selection(&self) -> TabSelection {
        selection(self.active_only, self.filter.clone(), self.search.clone())
    }
}

#[derive(Args, Debug, Clone, Default)]
struct OutputArgs {
    /// Output format
    #[arg(long, short, value_enum)]
    format: Option<Format>,

    /// Copy output to clipboard
    #[arg(long, short)]
    clipboard: bool,
}

#[derive(Args, Debug, Clone, Default)]
struct ModelArgs {
    /// Claude model to use
    #[arg(long)]
    model: Option<String>,

    /// Temperature (0-1)
    #[arg(long)]
    temperature: Option<f32>,

    /// Maximum tokens in the answer
    #[arg(long)]
    max_tokens: Option<u32>,
}

impl From<ModelArgs> for CompletionOptions {
    fn from(args: ModelArgs) -> Self {
        CompletionOptions {
            model: args.model,
            temperature: args.temperature,
            max_tokens: args.max_tokens,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all open Chrome tabs
    List {
        /// Only output URLs
        #[arg(long, conflicts_with = "title_only")]
        url_only: bool,

        /// Only output titles
        #[arg(long)]
        title_only: bool,

        /// Filter tabs by URL pattern (regex)
        #[arg(long, value_name = "PATTERN")]
        filter: Option<String>,

        /// Search tabs by title (case-insensitive)
        #[arg(long, value_name = "TEXT")]
        search: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show the currently active Chrome tab
    Active {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Extract content from tabs using a CSS selector
    Extract {
        /// CSS selector
        selector: String,

        /// Property to extract (text, html, attr, attr:<name>)
        #[arg(long, short, default_value = "text")]
        property: Property,

        #[command(flatten)]
        tabs: TabArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the HTML source of the active tab
    Source {
        /// Re-serialize the parsed document
        #[arg(long)]
        pretty: bool,

        /// Copy source to clipboard
        #[arg(long, short)]
        clipboard: bool,
    },
    /// Extract all links from tabs
    Links {
        /// Only use the active tab
        #[arg(long, short)]
        active_only: bool,

        /// Only include links on the tab's own host
        #[arg(long, conflicts_with = "external_only")]
        internal_only: bool,

        /// Only include links to other hosts
        #[arg(long)]
        external_only: bool,

        /// Filter links by URL pattern (regex)
        #[arg(long, value_name = "PATTERN")]
        filter: Option<String>,

        /// Search tabs by title (case-insensitive)
        #[arg(long, value_name = "TEXT")]
        search: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Extract Open Graph, Twitter Card and other page metadata
    Metadata {
        #[command(flatten)]
        tabs: TabArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Extract the main article content
    Readability {
        #[command(flatten)]
        tabs: TabArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Generate a citation for the active tab
    Cite {
        /// Citation format (markdown, url, text)
        #[arg(long, short, default_value = "markdown")]
        format: CiteFormat,

        /// Copy output to clipboard
        #[arg(long, short)]
        clipboard: bool,
    },
    /// Summarize the active tab with Claude
    Summarize {
        #[command(flatten)]
        model: ModelArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Ask Claude a question about the active tab
    Ask {
        question: String,

        #[command(flatten)]
        model: ModelArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Apply a prompt template to the active tab
    Prompt {
        /// Template name
        template: String,

        /// Question for templates that take one
        #[arg(long, short)]
        question: Option<String>,

        #[command(flatten)]
        model: ModelArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Manage configuration and prompt templates
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Show the API key in use, masked
    GetApiKey,
    /// Write the default prompt templates
    InitPrompts,
    /// List available prompt templates
    ListPrompts,
    /// Print a prompt template as JSON
    ShowPrompt { name: String },
    /// Delete a stored prompt template
    DeletePrompt { name: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout carries only rendered output
fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("tabnab=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_pipeline(cli: &Cli) -> Pipeline {
    let timeout = (cli.timeout > 0).then(|| Duration::from_secs(cli.timeout));
    let config = ConfigBuilder::from_lookup(|key| std::env::var(key).ok())
        .task_timeout(timeout)
        .build();

    let tabs: Arc<dyn TabSource> = match &cli.tabs_file {
        Some(path) => Arc::new(JsonTabs::new(path)),
        None => Arc::new(ChromeTabs::new()),
    };
    let fetcher: Arc<dyn HtmlFetcher> = match cli.fetch {
        Fetch::Browser => Arc::new(ChromeFetcher::new()),
        Fetch::Http => {
            let mut fetcher = HttpFetcher::new();
            if let Some(ua) = &cli.user_agent {
                fetcher = fetcher.with_user_agent(ua.clone());
            }
            Arc::new(fetcher)
        }
    };

    debug!(fetch = ?cli.fetch, tabs_file = ?cli.tabs_file, "Building pipeline");
    Pipeline::builder()
        .config(config)
        .tabs(tabs)
        .fetcher(fetcher)
        .build()
}

fn selection(active_only: bool, filter: Option<String>, search: Option<String>) -> TabSelection {
    let mut spec = FilterSpec::new();
    if let Some(pattern) = filter {
        spec = spec.url_pattern(pattern);
    }
    if let Some(text) = search {
        spec = spec.title_search(text);
    }
    let base = if active_only {
        TabSelection::active()
    } else {
        TabSelection::all()
    };
    base.with_filter(spec)
}

fn link_scope(internal_only: bool, external_only: bool) -> LinkScope {
    match (internal_only, external_only) {
        (true, _) => LinkScope::InternalOnly,
        (_, true) => LinkScope::ExternalOnly,
        _ => LinkScope::All,
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Error> {
    let pipeline = build_pipeline(&cli);

    match cli.command {
        Commands::List {
            url_only,
            title_only,
            filter,
            search,
            output,
        } => {
            let documents = pipeline.documents(&selection(false, filter, search)).await?;
            let records: Vec<_> = documents.iter().map(|d| d.record()).collect();
            let options = DisplayOptions {
                include_url: !title_only,
                include_title: !url_only,
            };
            let format = output.format.unwrap_or(Format::Text);
            let rendered = render_documents(&records, format.into(), &options);
            let count = records.len();
            emit(&rendered, output.clipboard, &format!("{count} tab(s)")).await?;
        }
        Commands::Active { output } => {
            let documents = pipeline.documents(&TabSelection::active()).await?;
            let records: Vec<_> = documents.iter().map(|d| d.record()).collect();
            let format = output.format.unwrap_or(Format::Text);
            let rendered = render_documents(&records, format.into(), &DisplayOptions::default());
            emit(&rendered, output.clipboard, "active tab").await?;
        }
        Commands::Extract {
            selector,
            property,
            tabs,
            output,
        } => {
            let request = ExtractionRequest::Selector { selector, property };
            let results = pipeline.run(&tabs.selection(), &request).await?;
            emit_results(&results, &request, &output, Format::Text, "results").await?;
        }
        Commands::Source { pretty, clipboard } => {
            let request = ExtractionRequest::RawSource { pretty };
            let results = pipeline.run(&TabSelection::active(), &request).await?;
            let Some(source) = single_text(&results) else {
                return Ok(report_single_failure(&results));
            };
            emit(source, clipboard, "HTML source").await?;
        }
        Commands::Links {
            active_only,
            internal_only,
            external_only,
            filter,
            search,
            output,
        } => {
            let request = ExtractionRequest::Links {
                scope: link_scope(internal_only, external_only),
                pattern: filter,
            };
            let results = pipeline
                .run(&selection(active_only, None, search), &request)
                .await?;
            emit_results(&results, &request, &output, Format::Text, "links").await?;
        }
        Commands::Metadata { tabs, output } => {
            let request = ExtractionRequest::Metadata;
            let results = pipeline.run(&tabs.selection(), &request).await?;
            emit_results(&results, &request, &output, Format::Json, "metadata").await?;
        }
        Commands::Readability { tabs, output } => {
            let request = ExtractionRequest::Readability;
            let results = pipeline.run(&tabs.selection(), &request).await?;
            emit_results(&results, &request, &output, Format::Text, "article(s)").await?;
        }
        Commands::Cite { format, clipboard } => {
            let documents = pipeline.documents(&TabSelection::active()).await?;
            let citation = documents
                .iter()
                .map(|d| cite::render(d.title(), d.url(), format))
                .collect::<Vec<_>>()
                .join("\n");
            emit(&citation, clipboard, "citation").await?;
        }
        Commands::Summarize { model, output } => {
            eprintln!("Summarizing with Claude...");
            let request = ExtractionRequest::AiPrompt {
                template: SUMMARIZE_TEMPLATE.to_string(),
                question: None,
                options: model.into(),
            };
            return ai_command(&pipeline, &request, &output, "summary").await;
        }
        Commands::Ask {
            question,
            model,
            output,
        } => {
            eprintln!("Asking Claude...");
            let request = ExtractionRequest::AiPrompt {
                template: ASK_TEMPLATE.to_string(),
                question: Some(question),
                options: model.into(),
            };
            return ai_command(&pipeline, &request, &output, "answer").await;
        }
        Commands::Prompt {
            template,
            question,
            model,
            output,
        } => {
            eprintln!("Applying prompt template '{template}'...");
            let request = ExtractionRequest::AiPrompt {
                template,
                question,
                options: model.into(),
            };
            return ai_command(&pipeline, &request, &output, "result").await;
        }
        Commands::Config(command) => run_config(&pipeline, command)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// AI commands work on the active tab and fail when it yields nothing
async fn ai_command(
    pipeline: &Pipeline,
    request: &ExtractionRequest,
    output: &OutputArgs,
    what: &str,
) -> Result<ExitCode, Error> {
    let results = pipeline.run(&TabSelection::active(), request).await?;
    if results.iter().any(|r| r.content().is_none()) {
        return Ok(report_single_failure(&results));
    }
    let question = match request {
        ExtractionRequest::AiPrompt { question, .. } => question.as_deref(),
        _ => None,
    };
    let rendered = render_answer(&results, request, output.format.unwrap_or(Format::Markdown), question);
    emit(&rendered, output.clipboard, what).await?;
    Ok(ExitCode::SUCCESS)
}

/// Answer text framed by the question asked and the page it came from
///
/// JSON output is left unframed.
fn render_answer(
    results: &[ExtractionResult],
    request: &ExtractionRequest,
    format: Format,
    question: Option<&str>,
) -> String {
    if format == Format::Json {
        return render(results, request.kind(), format.into(), &DisplayOptions::default());
    }
    let options = DisplayOptions {
        include_url: false,
        ..DisplayOptions::default()
    };
    let body = render(results, request.kind(), format.into(), &options);

    let mut out = String::new();
    if let Some(question) = question {
        out.push_str(&format!("Question: {question}\n\n"));
    }
    out.push_str(body.trim_end());
    for result in results {
        out.push_str(&format!("\n\nSource: {}", result.document.url));
    }
    out
}

fn run_config(pipeline: &Pipeline, command: ConfigCommand) -> Result<(), Error> {
    let store = pipeline.prompts();
    match command {
        ConfigCommand::GetApiKey => match pipeline.config().masked_api_key() {
            Some(key) => writeln_safe(&format!("Current API key: {key}")),
            None => writeln_safe("No API key set"),
        },
        ConfigCommand::InitPrompts => {
            let written = store.init_defaults()?;
            for name in &written {
                writeln_safe(&format!("✓ Created prompt '{name}'"));
            }
            if let Some(dir) = store.dir() {
                writeln_safe(&format!("✓ Initialized default prompts in {}", dir.display()));
            }
        }
        ConfigCommand::ListPrompts => {
            let templates = store.list()?;
            if templates.is_empty() {
                writeln_safe("No prompts found. Run 'tabnab config init-prompts' to create defaults.");
            } else {
                writeln_safe("Available prompt templates:\n");
                for template in templates {
                    writeln_safe(&format!("  {}\n    {}\n", template.name, template.description));
                }
            }
        }
        ConfigCommand::ShowPrompt { name } => {
            let template = store.resolve(&name)?;
            let json = serde_json::to_string_pretty(&template)
                .map_err(|e| Error::PromptStore(e.to_string()))?;
            writeln_safe(&json);
        }
        ConfigCommand::DeletePrompt { name } => {
            if !store.delete(&name)? {
                return Err(Error::TemplateNotFound(name));
            }
            writeln_safe(&format!("✓ Deleted prompt '{name}'"));
        }
    }
    Ok(())
}

async fn emit_results(
    results: &[ExtractionResult],
    request: &ExtractionRequest,
    output: &OutputArgs,
    default_format: Format,
    what: &str,
) -> Result<(), Error> {
    let format = output.format.unwrap_or(default_format);
    let rendered = render(results, request.kind(), format.into(), &DisplayOptions::default());
    emit(&rendered, output.clipboard, what).await
}

/// Write to the clipboard or stdout
async fn emit(output: &str, clipboard: bool, what: &str) -> Result<(), Error> {
    if clipboard {
        ClipboardSink::new().write(output).await?;
        writeln_safe(&copied_message(what));
        Ok(())
    } else {
        StdoutSink.write(output).await
    }
}

fn copied_message(what: &str) -> String {
    format!("✓ Copied {what} to clipboard")
}

/// Text of the only result, if it has any
fn single_text(results: &[ExtractionResult]) -> Option<&str> {
    match results.first().and_then(ExtractionResult::content) {
        Some(tabnab::Content::Text(text)) => Some(text),
        _ => None,
    }
}

fn report_single_failure(results: &[ExtractionResult]) -> ExitCode {
    for result in results {
        match result.error() {
            Some(e) => eprintln!("Error: {e}"),
            None if result.content().is_none() => {
                eprintln!("Error: Could not extract content from {}", result.document.url)
            }
            None => {}
        }
    }
    ExitCode::FAILURE
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
