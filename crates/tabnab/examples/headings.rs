//! Example: Print the first heading of every tab listed in a JSON file
//!
//! Run with: cargo run -p tabnab --example headings -- tabs.json
//!
//! The file holds `[{"title": "...", "url": "https://...", "isActive": false}]`.
//! Pages are fetched over HTTP, so no browser is needed.

use std::sync::Arc;
use tabnab::{
    render, DisplayOptions, ExtractionRequest, HttpFetcher, JsonTabs, OutputFormat, Pipeline,
    Property, TabSelection,
};

#[tokio::main]
async fn main() {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Usage: headings <tabs.json>");
        std::process::exit(2);
    };

    let pipeline = Pipeline::builder()
        .tabs(Arc::new(JsonTabs::new(path)))
        .fetcher(Arc::new(HttpFetcher::new()))
        .build();

    let request = ExtractionRequest::Selector {
        selector: "h1".to_string(),
        property: Property::Text,
    };

    match pipeline.run(&TabSelection::all(), &request).await {
        Ok(results) => {
            let output = render(
                &results,
                request.kind(),
                OutputFormat::Markdown,
                &DisplayOptions::default(),
            );
            println!("{output}");
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
