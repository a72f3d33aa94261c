//! Citations for a tab

use std::str::FromStr;
use url::Url;

/// Query parameters that only track where a visitor came from
const TRACKING_PARAMS: &[&str] = &["ref", "source", "fbclid", "gclid"];

/// Citation layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CiteFormat {
    /// `[title](url)`
    #[default]
    Markdown,
    /// Bare URL
    Url,
    /// Title and URL on separate lines
    Text,
}

impl FromStr for CiteFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(CiteFormat::Markdown),
            "url" => Ok(CiteFormat::Url),
            "text" | "txt" => Ok(CiteFormat::Text),
            _ => Err("Invalid citation format: must be markdown, url or text".to_string()),
        }
    }
}

fn is_tracking(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.starts_with("utm_") || TRACKING_PARAMS.contains(&name)
}

/// URL without tracking parameters or fragment
pub fn clean_url(url: &Url) -> Url {
    let mut clean = url.clone();
    clean.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| !is_tracking(name))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        clean.set_query(None);
    } else {
        clean.query_pairs_mut().clear().extend_pairs(kept);
    }
    clean
}

/// Citation for a page, using its cleaned URL
pub fn render(title: &str, url: &Url, format: CiteFormat) -> String {
    let url = clean_url(url);
    match format {
        CiteFormat::Markdown => format!("[{title}]({url})"),
        CiteFormat::Url => url.to_string(),
        CiteFormat::Text => format!("{title}\n{url}"),
    }
}
