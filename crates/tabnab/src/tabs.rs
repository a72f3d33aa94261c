//! Tab enumeration sources

use crate::browser::{run_osascript, LIST_TABS_SCRIPT};
use crate::error::Error;
use crate::types::TabRecord;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::warn;

/// Separator between fields of a Chrome listing line
const FIELD_SEPARATOR: &str = " || ";

/// Source of the ordered list of open tabs
#[async_trait]
pub trait TabSource: Send + Sync {
    /// Unique identifier for this source (for logging/debugging)
    fn name(&self) -> &'static str;

    /// List tabs in browser order
    async fn enumerate(&self) -> Result<Vec<TabRecord>, Error>;
}

/// Tabs of the running Google Chrome, via AppleScript
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeTabs;

impl ChromeTabs {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TabSource for ChromeTabs {
    fn name(&self) -> &'static str {
        "chrome"
    }

    async fn enumerate(&self) -> Result<Vec<TabRecord>, Error> {
        let raw = run_osascript(LIST_TABS_SCRIPT).await?;
        Ok(parse_tab_listing(&raw))
    }
}

/// Tabs read from a JSON array of `{title, url, isActive}` records
#[derive(Debug, Clone)]
pub struct JsonTabs {
    path: PathBuf,
}

impl JsonTabs {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TabSource for JsonTabs {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn enumerate(&self) -> Result<Vec<TabRecord>, Error> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::InvalidListing(format!("{}: {e}", self.path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::InvalidListing(format!("{}: {e}", self.path.display())))
    }
}

/// Parse `<url> || <title> || <true|false>` lines
///
/// Blank lines are skipped. The title may itself contain the separator;
/// the URL is taken from the front and the active flag from the back.
pub fn parse_tab_listing(raw: &str) -> Vec<TabRecord> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let record = parse_tab_line(line);
            if record.is_none() {
                warn!(line, "Skipping malformed tab line");
            }
            record
        })
        .collect()
}

fn parse_tab_line(line: &str) -> Option<TabRecord> {
    let (url, rest) = line.split_once(FIELD_SEPARATOR)?;
    let (title, active) = match rest.rsplit_once(FIELD_SEPARATOR) {
        Some((title, active)) => (title, active.trim() == "true"),
        None => (rest, false),
    };
    Some(TabRecord::new(title, url.trim(), active))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_tab_listing() {
        let raw = "https://www.npmjs.com/package/run-applescript || run-applescript - npm || true\n\
                   https://calendar.google.com/calendar/u/0/r/day || Google Calendar - Monday || false\n\
                   \n";
        let tabs = parse_tab_listing(raw);
        assert_eq!(
            tabs,
            vec![
                TabRecord::new(
                    "run-applescript - npm",
                    "https://www.npmjs.com/package/run-applescript",
                    true
                ),
                TabRecord::new(
                    "Google Calendar - Monday",
                    "https://calendar.google.com/calendar/u/0/r/day",
                    false
                ),
            ]
        );
    }

    #[test]
    fn test_parse_title_containing_separator() {
        let tabs = parse_tab_listing("https://a.com/ || a || b || false");
        assert_eq!(tabs, vec![TabRecord::new("a || b", "https://a.com/", false)]);
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let tabs = parse_tab_listing("garbage\nhttps://a.com/ || A || true");
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].title, "A");
    }

    #[tokio::test]
    async fn test_json_tabs() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"title": "A", "url": "https://a.com/", "isActive": true}}, {{"title": "B", "url": "https://b.com/"}}]"#
        )
        .unwrap();

        let tabs = JsonTabs::new(file.path()).enumerate().await.unwrap();
        assert_eq!(tabs.len(), 2);
        assert!(tabs[0].is_active);
        assert!(!tabs[1].is_active);
    }

    #[tokio::test]
    async fn test_json_tabs_missing_file() {
        let err = JsonTabs::new("/nonexistent/tabs.json").enumerate().await.unwrap_err();
        assert!(matches!(err, Error::InvalidListing(_)));
    }
}
