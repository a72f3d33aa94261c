//! Run-wide configuration
//!
//! Read once at startup from the environment and passed by reference to
//! the collaborators that need it. Nothing here is persisted.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default Claude model
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default completion length
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default Anthropic API endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.anthropic.com";

/// Default per-document extraction deadline
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only configuration for one run
#[derive(Clone)]
pub struct Config {
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_base_url: String,
    prompts_dir: Option<PathBuf>,
    task_timeout: Option<Duration>,
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Build a config from process environment variables
    pub fn from_env() -> Self {
        ConfigBuilder::from_lookup(|key| std::env::var(key).ok()).build()
    }

    /// True when an API key is available
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// API key with everything but the first 8 and last 4 characters hidden
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_deref().map(mask_secret)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Where prompt templates are stored; `None` without a home directory
    pub fn prompts_dir(&self) -> Option<&Path> {
        self.prompts_dir.as_deref()
    }

    /// Per-document deadline; `None` disables it
    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout
    }
}

impl Default for Config {
    fn default() -> Self {
        ConfigBuilder::new().build()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.masked_api_key())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_base_url", &self.api_base_url)
            .field("prompts_dir", &self.prompts_dir)
            .field("task_timeout", &self.task_timeout)
            .finish()
    }
}

/// Builder for [`Config`]
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_base_url: String,
    prompts_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
    task_timeout: Option<Duration>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Create a builder with built-in defaults and no API key
    ///
    /// The home directory comes from the platform's user directories.
    pub fn new() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            prompts_dir: None,
            home_dir: dirs::home_dir(),
            task_timeout: Some(DEFAULT_TASK_TIMEOUT),
        }
    }

    /// Seed a builder from variables resolved by `lookup`
    ///
    /// `ANTHROPIC_API_KEY` wins over `CLAUDE_API_KEY`. Numeric variables that
    /// fail to parse keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut builder = Self::new();

        builder.api_key = non_empty("ANTHROPIC_API_KEY").or_else(|| non_empty("CLAUDE_API_KEY"));
        if let Some(model) = non_empty("TABNAB_MODEL") {
            builder.model = model;
        }
        if let Some(temperature) = non_empty("TABNAB_TEMPERATURE").and_then(|v| v.parse().ok()) {
            builder.temperature = temperature;
        }
        if let Some(max_tokens) = non_empty("TABNAB_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            builder.max_tokens = max_tokens;
        }
        if let Some(base_url) = non_empty("ANTHROPIC_BASE_URL") {
            builder = builder.api_base_url(base_url);
        }
        builder.prompts_dir = non_empty("TABNAB_PROMPTS_DIR").map(PathBuf::from);
        builder
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn prompts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompts_dir = Some(dir.into());
        self
    }

    /// Home directory under which `.tabnab/prompts` is placed
    pub fn home_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.home_dir = dir;
        self
    }

    pub fn task_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.task_timeout = timeout;
        self
    }

    /// Build the config
    ///
    /// Prompts live in `~/.tabnab/prompts` unless a directory was given.
    /// Without either there is no prompts directory.
    pub fn build(self) -> Config {
        let home = self.home_dir;
        let prompts_dir = self
            .prompts_dir
            .or_else(|| home.map(|home| home.join(".tabnab").join("prompts")));
        Config {
            api_key: self.api_key,
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            api_base_url: self.api_base_url.trim_end_matches('/').to_string(),
            prompts_dir,
            task_timeout: self.task_timeout,
        }
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.has_credential());
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.temperature(), DEFAULT_TEMPERATURE);
        assert_eq!(config.max_tokens(), DEFAULT_MAX_TOKENS);
        assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(config.task_timeout(), Some(DEFAULT_TASK_TIMEOUT));
    }

    #[test]
    fn test_api_key_precedence() {
        let config = ConfigBuilder::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "sk-ant-primary"),
            ("CLAUDE_API_KEY", "sk-ant-secondary"),
        ]))
        .build();
        assert_eq!(config.api_key(), Some("sk-ant-primary"));

        let config =
            ConfigBuilder::from_lookup(lookup(&[("CLAUDE_API_KEY", "sk-ant-secondary")])).build();
        assert_eq!(config.api_key(), Some("sk-ant-secondary"));

        let config = ConfigBuilder::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "  ")])).build();
        assert!(!config.has_credential());
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigBuilder::from_lookup(lookup(&[
            ("TABNAB_MODEL", "claude-3-5-haiku-latest"),
            ("TABNAB_TEMPERATURE", "0.2"),
            ("TABNAB_MAX_TOKENS", "not-a-number"),
            ("ANTHROPIC_BASE_URL", "http://localhost:9999/"),
        ]))
        .home_dir(Some(PathBuf::from("/home/ada")))
        .build();
        assert_eq!(config.model(), "claude-3-5-haiku-latest");
        assert_eq!(config.temperature(), 0.2);
        assert_eq!(config.max_tokens(), DEFAULT_MAX_TOKENS);
        assert_eq!(config.api_base_url(), "http://localhost:9999");
        assert_eq!(
            config.prompts_dir(),
            Some(Path::new("/home/ada/.tabnab/prompts"))
        );
    }

    #[test]
    fn test_prompts_dir_override() {
        let config = ConfigBuilder::from_lookup(lookup(&[
            ("TABNAB_PROMPTS_DIR", "/tmp/prompts"),
        ]))
        .home_dir(Some(PathBuf::from("/home/ada")))
        .build();
        assert_eq!(config.prompts_dir(), Some(Path::new("/tmp/prompts")));
    }

    #[test]
    fn test_no_home_means_no_prompts_dir() {
        let config = ConfigBuilder::from_lookup(lookup(&[("HOME", "/home/ada")]))
            .home_dir(None)
            .build();
        assert_eq!(config.prompts_dir(), None);

        let config = Config::builder()
            .home_dir(None)
            .prompts_dir("/srv/prompts")
            .build();
        assert_eq!(config.prompts_dir(), Some(Path::new("/srv/prompts")));
    }

    #[test]
    fn test_masked_api_key() {
        let config = Config::builder().api_key("sk-ant-api03-abcdefghijkl").build();
        assert_eq!(config.masked_api_key().unwrap(), "sk-ant-a...ijkl");
        assert!(!format!("{config:?}").contains("abcdefgh"));

        let short = Config::builder().api_key("short").build();
        assert_eq!(short.masked_api_key().unwrap(), "*****");
    }
}
