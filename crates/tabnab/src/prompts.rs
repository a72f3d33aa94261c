//! Prompt templates for AI commands
//!
//! Templates are JSON files named `<name>.json` in the prompts directory.
//! A template's `prompt` holds a `{content}` placeholder for the page text
//! and optionally a `{question}` placeholder.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Placeholder replaced by the page text
pub const CONTENT_PLACEHOLDER: &str = "{content}";

/// Placeholder replaced by the user's question
pub const QUESTION_PLACEHOLDER: &str = "{question}";

/// Name of the built-in summary template
pub const SUMMARIZE_TEMPLATE: &str = "summarize";

/// Name of the built-in question template
pub const ASK_TEMPLATE: &str = "ask";

/// A named prompt with optional model overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl PromptTemplate {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            prompt: prompt.into(),
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Prompt text with `{question}` filled in
    ///
    /// Fails when the template asks for a question and none was given.
    pub fn with_question(&self, question: Option<&str>) -> Result<String, Error> {
        match question {
            Some(question) => Ok(self.prompt.replace(QUESTION_PLACEHOLDER, question)),
            None if self.prompt.contains(QUESTION_PLACEHOLDER) => {
                Err(Error::MissingQuestion(self.name.clone()))
            }
            None => Ok(self.prompt.clone()),
        }
    }
}

/// Templates available without any files on disk
pub fn builtin_templates() -> Vec<PromptTemplate> {
    vec![
        PromptTemplate::new(
            SUMMARIZE_TEMPLATE,
            "Summarize page in 3-5 bullet points",
            "Summarize this webpage in 3-5 concise bullet points:\n\n{content}",
        ),
        PromptTemplate::new(
            "extract-features",
            "Extract product features as structured data",
            "Extract key product features as a JSON array from this page. Return ONLY the JSON array.\n\n{content}\n\nReturn format: [\"feature 1\", \"feature 2\", ...]",
        ),
        PromptTemplate::new(
            "simplify",
            "Explain content in simple terms",
            "Explain this content in simple terms that a beginner could understand:\n\n{content}",
        ),
        PromptTemplate::new(
            "action-items",
            "Extract action items and tasks",
            "Extract all action items, tasks, or to-dos from this content:\n\n{content}",
        ),
        PromptTemplate::new(
            "key-points",
            "Extract key points and main ideas",
            "Extract the key points and main ideas from this content:\n\n{content}",
        ),
        PromptTemplate::new(
            ASK_TEMPLATE,
            "Answer a question about the page",
            "Answer this question about the following webpage content:\n\nQuestion: {question}\n\nContent:\n{content}",
        ),
    ]
}

/// Directory of prompt template files
///
/// A store without a directory only knows the built-ins and refuses writes.
#[derive(Debug, Clone)]
pub struct PromptStore {
    dir: Option<PathBuf>,
}

impl PromptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Store with nowhere to keep templates
    pub fn without_dir() -> Self {
        Self { dir: None }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Templates stored on disk, sorted by name
    ///
    /// A missing directory is an empty store.
    pub fn list(&self) -> Result<Vec<PromptTemplate>, Error> {
        let Some(dir) = self.dir() else {
            return Ok(Vec::new());
        };
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(store_error(dir, e)),
        };

        let mut templates = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| store_error(dir, e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                templates.push(read_template(&path)?);
            }
        }
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    /// Template stored on disk under `name`
    pub fn get(&self, name: &str) -> Result<Option<PromptTemplate>, Error> {
        let Some(path) = self.path_for(name)? else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        read_template(&path).map(Some)
    }

    /// Template from disk, falling back to the built-ins
    pub fn resolve(&self, name: &str) -> Result<PromptTemplate, Error> {
        if let Some(template) = self.get(name)? {
            debug!(name, "Using stored prompt template");
            return Ok(template);
        }
        builtin_templates()
            .into_iter()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::TemplateNotFound(name.to_string()))
    }

    /// Write a template, replacing any existing one with the same name
    pub fn save(&self, template: &PromptTemplate) -> Result<(), Error> {
        let path = self.writable_path(&template.name)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| store_error(dir, e))?;
        }
        let json = serde_json::to_string_pretty(template)
            .map_err(|e| Error::PromptStore(e.to_string()))?;
        fs::write(&path, json).map_err(|e| store_error(&path, e))
    }

    /// Remove a template; false when it did not exist
    pub fn delete(&self, name: &str) -> Result<bool, Error> {
        let path = self.writable_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(store_error(&path, e)),
        }
    }

    /// Write every built-in template that is not already on disk
    ///
    /// Returns the names written.
    pub fn init_defaults(&self) -> Result<Vec<String>, Error> {
        let mut written = Vec::new();
        for template in builtin_templates() {
            if self.get(&template.name)?.is_none() {
                self.save(&template)?;
                written.push(template.name);
            }
        }
        Ok(written)
    }

    fn writable_path(&self, name: &str) -> Result<PathBuf, Error> {
        self.path_for(name)?.ok_or_else(|| {
            Error::PromptStore(
                "no prompts directory: set TABNAB_PROMPTS_DIR or HOME".to_string(),
            )
        })
    }

    /// File for `name`, or `None` when the store has no directory
    fn path_for(&self, name: &str) -> Result<Option<PathBuf>, Error> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
        if !valid {
            return Err(Error::PromptStore(format!("invalid template name '{name}'")));
        }
        Ok(self.dir.as_ref().map(|dir| dir.join(format!("{name}.json"))))
    }
}

fn read_template(path: &Path) -> Result<PromptTemplate, Error> {
    let raw = fs::read_to_string(path).map_err(|e| store_error(path, e))?;
    serde_json::from_str(&raw).map_err(|e| Error::PromptStore(format!("{}: {e}", path.display())))
}

fn store_error(path: &Path, err: std::io::Error) -> Error {
    Error::PromptStore(format!("{}: {err}", path.display()))
}
