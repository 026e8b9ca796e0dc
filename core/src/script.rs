use std::path::{Path, PathBuf};

use crate::TabulaErrorExt;

/// A DSL source file loaded into memory. `name` is what diagnostics print as
/// the file of a location.
#[derive(Debug, Clone)]
pub struct Script {
    pub name: String,
    pub path: PathBuf,
    pub content: String,
}

impl Script {
    pub fn new(path: PathBuf) -> Result<Self, Box<dyn TabulaErrorExt>> {
        let content = std::fs::read_to_string(&path).map_err(|err| -> Box<dyn TabulaErrorExt> {
            Box::new(MissingScriptError {
                path: path.clone(),
                reason: err.to_string(),
            })
        })?;
        Ok(Script::from_source(&path, content))
    }

    /// Wraps source text that did not come from disk; `path` is still used
    /// to resolve relative imports.
    pub fn from_source(path: &Path, content: impl Into<String>) -> Self {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Script {
            name,
            path: path.to_path_buf(),
            content: content.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Script: {} at {:?}", self.name, self.path)
    }
}

#[derive(Debug, Clone)]
pub struct MissingScriptError {
    pub path: PathBuf,
    pub reason: String,
}

impl std::fmt::Display for MissingScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cannot read script at {:?}: {}", self.path, self.reason)
    }
}

impl std::error::Error for MissingScriptError {}

impl TabulaErrorExt for MissingScriptError {
    fn level(&self) -> crate::Level {
        crate::Level::Error
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "tabula.script".to_string()
    }

    fn span(&self) -> Option<crate::location::Span> {
        None
    }

    fn location(&self) -> Option<crate::location::Location> {
        None
    }
}
