//! file: core/src/config.rs
//! description: user configuration consumed by the translator.
//!
//! `UserConfig` is read from a JSON file. Its only section today is
//! `import_paths`, which maps either the reserved key `default_dirs` to a
//! list of search directories, or a library name to the directory whose
//! files make up that library.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key under `import_paths` listing the directories searched for relative imports.
pub const DEFAULT_DIRS_KEY: &str = "default_dirs";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub import_paths: BTreeMap<String, Vec<PathBuf>>,
}

impl UserConfig {
    /// Load a configuration from a JSON file path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<UserConfig, String> {
        let raw = std::fs::read_to_string(&path).map_err(|e| format!("read config: {}", e))?;
        let config: UserConfig =
            serde_json::from_str(&raw).map_err(|e| format!("parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Every library entry needs at least one directory; `default_dirs` may be empty.
    pub fn validate(&self) -> Result<(), String> {
        for (name, dirs) in &self.import_paths {
            if name != DEFAULT_DIRS_KEY && dirs.is_empty() {
                return Err(format!("library '{}' has no directory configured", name));
            }
        }
        Ok(())
    }

    pub fn default_dirs(&self) -> &[PathBuf] {
        self.import_paths
            .get(DEFAULT_DIRS_KEY)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Directory backing the library `name`, if one is configured.
    pub fn library_dir(&self, name: &str) -> Option<&Path> {
        if name == DEFAULT_DIRS_KEY {
            return None;
        }
        self.import_paths
            .get(name)
            .and_then(|dirs| dirs.first())
            .map(PathBuf::as_path)
    }

    pub fn with_default_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.import_paths
            .entry(DEFAULT_DIRS_KEY.to_string())
            .or_default()
            .push(dir.into());
        self
    }

    pub fn with_library(mut self, name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.import_paths.insert(name.into(), vec![dir.into()]);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_import_paths() {
        let raw = r#"{ "import_paths": { "default_dirs": ["/opt/lib"], "algos": ["/opt/algos"] } }"#;
        let config: UserConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.default_dirs(), &[PathBuf::from("/opt/lib")]);
        assert_eq!(config.library_dir("algos"), Some(Path::new("/opt/algos")));
        assert_eq!(config.library_dir("default_dirs"), None);
    }

    #[test]
    fn missing_section_is_empty() {
        let config: UserConfig = serde_json::from_str("{}").unwrap();
        assert!(config.default_dirs().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn library_without_directory_is_rejected() {
        let raw = r#"{ "import_paths": { "algos": [] } }"#;
        let config: UserConfig = serde_json::from_str(raw).unwrap();
        assert!(config.validate().is_err());
    }
}
