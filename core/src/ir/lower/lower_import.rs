//! file: core/src/ir/lower/lower_import.rs
//! description: `import "path" [as "alias"];`
//!
//! An imported script is translated into the importer's top-level block
//! with its own symbol table, function registry and import list. Its
//! top-level variables and functions are then made visible under a prefix:
//! the alias, or the file stem, followed by `.`. Names the imported script
//! itself got from its own imports are not re-exported.

use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;

use super::Translator;
use super::err::{ErrorKind, TranslationError};
use crate::ast::{AstNode, generate_ast_from_source};
use crate::script::Script;

const PREFIX_DELIM: char = '.';

impl Translator<'_> {
    pub(crate) fn visit_import(
        &mut self,
        node: &AstNode,
        path: &str,
        alias: Option<&str>,
    ) -> Result<(), TranslationError> {
        let import_error = |message: String| TranslationError::new(ErrorKind::ImportError, message).at(node);
        if self.ctx.symbols.num_scopes() != 1 || self.ctx.in_function {
            return Err(import_error("imports can only be done in the main scope".to_string()));
        }

        let importer = self
            .ctx
            .current_script()
            .map(absolute)
            .unwrap_or_default();
        let importer_dir = importer.parent().map(Path::to_path_buf).unwrap_or_default();
        let importing = Path::new(path);
        let has_extension = importing.extension().is_some();

        let mut prefix = match alias {
            Some(alias) => alias.to_string(),
            None => importing
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_default(),
        };
        prefix.push(PREFIX_DELIM);

        let mut import_paths = Vec::new();
        let mut resolved = importing.to_path_buf();
        if importing.is_relative() {
            let mut candidate = importer_dir.join(importing);
            if candidate.exists() {
                candidate = canonical(&candidate);
            }
            if has_extension {
                for dir in self.config().default_dirs() {
                    let library_file = dir.join(importing);
                    if !library_file.exists() {
                        continue;
                    }
                    if candidate.exists() && canonical(&library_file) != candidate {
                        return Err(import_error(format!(
                            "ambiguous import: {}, found another file with the same name in the default import directories: {}",
                            path,
                            library_file.display()
                        )));
                    }
                    candidate = library_file;
                }
            } else if let Some(dir) = self.config().library_dir(path) {
                import_paths = library_files(dir).map_err(import_error)?;
            }
            resolved = candidate;
        }
        if import_paths.is_empty() {
            import_paths.push(resolved.clone());
        }

        if canonical(&resolved) == canonical(&importer) {
            return Err(import_error(format!(
                "you cannot import the file you are currently in: {}",
                resolved.display()
            )));
        }
        for candidate in &import_paths {
            let candidate = canonical(candidate);
            if self.ctx.script_paths.iter().any(|open| canonical(open) == candidate) {
                return Err(import_error(format!(
                    "cyclic import of {}",
                    candidate.display()
                )));
            }
            if self.ctx.imported_files.iter().any(|seen| *seen == candidate) {
                return Err(import_error(format!(
                    "you cannot import the same file twice: {}",
                    candidate.display()
                )));
            }
            self.ctx.imported_files.push(candidate);
        }

        for import_path in &import_paths {
            if !import_path.exists() {
                return Err(import_error(format!(
                    "the import path doesn't exist: {}",
                    import_path.display()
                )));
            }
            let final_prefix = if !has_extension {
                let stem = import_path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().to_string())
                    .unwrap_or_default();
                format!("{}{}{}", prefix, stem, PREFIX_DELIM)
            } else if self.prefix_in_use(&prefix) {
                if let Some(alias) = alias {
                    return Err(import_error(format!(
                        "alias {} results in a name clash with another prefix",
                        alias
                    )));
                }
                let parent = importing
                    .parent()
                    .and_then(Path::file_name)
                    .or_else(|| import_path.parent().and_then(Path::file_name))
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default();
                format!("{}{}{}", parent, PREFIX_DELIM, prefix)
            } else {
                prefix.clone()
            };
            self.import_script(node, import_path, &final_prefix)?;
        }
        Ok(())
    }

    /// Whether some top-level variable or function already lives directly
    /// under `prefix`.
    fn prefix_in_use(&self, prefix: &str) -> bool {
        let occupies = |name: &String| {
            name.starts_with(prefix) && name.matches(PREFIX_DELIM).count() == 1
        };
        self.ctx.symbols.top_names().any(occupies) || self.ctx.functions.names().any(occupies)
    }

    fn import_script(
        &mut self,
        node: &AstNode,
        import_path: &Path,
        prefix: &str,
    ) -> Result<(), TranslationError> {
        let import_error = |message: String| TranslationError::new(ErrorKind::ImportError, message).at(node);
        let script = Script::new(import_path.to_path_buf()).map_err(|err| {
            import_error(format!("cannot read {}: {}", import_path.display(), err.message()))
        })?;
        let ast = generate_ast_from_source(&script).map_err(|err| {
            import_error(format!(
                "failed to parse imported file {}: {}",
                import_path.display(),
                err.message()
            ))
        })?;

        let first_function = self.module.functions.len();
        let saved = self.ctx.isolate_for_import(import_path);
        let visited = self.visit_script(&ast);
        let (mut symbols, functions) = self.ctx.restore(saved);
        visited?;

        for (name, info) in symbols.take_scope() {
            if !name.contains(PREFIX_DELIM) {
                self.ctx.symbols.put(format!("{}{}", prefix, name), info);
            }
        }
        for (name, overloads) in functions.into_entries() {
            if name.contains(PREFIX_DELIM) {
                continue;
            }
            for mut signature in overloads {
                signature.name = format!("{}{}", prefix, name);
                self.ctx.functions.insert(signature);
            }
        }
        for function in &mut self.module.functions[first_function..] {
            if !function.name.contains(PREFIX_DELIM) {
                function.name = format!("{}{}", prefix, function.name);
            }
        }
        log::debug!("imported {} under prefix `{}`", import_path.display(), prefix);
        Ok(())
    }
}

/// Files of a library directory, in name order.
fn library_files(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let pattern = dir.join("*");
    let pattern = pattern.to_string_lossy();
    let paths = glob(&pattern).map_err(|e| format!("invalid library directory {}: {}", dir.display(), e))?;
    let mut files: Vec<PathBuf> = paths.flatten().filter(|p| p.is_file()).collect();
    files.sort();
    Ok(files)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| absolute(path))
}
