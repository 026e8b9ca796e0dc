//! file: core/src/ir/lower/lowering_context.rs
//! description: name-resolution state threaded through translation.
//!
//! `LoweringContext` owns the symbol table, the function registry and the
//! import bookkeeping. Function bodies and imported scripts are translated
//! against a fresh context; `isolate`/`restore` swap the state out and back.

use std::path::{Path, PathBuf};

use crate::symbols::{FunctionRegistry, ScopedSymbolTable};

#[derive(Debug, Default)]
pub struct LoweringContext {
    pub symbols: ScopedSymbolTable,
    pub functions: FunctionRegistry,
    /// Scripts currently being translated; the last one is the innermost import.
    pub script_paths: Vec<PathBuf>,
    /// Files imported into the script being translated.
    pub imported_files: Vec<PathBuf>,
    /// Set while translating a function body.
    pub in_function: bool,
}

/// State parked by `LoweringContext::isolate`.
#[derive(Debug)]
pub struct SavedContext {
    symbols: ScopedSymbolTable,
    functions: Option<FunctionRegistry>,
    imported_files: Option<Vec<PathBuf>>,
    in_function: bool,
}

impl LoweringContext {
    pub fn new(script_path: &Path) -> Self {
        LoweringContext {
            script_paths: vec![script_path.to_path_buf()],
            ..Default::default()
        }
    }

    pub fn current_script(&self) -> Option<&Path> {
        self.script_paths.last().map(PathBuf::as_path)
    }

    /// Swaps in an empty symbol table for a function body. Functions stay
    /// visible so bodies can call earlier definitions and themselves.
    pub fn isolate_for_function(&mut self) -> SavedContext {
        SavedContext {
            symbols: std::mem::take(&mut self.symbols),
            functions: None,
            imported_files: None,
            in_function: std::mem::replace(&mut self.in_function, true),
        }
    }

    /// Swaps in an empty symbol table, function registry and import list for
    /// translating the imported script at `path`.
    pub fn isolate_for_import(&mut self, path: &Path) -> SavedContext {
        self.script_paths.push(path.to_path_buf());
        SavedContext {
            symbols: std::mem::take(&mut self.symbols),
            functions: Some(std::mem::take(&mut self.functions)),
            imported_files: Some(std::mem::take(&mut self.imported_files)),
            in_function: std::mem::replace(&mut self.in_function, false),
        }
    }

    /// Puts parked state back and hands out what was built in isolation.
    pub fn restore(&mut self, saved: SavedContext) -> (ScopedSymbolTable, FunctionRegistry) {
        let symbols = std::mem::replace(&mut self.symbols, saved.symbols);
        let functions = match saved.functions {
            Some(functions) => {
                self.script_paths.pop();
                std::mem::replace(&mut self.functions, functions)
            }
            None => FunctionRegistry::new(),
        };
        if let Some(imported) = saved.imported_files {
            self.imported_files = imported;
        }
        self.in_function = saved.in_function;
        (symbols, functions)
    }
}
