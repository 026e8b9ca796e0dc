pub mod ast;
pub mod config;
pub mod error;
pub mod ir;
pub mod location;
pub mod script;
pub mod symbols;

use std::collections::BTreeMap;

pub use ast::{AstNode, RulesParser, generate_ast_from_source};
pub use config::UserConfig;
pub use error::{Level, TabulaErrorExt};
pub use ir::{ErrorKind, IrModule, TranslationError, lower_ast_to_ir};
pub use location::{Location, Span};
pub use script::Script;

pub fn generate_error_report<E: TabulaErrorExt + ?Sized>(error: &E) -> String {
    let level = error.level();
    let location = match error.location() {
        Some(loc) => loc.to_string(),
        None => "unknown location".to_string(),
    };
    let message = error.message();

    format!("TABULA | {} | {} | {}", level, location, message)
}

/// Parse and translate `source` in one go.
pub fn compile_source_to_ir(
    source: &Script,
    args: &BTreeMap<String, String>,
    config: &UserConfig,
) -> Result<IrModule, Box<dyn TabulaErrorExt>> {
    let ast = ast::generate_ast_from_source(source)?;
    lower_ast_to_ir(&ast, &source.path, args, config)
        .map_err(|err| -> Box<dyn TabulaErrorExt> { Box::new(err) })
}
