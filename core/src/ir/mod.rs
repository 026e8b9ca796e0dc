//! file: core/src/ir/mod.rs
//! description: typed SSA intermediate representation and AST lowering.

pub mod lower;
pub mod module;
pub mod op;
pub mod types;
pub mod value;

use std::collections::BTreeMap;
use std::path::Path;

pub use self::lower::err::{ErrorKind, TranslationError};
pub use self::module::{Diagnostic, Function, IrModule};
pub use self::op::{Op, OpKind, Region};
pub use self::types::{Type, ValueType};
pub use self::value::{Constant, DenseBuffer, MatrixConstant, Scalar, ValueId, ValueTable};

use crate::ast::AstNode;
use crate::config::UserConfig;

/// Translate a parsed script into an `IrModule`.
///
/// `script_path` anchors relative imports; `args` holds the `$name`
/// command-line arguments as unparsed literal text.
pub fn lower_ast_to_ir(
    ast: &AstNode,
    script_path: &Path,
    args: &BTreeMap<String, String>,
    config: &UserConfig,
) -> Result<IrModule, TranslationError> {
    let mut translator = lower::Translator::new(script_path, args, config);
    translator.visit_script(ast)?;
    Ok(translator.finish())
}
