//! file: core/src/ir/lower/mod.rs
//! description: AST to IR translation.
//!
//! `Translator` walks the syntax tree once, emitting ops into the block
//! that is currently open in its `OpBuilder` and keeping variable bindings
//! in the `LoweringContext`. The work is split by construct:
//!
//! - `lower_stmt`: statements, blocks and assignment targets
//! - `lower_expr`: operators, identifiers, casts and `$` arguments
//! - `lower_literal`: scalar, matrix and frame literals
//! - `lower_index`: right and left indexing
//! - `lower_control`: if, while, do-while, for and parfor
//! - `lower_function`: function definitions, calls and overload resolution
//! - `early_return`: restructuring of returns nested in if-statements
//! - `lower_import`: imports and library resolution
//!

mod builder;
mod declare_builtins;
mod early_return;
pub mod err;
mod lower_control;
mod lower_expr;
mod lower_function;
mod lower_import;
mod lower_index;
mod lower_literal;
mod lower_stmt;
mod lowering_context;

pub use builder::OpBuilder;
pub use lowering_context::{LoweringContext, SavedContext};

use std::collections::BTreeMap;
use std::path::Path;

use crate::ast::{AstNode, AstNodeKind};
use crate::config::UserConfig;
use crate::ir::module::IrModule;
use crate::ir::op::{Op, OpKind};
use crate::ir::types::{Type, ValueType};
use crate::ir::value::{Constant, Scalar, ValueId};
use crate::location::Location;
use err::{ErrorKind, TranslationError};

/// What visiting an expression produced.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Lowered {
    Nothing,
    Single(ValueId),
    Multi(Vec<ValueId>),
}

impl Lowered {
    pub(crate) fn from_results(mut results: Vec<ValueId>) -> Self {
        match results.len() {
            0 => Lowered::Nothing,
            1 => Lowered::Single(results.remove(0)),
            _ => Lowered::Multi(results),
        }
    }
}

pub struct Translator<'a> {
    pub(crate) module: IrModule,
    pub(crate) builder: OpBuilder,
    pub(crate) ctx: LoweringContext,
    args: &'a BTreeMap<String, String>,
    config: &'a UserConfig,
}

impl<'a> Translator<'a> {
    pub fn new(
        script_path: &Path,
        args: &'a BTreeMap<String, String>,
        config: &'a UserConfig,
    ) -> Self {
        Translator {
            module: IrModule::new(),
            builder: OpBuilder::new(),
            ctx: LoweringContext::new(script_path),
            args,
            config,
        }
    }

    /// Translate the statements of a `Script` node into the open block.
    pub fn visit_script(&mut self, ast: &AstNode) -> Result<(), TranslationError> {
        let AstNodeKind::Script { body } = &ast.kind else {
            return Err(TranslationError::new(
                ErrorKind::UnsupportedConstruct,
                format!("expected a script, found a {}", ast.kind.describe()),
            )
            .at(ast));
        };
        for statement in body {
            self.visit_statement(statement)?;
        }
        Ok(())
    }

    /// Close the top-level block and hand out the finished module.
    pub fn finish(self) -> IrModule {
        let mut module = self.module;
        module.entry.ops = self.builder.finish();
        module
    }

    pub(crate) fn type_of(&self, value: ValueId) -> Type {
        self.module.values.type_of(value).clone()
    }

    /// Emit an op defining one fresh value per entry of `result_types`.
    pub(crate) fn create(
        &mut self,
        kind: OpKind,
        operands: Vec<ValueId>,
        result_types: Vec<Type>,
        location: Option<&Location>,
    ) -> Vec<ValueId> {
        let results: Vec<ValueId> = result_types
            .into_iter()
            .map(|ty| self.module.values.fresh(ty))
            .collect();
        let op = Op::new(kind, operands, results.clone()).with_location(location.cloned());
        self.builder.emit_op(op);
        results
    }

    pub(crate) fn create1(
        &mut self,
        kind: OpKind,
        operands: Vec<ValueId>,
        result_type: Type,
        location: Option<&Location>,
    ) -> ValueId {
        let result = self.module.values.fresh(result_type);
        let op = Op::new(kind, operands, vec![result]).with_location(location.cloned());
        self.builder.emit_op(op);
        result
    }

    pub(crate) fn constant(
        &mut self,
        value: Scalar,
        vt: ValueType,
        location: Option<&Location>,
    ) -> ValueId {
        let id = self.create1(
            OpKind::Constant(Constant::Scalar(value.clone())),
            vec![],
            Type::Scalar(vt),
            location,
        );
        self.module.values.set_constant(id, value);
        id
    }

    pub(crate) fn const_i64(&mut self, value: i64, location: Option<&Location>) -> ValueId {
        self.constant(Scalar::Int(value), ValueType::SI64, location)
    }

    pub(crate) fn const_index(&mut self, value: usize, location: Option<&Location>) -> ValueId {
        self.constant(Scalar::UInt(value as u64), ValueType::Index, location)
    }

    pub(crate) fn const_bool(&mut self, value: bool, location: Option<&Location>) -> ValueId {
        self.constant(Scalar::Bool(value), ValueType::Bool, location)
    }

    pub(crate) fn const_str(&mut self, value: &str, location: Option<&Location>) -> ValueId {
        self.constant(Scalar::Str(value.to_string()), ValueType::Str, location)
    }

    /// `value` itself when it already has type `target`, a cast otherwise.
    pub(crate) fn cast_if(
        &mut self,
        target: Type,
        value: ValueId,
        location: Option<&Location>,
    ) -> ValueId {
        if self.module.values.type_of(value) == &target {
            value
        } else {
            self.create1(OpKind::Cast, vec![value], target, location)
        }
    }

    pub(crate) fn cast_si64_if(&mut self, value: ValueId, location: Option<&Location>) -> ValueId {
        self.cast_if(Type::Scalar(ValueType::SI64), value, location)
    }

    pub(crate) fn cast_index_if(&mut self, value: ValueId, location: Option<&Location>) -> ValueId {
        self.cast_if(Type::Scalar(ValueType::Index), value, location)
    }

    pub(crate) fn cast_bool_if(&mut self, value: ValueId, location: Option<&Location>) -> ValueId {
        self.cast_if(Type::Scalar(ValueType::Bool), value, location)
    }

    /// Record a warning both in the log and on the module.
    pub(crate) fn warn(&mut self, message: String, location: Option<&Location>) {
        match location {
            Some(loc) => log::warn!("{} (at {})", message, loc),
            None => log::warn!("{}", message),
        }
        self.module.warn(message, location.cloned());
    }

    pub(crate) fn args(&self) -> &'a BTreeMap<String, String> {
        self.args
    }

    pub(crate) fn config(&self) -> &'a UserConfig {
        self.config
    }
}
