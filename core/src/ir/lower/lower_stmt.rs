//! file: core/src/ir/lower/lower_stmt.rs
//! description: statement lowering and assignment.

use super::err::{ErrorKind, TranslationError};
use super::{Lowered, Translator};
use crate::ast::{AssignTarget, AstNode, AstNodeKind};
use crate::ir::op::OpKind;
use crate::ir::value::ValueId;
use crate::location::Location;
use crate::symbols::SymbolInfo;

impl Translator<'_> {
    pub(crate) fn visit_statement(&mut self, node: &AstNode) -> Result<(), TranslationError> {
        match &node.kind {
            AstNodeKind::Block { statements } => self.visit_block(statements),
            AstNodeKind::ExprStatement { expr } => {
                self.visit_expr(expr)?;
                Ok(())
            }
            AstNodeKind::Assignment { targets, value } => {
                self.visit_assignment(node, targets, value)
            }
            AstNodeKind::Return { values } => self.visit_return(node, values),
            AstNodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.visit_if(node, condition, then_branch, else_branch.as_deref()),
            AstNodeKind::While {
                condition,
                body,
                do_while,
            } => self.visit_while(node, condition, body, *do_while),
            AstNodeKind::For {
                var,
                from,
                to,
                step,
                body,
            } => self.visit_for(node, var, from, to, step.as_deref(), body),
            AstNodeKind::ParFor {
                var,
                from,
                to,
                step,
                body,
            } => self.visit_parfor(node, var, from, to, step.as_deref(), body),
            AstNodeKind::Function {
                name,
                params,
                returns,
                body,
            } => self.visit_function(node, name, params, returns.as_deref(), body),
            AstNodeKind::Import { path, alias } => self.visit_import(node, path, alias.as_deref()),
            other => Err(TranslationError::new(
                ErrorKind::UnsupportedConstruct,
                format!("a {} cannot be used as a statement", other.describe()),
            )
            .at(node)),
        }
    }

    /// Statements in a nested scope; names bound there for the first time
    /// go out of scope with the block, updates to outer names are kept.
    pub(crate) fn visit_block(&mut self, statements: &[AstNode]) -> Result<(), TranslationError> {
        self.ctx.symbols.push_scope();
        for statement in statements {
            if let Err(err) = self.visit_statement(statement) {
                self.ctx.symbols.pop_scope();
                return Err(err);
            }
        }
        let written = self.ctx.symbols.pop_scope();
        self.ctx.symbols.put_scope(written);
        Ok(())
    }

    fn visit_assignment(
        &mut self,
        node: &AstNode,
        targets: &[AssignTarget],
        value: &AstNode,
    ) -> Result<(), TranslationError> {
        let rhs = self.visit_expr(value)?;
        let values = match (targets.len(), rhs) {
            (1, Lowered::Single(v)) => vec![v],
            (1, Lowered::Multi(_)) => {
                return Err(TranslationError::new(
                    ErrorKind::ArityMismatch,
                    "trying to assign multiple results to a single variable",
                )
                .at(node));
            }
            (n, Lowered::Multi(values)) if values.len() == n => values,
            (n, Lowered::Multi(values)) => {
                return Err(TranslationError::new(
                    ErrorKind::ArityMismatch,
                    format!(
                        "right-hand side produces {} values, but {} variables are assigned",
                        values.len(),
                        n
                    ),
                )
                .at(node));
            }
            (n, Lowered::Single(_)) => {
                return Err(TranslationError::new(
                    ErrorKind::ArityMismatch,
                    format!("right-hand side produces 1 value, but {} variables are assigned", n),
                )
                .at(node));
            }
            (_, Lowered::Nothing) => {
                return Err(TranslationError::new(
                    ErrorKind::ArityMismatch,
                    "right-hand side of the assignment does not produce a value",
                )
                .at(node));
            }
        };
        for (target, value) in targets.iter().zip(values) {
            self.handle_assignment_part(node, target, value)?;
        }
        Ok(())
    }

    /// Bind `value` to one assignment target, writing through the target's
    /// indexing if it has any.
    pub(crate) fn handle_assignment_part(
        &mut self,
        node: &AstNode,
        target: &AssignTarget,
        value: ValueId,
    ) -> Result<(), TranslationError> {
        let name = &target.name;
        let location = node.location.as_ref();
        if self.ctx.symbols.get(name).is_some_and(|info| info.read_only) {
            return Err(TranslationError::new(
                ErrorKind::ReadOnlyAssignment,
                format!("trying to assign read-only variable {}", name),
            )
            .at(node));
        }

        let new_value = match &target.indexing {
            None => self.rename_if(value, location),
            Some(indexing) => {
                let Some(obj) = self.ctx.symbols.get(name).map(|info| info.value) else {
                    return Err(TranslationError::new(
                        ErrorKind::UndefinedVariable,
                        format!(
                            "cannot use left indexing on variable {} before a value has been assigned to it",
                            name
                        ),
                    )
                    .at(node));
                };
                let (rows, cols) = self.visit_indexing(indexing)?;
                self.write_indexed(node, obj, value, rows, cols)?
            }
        };
        self.ctx.symbols.put(name.clone(), SymbolInfo::writable(new_value));
        Ok(())
    }

    /// Values bound to a variable get a rename so every variable binding
    /// is a distinct SSA value.
    pub(crate) fn rename_if(&mut self, value: ValueId, location: Option<&Location>) -> ValueId {
        if self.ctx.symbols.binds_value(value) {
            let ty = self.type_of(value);
            self.create1(OpKind::Rename, vec![value], ty, location)
        } else {
            value
        }
    }

    fn visit_return(&mut self, node: &AstNode, values: &[AstNode]) -> Result<(), TranslationError> {
        if !self.ctx.in_function {
            return Err(TranslationError::new(
                ErrorKind::UnsupportedConstruct,
                "return statements are only allowed inside function definitions",
            )
            .at(node));
        }
        let operands = values
            .iter()
            .map(|value| self.visit_value(value))
            .collect::<Result<Vec<_>, _>>()?;
        self.create(OpKind::Return, operands, vec![], node.location.as_ref());
        Ok(())
    }
}
