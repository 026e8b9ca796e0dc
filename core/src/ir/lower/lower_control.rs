//! file: core/src/ir/lower/lower_control.rs
//! description: structured control flow.
//!
//! Branch and loop bodies are built in their own op block and symbol scope.
//! Popping the scope yields the write-set: the pre-existing variables the
//! body rebound. Those become the results of the structured op (and the
//! loop-carried values of loops) and are rebound to its results afterwards.

use std::collections::{HashMap, HashSet};

use super::Translator;
use super::err::{ErrorKind, TranslationError};
use crate::ast::AstNode;
use crate::ir::op::{self, Op, OpKind, Region};
use crate::ir::types::{Type, ValueType};
use crate::ir::value::ValueId;
use crate::location::Location;
use crate::symbols::{Scope, SymbolInfo, merge_symbols};

/// A variable rebound inside a loop body.
struct Carried {
    name: String,
    old: ValueId,
    new: ValueId,
    ty: Type,
}

impl Translator<'_> {
    pub(crate) fn visit_if(
        &mut self,
        node: &AstNode,
        condition: &AstNode,
        then_branch: &AstNode,
        else_branch: Option<&AstNode>,
    ) -> Result<(), TranslationError> {
        let location = node.location.as_ref();
        let cond = self.visit_value(condition)?;
        let cond = self.cast_bool_if(cond, location);

        let (then_written, mut then_ops) = self.visit_region_body(then_branch)?;
        let (else_written, mut else_ops) = match else_branch {
            Some(branch) => self.visit_region_body(branch)?,
            None => (Scope::new(), Vec::new()),
        };

        let names = merge_symbols(&then_written, &else_written);
        let mut then_results = Vec::with_capacity(names.len());
        let mut else_results = Vec::with_capacity(names.len());
        let mut result_types = Vec::with_capacity(names.len());
        for name in &names {
            let then_value = self.branch_value(node, name, &then_written)?;
            let else_value = self.branch_value(node, name, &else_written)?;
            let then_type = self.type_of(then_value);
            let else_type = self.type_of(else_value);
            if !then_type.equal_unknown_aware(&else_type) {
                return Err(TranslationError::new(
                    ErrorKind::TypeAmbiguity,
                    format!(
                        "type of variable `{}` after if-statement is ambiguous, could be either {} (then-branch) or {} (else-branch)",
                        name, then_type, else_type
                    ),
                )
                .at(node));
            }
            then_results.push(then_value);
            else_results.push(else_value);
            result_types.push(then_type.unify(&else_type));
        }

        close_branch(&mut then_ops, then_results, location);
        let mut regions = vec![Region::new(vec![], then_ops)];
        if else_branch.is_some() || !names.is_empty() {
            close_branch(&mut else_ops, else_results, location);
            regions.push(Region::new(vec![], else_ops));
        }

        let results: Vec<ValueId> = result_types
            .into_iter()
            .map(|ty| self.module.values.fresh(ty))
            .collect();
        let op = Op::new(OpKind::If, vec![cond], results.clone())
            .with_regions(regions)
            .with_location(location.cloned());
        self.builder.emit_op(op);
        log::debug!("built if-statement with {} result(s)", results.len());

        for (name, result) in names.into_iter().zip(results) {
            self.ctx.symbols.put(name, SymbolInfo::writable(result));
        }
        Ok(())
    }

    /// Translate `body` into a fresh block under a fresh scope, returning its
    /// write-set and ops.
    fn visit_region_body(&mut self, body: &AstNode) -> Result<(Scope, Vec<Op>), TranslationError> {
        self.ctx.symbols.push_scope();
        self.builder.push_block();
        self.visit_statement(body)?;
        let written = self.ctx.symbols.pop_scope();
        Ok((written, self.builder.pop_block()))
    }

    fn branch_value(
        &self,
        node: &AstNode,
        name: &str,
        written: &Scope,
    ) -> Result<ValueId, TranslationError> {
        self.ctx
            .symbols
            .get_in(name, written)
            .map(|info| info.value)
            .ok_or_else(|| {
                TranslationError::new(
                    ErrorKind::UndefinedVariable,
                    format!("variable `{}` referenced before assignment", name),
                )
                .at(node)
            })
    }

    pub(crate) fn visit_while(
        &mut self,
        node: &AstNode,
        condition: &AstNode,
        body: &AstNode,
        do_while: bool,
    ) -> Result<(), TranslationError> {
        let location = node.location.as_ref();

        let (written, mut before_ops, mut after_ops, cond) = if do_while {
            self.builder.push_block();
            // the condition sees the body's updates but not its new names
            self.ctx.symbols.push_scope();
            self.ctx.symbols.push_scope();
            self.visit_statement(body)?;
            let written = self.ctx.symbols.pop_scope();
            self.ctx.symbols.put_scope(written.clone());
            let cond = self.visit_value(condition)?;
            let cond = self.cast_bool_if(cond, location);
            self.ctx.symbols.pop_scope();
            (written, self.builder.pop_block(), Vec::new(), cond)
        } else {
            self.builder.push_block();
            let cond = self.visit_value(condition)?;
            let cond = self.cast_bool_if(cond, location);
            let before_ops = self.builder.pop_block();
            let (written, after_ops) = self.visit_region_body(body)?;
            (written, before_ops, after_ops, cond)
        };

        let carried = self.loop_carried(node, &written, None)?;
        let olds: Vec<ValueId> = carried.iter().map(|c| c.old).collect();
        let news: Vec<ValueId> = carried.iter().map(|c| c.new).collect();
        let before_args = self.fresh_args(&carried);
        let after_args = self.fresh_args(&carried);

        if do_while {
            before_ops.push(Op::new(OpKind::Condition, prepend(cond, news), vec![]));
            after_ops.push(Op::new(OpKind::Yield, after_args.clone(), vec![]));
        } else {
            before_ops.push(Op::new(OpKind::Condition, prepend(cond, olds.clone()), vec![]));
            after_ops.push(Op::new(OpKind::Yield, news, vec![]));
        }
        op::replace_uses(&mut before_ops, &substitution(&olds, &before_args));
        op::replace_uses(&mut after_ops, &substitution(&olds, &after_args));

        let results = self.fresh_args(&carried);
        let op = Op::new(OpKind::While, olds, results.clone())
            .with_regions(vec![
                Region::new(before_args, before_ops),
                Region::new(after_args, after_ops),
            ])
            .with_attr("do_while", do_while.to_string())
            .with_location(location.cloned());
        self.builder.emit_op(op);
        log::debug!(
            "built {} with {} loop-carried value(s)",
            if do_while { "do-while-loop" } else { "while-loop" },
            results.len()
        );

        self.rebind(carried, results);
        Ok(())
    }

    /// `for (var in from:to:step)`: inclusive bounds, counting down when
    /// the step (or, without a step, `to < from`) says so. The loop itself
    /// always counts upwards over the bounds multiplied by the direction.
    pub(crate) fn visit_for(
        &mut self,
        node: &AstNode,
        var: &str,
        from: &AstNode,
        to: &AstNode,
        step: Option<&AstNode>,
        body: &AstNode,
    ) -> Result<(), TranslationError> {
        let location = node.location.as_ref();
        let si64 = Type::Scalar(ValueType::SI64);

        let from = self.visit_value(from)?;
        let from = self.cast_si64_if(from, location);
        let to = self.visit_value(to)?;
        let to = self.cast_si64_if(to, location);
        let (step, direction) = match step {
            Some(step) => {
                let step = self.visit_value(step)?;
                let step = self.cast_si64_if(step, location);
                let direction = self.create1(OpKind::EwSign, vec![step], si64.clone(), location);
                (step, direction)
            }
            None => {
                // -1 + 2 * (to >= from)
                let minus_one = self.const_i64(-1, location);
                let two = self.const_i64(2, location);
                let ascending = self.create1(OpKind::EwGe, vec![to, from], si64.clone(), location);
                let doubled = self.create1(OpKind::EwMul, vec![two, ascending], si64.clone(), location);
                let step = self.create1(OpKind::EwAdd, vec![minus_one, doubled], si64.clone(), location);
                (step, step)
            }
        };
        let to = self.create1(OpKind::EwAdd, vec![to, direction], si64.clone(), location);
        let from = self.create1(OpKind::EwMul, vec![from, direction], si64.clone(), location);
        let to = self.create1(OpKind::EwMul, vec![to, direction], si64.clone(), location);
        let step = self.create1(OpKind::EwMul, vec![step, direction], si64.clone(), location);
        let from = self.cast_index_if(from, location);
        let to = self.cast_index_if(to, location);
        let step = self.cast_index_if(step, location);

        let induction = self.module.values.fresh(Type::Scalar(ValueType::Index));
        self.builder.push_block();
        self.ctx.symbols.push_scope();
        let counter = self.cast_si64_if(induction, location);
        let visible = self.create1(OpKind::EwMul, vec![counter, direction], si64, location);
        self.ctx.symbols.put(var, SymbolInfo::read_only(visible));
        self.visit_statement(body)?;
        let written = self.ctx.symbols.pop_scope();
        let mut body_ops = self.builder.pop_block();

        let carried = self.loop_carried(node, &written, Some(var))?;
        let olds: Vec<ValueId> = carried.iter().map(|c| c.old).collect();
        let news: Vec<ValueId> = carried.iter().map(|c| c.new).collect();
        let iter_args = self.fresh_args(&carried);
        body_ops.push(Op::new(OpKind::Yield, news, vec![]));
        op::replace_uses(&mut body_ops, &substitution(&olds, &iter_args));

        let results = self.fresh_args(&carried);
        let mut operands = vec![from, to, step];
        operands.extend(olds);
        let op = Op::new(OpKind::For, operands, results.clone())
            .with_regions(vec![Region::new(prepend(induction, iter_args), body_ops)])
            .with_location(location.cloned());
        self.builder.emit_op(op);
        log::debug!("built for-loop over `{}` with {} loop-carried value(s)", var, results.len());

        self.rebind(carried, results);
        Ok(())
    }

    /// `parfor (var in from:to:step)`: the body becomes a closed region.
    /// Every value it uses from outside, loop-carried or not, is passed in
    /// as an operand and received as a region argument.
    pub(crate) fn visit_parfor(
        &mut self,
        node: &AstNode,
        var: &str,
        from: &AstNode,
        to: &AstNode,
        step: Option<&AstNode>,
        body: &AstNode,
    ) -> Result<(), TranslationError> {
        let location = node.location.as_ref();
        let from = self.visit_value(from)?;
        let from = self.cast_si64_if(from, location);
        let to = self.visit_value(to)?;
        let to = self.cast_si64_if(to, location);
        let step = match step {
            Some(step) => {
                let step = self.visit_value(step)?;
                self.cast_si64_if(step, location)
            }
            None => self.const_i64(1, location),
        };

        let induction = self.module.values.fresh(Type::Scalar(ValueType::Index));
        self.builder.push_block();
        self.ctx.symbols.push_scope();
        self.ctx.symbols.put(var, SymbolInfo::writable(induction));
        self.visit_statement(body)?;
        let written = self.ctx.symbols.pop_scope();
        let mut body_ops = self.builder.pop_block();

        let carried = self.loop_carried(node, &written, Some(var))?;
        let news: Vec<ValueId> = carried.iter().map(|c| c.new).collect();
        let mut captured: Vec<ValueId> = carried.iter().map(|c| c.old).collect();
        let bound = HashSet::from([induction]);
        for value in op::free_values(&body_ops, &bound) {
            if !captured.contains(&value) {
                captured.push(value);
            }
        }
        body_ops.push(Op::new(OpKind::Return, news, vec![]));

        let args: Vec<ValueId> = captured
            .iter()
            .map(|value| self.module.values.fresh_like(*value))
            .collect();
        op::replace_uses(&mut body_ops, &substitution(&captured, &args));

        let results = self.fresh_args(&carried);
        let mut operands = vec![from, to, step];
        operands.extend(captured);
        let op = Op::new(OpKind::ParFor, operands, results.clone())
            .with_regions(vec![Region::new(prepend(induction, args), body_ops)])
            .with_location(location.cloned());
        self.builder.emit_op(op);
        log::debug!("built parfor-loop over `{}` with {} result(s)", var, results.len());

        self.rebind(carried, results);
        Ok(())
    }

    /// Pairs every rebound name of `written` with its pre-loop value. The
    /// loop variable itself is never carried.
    fn loop_carried(
        &self,
        node: &AstNode,
        written: &Scope,
        loop_var: Option<&str>,
    ) -> Result<Vec<Carried>, TranslationError> {
        let mut carried = Vec::with_capacity(written.len());
        for (name, info) in written {
            if loop_var == Some(name.as_str()) {
                continue;
            }
            let old = self.branch_value(node, name, &Scope::new())?;
            let old_type = self.type_of(old);
            let new_type = self.type_of(info.value);
            if !new_type.equal_unknown_aware(&old_type) {
                return Err(TranslationError::new(
                    ErrorKind::TypeAmbiguity,
                    format!(
                        "type of variable `{}` changes within the loop body from {} to {}",
                        name, old_type, new_type
                    ),
                )
                .at(node));
            }
            carried.push(Carried {
                name: name.clone(),
                old,
                new: info.value,
                ty: new_type.unify(&old_type),
            });
        }
        Ok(carried)
    }

    fn fresh_args(&mut self, carried: &[Carried]) -> Vec<ValueId> {
        carried
            .iter()
            .map(|c| self.module.values.fresh(c.ty.clone()))
            .collect()
    }

    fn rebind(&mut self, carried: Vec<Carried>, results: Vec<ValueId>) {
        for (c, result) in carried.into_iter().zip(results) {
            self.ctx.symbols.put(c.name, SymbolInfo::writable(result));
        }
    }
}

/// Terminate a branch with a yield of `values`; a branch already ending in
/// a return is left for the early-return rewrite.
fn close_branch(ops: &mut Vec<Op>, values: Vec<ValueId>, location: Option<&Location>) {
    if matches!(ops.last(), Some(last) if last.kind == OpKind::Return) {
        return;
    }
    ops.push(Op::new(OpKind::Yield, values, vec![]).with_location(location.cloned()));
}

fn prepend(first: ValueId, rest: Vec<ValueId>) -> Vec<ValueId> {
    let mut values = Vec::with_capacity(rest.len() + 1);
    values.push(first);
    values.extend(rest);
    values
}

fn substitution(from: &[ValueId], to: &[ValueId]) -> HashMap<ValueId, ValueId> {
    from.iter().copied().zip(to.iter().copied()).collect()
}
