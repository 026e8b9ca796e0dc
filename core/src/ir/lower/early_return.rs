//! file: core/src/ir/lower/early_return.rs
//! description: rewrites returns nested in if-statements.
//!
//! A function body must end in its only top-level return. A return nested
//! inside an `if` is lifted one level at a time: the `if` becomes a
//! value-yielding `if` whose returning branch yields the returned values,
//! while the other branch receives everything that would have run after
//! the `if` (moved when it sits in the same block, cloned when it sits
//! further out). The rebuilt `if` is followed by a return of its results.
//! Returns inside `parfor` bodies terminate the loop body and are skipped.

use std::collections::HashMap;

use super::err::{ErrorKind, TranslationError};
use crate::ir::module::IrModule;
use crate::ir::op::{self, Op, OpKind, Region};
use crate::ir::value::ValueId;
use crate::location::Location;

/// `(op index, region index)` steps from the function body to a block.
type BlockPath = Vec<(usize, usize)>;

pub(crate) fn rectify_early_returns(
    body: &mut Vec<Op>,
    module: &mut IrModule,
) -> Result<(), TranslationError> {
    loop {
        let mut deepest = None;
        find_deepest_return(body, &mut Vec::new(), &mut deepest);
        let Some((path, index)) = deepest else {
            return Ok(());
        };

        if path.is_empty() {
            if index + 1 < body.len() {
                let location = body[index].location.clone();
                let dropped = body.split_off(index + 1);
                warn_unreachable(&dropped, location.as_ref(), module);
            }
            return Ok(());
        }

        let (if_block_path, last) = path.split_at(path.len() - 1);
        let (if_index, _) = last[0];
        let parent = &block_at(body, if_block_path)[if_index];
        if parent.kind != OpKind::If {
            return Err(TranslationError::new(
                ErrorKind::UnsupportedConstruct,
                format!("early return inside `{}` is not supported", parent.kind.name()),
            )
            .at_location(parent.location.as_ref()));
        }
        rectify_if(body, if_block_path, if_index, module)?;
    }
}

/// Pre-order search; the first return found at the greatest depth wins.
fn find_deepest_return(ops: &[Op], path: &mut BlockPath, best: &mut Option<(BlockPath, usize)>) {
    for (i, op) in ops.iter().enumerate() {
        if op.kind == OpKind::Return
            && best.as_ref().is_none_or(|(found, _)| path.len() > found.len())
        {
            *best = Some((path.clone(), i));
        }
        if op.kind == OpKind::ParFor {
            continue;
        }
        for (r, region) in op.regions.iter().enumerate() {
            path.push((i, r));
            find_deepest_return(&region.ops, path, best);
            path.pop();
        }
    }
}

fn block_at<'a>(mut ops: &'a [Op], path: &[(usize, usize)]) -> &'a [Op] {
    for &(op_index, region_index) in path {
        ops = &ops[op_index].regions[region_index].ops;
    }
    ops
}

fn block_at_mut<'a>(mut ops: &'a mut Vec<Op>, path: &[(usize, usize)]) -> &'a mut Vec<Op> {
    for &(op_index, region_index) in path {
        ops = &mut ops[op_index].regions[region_index].ops;
    }
    ops
}

/// Replace the `if` at `block_path[..]/if_index` by a value-yielding `if`
/// followed by a return of its results.
fn rectify_if(
    body: &mut Vec<Op>,
    block_path: &[(usize, usize)],
    if_index: usize,
    module: &mut IrModule,
) -> Result<(), TranslationError> {
    let (if_op, tail) = {
        let block = block_at_mut(body, block_path);
        let tail = block.split_off(if_index + 1);
        let if_op = block.pop();
        (if_op, tail)
    };
    let Some(if_op) = if_op else {
        return Ok(());
    };
    let location = if_op.location.clone();

    let mut regions = if_op.regions.clone();
    if regions.len() < 2 {
        regions.push(Region::default());
    }

    let mut tail = Some(tail);
    for region in regions.iter_mut() {
        match region.ops.iter().position(|op| op.kind == OpKind::Return) {
            Some(at) => {
                let dropped = region.ops.split_off(at + 1);
                warn_unreachable(&dropped, region.ops[at].location.as_ref(), module);
            }
            None => {
                let mut map = HashMap::new();
                if region.ops.last().is_some_and(|op| op.kind == OpKind::Yield) {
                    if let Some(yield_op) = region.ops.pop() {
                        map.extend(if_op.results.iter().copied().zip(yield_op.operands));
                    }
                }
                let local = tail.take().unwrap_or_default();
                let continuation = continuation(body, block_path, local, &mut map, module)?;
                region.ops.extend(continuation);
            }
        }
        match region.ops.last_mut() {
            Some(last) if last.kind == OpKind::Return => last.kind = OpKind::Yield,
            _ => {
                return Err(TranslationError::new(
                    ErrorKind::UnsupportedConstruct,
                    "function with an early return must end with a return statement",
                )
                .at_location(location.as_ref()));
            }
        }
    }
    if let Some(unused) = tail {
        warn_unreachable(&unused, location.as_ref(), module);
    }

    let then_values = yielded(&regions[0]);
    let else_values = yielded(&regions[1]);
    if then_values.len() != else_values.len() {
        return Err(TranslationError::new(
            ErrorKind::ArityMismatch,
            format!(
                "branches of the if-statement return different numbers of values ({} vs. {})",
                then_values.len(),
                else_values.len()
            ),
        )
        .at_location(location.as_ref()));
    }
    let mut results = Vec::with_capacity(then_values.len());
    for (i, (t, e)) in then_values.iter().zip(&else_values).enumerate() {
        let then_type = module.values.type_of(*t).clone();
        let else_type = module.values.type_of(*e).clone();
        if !then_type.equal_unknown_aware(&else_type) {
            return Err(TranslationError::new(
                ErrorKind::TypeAmbiguity,
                format!(
                    "type of return value #{} is ambiguous, could be either {} (then-branch) or {} (else-branch)",
                    i, then_type, else_type
                ),
            )
            .at_location(location.as_ref()));
        }
        results.push(module.values.fresh(then_type.unify(&else_type)));
    }

    let rebuilt = Op::new(OpKind::If, if_op.operands.clone(), results.clone())
        .with_regions(regions)
        .with_location(location.clone());
    let ret = Op::new(OpKind::Return, results, vec![]).with_location(location);
    let block = block_at_mut(body, block_path);
    block.push(rebuilt);
    block.push(ret);
    Ok(())
}

fn yielded(region: &Region) -> Vec<ValueId> {
    region
        .ops
        .last()
        .map(|op| op.operands.clone())
        .unwrap_or_default()
}

/// Everything that runs after the `if` up to the next return: the rest of
/// its own block (moved), then the rest of each enclosing block (cloned),
/// leaving each enclosing `if` through its yield.
fn continuation(
    body: &[Op],
    block_path: &[(usize, usize)],
    local: Vec<Op>,
    map: &mut HashMap<ValueId, ValueId>,
    module: &mut IrModule,
) -> Result<Vec<Op>, TranslationError> {
    let mut out = Vec::new();
    let mut pending = local;
    op::replace_uses(&mut pending, map);
    let mut level = block_path.len();
    loop {
        let last_kind = pending.last().map(|op| op.kind.clone());
        match last_kind {
            Some(OpKind::Return) => {
                out.extend(pending);
                return Ok(out);
            }
            Some(OpKind::Yield) if level > 0 => {
                let yield_op = pending.pop();
                out.extend(pending);
                let (parent_index, _) = block_path[level - 1];
                let parent_block = block_at(body, &block_path[..level - 1]);
                let parent = &parent_block[parent_index];
                if parent.kind != OpKind::If {
                    return Err(TranslationError::new(
                        ErrorKind::UnsupportedConstruct,
                        format!("early return inside `{}` is not supported", parent.kind.name()),
                    )
                    .at_location(parent.location.as_ref()));
                }
                if let Some(yield_op) = yield_op {
                    map.extend(parent.results.iter().copied().zip(yield_op.operands));
                }
                pending = parent_block[parent_index + 1..]
                    .iter()
                    .map(|op| op.clone_fresh(map, &mut module.values))
                    .collect();
                level -= 1;
            }
            Some(other) if other.is_terminator() => {
                return Err(TranslationError::new(
                    ErrorKind::UnsupportedConstruct,
                    format!(
                        "early return inside a block ending in `{}` is not supported",
                        other.name()
                    ),
                ));
            }
            _ => {
                out.extend(pending);
                return Ok(out);
            }
        }
    }
}

fn warn_unreachable(dropped: &[Op], location: Option<&Location>, module: &mut IrModule) {
    for op in dropped {
        if op.kind == OpKind::Yield || (op.kind == OpKind::Return && op.operands.is_empty()) {
            continue;
        }
        let message = format!(
            "operation `{}` is ignored, as the function returns before it",
            op.kind.name()
        );
        let at = op.location.as_ref().or(location);
        match at {
            Some(loc) => log::warn!("{} (at {})", message, loc),
            None => log::warn!("{}", message),
        }
        module.warn(message, at.cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::{Type, ValueType};

    fn scalar(module: &mut IrModule) -> ValueId {
        module.values.fresh(Type::Scalar(ValueType::SI64))
    }

    #[test]
    fn trailing_ops_after_top_level_return_are_dropped() {
        let mut module = IrModule::new();
        let a = scalar(&mut module);
        let b = scalar(&mut module);
        let mut body = vec![
            Op::new(OpKind::Return, vec![a], vec![]),
            Op::new(OpKind::EwAdd, vec![a, a], vec![b]),
            Op::new(OpKind::Return, vec![b], vec![]),
        ];
        rectify_early_returns(&mut body, &mut module).unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(module.diagnostics.len(), 2);
    }

    #[test]
    fn return_in_then_branch_becomes_yield() {
        let mut module = IrModule::new();
        let cond = module.values.fresh(Type::Scalar(ValueType::Bool));
        let one = scalar(&mut module);
        let two = scalar(&mut module);
        let then_region = Region::new(vec![], vec![Op::new(OpKind::Return, vec![one], vec![])]);
        let mut body = vec![
            Op::new(OpKind::If, vec![cond], vec![]).with_regions(vec![then_region]),
            Op::new(OpKind::Return, vec![two], vec![]),
        ];
        rectify_early_returns(&mut body, &mut module).unwrap();

        assert_eq!(body.len(), 2);
        assert_eq!(body[0].kind, OpKind::If);
        assert_eq!(body[0].results.len(), 1);
        assert_eq!(body[1].kind, OpKind::Return);
        assert_eq!(body[1].operands, body[0].results);
        let then_ops = &body[0].regions[0].ops;
        let else_ops = &body[0].regions[1].ops;
        assert_eq!(then_ops.last().map(|op| &op.kind), Some(&OpKind::Yield));
        assert_eq!(then_ops.last().map(|op| op.operands.clone()), Some(vec![one]));
        assert_eq!(else_ops.last().map(|op| op.operands.clone()), Some(vec![two]));
    }

    #[test]
    fn return_inside_while_is_rejected() {
        let mut module = IrModule::new();
        let a = scalar(&mut module);
        let after = Region::new(vec![], vec![Op::new(OpKind::Return, vec![a], vec![])]);
        let mut body = vec![
            Op::new(OpKind::While, vec![], vec![]).with_regions(vec![Region::default(), after]),
            Op::new(OpKind::Return, vec![], vec![]),
        ];
        let err = rectify_early_returns(&mut body, &mut module).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedConstruct);
    }
}
