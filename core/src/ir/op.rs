//! file: core/src/ir/op.rs
//! description: IR operations and the regions nested inside them.
//!
//! An `Op` consumes operand values, defines result values and may own
//! regions. Structured control flow (`if`, `while`, `for`, `parfor`) keeps
//! its bodies as regions whose last operation is a terminator.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::value::{Constant, ValueId, ValueTable};
use crate::location::Location;

#[derive(Debug, Clone, PartialEq)]
pub enum OpKind {
    Constant(Constant),
    Cast,
    Rename,

    EwAdd,
    EwSub,
    EwMul,
    EwDiv,
    EwPow,
    EwMod,
    EwMinus,
    EwSign,
    EwEq,
    EwNeq,
    EwLt,
    EwLe,
    EwGt,
    EwGe,
    EwAnd,
    EwOr,
    MatMul,
    Cond,

    NumRows,
    NumCols,
    Reshape,
    ExtractRow,
    ExtractCol,
    SliceRow,
    SliceCol,
    InsertRow,
    InsertCol,
    FilterRow,
    FilterCol,
    CreateFrame,

    If,
    While,
    For,
    ParFor,
    Condition,
    Yield,
    Return,

    GenericCall { callee: String },
    Builtin { name: String },
}

impl OpKind {
    pub fn name(&self) -> &str {
        match self {
            OpKind::Constant(_) => "constant",
            OpKind::Cast => "cast",
            OpKind::Rename => "rename",
            OpKind::EwAdd => "ew_add",
            OpKind::EwSub => "ew_sub",
            OpKind::EwMul => "ew_mul",
            OpKind::EwDiv => "ew_div",
            OpKind::EwPow => "ew_pow",
            OpKind::EwMod => "ew_mod",
            OpKind::EwMinus => "ew_minus",
            OpKind::EwSign => "ew_sign",
            OpKind::EwEq => "ew_eq",
            OpKind::EwNeq => "ew_neq",
            OpKind::EwLt => "ew_lt",
            OpKind::EwLe => "ew_le",
            OpKind::EwGt => "ew_gt",
            OpKind::EwGe => "ew_ge",
            OpKind::EwAnd => "ew_and",
            OpKind::EwOr => "ew_or",
            OpKind::MatMul => "mat_mul",
            OpKind::Cond => "cond",
            OpKind::NumRows => "num_rows",
            OpKind::NumCols => "num_cols",
            OpKind::Reshape => "reshape",
            OpKind::ExtractRow => "extract_row",
            OpKind::ExtractCol => "extract_col",
            OpKind::SliceRow => "slice_row",
            OpKind::SliceCol => "slice_col",
            OpKind::InsertRow => "insert_row",
            OpKind::InsertCol => "insert_col",
            OpKind::FilterRow => "filter_row",
            OpKind::FilterCol => "filter_col",
            OpKind::CreateFrame => "create_frame",
            OpKind::If => "if",
            OpKind::While => "while",
            OpKind::For => "for",
            OpKind::ParFor => "parfor",
            OpKind::Condition => "condition",
            OpKind::Yield => "yield",
            OpKind::Return => "return",
            OpKind::GenericCall { .. } => "generic_call",
            OpKind::Builtin { name } => name,
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self, OpKind::Yield | OpKind::Return | OpKind::Condition)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Op {
    pub kind: OpKind,
    pub operands: Vec<ValueId>,
    pub results: Vec<ValueId>,
    pub regions: Vec<Region>,
    pub attrs: BTreeMap<String, String>,
    pub location: Option<Location>,
}

/// A block of operations with block arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Region {
    pub args: Vec<ValueId>,
    pub ops: Vec<Op>,
}

impl Op {
    pub fn new(kind: OpKind, operands: Vec<ValueId>, results: Vec<ValueId>) -> Self {
        Op {
            kind,
            operands,
            results,
            regions: Vec::new(),
            attrs: BTreeMap::new(),
            location: None,
        }
    }

    pub fn with_regions(mut self, regions: Vec<Region>) -> Self {
        self.regions = regions;
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_location(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Deep copy with fresh result and block-argument values. `map` carries
    /// substitutions for operands and receives the old-to-new value pairs.
    pub fn clone_fresh(&self, map: &mut HashMap<ValueId, ValueId>, values: &mut ValueTable) -> Op {
        let operands = self
            .operands
            .iter()
            .map(|v| *map.get(v).unwrap_or(v))
            .collect();
        let results = self
            .results
            .iter()
            .map(|r| {
                let fresh = values.fresh_like(*r);
                map.insert(*r, fresh);
                fresh
            })
            .collect();
        let regions = self
            .regions
            .iter()
            .map(|region| {
                let args = region
                    .args
                    .iter()
                    .map(|a| {
                        let fresh = values.fresh_like(*a);
                        map.insert(*a, fresh);
                        fresh
                    })
                    .collect();
                let ops = region.ops.iter().map(|op| op.clone_fresh(map, values)).collect();
                Region { args, ops }
            })
            .collect();
        Op {
            kind: self.kind.clone(),
            operands,
            results,
            regions,
            attrs: self.attrs.clone(),
            location: self.location.clone(),
        }
    }
}

impl Region {
    pub fn new(args: Vec<ValueId>, ops: Vec<Op>) -> Self {
        Region { args, ops }
    }

    pub fn terminator(&self) -> Option<&Op> {
        self.ops.last().filter(|op| op.kind.is_terminator())
    }
}

/// Rewrites every use of a key of `map` in `ops`, nested regions included.
pub fn replace_uses(ops: &mut [Op], map: &HashMap<ValueId, ValueId>) {
    if map.is_empty() {
        return;
    }
    for op in ops {
        for operand in op.operands.iter_mut() {
            if let Some(new) = map.get(operand) {
                *operand = *new;
            }
        }
        for region in op.regions.iter_mut() {
            replace_uses(&mut region.ops, map);
        }
    }
}

/// Values defined inside `ops`: results and nested block arguments.
pub fn defined_values(ops: &[Op], out: &mut HashSet<ValueId>) {
    for op in ops {
        out.extend(op.results.iter().copied());
        for region in &op.regions {
            out.extend(region.args.iter().copied());
            defined_values(&region.ops, out);
        }
    }
}

/// Values used by `ops` but defined outside them, in first-use order.
pub fn free_values(ops: &[Op], bound: &HashSet<ValueId>) -> Vec<ValueId> {
    let mut defined = bound.clone();
    defined_values(ops, &mut defined);
    let mut seen = HashSet::new();
    let mut free = Vec::new();
    collect_uses(ops, &defined, &mut seen, &mut free);
    free
}

fn collect_uses(
    ops: &[Op],
    defined: &HashSet<ValueId>,
    seen: &mut HashSet<ValueId>,
    free: &mut Vec<ValueId>,
) {
    for op in ops {
        for operand in &op.operands {
            if !defined.contains(operand) && seen.insert(*operand) {
                free.push(*operand);
            }
        }
        for region in &op.regions {
            collect_uses(&region.ops, defined, seen, free);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::Type;

    #[test]
    fn replace_uses_reaches_nested_regions() {
        let inner = Op::new(OpKind::EwAdd, vec![ValueId(0), ValueId(0)], vec![ValueId(2)]);
        let mut ops = vec![Op::new(OpKind::If, vec![ValueId(1)], vec![])
            .with_regions(vec![Region::new(vec![], vec![inner])])];
        let map = HashMap::from([(ValueId(0), ValueId(9))]);
        replace_uses(&mut ops, &map);
        assert_eq!(ops[0].regions[0].ops[0].operands, vec![ValueId(9), ValueId(9)]);
        assert_eq!(ops[0].operands, vec![ValueId(1)]);
    }

    #[test]
    fn free_values_skip_local_definitions() {
        let ops = vec![
            Op::new(OpKind::EwAdd, vec![ValueId(0), ValueId(1)], vec![ValueId(3)]),
            Op::new(OpKind::EwMul, vec![ValueId(3), ValueId(2)], vec![ValueId(4)]),
        ];
        let bound = HashSet::from([ValueId(1)]);
        assert_eq!(free_values(&ops, &bound), vec![ValueId(0), ValueId(2)]);
    }

    #[test]
    fn clone_fresh_renumbers_results() {
        let mut values = ValueTable::new();
        let a = values.fresh(Type::Unknown);
        let b = values.fresh(Type::Unknown);
        let op = Op::new(OpKind::EwMinus, vec![a], vec![b]);
        let mut map = HashMap::new();
        let copy = op.clone_fresh(&mut map, &mut values);
        assert_eq!(copy.operands, vec![a]);
        assert_ne!(copy.results, vec![b]);
        assert_eq!(map.get(&b), Some(&copy.results[0]));
    }
}
