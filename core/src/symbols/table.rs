use std::collections::{BTreeMap, BTreeSet};

use super::symbol::SymbolInfo;
use crate::ir::ValueId;

/// One level of the table. Ordered so that anything iterating a scope
/// (branch merges, loop-carried values) produces the same IR every run.
pub type Scope = BTreeMap<String, SymbolInfo>;

#[derive(Debug, Clone, PartialEq)]
pub struct ScopedSymbolTable {
    scopes: Vec<Scope>,
}

impl Default for ScopedSymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopedSymbolTable {
    /// A table holding only the outermost scope.
    pub fn new() -> Self {
        ScopedSymbolTable {
            scopes: vec![Scope::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Removes the innermost scope and returns the write-set: the bindings
    /// it made for names that are still visible in an enclosing scope.
    /// Names first defined in the popped scope are dropped.
    pub fn pop_scope(&mut self) -> Scope {
        let popped = self.scopes.pop().unwrap_or_default();
        if self.scopes.is_empty() {
            self.scopes.push(Scope::new());
        }
        popped
            .into_iter()
            .filter(|(name, _)| self.has(name))
            .collect()
    }

    /// Takes every binding of the innermost scope, leaving it empty.
    pub fn take_scope(&mut self) -> Scope {
        self.scopes.last_mut().map(std::mem::take).unwrap_or_default()
    }

    pub fn num_scopes(&self) -> usize {
        self.scopes.len()
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Innermost binding of `name`.
    pub fn get(&self, name: &str) -> Option<&SymbolInfo> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Looks `name` up in `scope` first, then in the table.
    pub fn get_in<'a>(&'a self, name: &str, scope: &'a Scope) -> Option<&'a SymbolInfo> {
        scope.get(name).or_else(|| self.get(name))
    }

    pub fn put(&mut self, name: impl Into<String>, info: SymbolInfo) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), info);
        }
    }

    /// Merges all bindings of `scope` into the innermost scope.
    pub fn put_scope(&mut self, scope: Scope) {
        for (name, info) in scope {
            self.put(name, info);
        }
    }

    /// Whether some visible name is currently bound to `value`.
    pub fn binds_value(&self, value: ValueId) -> bool {
        self.scopes
            .iter()
            .any(|scope| scope.values().any(|info| info.value == value))
    }

    /// Names bound in the innermost scope, in order.
    pub fn top_names(&self) -> impl Iterator<Item = &String> {
        self.scopes.last().into_iter().flat_map(|scope| scope.keys())
    }
}

/// Sorted union of the names bound in two scopes.
pub fn merge_symbols(a: &Scope, b: &Scope) -> BTreeSet<String> {
    a.keys().chain(b.keys()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(v: u32) -> SymbolInfo {
        SymbolInfo::writable(ValueId(v))
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let mut table = ScopedSymbolTable::new();
        table.put("x", info(0));
        table.push_scope();
        table.put("x", info(1));
        assert_eq!(table.get("x").map(|s| s.value), Some(ValueId(1)));
        table.pop_scope();
        assert_eq!(table.get("x").map(|s| s.value), Some(ValueId(0)));
    }

    #[test]
    fn pop_returns_only_overwritten_names() {
        let mut table = ScopedSymbolTable::new();
        table.put("x", info(0));
        table.push_scope();
        table.put("x", info(1));
        table.put("local", info(2));
        let written = table.pop_scope();
        assert_eq!(written.keys().collect::<Vec<_>>(), vec!["x"]);
        assert!(!table.has("local"));
    }

    #[test]
    fn get_in_prefers_the_given_scope() {
        let mut table = ScopedSymbolTable::new();
        table.put("x", info(0));
        let mut branch = Scope::new();
        branch.insert("x".to_string(), info(4));
        assert_eq!(table.get_in("x", &branch).map(|s| s.value), Some(ValueId(4)));
        assert_eq!(table.get_in("x", &Scope::new()).map(|s| s.value), Some(ValueId(0)));
    }

    #[test]
    fn merge_symbols_is_sorted_union() {
        let mut a = Scope::new();
        a.insert("z".to_string(), info(0));
        a.insert("a".to_string(), info(1));
        let mut b = Scope::new();
        b.insert("m".to_string(), info(2));
        b.insert("a".to_string(), info(3));
        let names: Vec<String> = merge_symbols(&a, &b).into_iter().collect();
        assert_eq!(names, vec!["a", "m", "z"]);
    }

    #[test]
    fn binds_value_searches_all_scopes() {
        let mut table = ScopedSymbolTable::new();
        table.put("x", info(3));
        table.push_scope();
        assert!(table.binds_value(ValueId(3)));
        assert!(!table.binds_value(ValueId(4)));
    }
}
