//! file: core/src/ir/lower/declare_builtins.rs
//! description: table of built-in functions callable from scripts.
//!
//! Calls that do not resolve to a user-defined function are looked up here.
//! Each entry fixes the accepted argument count and how many results the
//! lowered `Builtin` op defines.
//!

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BuiltinSpec {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    pub results: usize,
}

const fn builtin(name: &'static str, min_args: usize, max_args: usize, results: usize) -> BuiltinSpec {
    BuiltinSpec {
        name,
        min_args,
        max_args,
        results,
    }
}

const BUILTINS: &[BuiltinSpec] = &[
    // data generation
    builtin("fill", 3, 3, 1),
    builtin("rand", 6, 6, 1),
    builtin("seq", 2, 3, 1),
    builtin("diagMatrix", 1, 1, 1),
    builtin("sample", 4, 4, 1),
    // shape
    builtin("nrow", 1, 1, 1),
    builtin("ncol", 1, 1, 1),
    builtin("ncell", 1, 1, 1),
    builtin("reshape", 3, 3, 1),
    builtin("t", 1, 1, 1),
    builtin("cbind", 2, 2, 1),
    builtin("rbind", 2, 2, 1),
    builtin("reverse", 1, 1, 1),
    builtin("order", 2, 4, 1),
    // aggregation
    builtin("sum", 1, 2, 1),
    builtin("aggMin", 1, 1, 1),
    builtin("aggMax", 1, 1, 1),
    builtin("mean", 1, 2, 1),
    builtin("stddev", 1, 2, 1),
    builtin("cumSum", 1, 1, 1),
    // element-wise math
    builtin("abs", 1, 1, 1),
    builtin("sign", 1, 1, 1),
    builtin("sqrt", 1, 1, 1),
    builtin("exp", 1, 1, 1),
    builtin("ln", 1, 1, 1),
    builtin("round", 1, 1, 1),
    builtin("floor", 1, 1, 1),
    builtin("ceil", 1, 1, 1),
    builtin("min", 2, 2, 1),
    builtin("max", 2, 2, 1),
    // linear algebra
    builtin("solve", 2, 2, 1),
    builtin("eigen", 1, 1, 2),
    builtin("syrk", 1, 1, 1),
    // frames and labels
    builtin("setColLabels", 2, 2, 1),
    builtin("setColLabelsPrefix", 2, 2, 1),
    builtin("createFrame", 1, usize::MAX, 1),
    // higher-order
    builtin("map", 2, 2, 1),
    // I/O and control
    builtin("print", 1, 3, 0),
    builtin("readMatrix", 1, 1, 1),
    builtin("readFrame", 1, 1, 1),
    builtin("writeMatrix", 2, 2, 0),
    builtin("writeFrame", 2, 2, 0),
    builtin("stop", 0, 1, 0),
    builtin("now", 0, 0, 1),
];

pub(crate) fn lookup_builtin(name: &str) -> Option<&'static BuiltinSpec> {
    BUILTINS.iter().find(|spec| spec.name == name)
}

impl BuiltinSpec {
    pub fn accepts(&self, arg_count: usize) -> bool {
        arg_count >= self.min_args && arg_count <= self.max_args
    }

    /// Human-readable expected argument count for diagnostics.
    pub fn expected_args(&self) -> String {
        if self.min_args == self.max_args {
            format!("{}", self.min_args)
        } else if self.max_args == usize::MAX {
            format!("at least {}", self.min_args)
        } else {
            format!("between {} and {}", self.min_args, self.max_args)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = BUILTINS.iter().map(|b| b.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BUILTINS.len());
    }

    #[test]
    fn arity_ranges() {
        let print = lookup_builtin("print").unwrap();
        assert!(print.accepts(1));
        assert!(!print.accepts(0));
        assert_eq!(print.results, 0);
        assert_eq!(lookup_builtin("seq").unwrap().expected_args(), "between 2 and 3");
        assert!(lookup_builtin("nosuch").is_none());
    }
}
