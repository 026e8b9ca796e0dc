//! file: core/src/ir/module.rs
//! description: the translation unit produced by lowering.
//!
//! `IrModule` owns the value table, the user-defined functions, the ops of
//! the script's top-level code and the warnings collected along the way.
//! Its `Display` impl prints a textual form used by `--dump ir` and tests.

use std::fmt;

use super::op::{Op, OpKind, Region};
use super::types::Type;
use super::value::{ValueId, ValueTable};
use crate::error::Level;
use crate::location::Location;

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Name as written in the source, including any import prefix.
    pub name: String,
    /// Unique symbol referenced by `generic_call`.
    pub symbol: String,
    pub param_types: Vec<Type>,
    pub result_types: Vec<Type>,
    pub body: Region,
    pub location: Option<Location>,
}

/// Non-fatal message attached to the module, e.g. discarded dead code.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IrModule {
    pub functions: Vec<Function>,
    pub entry: Region,
    pub values: ValueTable,
    pub diagnostics: Vec<Diagnostic>,
    next_function_id: usize,
}

impl IrModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Symbol of the form `<name>-<n>`, unique within this module.
    pub fn unique_function_symbol(&mut self, name: &str) -> String {
        let symbol = format!("{}-{}", name, self.next_function_id);
        self.next_function_id += 1;
        symbol
    }

    pub fn function(&self, symbol: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.symbol == symbol)
    }

    pub fn functions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Function> + 'a {
        self.functions.iter().filter(move |f| f.name == name)
    }

    pub fn type_of(&self, value: ValueId) -> &Type {
        self.values.type_of(value)
    }

    pub fn warn(&mut self, message: String, location: Option<Location>) {
        self.diagnostics.push(Diagnostic {
            level: Level::Warning,
            message,
            location,
        });
    }
}

struct Printer<'a> {
    values: &'a ValueTable,
}

impl Printer<'_> {
    fn pad(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write!(f, "{:width$}", "", width = indent * 2)
    }

    fn value_list(&self, f: &mut fmt::Formatter<'_>, list: &[ValueId]) -> fmt::Result {
        for (i, v) in list.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }

    fn typed_list(&self, f: &mut fmt::Formatter<'_>, list: &[ValueId]) -> fmt::Result {
        for (i, v) in list.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", v, self.values.type_of(*v))?;
        }
        Ok(())
    }

    fn region(&self, f: &mut fmt::Formatter<'_>, region: &Region, indent: usize) -> fmt::Result {
        if !region.args.is_empty() {
            self.pad(f, indent)?;
            write!(f, "^(")?;
            self.typed_list(f, &region.args)?;
            writeln!(f, "):")?;
        }
        for op in &region.ops {
            self.op(f, op, indent + 1)?;
        }
        Ok(())
    }

    fn op(&self, f: &mut fmt::Formatter<'_>, op: &Op, indent: usize) -> fmt::Result {
        self.pad(f, indent)?;
        if !op.results.is_empty() {
            self.value_list(f, &op.results)?;
            write!(f, " = ")?;
        }
        match &op.kind {
            OpKind::Constant(c) => write!(f, "constant {}", c)?,
            OpKind::GenericCall { callee } => write!(f, "generic_call @{}", callee)?,
            kind => write!(f, "{}", kind.name())?,
        }
        if !op.operands.is_empty() {
            write!(f, " ")?;
            self.value_list(f, &op.operands)?;
        }
        if !op.attrs.is_empty() {
            write!(f, " {{")?;
            for (i, (key, value)) in op.attrs.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{} = {:?}", key, value)?;
            }
            write!(f, "}}")?;
        }
        if !op.results.is_empty() {
            write!(f, " : ")?;
            for (i, r) in op.results.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.values.type_of(*r))?;
            }
        }
        for region in &op.regions {
            writeln!(f, " {{")?;
            self.region(f, region, indent)?;
            self.pad(f, indent)?;
            write!(f, "}}")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for IrModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let printer = Printer { values: &self.values };
        for function in &self.functions {
            write!(f, "func @{}(", function.symbol)?;
            printer.typed_list(f, &function.body.args)?;
            write!(f, ") -> (")?;
            for (i, ty) in function.result_types.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", ty)?;
            }
            writeln!(f, ") {{")?;
            for op in &function.body.ops {
                printer.op(f, op, 1)?;
            }
            writeln!(f, "}}")?;
        }
        writeln!(f, "entry {{")?;
        for op in &self.entry.ops {
            printer.op(f, op, 1)?;
        }
        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::ValueType;
    use crate::ir::value::{Constant, Scalar};

    #[test]
    fn function_symbols_count_per_module() {
        let mut first = IrModule::new();
        assert_eq!(first.unique_function_symbol("f"), "f-0");
        assert_eq!(first.unique_function_symbol("g"), "g-1");
        let mut second = IrModule::new();
        assert_eq!(second.unique_function_symbol("f"), "f-0");
    }

    #[test]
    fn prints_constants_and_types() {
        let mut module = IrModule::new();
        let v = module.values.fresh(Type::Scalar(ValueType::SI64));
        module.entry.ops.push(Op::new(
            OpKind::Constant(Constant::Scalar(Scalar::Int(7))),
            vec![],
            vec![v],
        ));
        let text = module.to_string();
        assert!(text.contains("%0 = constant 7 : si64"), "{}", text);
    }
}
