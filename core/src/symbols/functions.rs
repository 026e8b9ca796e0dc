use std::collections::BTreeMap;

use crate::ir::Type;

/// Declared shape of one user-defined function overload.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: String,
    pub symbol: String,
    pub params: Vec<Type>,
    pub results: Vec<Type>,
}

impl FunctionSignature {
    /// `name(t1, t2)` as shown in overload errors.
    pub fn describe(&self) -> String {
        let params: Vec<String> = self.params.iter().map(Type::to_string).collect();
        format!("{}({})", self.name, params.join(", "))
    }

    pub fn accepts(&self, args: &[Type]) -> bool {
        self.params.len() == args.len()
            && args
                .iter()
                .zip(&self.params)
                .all(|(arg, param)| arg.compatible_with_param(param))
    }
}

/// Overloads per function name, kept in definition order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionRegistry {
    entries: BTreeMap<String, Vec<FunctionSignature>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `signature` unless an overload with the same symbol is already known.
    pub fn insert(&mut self, signature: FunctionSignature) {
        let overloads = self.entries.entry(signature.name.clone()).or_default();
        match overloads.iter_mut().find(|s| s.symbol == signature.symbol) {
            Some(existing) => *existing = signature,
            None => overloads.push(signature),
        }
    }

    pub fn candidates(&self, name: &str) -> &[FunctionSignature] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        !self.candidates(name).is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn into_entries(self) -> BTreeMap<String, Vec<FunctionSignature>> {
        self.entries
    }

    /// First overload, in definition order, accepting `args`.
    pub fn resolve(&self, name: &str, args: &[Type]) -> Option<&FunctionSignature> {
        self.candidates(name).iter().find(|s| s.accepts(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ValueType;

    fn sig(symbol: &str, params: Vec<Type>) -> FunctionSignature {
        FunctionSignature {
            name: "f".to_string(),
            symbol: symbol.to_string(),
            params,
            results: vec![],
        }
    }

    #[test]
    fn first_compatible_overload_wins() {
        let mut registry = FunctionRegistry::new();
        registry.insert(sig("f-0", vec![Type::Matrix(ValueType::F64)]));
        registry.insert(sig("f-1", vec![Type::Matrix(ValueType::SI64)]));

        let found = registry.resolve("f", &[Type::Matrix(ValueType::SI64)]);
        assert_eq!(found.map(|s| s.symbol.as_str()), Some("f-1"));
        let found = registry.resolve("f", &[Type::Matrix(ValueType::Unknown)]);
        assert_eq!(found.map(|s| s.symbol.as_str()), Some("f-0"));
        assert!(registry.resolve("f", &[Type::Scalar(ValueType::Str)]).is_none());
    }

    #[test]
    fn arity_must_match() {
        let mut registry = FunctionRegistry::new();
        registry.insert(sig("f-0", vec![Type::Unknown]));
        assert!(registry.resolve("f", &[]).is_none());
        assert!(registry.resolve("f", &[Type::Unknown, Type::Unknown]).is_none());
    }

    #[test]
    fn reinserting_a_symbol_replaces_it() {
        let mut registry = FunctionRegistry::new();
        registry.insert(sig("f-0", vec![Type::Unknown]));
        registry.insert(sig("f-0", vec![Type::Scalar(ValueType::F64)]));
        assert_eq!(registry.candidates("f").len(), 1);
        assert_eq!(registry.candidates("f")[0].describe(), "f(f64)");
    }
}
