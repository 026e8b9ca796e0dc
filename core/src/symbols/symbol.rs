use crate::ir::ValueId;

/// Binding of a variable name: the value it currently refers to and
/// whether assignments to the name are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo {
    pub value: ValueId,
    pub read_only: bool,
}

impl SymbolInfo {
    pub fn new(value: ValueId, read_only: bool) -> Self {
        SymbolInfo { value, read_only }
    }

    pub fn writable(value: ValueId) -> Self {
        Self::new(value, false)
    }

    pub fn read_only(value: ValueId) -> Self {
        Self::new(value, true)
    }
}
