//! file: core/src/symbols/mod.rs
//! description: name binding during translation.
//!
//! `ScopedSymbolTable` maps variable names to the SSA value currently
//! holding them; `FunctionRegistry` keeps every overload of every
//! user-defined function seen so far.

pub mod functions;
pub mod symbol;
pub mod table;

pub use functions::{FunctionRegistry, FunctionSignature};
pub use symbol::SymbolInfo;
pub use table::{Scope, ScopedSymbolTable, merge_symbols};
