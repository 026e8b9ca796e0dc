//! file: core/src/ir/value.rs
//! description: SSA value handles, compile-time constants and the value table.

use std::collections::HashMap;
use std::fmt;

use super::types::{Type, ValueType};

/// Handle of an SSA value inside one `IrModule`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Scalar {
    pub fn as_f64(&self) -> f64 {
        match self {
            Scalar::Int(v) => *v as f64,
            Scalar::UInt(v) => *v as f64,
            Scalar::Float(v) => *v,
            Scalar::Bool(v) => f64::from(u8::from(*v)),
            Scalar::Str(s) => s.parse().unwrap_or(f64::NAN),
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            Scalar::Int(v) => *v,
            Scalar::UInt(v) => *v as i64,
            Scalar::Float(v) => *v as i64,
            Scalar::Bool(v) => i64::from(*v),
            Scalar::Str(s) => s.parse().unwrap_or_default(),
        }
    }

    pub fn as_u64(&self) -> u64 {
        match self {
            Scalar::UInt(v) => *v,
            other => other.as_i64() as u64,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Scalar::Bool(v) => *v,
            Scalar::Str(s) => !s.is_empty(),
            other => other.as_f64() != 0.0,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::UInt(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{:?}", v),
            Scalar::Bool(v) => write!(f, "{}", v),
            Scalar::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// Cell storage of a constant matrix, one variant per element type.
#[derive(Debug, Clone, PartialEq)]
pub enum DenseBuffer {
    F64(Vec<f64>),
    F32(Vec<f32>),
    SI64(Vec<i64>),
    SI32(Vec<i32>),
    SI8(Vec<i8>),
    UI64(Vec<u64>),
    UI32(Vec<u32>),
    UI8(Vec<u8>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

impl DenseBuffer {
    /// Empty buffer for `vt`; `None` for element types a matrix cannot hold.
    pub fn with_capacity(vt: ValueType, capacity: usize) -> Option<Self> {
        let buffer = match vt {
            ValueType::F64 => DenseBuffer::F64(Vec::with_capacity(capacity)),
            ValueType::F32 => DenseBuffer::F32(Vec::with_capacity(capacity)),
            ValueType::SI64 => DenseBuffer::SI64(Vec::with_capacity(capacity)),
            ValueType::SI32 => DenseBuffer::SI32(Vec::with_capacity(capacity)),
            ValueType::SI8 => DenseBuffer::SI8(Vec::with_capacity(capacity)),
            ValueType::UI64 => DenseBuffer::UI64(Vec::with_capacity(capacity)),
            ValueType::UI32 => DenseBuffer::UI32(Vec::with_capacity(capacity)),
            ValueType::UI8 => DenseBuffer::UI8(Vec::with_capacity(capacity)),
            ValueType::Bool => DenseBuffer::Bool(Vec::with_capacity(capacity)),
            ValueType::Str => DenseBuffer::Str(Vec::with_capacity(capacity)),
            ValueType::Index | ValueType::Unknown => return None,
        };
        Some(buffer)
    }

    /// Appends `value` converted to the buffer's element type.
    pub fn push(&mut self, value: &Scalar) {
        match self {
            DenseBuffer::F64(v) => v.push(value.as_f64()),
            DenseBuffer::F32(v) => v.push(value.as_f64() as f32),
            DenseBuffer::SI64(v) => v.push(value.as_i64()),
            DenseBuffer::SI32(v) => v.push(value.as_i64() as i32),
            DenseBuffer::SI8(v) => v.push(value.as_i64() as i8),
            DenseBuffer::UI64(v) => v.push(value.as_u64()),
            DenseBuffer::UI32(v) => v.push(value.as_u64() as u32),
            DenseBuffer::UI8(v) => v.push(value.as_u64() as u8),
            DenseBuffer::Bool(v) => v.push(value.as_bool()),
            DenseBuffer::Str(v) => v.push(match value {
                Scalar::Str(s) => s.clone(),
                other => other.to_string(),
            }),
        }
    }

    /// Appends the zero value of the element type.
    pub fn push_default(&mut self) {
        match self {
            DenseBuffer::F64(v) => v.push(0.0),
            DenseBuffer::F32(v) => v.push(0.0),
            DenseBuffer::SI64(v) => v.push(0),
            DenseBuffer::SI32(v) => v.push(0),
            DenseBuffer::SI8(v) => v.push(0),
            DenseBuffer::UI64(v) => v.push(0),
            DenseBuffer::UI32(v) => v.push(0),
            DenseBuffer::UI8(v) => v.push(0),
            DenseBuffer::Bool(v) => v.push(false),
            DenseBuffer::Str(v) => v.push(String::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DenseBuffer::F64(v) => v.len(),
            DenseBuffer::F32(v) => v.len(),
            DenseBuffer::SI64(v) => v.len(),
            DenseBuffer::SI32(v) => v.len(),
            DenseBuffer::SI8(v) => v.len(),
            DenseBuffer::UI64(v) => v.len(),
            DenseBuffer::UI32(v) => v.len(),
            DenseBuffer::UI8(v) => v.len(),
            DenseBuffer::Bool(v) => v.len(),
            DenseBuffer::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            DenseBuffer::F64(_) => ValueType::F64,
            DenseBuffer::F32(_) => ValueType::F32,
            DenseBuffer::SI64(_) => ValueType::SI64,
            DenseBuffer::SI32(_) => ValueType::SI32,
            DenseBuffer::SI8(_) => ValueType::SI8,
            DenseBuffer::UI64(_) => ValueType::UI64,
            DenseBuffer::UI32(_) => ValueType::UI32,
            DenseBuffer::UI8(_) => ValueType::UI8,
            DenseBuffer::Bool(_) => ValueType::Bool,
            DenseBuffer::Str(_) => ValueType::Str,
        }
    }
}

impl fmt::Display for DenseBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: fmt::Debug>(f: &mut fmt::Formatter<'_>, cells: &[T]) -> fmt::Result {
            write!(f, "[")?;
            for (i, cell) in cells.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:?}", cell)?;
            }
            write!(f, "]")
        }
        match self {
            DenseBuffer::F64(v) => list(f, v),
            DenseBuffer::F32(v) => list(f, v),
            DenseBuffer::SI64(v) => list(f, v),
            DenseBuffer::SI32(v) => list(f, v),
            DenseBuffer::SI8(v) => list(f, v),
            DenseBuffer::UI64(v) => list(f, v),
            DenseBuffer::UI32(v) => list(f, v),
            DenseBuffer::UI8(v) => list(f, v),
            DenseBuffer::Bool(v) => list(f, v),
            DenseBuffer::Str(v) => list(f, v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixConstant {
    pub rows: usize,
    pub cols: usize,
    pub data: DenseBuffer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Scalar(Scalar),
    Matrix(MatrixConstant),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Scalar(s) => write!(f, "{}", s),
            Constant::Matrix(m) => write!(
                f,
                "dense<{}x{} {}>{}",
                m.rows,
                m.cols,
                m.data.value_type(),
                m.data
            ),
        }
    }
}

/// Types and constant payloads of every value allocated in a module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTable {
    types: Vec<Type>,
    constants: HashMap<ValueId, Scalar>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self, ty: Type) -> ValueId {
        let id = ValueId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    /// New value with the type and constant payload of `like`.
    pub fn fresh_like(&mut self, like: ValueId) -> ValueId {
        let id = self.fresh(self.type_of(like).clone());
        if let Some(constant) = self.constants.get(&like).cloned() {
            self.constants.insert(id, constant);
        }
        id
    }

    pub fn type_of(&self, id: ValueId) -> &Type {
        self.types.get(id.0 as usize).unwrap_or(&Type::Unknown)
    }

    pub fn set_constant(&mut self, id: ValueId, value: Scalar) {
        self.constants.insert(id, value);
    }

    pub fn constant_of(&self, id: ValueId) -> Option<&Scalar> {
        self.constants.get(&id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_values_are_sequential() {
        let mut values = ValueTable::new();
        let a = values.fresh(Type::Scalar(ValueType::SI64));
        let b = values.fresh(Type::Unknown);
        assert_eq!(a, ValueId(0));
        assert_eq!(b, ValueId(1));
        assert_eq!(values.type_of(a), &Type::Scalar(ValueType::SI64));
    }

    #[test]
    fn fresh_like_copies_constants() {
        let mut values = ValueTable::new();
        let a = values.fresh(Type::Scalar(ValueType::F64));
        values.set_constant(a, Scalar::Float(2.5));
        let b = values.fresh_like(a);
        assert_eq!(values.constant_of(b), Some(&Scalar::Float(2.5)));
    }

    #[test]
    fn buffer_converts_cells() {
        let mut buffer = DenseBuffer::with_capacity(ValueType::SI32, 3).unwrap();
        buffer.push(&Scalar::Float(2.9));
        buffer.push(&Scalar::Bool(true));
        buffer.push_default();
        assert_eq!(buffer, DenseBuffer::SI32(vec![2, 1, 0]));
        assert!(DenseBuffer::with_capacity(ValueType::Unknown, 1).is_none());
    }
}
