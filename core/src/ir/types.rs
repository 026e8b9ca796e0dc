//! file: core/src/ir/types.rs
//! description: value and data types carried by IR values.

use std::fmt;

/// Element type of a scalar, matrix cell or frame column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    F64,
    F32,
    SI64,
    SI32,
    SI8,
    UI64,
    UI32,
    UI8,
    Bool,
    Str,
    Index,
    Unknown,
}

impl ValueType {
    pub fn from_name(name: &str) -> Option<Self> {
        let vt = match name {
            "f64" => ValueType::F64,
            "f32" => ValueType::F32,
            "si64" => ValueType::SI64,
            "si32" => ValueType::SI32,
            "si8" => ValueType::SI8,
            "ui64" => ValueType::UI64,
            "ui32" => ValueType::UI32,
            "ui8" => ValueType::UI8,
            "bool" => ValueType::Bool,
            "str" => ValueType::Str,
            "index" => ValueType::Index,
            _ => return None,
        };
        Some(vt)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueType::F64 => "f64",
            ValueType::F32 => "f32",
            ValueType::SI64 => "si64",
            ValueType::SI32 => "si32",
            ValueType::SI8 => "si8",
            ValueType::UI64 => "ui64",
            ValueType::UI32 => "ui32",
            ValueType::UI8 => "ui8",
            ValueType::Bool => "bool",
            ValueType::Str => "str",
            ValueType::Index => "index",
            ValueType::Unknown => "unknown",
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ValueType::F64 | ValueType::F32)
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, ValueType::SI64 | ValueType::SI32 | ValueType::SI8)
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            ValueType::UI64 | ValueType::UI32 | ValueType::UI8 | ValueType::Index
        )
    }

    // Higher means more general: every value of a lower rank fits (possibly
    // lossily) into a higher one.
    fn generality(&self) -> u8 {
        match self {
            ValueType::Str => 11,
            ValueType::F64 => 10,
            ValueType::F32 => 9,
            ValueType::SI64 => 8,
            ValueType::UI64 => 7,
            ValueType::Index => 6,
            ValueType::SI32 => 5,
            ValueType::UI32 => 4,
            ValueType::SI8 => 3,
            ValueType::UI8 => 2,
            ValueType::Bool => 1,
            ValueType::Unknown => 0,
        }
    }

    /// Most general of the given element types. Unknown entries are ignored;
    /// `None` when nothing known remains.
    pub fn most_general<I>(types: I) -> Option<ValueType>
    where
        I: IntoIterator<Item = ValueType>,
    {
        types
            .into_iter()
            .filter(|vt| *vt != ValueType::Unknown)
            .max_by_key(|vt| vt.generality())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Unknown,
    Scalar(ValueType),
    Matrix(ValueType),
    Frame(Vec<ValueType>),
}

impl Type {
    /// Scalar of `vt`, collapsing an unknown element type to `Type::Unknown`.
    pub fn scalar(vt: ValueType) -> Type {
        match vt {
            ValueType::Unknown => Type::Unknown,
            vt => Type::Scalar(vt),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown | Type::Scalar(ValueType::Unknown))
    }

    pub fn is_data_object(&self) -> bool {
        matches!(self, Type::Matrix(_) | Type::Frame(_))
    }

    pub fn is_frame(&self) -> bool {
        matches!(self, Type::Frame(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Type::Scalar(ValueType::Str))
    }

    /// Element type: the cell type of a matrix, the first column of a frame,
    /// the type itself for scalars.
    pub fn element_type(&self) -> ValueType {
        match self {
            Type::Unknown => ValueType::Unknown,
            Type::Scalar(vt) | Type::Matrix(vt) => *vt,
            Type::Frame(columns) => columns.first().copied().unwrap_or(ValueType::Unknown),
        }
    }

    /// Equality where an unknown type, or an unknown element type inside a
    /// matrix or frame, matches anything in its position.
    pub fn equal_unknown_aware(&self, other: &Type) -> bool {
        if self.is_unknown() || other.is_unknown() {
            return true;
        }
        match (self, other) {
            (Type::Scalar(a), Type::Scalar(b)) => a == b,
            (Type::Matrix(a), Type::Matrix(b)) => {
                *a == ValueType::Unknown || *b == ValueType::Unknown || a == b
            }
            (Type::Frame(a), Type::Frame(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| {
                        *x == ValueType::Unknown || *y == ValueType::Unknown || x == y
                    })
            }
            _ => false,
        }
    }

    /// Whether an argument of type `self` may be passed for a parameter of
    /// type `param`.
    pub fn compatible_with_param(&self, param: &Type) -> bool {
        if self == param || self.is_unknown() || param.is_unknown() {
            return true;
        }
        match (self, param) {
            (Type::Matrix(a), Type::Matrix(b)) => {
                *a == ValueType::Unknown || *b == ValueType::Unknown
            }
            _ => false,
        }
    }

    /// Result of an element-wise binary op on `lhs` and `rhs`. A matrix
    /// operand makes the result a matrix of the most general cell type.
    /// Comparisons and logical ops on two scalars yield a bool.
    pub fn ew_binary_result(lhs: &Type, rhs: &Type, predicate: bool) -> Type {
        if lhs.is_unknown() || rhs.is_unknown() {
            return Type::Unknown;
        }
        match (lhs, rhs) {
            (Type::Scalar(_), Type::Scalar(_)) if predicate => Type::Scalar(ValueType::Bool),
            (Type::Scalar(a), Type::Scalar(b)) => {
                Type::scalar(ValueType::most_general([*a, *b]).unwrap_or(ValueType::Unknown))
            }
            (Type::Matrix(a), Type::Matrix(b))
            | (Type::Matrix(a), Type::Scalar(b))
            | (Type::Scalar(a), Type::Matrix(b)) => {
                if *a == ValueType::Unknown || *b == ValueType::Unknown {
                    Type::Matrix(ValueType::Unknown)
                } else {
                    Type::Matrix(ValueType::most_general([*a, *b]).unwrap_or(ValueType::Unknown))
                }
            }
            _ => Type::Unknown,
        }
    }

    /// Result of `c ? a : b`. A matrix condition selects cell by cell and
    /// yields a matrix; otherwise scalars generalize and anything else must
    /// agree.
    pub fn cond_result(cond: &Type, then_type: &Type, else_type: &Type) -> Type {
        match (cond, then_type, else_type) {
            (
                Type::Matrix(_),
                Type::Scalar(a) | Type::Matrix(a),
                Type::Scalar(b) | Type::Matrix(b),
            ) => {
                if *a == ValueType::Unknown || *b == ValueType::Unknown {
                    Type::Matrix(ValueType::Unknown)
                } else {
                    Type::Matrix(ValueType::most_general([*a, *b]).unwrap_or(ValueType::Unknown))
                }
            }
            (_, Type::Scalar(a), Type::Scalar(b)) => {
                Type::scalar(ValueType::most_general([*a, *b]).unwrap_or(ValueType::Unknown))
            }
            (_, a, b) if a.equal_unknown_aware(b) => a.unify(b),
            _ => Type::Unknown,
        }
    }

    /// Prefers the known side of two types describing the same value.
    pub fn unify(&self, other: &Type) -> Type {
        if self.is_unknown() {
            other.clone()
        } else {
            self.clone()
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unknown => write!(f, "unknown"),
            Type::Scalar(vt) => write!(f, "{}", vt),
            Type::Matrix(vt) => write!(f, "matrix<{}>", vt),
            Type::Frame(columns) => {
                write!(f, "frame<[")?;
                for (i, vt) in columns.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", vt)?;
                }
                write!(f, "]>")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_general_prefers_strings_then_floats() {
        let vt = ValueType::most_general([ValueType::SI64, ValueType::F32, ValueType::Bool]);
        assert_eq!(vt, Some(ValueType::F32));
        let vt = ValueType::most_general([ValueType::F64, ValueType::Str]);
        assert_eq!(vt, Some(ValueType::Str));
        let vt = ValueType::most_general([ValueType::UI64, ValueType::SI64]);
        assert_eq!(vt, Some(ValueType::SI64));
    }

    #[test]
    fn most_general_ignores_unknown() {
        assert_eq!(ValueType::most_general([ValueType::Unknown]), None);
        assert_eq!(
            ValueType::most_general([ValueType::Unknown, ValueType::UI8]),
            Some(ValueType::UI8)
        );
    }

    #[test]
    fn unknown_aware_equality() {
        let m64 = Type::Matrix(ValueType::F64);
        let mu = Type::Matrix(ValueType::Unknown);
        assert!(m64.equal_unknown_aware(&mu));
        assert!(m64.equal_unknown_aware(&Type::Unknown));
        assert!(!m64.equal_unknown_aware(&Type::Matrix(ValueType::SI64)));
        assert!(!m64.equal_unknown_aware(&Type::Scalar(ValueType::F64)));
    }

    #[test]
    fn param_compatibility() {
        let m64 = Type::Matrix(ValueType::F64);
        assert!(m64.compatible_with_param(&Type::Matrix(ValueType::Unknown)));
        assert!(!m64.compatible_with_param(&Type::Matrix(ValueType::SI64)));
        assert!(Type::Unknown.compatible_with_param(&Type::Scalar(ValueType::Str)));
    }

    #[test]
    fn ew_binary_result_types() {
        let si64 = Type::Scalar(ValueType::SI64);
        let float = Type::Scalar(ValueType::F64);
        let m_si64 = Type::Matrix(ValueType::SI64);

        assert_eq!(Type::ew_binary_result(&float, &si64, false), float);
        assert_eq!(Type::ew_binary_result(&si64, &float, true), Type::Scalar(ValueType::Bool));
        assert_eq!(
            Type::ew_binary_result(&m_si64, &float, false),
            Type::Matrix(ValueType::F64)
        );
        assert_eq!(
            Type::ew_binary_result(&si64, &m_si64, true),
            Type::Matrix(ValueType::SI64)
        );
        assert_eq!(
            Type::ew_binary_result(&Type::Matrix(ValueType::Unknown), &float, false),
            Type::Matrix(ValueType::Unknown)
        );
        assert_eq!(Type::ew_binary_result(&Type::Unknown, &si64, false), Type::Unknown);
    }

    #[test]
    fn cond_result_types() {
        let flag = Type::Scalar(ValueType::Bool);
        let si64 = Type::Scalar(ValueType::SI64);
        let f32 = Type::Scalar(ValueType::F32);
        let m_f64 = Type::Matrix(ValueType::F64);
        assert_eq!(Type::cond_result(&flag, &si64, &f32), f32);
        assert_eq!(Type::cond_result(&flag, &m_f64, &Type::Unknown), m_f64);
        assert_eq!(Type::cond_result(&flag, &m_f64, &si64), Type::Unknown);
        assert_eq!(
            Type::cond_result(&Type::Matrix(ValueType::Bool), &si64, &f32),
            Type::Matrix(ValueType::F32)
        );
    }

    #[test]
    fn display_names() {
        assert_eq!(Type::Matrix(ValueType::SI64).to_string(), "matrix<si64>");
        assert_eq!(
            Type::Frame(vec![ValueType::F64, ValueType::Str]).to_string(),
            "frame<[f64, str]>"
        );
    }
}
