//! file: core/src/ir/lower/lower_literal.rs
//! description: scalar, matrix and frame literals.
//!
//! Matrix literals are built as a constant column whose cells are patched
//! with `insert_row` wherever an element is not known at translation time,
//! then reshaped to the requested dimensions. Frames are assembled from one
//! such column per frame column.

use super::Translator;
use super::err::{ErrorKind, TranslationError};
use crate::ast::{AstNode, Literal};
use crate::ir::op::OpKind;
use crate::ir::types::{Type, ValueType};
use crate::ir::value::{Constant, DenseBuffer, MatrixConstant, Scalar, ValueId};
use crate::location::Location;

impl Translator<'_> {
    pub(crate) fn visit_literal(
        &mut self,
        node: &AstNode,
        literal: &Literal,
    ) -> Result<ValueId, TranslationError> {
        let location = node.location.as_ref();
        let (value, vt) = match literal {
            Literal::Int(text) => parse_int_literal(text).ok_or_else(|| {
                TranslationError::new(
                    ErrorKind::InvalidLiteral,
                    format!("invalid integer literal `{}`", text),
                )
                .at(node)
            })?,
            Literal::Float(text) => parse_float_literal(text).ok_or_else(|| {
                TranslationError::new(
                    ErrorKind::InvalidLiteral,
                    format!("invalid floating-point literal `{}`", text),
                )
                .at(node)
            })?,
            Literal::Bool(value) => (Scalar::Bool(*value), ValueType::Bool),
            Literal::Str(value) => (Scalar::Str(value.clone()), ValueType::Str),
        };
        Ok(self.constant(value, vt, location))
    }

    pub(crate) fn visit_matrix_literal(
        &mut self,
        node: &AstNode,
        elements: &[AstNode],
        rows: Option<&AstNode>,
        cols: Option<&AstNode>,
    ) -> Result<ValueId, TranslationError> {
        let location = node.location.as_ref();
        if elements.is_empty() {
            return Err(TranslationError::new(
                ErrorKind::InvalidLiteral,
                "empty matrix literals are not supported",
            )
            .at(node));
        }
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            let value = self.visit_value(element)?;
            if self.type_of(value).is_data_object() {
                return Err(TranslationError::new(
                    ErrorKind::InvalidLiteral,
                    "matrix literal elements must be scalars",
                )
                .at(element));
            }
            values.push(value);
        }
        let vt = self.generalized_type(&values);
        let column = self.build_col_matrix(node, &values, vt)?;

        let n = values.len();
        let (rows, cols) = match (rows, cols) {
            (None, None) => (self.const_index(n, location), self.const_index(1, location)),
            (Some(rows), None) => {
                let rows = self.visit_value(rows)?;
                let rows = self.cast_index_if(rows, location);
                let cols = self.other_dimension(n, rows, location);
                (rows, cols)
            }
            (None, Some(cols)) => {
                let cols = self.visit_value(cols)?;
                let cols = self.cast_index_if(cols, location);
                let rows = self.other_dimension(n, cols, location);
                (rows, cols)
            }
            (Some(rows), Some(cols)) => {
                let rows = self.visit_value(rows)?;
                let rows = self.cast_index_if(rows, location);
                let cols = self.visit_value(cols)?;
                let cols = self.cast_index_if(cols, location);
                (rows, cols)
            }
        };
        Ok(self.create1(
            OpKind::Reshape,
            vec![column, rows, cols],
            Type::Matrix(vt),
            location,
        ))
    }

    /// `n / given`; a count that does not divide evenly is rejected by the
    /// reshape at run time.
    fn other_dimension(
        &mut self,
        n: usize,
        given: ValueId,
        location: Option<&Location>,
    ) -> ValueId {
        let total = self.const_index(n, location);
        let other = self.create1(
            OpKind::EwDiv,
            vec![total, given],
            Type::Scalar(ValueType::Index),
            location,
        );
        self.cast_index_if(other, location)
    }

    /// Most general element type of `values`, f64 when none is known.
    fn generalized_type(&self, values: &[ValueId]) -> ValueType {
        ValueType::most_general(values.iter().map(|v| self.type_of(*v).element_type()))
            .unwrap_or(ValueType::F64)
    }

    /// An `n x 1` matrix of `vt` holding `values` in order.
    fn build_col_matrix(
        &mut self,
        node: &AstNode,
        values: &[ValueId],
        vt: ValueType,
    ) -> Result<ValueId, TranslationError> {
        let location = node.location.as_ref();
        let Some(mut buffer) = DenseBuffer::with_capacity(vt, values.len()) else {
            return Err(TranslationError::new(
                ErrorKind::InvalidLiteral,
                format!("matrix literals of value type {} are not supported", vt),
            )
            .at(node));
        };

        let mut patches = Vec::new();
        for (i, value) in values.iter().enumerate() {
            match self.module.values.constant_of(*value) {
                Some(constant) => {
                    if vt == ValueType::Str && !matches!(constant, Scalar::Str(_)) {
                        return Err(TranslationError::new(
                            ErrorKind::InvalidLiteral,
                            "matrix literals mixing strings and other value types are not supported",
                        )
                        .at(node));
                    }
                    buffer.push(constant);
                }
                None => {
                    buffer.push_default();
                    patches.push((i, *value));
                }
            }
        }

        let constant = Constant::Matrix(MatrixConstant {
            rows: values.len(),
            cols: 1,
            data: buffer,
        });
        let mut result = self.create1(
            OpKind::Constant(constant),
            vec![],
            Type::Matrix(vt),
            location,
        );

        for (i, value) in patches {
            let cell = self.cast_if(Type::Scalar(vt), value, location);
            let cell = self.create1(OpKind::Cast, vec![cell], Type::Matrix(vt), location);
            let lower = self.const_i64(i as i64, location);
            let upper = self.const_i64(i as i64 + 1, location);
            result = self.create1(
                OpKind::InsertRow,
                vec![result, cell, lower, upper],
                Type::Matrix(vt),
                location,
            );
        }
        Ok(result)
    }

    /// `{"a": m1, "b": m2}`
    pub(crate) fn visit_col_major_frame(
        &mut self,
        node: &AstNode,
        columns: &[(AstNode, AstNode)],
    ) -> Result<ValueId, TranslationError> {
        if columns.is_empty() {
            return Err(TranslationError::new(
                ErrorKind::InvalidLiteral,
                "empty frame literals are not supported",
            )
            .at(node));
        }
        let mut column_values = Vec::with_capacity(columns.len());
        let mut labels = Vec::with_capacity(columns.len());
        let mut column_types = Vec::with_capacity(columns.len());
        for (label, column) in columns {
            labels.push(self.visit_frame_label(label)?);
            let value = self.visit_value(column)?;
            let Type::Matrix(vt) = self.type_of(value) else {
                return Err(TranslationError::new(
                    ErrorKind::InvalidLiteral,
                    "columns of a frame literal must be matrices",
                )
                .at(column));
            };
            column_values.push(value);
            column_types.push(vt);
        }
        Ok(self.create_frame(node, column_values, labels, column_types))
    }

    /// `{["a", "b"], [1, 2], [3, 4]}`
    pub(crate) fn visit_row_major_frame(
        &mut self,
        node: &AstNode,
        labels: &[AstNode],
        rows: &[Vec<AstNode>],
    ) -> Result<ValueId, TranslationError> {
        if labels.is_empty() || rows.is_empty() {
            return Err(TranslationError::new(
                ErrorKind::InvalidLiteral,
                "empty frame literals are not supported",
            )
            .at(node));
        }
        let label_values = labels
            .iter()
            .map(|label| self.visit_frame_label(label))
            .collect::<Result<Vec<_>, _>>()?;

        let mut cells: Vec<Vec<ValueId>> = vec![Vec::with_capacity(rows.len()); labels.len()];
        for row in rows {
            if row.len() != labels.len() {
                return Err(TranslationError::new(
                    ErrorKind::InvalidLiteral,
                    "size of row does not match the amount of labels",
                )
                .at(node));
            }
            for (j, cell) in row.iter().enumerate() {
                let value = self.visit_value(cell)?;
                if self.type_of(value).is_data_object() {
                    return Err(TranslationError::new(
                        ErrorKind::InvalidLiteral,
                        "frame literal cells must be scalars",
                    )
                    .at(cell));
                }
                cells[j].push(value);
            }
        }

        let mut column_values = Vec::with_capacity(cells.len());
        let mut column_types = Vec::with_capacity(cells.len());
        for column in &cells {
            let vt = self.generalized_type(column);
            column_values.push(self.build_col_matrix(node, column, vt)?);
            column_types.push(vt);
        }
        Ok(self.create_frame(node, column_values, label_values, column_types))
    }

    fn visit_frame_label(&mut self, label: &AstNode) -> Result<ValueId, TranslationError> {
        let value = self.visit_value(label)?;
        if !self.type_of(value).is_string() {
            return Err(TranslationError::new(
                ErrorKind::InvalidLiteral,
                "labels of a frame literal must be strings",
            )
            .at(label));
        }
        Ok(value)
    }

    fn create_frame(
        &mut self,
        node: &AstNode,
        columns: Vec<ValueId>,
        labels: Vec<ValueId>,
        column_types: Vec<ValueType>,
    ) -> ValueId {
        let mut operands = columns;
        operands.extend(labels);
        self.create1(
            OpKind::CreateFrame,
            operands,
            Type::Frame(column_types),
            node.location.as_ref(),
        )
    }
}

/// Integer literal text to a constant: separators `_` and `'` are dropped,
/// `u`/`ull` make it ui64, `l` si64, `z` an index, and no suffix si64.
pub(crate) fn parse_int_literal(text: &str) -> Option<(Scalar, ValueType)> {
    let cleaned: String = text.chars().filter(|c| *c != '_' && *c != '\'').collect();
    if let Some(digits) = cleaned
        .strip_suffix("ull")
        .or_else(|| cleaned.strip_suffix('u'))
    {
        return digits
            .parse::<u64>()
            .ok()
            .map(|v| (Scalar::UInt(v), ValueType::UI64));
    }
    if let Some(digits) = cleaned.strip_suffix('z') {
        return digits
            .parse::<u64>()
            .ok()
            .map(|v| (Scalar::UInt(v), ValueType::Index));
    }
    let digits = cleaned.strip_suffix('l').unwrap_or(&cleaned);
    // the magnitude of i64::MIN only appears under a unary minus
    if digits == "9223372036854775808" {
        return Some((Scalar::Int(i64::MIN), ValueType::SI64));
    }
    digits
        .parse::<i64>()
        .ok()
        .map(|v| (Scalar::Int(v), ValueType::SI64))
}

/// Floating-point literal text to a constant: an `f` suffix makes it f32,
/// otherwise f64. `nan` and `inf` are accepted with or without the suffix.
pub(crate) fn parse_float_literal(text: &str) -> Option<(Scalar, ValueType)> {
    let cleaned: String = text.chars().filter(|c| *c != '_' && *c != '\'').collect();
    match cleaned.as_str() {
        "nan" => return Some((Scalar::Float(f64::NAN), ValueType::F64)),
        "inf" => return Some((Scalar::Float(f64::INFINITY), ValueType::F64)),
        "nanf" => return Some((Scalar::Float(f64::NAN), ValueType::F32)),
        "inff" => return Some((Scalar::Float(f64::INFINITY), ValueType::F32)),
        _ => {}
    }
    match cleaned.strip_suffix('f') {
        Some(digits) => digits
            .parse::<f32>()
            .ok()
            .map(|v| (Scalar::Float(f64::from(v)), ValueType::F32)),
        None => cleaned
            .parse::<f64>()
            .ok()
            .map(|v| (Scalar::Float(v), ValueType::F64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_suffixes_select_value_types() {
        assert_eq!(parse_int_literal("1_000"), Some((Scalar::Int(1000), ValueType::SI64)));
        assert_eq!(parse_int_literal("7u"), Some((Scalar::UInt(7), ValueType::UI64)));
        assert_eq!(parse_int_literal("7ull"), Some((Scalar::UInt(7), ValueType::UI64)));
        assert_eq!(parse_int_literal("3z"), Some((Scalar::UInt(3), ValueType::Index)));
        assert_eq!(parse_int_literal("1'000l"), Some((Scalar::Int(1000), ValueType::SI64)));
    }

    #[test]
    fn int_min_magnitude_is_accepted() {
        assert_eq!(
            parse_int_literal("9223372036854775808"),
            Some((Scalar::Int(i64::MIN), ValueType::SI64))
        );
        assert_eq!(parse_int_literal("9223372036854775809"), None);
    }

    #[test]
    fn float_forms() {
        assert_eq!(parse_float_literal("2.5"), Some((Scalar::Float(2.5), ValueType::F64)));
        assert_eq!(parse_float_literal("2.5f"), Some((Scalar::Float(2.5), ValueType::F32)));
        assert_eq!(parse_float_literal("1e3"), Some((Scalar::Float(1000.0), ValueType::F64)));
        assert_eq!(
            parse_float_literal("inff"),
            Some((Scalar::Float(f64::INFINITY), ValueType::F32))
        );
        let (nan, vt) = parse_float_literal("nan").unwrap();
        assert!(nan.as_f64().is_nan());
        assert_eq!(vt, ValueType::F64);
    }
}
