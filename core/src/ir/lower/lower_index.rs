//! file: core/src/ir/lower/lower_index.rs
//! description: right indexing (reads) and left indexing (writes).
//!
//! An axis selector is either a single position, a data object of
//! positions, a string label or a `lower:upper` range. Reads lower to
//! extract/slice ops, writes to insert ops.

use super::Translator;
use super::err::{ErrorKind, TranslationError};
use crate::ast::{AstNode, IndexAxis, Indexing};
use crate::ir::op::OpKind;
use crate::ir::types::{Type, ValueType};
use crate::ir::value::ValueId;
use crate::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Row,
    Col,
}

impl Axis {
    fn extract(self) -> OpKind {
        match self {
            Axis::Row => OpKind::ExtractRow,
            Axis::Col => OpKind::ExtractCol,
        }
    }

    fn slice(self) -> OpKind {
        match self {
            Axis::Row => OpKind::SliceRow,
            Axis::Col => OpKind::SliceCol,
        }
    }

    fn insert(self) -> OpKind {
        match self {
            Axis::Row => OpKind::InsertRow,
            Axis::Col => OpKind::InsertCol,
        }
    }

    fn extent(self) -> OpKind {
        match self {
            Axis::Row => OpKind::NumRows,
            Axis::Col => OpKind::NumCols,
        }
    }
}

/// A lowered selector for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AxisIndex {
    Position(ValueId),
    Range {
        lower: Option<ValueId>,
        upper: Option<ValueId>,
    },
}

impl Translator<'_> {
    /// Lower both selectors of `[rows, cols]`; a missing selector, or a range
    /// with neither bound, selects everything and yields `None`.
    pub(crate) fn visit_indexing(
        &mut self,
        indexing: &Indexing,
    ) -> Result<(Option<AxisIndex>, Option<AxisIndex>), TranslationError> {
        let rows = match &indexing.rows {
            Some(axis) => self.visit_axis(axis)?,
            None => None,
        };
        let cols = match &indexing.cols {
            Some(axis) => self.visit_axis(axis)?,
            None => None,
        };
        Ok((rows, cols))
    }

    fn visit_axis(&mut self, axis: &IndexAxis) -> Result<Option<AxisIndex>, TranslationError> {
        match axis {
            IndexAxis::Position(expr) => Ok(Some(AxisIndex::Position(self.visit_value(expr)?))),
            IndexAxis::Range { lower, upper } => {
                let lower = lower.as_deref().map(|e| self.visit_value(e)).transpose()?;
                let upper = upper.as_deref().map(|e| self.visit_value(e)).transpose()?;
                if lower.is_none() && upper.is_none() {
                    Ok(None)
                } else {
                    Ok(Some(AxisIndex::Range { lower, upper }))
                }
            }
        }
    }

    /// `obj[rows, cols]` as an expression.
    pub(crate) fn visit_right_index(
        &mut self,
        node: &AstNode,
        object: &AstNode,
        indexing: &Indexing,
    ) -> Result<ValueId, TranslationError> {
        let mut obj = self.visit_value(object)?;
        let (rows, cols) = self.visit_indexing(indexing)?;
        if let Some(rows) = rows {
            obj = self.apply_right_indexing(node, Axis::Row, obj, rows, false)?;
        }
        if let Some(cols) = cols {
            let allow_label = self.type_of(obj).is_frame();
            obj = self.apply_right_indexing(node, Axis::Col, obj, cols, allow_label)?;
        }
        Ok(obj)
    }

    pub(crate) fn apply_right_indexing(
        &mut self,
        node: &AstNode,
        axis: Axis,
        obj: ValueId,
        index: AxisIndex,
        allow_label: bool,
    ) -> Result<ValueId, TranslationError> {
        let location = node.location.as_ref();
        let result_type = self.indexed_type(axis, obj);
        match index {
            AxisIndex::Position(pos) => {
                let pos_type = self.type_of(pos);
                if pos_type.is_data_object() {
                    return Ok(self.create1(axis.extract(), vec![obj, pos], result_type, location));
                }
                if pos_type.is_string() {
                    if !allow_label {
                        return Err(TranslationError::new(
                            ErrorKind::UnsupportedConstruct,
                            "cannot use right indexing with label in this case",
                        )
                        .at(node));
                    }
                    return Ok(self.create1(axis.extract(), vec![obj, pos], result_type, location));
                }
                let (lower, upper) = self.single_position_bounds(pos, location);
                Ok(self.create1(axis.slice(), vec![obj, lower, upper], result_type, location))
            }
            AxisIndex::Range { lower, upper } => {
                let (lower, upper) = self.range_bounds(axis, obj, lower, upper, location);
                Ok(self.create1(axis.slice(), vec![obj, lower, upper], result_type, location))
            }
        }
    }

    pub(crate) fn apply_left_indexing(
        &mut self,
        node: &AstNode,
        axis: Axis,
        obj: ValueId,
        inserted: ValueId,
        index: AxisIndex,
        allow_label: bool,
    ) -> Result<ValueId, TranslationError> {
        let location = node.location.as_ref();
        let result_type = self.type_of(obj);
        match index {
            AxisIndex::Position(pos) => {
                let pos_type = self.type_of(pos);
                if pos_type.is_data_object() {
                    return Err(TranslationError::new(
                        ErrorKind::UnsupportedConstruct,
                        "left indexing with positions given as a data object is not supported yet",
                    )
                    .at(node));
                }
                if pos_type.is_string() {
                    let message = if allow_label {
                        "left indexing by label is not supported yet"
                    } else {
                        "cannot use left indexing with label in this case"
                    };
                    return Err(TranslationError::new(ErrorKind::UnsupportedConstruct, message).at(node));
                }
                let (lower, upper) = self.single_position_bounds(pos, location);
                Ok(self.create1(
                    axis.insert(),
                    vec![obj, inserted, lower, upper],
                    result_type,
                    location,
                ))
            }
            AxisIndex::Range { lower, upper } => {
                let (lower, upper) = self.range_bounds(axis, obj, lower, upper, location);
                Ok(self.create1(
                    axis.insert(),
                    vec![obj, inserted, lower, upper],
                    result_type,
                    location,
                ))
            }
        }
    }

    /// Assignment through `obj[rows, cols] = value`.
    pub(crate) fn write_indexed(
        &mut self,
        node: &AstNode,
        obj: ValueId,
        value: ValueId,
        rows: Option<AxisIndex>,
        cols: Option<AxisIndex>,
    ) -> Result<ValueId, TranslationError> {
        let is_frame = self.type_of(obj).is_frame();
        match (rows, cols) {
            (Some(rows), Some(cols)) => {
                // Read the affected rows, patch their columns, write them back.
                let row_segment = self.apply_right_indexing(node, Axis::Row, obj, rows, false)?;
                let row_segment =
                    self.apply_left_indexing(node, Axis::Col, row_segment, value, cols, is_frame)?;
                self.apply_left_indexing(node, Axis::Row, obj, row_segment, rows, false)
            }
            (Some(rows), None) => self.apply_left_indexing(node, Axis::Row, obj, value, rows, false),
            (None, Some(cols)) => {
                self.apply_left_indexing(node, Axis::Col, obj, value, cols, is_frame)
            }
            (None, None) => Ok(self.rename_if(value, node.location.as_ref())),
        }
    }

    /// Half-open `[pos, pos + 1)` as si64 values.
    fn single_position_bounds(
        &mut self,
        pos: ValueId,
        location: Option<&Location>,
    ) -> (ValueId, ValueId) {
        let lower = self.cast_si64_if(pos, location);
        let one = self.const_i64(1, location);
        let upper = self.create1(
            OpKind::EwAdd,
            vec![lower, one],
            Type::Scalar(ValueType::SI64),
            location,
        );
        (lower, upper)
    }

    /// Range bounds as si64 values; a missing lower bound is 0, a missing
    /// upper bound is the extent of `obj` along `axis`.
    fn range_bounds(
        &mut self,
        axis: Axis,
        obj: ValueId,
        lower: Option<ValueId>,
        upper: Option<ValueId>,
        location: Option<&Location>,
    ) -> (ValueId, ValueId) {
        let lower = match lower {
            Some(v) => v,
            None => self.const_i64(0, location),
        };
        let upper = match upper {
            Some(v) => v,
            None => self.create1(
                axis.extent(),
                vec![obj],
                Type::Scalar(ValueType::Index),
                location,
            ),
        };
        let lower = self.cast_si64_if(lower, location);
        let upper = self.cast_si64_if(upper, location);
        (lower, upper)
    }

    /// Reading rows keeps the object type; reading columns keeps it for
    /// matrices only, since a frame's column types change.
    fn indexed_type(&self, axis: Axis, obj: ValueId) -> Type {
        match (axis, self.type_of(obj)) {
            (_, Type::Matrix(vt)) => Type::Matrix(vt),
            (Axis::Row, frame @ Type::Frame(_)) => frame,
            _ => Type::Unknown,
        }
    }
}
