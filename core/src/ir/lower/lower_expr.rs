//! file: core/src/ir/lower/lower_expr.rs
//! description: expression lowering.
//!
//! Every expression visit returns a `Lowered`: nothing, one value, or the
//! tuple of results of a multi-result call. Most callers want exactly one
//! value and go through `visit_value`.

use super::err::{ErrorKind, TranslationError};
use super::{Lowered, Translator};
use crate::ast::{
    AstNode, AstNodeKind, BinaryOperator, DataTypeName, TypeAnnotation, UnaryOperator,
    parse_literal_argument,
};
use crate::ir::op::OpKind;
use crate::ir::types::{Type, ValueType};
use crate::ir::value::ValueId;

impl Translator<'_> {
    pub(crate) fn visit_expr(&mut self, node: &AstNode) -> Result<Lowered, TranslationError> {
        let value = match &node.kind {
            AstNodeKind::Call {
                name,
                kernel_hint,
                args,
            } => return self.visit_call(node, name, kernel_hint.as_deref(), args),
            AstNodeKind::Literal(literal) => self.visit_literal(node, literal)?,
            AstNodeKind::Arg { name } => self.visit_arg(node, name)?,
            AstNodeKind::Identifier { name } => self.visit_identifier(node, name)?,
            AstNodeKind::Cast { target, expr } => self.visit_cast(node, target, expr)?,
            AstNodeKind::RightIndex { object, indexing } => {
                self.visit_right_index(node, object, indexing)?
            }
            AstNodeKind::Filter { object, rows, cols } => {
                self.visit_filter(node, object, rows.as_deref(), cols.as_deref())?
            }
            AstNodeKind::Unary { op, expr } => self.visit_unary(node, *op, expr)?,
            AstNodeKind::Binary {
                left,
                op,
                right,
                kernel_hint,
            } => self.visit_binary(node, left, *op, right, kernel_hint.as_deref())?,
            AstNodeKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                let mut cond = self.visit_value(condition)?;
                // matrix conditions select cell by cell
                if !self.type_of(cond).is_data_object() {
                    cond = self.cast_bool_if(cond, node.location.as_ref());
                }
                let then_value = self.visit_value(then_expr)?;
                let else_value = self.visit_value(else_expr)?;
                let ty = Type::cond_result(
                    &self.type_of(cond),
                    &self.type_of(then_value),
                    &self.type_of(else_value),
                );
                self.create1(
                    OpKind::Cond,
                    vec![cond, then_value, else_value],
                    ty,
                    node.location.as_ref(),
                )
            }
            AstNodeKind::MatrixLiteral {
                elements,
                rows,
                cols,
            } => self.visit_matrix_literal(node, elements, rows.as_deref(), cols.as_deref())?,
            AstNodeKind::ColMajorFrame { columns } => self.visit_col_major_frame(node, columns)?,
            AstNodeKind::RowMajorFrame { labels, rows } => {
                self.visit_row_major_frame(node, labels, rows)?
            }
            other => {
                return Err(TranslationError::new(
                    ErrorKind::UnsupportedConstruct,
                    format!("a {} cannot be used as an expression", other.describe()),
                )
                .at(node));
            }
        };
        Ok(Lowered::Single(value))
    }

    /// Visit an expression that must produce exactly one value.
    pub(crate) fn visit_value(&mut self, node: &AstNode) -> Result<ValueId, TranslationError> {
        match self.visit_expr(node)? {
            Lowered::Single(value) => Ok(value),
            Lowered::Nothing => Err(TranslationError::new(
                ErrorKind::ArityMismatch,
                "expression does not produce a value",
            )
            .at(node)),
            Lowered::Multi(values) => Err(TranslationError::new(
                ErrorKind::ArityMismatch,
                format!("expected a single value, but the expression produces {}", values.len()),
            )
            .at(node)),
        }
    }

    fn visit_identifier(&mut self, node: &AstNode, name: &str) -> Result<ValueId, TranslationError> {
        match self.ctx.symbols.get(name) {
            Some(info) => Ok(info.value),
            None => Err(TranslationError::new(
                ErrorKind::UndefinedVariable,
                format!("variable `{}` referenced before assignment", name),
            )
            .at(node)),
        }
    }

    /// `$name`: the command-line value is parsed as a literal; one leading
    /// `-` is re-applied as a negation.
    fn visit_arg(&mut self, node: &AstNode, name: &str) -> Result<ValueId, TranslationError> {
        let args = self.args();
        let Some(text) = args.get(name) else {
            return Err(TranslationError::new(
                ErrorKind::UndefinedVariable,
                format!(
                    "argument {} referenced, but not provided as a command line argument",
                    name
                ),
            )
            .at(node));
        };
        let (negative, literal_text) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.as_str()),
        };
        let invalid = || {
            TranslationError::new(
                ErrorKind::InvalidLiteral,
                format!("invalid literal value for argument '{}': {}", name, text),
            )
            .at(node)
        };
        let parsed = parse_literal_argument(literal_text).map_err(|_| invalid())?;
        let AstNodeKind::Literal(literal) = &parsed.kind else {
            return Err(invalid());
        };
        let value = self.visit_literal(node, literal)?;
        if negative {
            let ty = self.type_of(value);
            Ok(self.create1(OpKind::EwMinus, vec![value], ty, node.location.as_ref()))
        } else {
            Ok(value)
        }
    }

    fn visit_unary(
        &mut self,
        node: &AstNode,
        op: UnaryOperator,
        expr: &AstNode,
    ) -> Result<ValueId, TranslationError> {
        let value = self.visit_value(expr)?;
        match op {
            UnaryOperator::Plus => Ok(value),
            UnaryOperator::Minus => {
                let ty = self.type_of(value);
                Ok(self.create1(OpKind::EwMinus, vec![value], ty, node.location.as_ref()))
            }
        }
    }

    fn visit_binary(
        &mut self,
        node: &AstNode,
        left: &AstNode,
        op: BinaryOperator,
        right: &AstNode,
        kernel_hint: Option<&str>,
    ) -> Result<ValueId, TranslationError> {
        let location = node.location.as_ref();
        let lhs = self.visit_value(left)?;
        let rhs = self.visit_value(right)?;

        if op == BinaryOperator::MatMul {
            // operands: lhs, rhs, transpose-lhs, transpose-rhs
            let transpose_lhs = self.const_bool(false, location);
            let transpose_rhs = self.const_bool(false, location);
            let ty = self.type_of(lhs);
            return Ok(self.create1(
                OpKind::MatMul,
                vec![lhs, rhs, transpose_lhs, transpose_rhs],
                ty,
                location,
            ));
        }

        let kind = match op {
            BinaryOperator::Pow => OpKind::EwPow,
            BinaryOperator::Mod => OpKind::EwMod,
            BinaryOperator::Mul => OpKind::EwMul,
            BinaryOperator::Div => OpKind::EwDiv,
            BinaryOperator::Add => OpKind::EwAdd,
            BinaryOperator::Sub => OpKind::EwSub,
            BinaryOperator::Eq => OpKind::EwEq,
            BinaryOperator::Ne => OpKind::EwNeq,
            BinaryOperator::Lt => OpKind::EwLt,
            BinaryOperator::Le => OpKind::EwLe,
            BinaryOperator::Gt => OpKind::EwGt,
            BinaryOperator::Ge => OpKind::EwGe,
            BinaryOperator::And => OpKind::EwAnd,
            BinaryOperator::Or => OpKind::EwOr,
            BinaryOperator::MatMul => OpKind::MatMul,
        };
        let predicate = matches!(
            op,
            BinaryOperator::Eq
                | BinaryOperator::Ne
                | BinaryOperator::Lt
                | BinaryOperator::Le
                | BinaryOperator::Gt
                | BinaryOperator::Ge
                | BinaryOperator::And
                | BinaryOperator::Or
        );
        let ty = Type::ew_binary_result(&self.type_of(lhs), &self.type_of(rhs), predicate);
        let result = self.create1(kind, vec![lhs, rhs], ty, location);
        if let Some(hint) = kernel_hint {
            if !op.accepts_kernel_hint() {
                return Err(TranslationError::new(
                    ErrorKind::UnsupportedConstruct,
                    "kernel hints are only supported for +, -, * and /",
                )
                .at(node));
            }
            self.attach_kernel_hint(hint);
        }
        Ok(result)
    }

    pub(crate) fn attach_kernel_hint(&mut self, hint: &str) {
        if let Some(op) = self.builder.last_op_mut() {
            op.attrs.insert("kernel_hint".to_string(), hint.to_string());
        }
    }

    fn visit_filter(
        &mut self,
        node: &AstNode,
        object: &AstNode,
        rows: Option<&AstNode>,
        cols: Option<&AstNode>,
    ) -> Result<ValueId, TranslationError> {
        let location = node.location.as_ref();
        let mut obj = self.visit_value(object)?;
        if let Some(rows) = rows {
            let selection = self.visit_value(rows)?;
            let ty = self.type_of(obj);
            obj = self.create1(OpKind::FilterRow, vec![obj, selection], ty, location);
        }
        if let Some(cols) = cols {
            let selection = self.visit_value(cols)?;
            let ty = match self.type_of(obj) {
                Type::Matrix(vt) => Type::Matrix(vt),
                _ => Type::Unknown,
            };
            obj = self.create1(OpKind::FilterCol, vec![obj, selection], ty, location);
        }
        Ok(obj)
    }

    /// `as.<data type><value type>(expr)`; the result type is derived from
    /// the target and the type of the argument.
    fn visit_cast(
        &mut self,
        node: &AstNode,
        target: &TypeAnnotation,
        expr: &AstNode,
    ) -> Result<ValueId, TranslationError> {
        let arg = self.visit_value(expr)?;
        let arg_type = self.type_of(arg);
        let value_type = target
            .value_type
            .as_deref()
            .map(|name| self.value_type_by_name(node, name))
            .transpose()?;

        let result_type = match (target.data_type, value_type) {
            (Some(DataTypeName::Matrix), Some(vt)) => Type::Matrix(vt),
            (Some(DataTypeName::Matrix), None) => Type::Matrix(arg_type.element_type()),
            (Some(DataTypeName::Frame), Some(_)) => {
                return Err(TranslationError::new(
                    ErrorKind::UnsupportedConstruct,
                    "casting to a frame with particular column types is not supported yet",
                )
                .at(node));
            }
            (Some(DataTypeName::Frame), None) => match arg_type {
                Type::Frame(columns) => Type::Frame(columns),
                Type::Matrix(vt) | Type::Scalar(vt) => Type::Frame(vec![vt]),
                Type::Unknown => Type::Frame(vec![ValueType::Unknown]),
            },
            (Some(DataTypeName::Scalar), Some(vt)) => Type::Scalar(vt),
            (Some(DataTypeName::Scalar), None) => Type::scalar(arg_type.element_type()),
            (None, Some(vt)) => match arg_type {
                Type::Matrix(_) => Type::Matrix(vt),
                Type::Frame(_) => {
                    return Err(TranslationError::new(
                        ErrorKind::UnsupportedConstruct,
                        "casting a frame to a particular value type is not supported yet",
                    )
                    .at(node));
                }
                Type::Unknown => Type::Unknown,
                Type::Scalar(_) => Type::Scalar(vt),
            },
            (None, None) => {
                return Err(TranslationError::new(
                    ErrorKind::UnsupportedConstruct,
                    "casting requires the specification of the target data and/or value type",
                )
                .at(node));
            }
        };
        Ok(self.create1(OpKind::Cast, vec![arg], result_type, node.location.as_ref()))
    }

    pub(crate) fn value_type_by_name(
        &self,
        node: &AstNode,
        name: &str,
    ) -> Result<ValueType, TranslationError> {
        ValueType::from_name(name).ok_or_else(|| {
            TranslationError::new(
                ErrorKind::UnsupportedConstruct,
                format!("unsupported value type `{}`", name),
            )
            .at(node)
        })
    }
}
