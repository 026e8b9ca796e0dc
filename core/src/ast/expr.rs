use crate::{
    ast::{
        AstNode, AstNodeKind, BinaryOperator, IndexAxis, Indexing, Literal, Rule, TabulaErrorExt,
        UnaryOperator, err::syntax_error, rules, stmt,
    },
    script,
};

use super::rules::{Inner, Pair};

/// Parse any expression-level pair into an `AstNode`.
pub(crate) fn parse_expression_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    match pair.as_rule() {
        Rule::expr => {
            let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
            let next = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
            parse_expression_rule(next, script)
        }
        Rule::ternary => parse_ternary_rule(pair, script),
        Rule::disj
        | Rule::conj
        | Rule::cmp
        | Rule::add
        | Rule::mul
        | Rule::modulo
        | Rule::matmul => parse_left_assoc_rule(pair, script),
        Rule::pow => parse_pow_rule(pair, script),
        Rule::unary => parse_unary_rule(pair, script),
        Rule::postfix => parse_postfix_rule(pair, script),
        Rule::primary => parse_primary_rule(pair, script),
        other => Err(syntax_error(
            format!("Unexpected expression type. {:?}", other),
            "tabula.expr.parse_expression_rule",
            rules::get_location_from_pair(&pair, script),
            rules::get_span_from_pair(&pair, script),
        )),
    }
}

fn parse_ternary_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let cond_pair = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let condition = parse_expression_rule(cond_pair, script)?;
    let Some(then_pair) = inner_pairs.next() else {
        return Ok(condition);
    };
    let then_expr = parse_expression_rule(then_pair, script)?;
    let else_pair = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let else_expr = parse_expression_rule(else_pair, script)?;
    Ok(AstNode::new(
        AstNodeKind::Ternary {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        },
        location,
        span,
    ))
}

/// Folds `operand (op operand)*` into left-nested binary nodes.
fn parse_left_assoc_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let left_pair = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let mut node = parse_expression_rule(left_pair, script)?;

    while let Some(op_pair) = inner_pairs.next() {
        let op = parse_operator(&op_pair, script)?;
        let kernel_hint = take_kernel_hint(&mut inner_pairs);
        let right_pair = match inner_pairs.next() {
            Some(rp) => rp,
            None => {
                return Err(syntax_error(
                    format!("Missing right-hand operand for `{}`.", op_pair.as_str()),
                    "tabula.expr.parse_left_assoc_rule",
                    location.clone(),
                    span.clone(),
                ));
            }
        };
        let right_node = parse_expression_rule(right_pair, script)?;

        node = AstNode::new(
            AstNodeKind::Binary {
                left: Box::new(node),
                op,
                right: Box::new(right_node),
                kernel_hint,
            },
            rules::get_location_from_pair(&op_pair, script),
            rules::get_span_from_pair(&op_pair, script),
        );
    }

    Ok(node)
}

/// `base ^ exponent` binds to the right.
fn parse_pow_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let base_pair = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let base = parse_expression_rule(base_pair, script)?;
    let Some(op_pair) = inner_pairs.next() else {
        return Ok(base);
    };
    let exponent_pair = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let exponent = parse_expression_rule(exponent_pair, script)?;
    Ok(AstNode::new(
        AstNodeKind::Binary {
            left: Box::new(base),
            op: BinaryOperator::Pow,
            right: Box::new(exponent),
            kernel_hint: None,
        },
        rules::get_location_from_pair(&op_pair, script),
        rules::get_span_from_pair(&op_pair, script),
    ))
}

fn parse_operator(
    op_pair: &Pair,
    script: &script::Script,
) -> Result<BinaryOperator, Box<dyn TabulaErrorExt>> {
    BinaryOperator::from_symbol(op_pair.as_str()).ok_or_else(|| {
        syntax_error(
            format!("Invalid operator `{}`.", op_pair.as_str()),
            "tabula.expr.parse_operator",
            rules::get_location_from_pair(op_pair, script),
            rules::get_span_from_pair(op_pair, script),
        )
    })
}

fn take_kernel_hint(pairs: &mut Inner) -> Option<String> {
    if pairs.peek().map(|p| p.as_rule()) == Some(Rule::kernel_hint) {
        pairs.next().map(|p| kernel_hint_name(&p))
    } else {
        None
    }
}

fn kernel_hint_name(pair: &Pair) -> String {
    pair.as_str().trim_start_matches("::").trim().to_string()
}

fn parse_unary_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let mut ops = Vec::new();
    let mut operand = None;
    for next in inner_pairs {
        match next.as_rule() {
            Rule::unary_op => {
                let op = if next.as_str() == "-" {
                    UnaryOperator::Minus
                } else {
                    UnaryOperator::Plus
                };
                ops.push((
                    op,
                    rules::get_location_from_pair(&next, script),
                    rules::get_span_from_pair(&next, script),
                ));
            }
            _ => operand = Some(parse_expression_rule(next, script)?),
        }
    }
    let Some(mut node) = operand else {
        return Err(syntax_error(
            "Unary operator without operand.",
            "tabula.expr.parse_unary_rule",
            location,
            span,
        ));
    };
    for (op, op_location, op_span) in ops.into_iter().rev() {
        node = AstNode::new(
            AstNodeKind::Unary {
                op,
                expr: Box::new(node),
            },
            op_location,
            op_span,
        );
    }
    Ok(node)
}

fn parse_postfix_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let primary_pair = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let mut node = parse_expression_rule(primary_pair, script)?;
    for next in inner_pairs {
        let next_location = rules::get_location_from_pair(&next, script);
        let next_span = rules::get_span_from_pair(&next, script);
        node = match next.as_rule() {
            Rule::indexing => AstNode::new(
                AstNodeKind::RightIndex {
                    object: Box::new(node),
                    indexing: parse_indexing_rule(next, script)?,
                },
                next_location,
                next_span,
            ),
            Rule::filter_index => {
                let mut rows = None;
                let mut cols = None;
                for part in next.into_inner() {
                    let target = if part.as_rule() == Rule::filter_rows {
                        &mut rows
                    } else {
                        &mut cols
                    };
                    *target = Some(Box::new(parse_wrapped_expression(part, script)?));
                }
                AstNode::new(
                    AstNodeKind::Filter {
                        object: Box::new(node),
                        rows,
                        cols,
                    },
                    next_location,
                    next_span,
                )
            }
            other => {
                return Err(syntax_error(
                    format!("Unexpected postfix rule: {:?}", other),
                    "tabula.expr.parse_postfix_rule",
                    next_location,
                    next_span,
                ));
            }
        };
    }
    Ok(node)
}

/// Parse an `indexing` pair (`[rows, cols]`).
pub(crate) fn parse_indexing_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<Indexing, Box<dyn TabulaErrorExt>> {
    let mut indexing = Indexing {
        rows: None,
        cols: None,
    };
    for axis_pair in pair.into_inner() {
        let is_rows = axis_pair.as_rule() == Rule::row_axis;
        let (mut inner, location, span) = rules::get_data_from_rule(&axis_pair, script);
        let selector = rules::fetch_next_pair(&mut inner, &location, &span)?;
        let axis = if selector.as_rule() == Rule::range_axis {
            let mut lower = None;
            let mut upper = None;
            for bound in selector.into_inner() {
                let is_lower = bound.as_rule() == Rule::range_lower;
                let value = Some(Box::new(parse_wrapped_expression(bound, script)?));
                if is_lower {
                    lower = value;
                } else {
                    upper = value;
                }
            }
            IndexAxis::Range { lower, upper }
        } else {
            IndexAxis::Position(Box::new(parse_expression_rule(selector, script)?))
        };
        if is_rows {
            indexing.rows = Some(axis);
        } else {
            indexing.cols = Some(axis);
        }
    }
    Ok(indexing)
}

/// Parse a named wrapper rule holding exactly one `expr`.
fn parse_wrapped_expression(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (mut inner, location, span) = rules::get_data_from_rule(&pair, script);
    let expr_pair = rules::fetch_next_pair(&mut inner, &location, &span)?;
    parse_expression_rule(expr_pair, script)
}

fn parse_primary_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let next = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    match next.as_rule() {
        Rule::expr => parse_expression_rule(next, script),
        Rule::literal => parse_literal_rule(next, script),
        Rule::qualified => Ok(AstNode::new(
            AstNodeKind::Identifier {
                name: next.as_str().to_string(),
            },
            location,
            span,
        )),
        Rule::arg_expr => Ok(AstNode::new(
            AstNodeKind::Arg {
                name: next.as_str().trim_start_matches('$').to_string(),
            },
            location,
            span,
        )),
        Rule::cast_expr => parse_cast_rule(next, script),
        Rule::call_expr => parse_call_rule(next, script),
        Rule::matrix_literal => parse_matrix_literal_rule(next, script),
        Rule::row_major_frame => parse_row_major_frame_rule(next, script),
        Rule::col_major_frame => parse_col_major_frame_rule(next, script),
        other => Err(syntax_error(
            format!("Unexpected primary expression: {:?}", other),
            "tabula.expr.parse_primary_rule",
            location,
            span,
        )),
    }
}

/// Parse a `literal` pair.
pub(crate) fn parse_literal_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let next = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let literal = match next.as_rule() {
        Rule::int_literal => Literal::Int(next.as_str().to_string()),
        Rule::float_literal => Literal::Float(next.as_str().to_string()),
        Rule::bool_literal => Literal::Bool(next.as_str() == "true"),
        Rule::string_literal => Literal::Str(stmt::unescape_string(next.as_str())),
        other => {
            return Err(syntax_error(
                format!("Unexpected literal type: {:?}", other),
                "tabula.expr.parse_literal_rule",
                location,
                span,
            ));
        }
    };
    Ok(AstNode::new(AstNodeKind::Literal(literal), location, span))
}

fn parse_cast_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let head = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let target = stmt::parse_type_def(head)?;
    let arg_pair = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let expr = parse_expression_rule(arg_pair, script)?;
    Ok(AstNode::new(
        AstNodeKind::Cast {
            target,
            expr: Box::new(expr),
        },
        location,
        span,
    ))
}

fn parse_call_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let name = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?
        .as_str()
        .to_string();
    let kernel_hint = take_kernel_hint(&mut inner_pairs);
    let args = inner_pairs
        .map(|p| parse_expression_rule(p, script))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(AstNode::new(
        AstNodeKind::Call {
            name,
            kernel_hint,
            args,
        },
        location,
        span,
    ))
}

fn parse_matrix_literal_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let mut elements = Vec::new();
    let mut rows = None;
    let mut cols = None;
    for next in inner_pairs {
        match next.as_rule() {
            Rule::matrix_dims => {
                for dim in next.into_inner() {
                    let is_rows = dim.as_rule() == Rule::dim_rows;
                    let value = Some(Box::new(parse_wrapped_expression(dim, script)?));
                    if is_rows {
                        rows = value;
                    } else {
                        cols = value;
                    }
                }
            }
            _ => elements.push(parse_expression_rule(next, script)?),
        }
    }
    Ok(AstNode::new(
        AstNodeKind::MatrixLiteral {
            elements,
            rows,
            cols,
        },
        location,
        span,
    ))
}

fn parse_row_major_frame_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let mut rows_iter = inner_pairs.map(|row| {
        row.into_inner()
            .map(|cell| parse_expression_rule(cell, script))
            .collect::<Result<Vec<_>, _>>()
    });
    let labels = match rows_iter.next() {
        Some(labels) => labels?,
        None => {
            return Err(syntax_error(
                "Frame literal without a label row.",
                "tabula.expr.parse_row_major_frame_rule",
                location,
                span,
            ));
        }
    };
    let rows = rows_iter.collect::<Result<Vec<_>, _>>()?;
    Ok(AstNode::new(
        AstNodeKind::RowMajorFrame { labels, rows },
        location,
        span,
    ))
}

fn parse_col_major_frame_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let mut columns = Vec::new();
    for column in inner_pairs {
        let (mut parts, column_location, column_span) = rules::get_data_from_rule(&column, script);
        let label_pair = rules::fetch_next_pair(&mut parts, &column_location, &column_span)?;
        let label = parse_expression_rule(label_pair, script)?;
        let values_pair = rules::fetch_next_pair(&mut parts, &column_location, &column_span)?;
        let values = parse_expression_rule(values_pair, script)?;
        columns.push((label, values));
    }
    Ok(AstNode::new(
        AstNodeKind::ColMajorFrame { columns },
        location,
        span,
    ))
}
