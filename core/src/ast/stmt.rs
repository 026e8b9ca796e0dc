//! file: core/src/ast/stmt.rs
//! description: parsing helpers for statements.
//!
//! Turns `statement` pairs from the `pest`-generated `RulesParser` into
//! `AstNode`s. Every node carries the `Location`/`Span` of the rule it was
//! built from so later stages can point back into the source.
//!
use crate::{
    ast::{
        AssignTarget, AstNode, AstNodeKind, DataTypeName, Param, Rule, TypeAnnotation,
        TabulaErrorExt, err::syntax_error, expr, rules,
    },
    script,
};

use super::rules::Pair;

/// Parse the `script` rule into an `AstNodeKind::Script` node.
pub(crate) fn parse_script_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let mut body = Vec::new();
    for next in inner_pairs {
        match next.as_rule() {
            Rule::statement => body.push(parse_statement_rule(next, script)?),
            Rule::EOI => {}
            other => {
                return Err(syntax_error(
                    format!("Unexpected rule at top level: {:?}", other),
                    "tabula.stmt.parse_script_rule",
                    location,
                    span,
                ));
            }
        }
    }
    Ok(AstNode::new(AstNodeKind::Script { body }, location, span))
}

pub(crate) fn parse_statement_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let next_rule = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    match next_rule.as_rule() {
        Rule::block_stmt => parse_block_rule(next_rule, script),
        Rule::import_stmt => parse_import_rule(next_rule, script),
        Rule::function_stmt => parse_function_rule(next_rule, script),
        Rule::if_stmt => parse_if_rule(next_rule, script),
        Rule::while_stmt => parse_while_rule(next_rule, script, false),
        Rule::do_while_stmt => parse_while_rule(next_rule, script, true),
        Rule::for_stmt => parse_for_rule(next_rule, script, false),
        Rule::parfor_stmt => parse_for_rule(next_rule, script, true),
        Rule::return_stmt => parse_return_rule(next_rule, script),
        Rule::assign_stmt => parse_assign_rule(next_rule, script),
        Rule::expr_stmt => {
            let (mut inner, location, span) = rules::get_data_from_rule(&next_rule, script);
            let expr_pair = rules::fetch_next_pair(&mut inner, &location, &span)?;
            let expr = expr::parse_expression_rule(expr_pair, script)?;
            Ok(AstNode::new(
                AstNodeKind::ExprStatement {
                    expr: Box::new(expr),
                },
                location,
                span,
            ))
        }
        other => Err(syntax_error(
            format!("Unexpected statement type: {:?}", other),
            "tabula.stmt.parse_statement_rule",
            location,
            span,
        )),
    }
}

fn parse_block_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let statements = inner_pairs
        .map(|p| parse_statement_rule(p, script))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(AstNode::new(AstNodeKind::Block { statements }, location, span))
}

fn parse_import_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let path_pair = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let path = unescape_string(path_pair.as_str());
    let alias = inner_pairs.next().map(|p| unescape_string(p.as_str()));
    Ok(AstNode::new(AstNodeKind::Import { path, alias }, location, span))
}

fn parse_function_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let name = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?
        .as_str()
        .to_string();

    let mut params = Vec::new();
    let mut returns = None;
    let mut body = None;
    for next in inner_pairs {
        match next.as_rule() {
            Rule::param_list => {
                for param_pair in next.into_inner() {
                    let mut parts = param_pair.into_inner();
                    let param_name = match parts.next() {
                        Some(p) => p.as_str().to_string(),
                        None => continue,
                    };
                    let ty = parts.next().map(parse_type_def).transpose()?;
                    params.push(Param {
                        name: param_name,
                        ty,
                    });
                }
            }
            Rule::return_types => {
                let types = next
                    .into_inner()
                    .map(parse_type_def)
                    .collect::<Result<Vec<_>, _>>()?;
                returns = Some(types);
            }
            Rule::block_stmt => body = Some(parse_block_rule(next, script)?),
            other => {
                return Err(syntax_error(
                    format!("Unexpected rule in function definition: {:?}", other),
                    "tabula.stmt.parse_function_rule",
                    location,
                    span,
                ));
            }
        }
    }

    let Some(body) = body else {
        return Err(syntax_error(
            format!("Function `{}` has no body.", name),
            "tabula.stmt.parse_function_rule",
            location,
            span,
        ));
    };
    Ok(AstNode::new(
        AstNodeKind::Function {
            name,
            params,
            returns,
            body: Box::new(body),
        },
        location,
        span,
    ))
}

/// Parse a `type_def` (or the head of a cast) into a `TypeAnnotation`.
pub(crate) fn parse_type_def(pair: Pair) -> Result<TypeAnnotation, Box<dyn TabulaErrorExt>> {
    let mut annotation = TypeAnnotation {
        data_type: None,
        value_type: None,
    };
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::data_type => annotation.data_type = DataTypeName::from_keyword(part.as_str()),
            Rule::value_type => annotation.value_type = Some(part.as_str().to_string()),
            _ => {}
        }
    }
    Ok(annotation)
}

fn parse_if_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let cond_pair = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let condition = expr::parse_expression_rule(cond_pair, script)?;
    let then_pair = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let then_branch = parse_statement_rule(then_pair, script)?;
    let else_branch = inner_pairs
        .next()
        .map(|p| parse_statement_rule(p, script))
        .transpose()?;
    Ok(AstNode::new(
        AstNodeKind::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        },
        location,
        span,
    ))
}

fn parse_while_rule(
    pair: Pair,
    script: &script::Script,
    do_while: bool,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let first = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let second = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    // `while (cond) body` versus `do body while (cond)`
    let (cond_pair, body_pair) = if do_while {
        (second, first)
    } else {
        (first, second)
    };
    let condition = expr::parse_expression_rule(cond_pair, script)?;
    let body = parse_statement_rule(body_pair, script)?;
    Ok(AstNode::new(
        AstNodeKind::While {
            condition: Box::new(condition),
            body: Box::new(body),
            do_while,
        },
        location,
        span,
    ))
}

fn parse_for_rule(
    pair: Pair,
    script: &script::Script,
    parallel: bool,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (mut inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let var = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?
        .as_str()
        .to_string();

    let range_pair = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let (mut bounds, range_location, range_span) = rules::get_data_from_rule(&range_pair, script);
    let from_pair = rules::fetch_next_pair(&mut bounds, &range_location, &range_span)?;
    let from = Box::new(expr::parse_expression_rule(from_pair, script)?);
    let to_pair = rules::fetch_next_pair(&mut bounds, &range_location, &range_span)?;
    let to = Box::new(expr::parse_expression_rule(to_pair, script)?);
    let step = bounds
        .next()
        .map(|p| expr::parse_expression_rule(p, script).map(Box::new))
        .transpose()?;

    let body_pair = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let body = Box::new(parse_statement_rule(body_pair, script)?);

    let kind = if parallel {
        AstNodeKind::ParFor {
            var,
            from,
            to,
            step,
            body,
        }
    } else {
        AstNodeKind::For {
            var,
            from,
            to,
            step,
            body,
        }
    };
    Ok(AstNode::new(kind, location, span))
}

fn parse_return_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let values = inner_pairs
        .map(|p| expr::parse_expression_rule(p, script))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(AstNode::new(AstNodeKind::Return { values }, location, span))
}

fn parse_assign_rule(
    pair: Pair,
    script: &script::Script,
) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, script);
    let mut targets = Vec::new();
    let mut value = None;
    for next in inner_pairs {
        match next.as_rule() {
            Rule::assign_target => {
                let (mut parts, target_location, target_span) =
                    rules::get_data_from_rule(&next, script);
                let name = rules::fetch_next_pair(&mut parts, &target_location, &target_span)?
                    .as_str()
                    .to_string();
                let indexing = parts
                    .next()
                    .map(|p| expr::parse_indexing_rule(p, script))
                    .transpose()?;
                targets.push(AssignTarget { name, indexing });
            }
            Rule::expr => value = Some(expr::parse_expression_rule(next, script)?),
            other => {
                return Err(syntax_error(
                    format!("Unexpected rule in assignment: {:?}", other),
                    "tabula.stmt.parse_assign_rule",
                    location,
                    span,
                ));
            }
        }
    }
    let Some(value) = value else {
        return Err(syntax_error(
            "Assignment without a value.",
            "tabula.stmt.parse_assign_rule",
            location,
            span,
        ));
    };
    Ok(AstNode::new(
        AstNodeKind::Assignment {
            targets,
            value: Box::new(value),
        },
        location,
        span,
    ))
}

/// Strip the quotes of a string literal and resolve its escape sequences.
pub(crate) fn unescape_string(raw: &str) -> String {
    let body = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::unescape_string;

    #[test]
    fn unescapes_supported_sequences() {
        assert_eq!(unescape_string(r#""a\tb\n""#), "a\tb\n");
        assert_eq!(unescape_string(r#""say \"hi\"""#), "say \"hi\"");
        assert_eq!(unescape_string(r#""back\\slash""#), "back\\slash");
        assert_eq!(unescape_string(r#""\b\f\r""#), "\u{8}\u{c}\r");
    }

    #[test]
    fn keeps_unknown_escapes() {
        assert_eq!(unescape_string(r#""\q""#), "\\q");
    }
}
