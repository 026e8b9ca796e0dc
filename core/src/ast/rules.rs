use pest_derive::Parser;

use crate::error::TabulaErrorExt;
use crate::location;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct RulesParser;

pub(crate) type Pair<'a> = pest::iterators::Pair<'a, Rule>;
/// Inner pairs of a rule, keyword tokens already removed.
pub(crate) type Inner<'a> = std::iter::Peekable<std::vec::IntoIter<Pair<'a>>>;

pub(crate) fn fetch_next_pair<'a>(
    pairs: &mut Inner<'a>,
    location: &Option<location::Location>,
    span: &Option<location::Span>,
) -> Result<Pair<'a>, Box<dyn TabulaErrorExt>> {
    match pairs.next() {
        Some(pair) => Ok(pair),
        None => Err(super::err::syntax_error(
            "Expected more inner pairs but found none.",
            "tabula.ast.rules.fetch_next_pair",
            location.clone(),
            span.clone(),
        )),
    }
}

/// Inner pairs of `rule` with keyword tokens filtered out, plus the
/// location and span of `rule` itself.
pub(crate) fn get_data_from_rule<'a>(
    rule: &Pair<'a>,
    script: &crate::script::Script,
) -> (
    Inner<'a>,
    Option<crate::location::Location>,
    Option<crate::location::Span>,
) {
    let inner_rules: Vec<Pair<'a>> = rule
        .clone()
        .into_inner()
        .filter(|p| !is_keyword(p.as_rule()))
        .collect();
    let span = get_span_from_pair(rule, script);
    let location = get_location_from_pair(rule, script);
    (inner_rules.into_iter().peekable(), location, span)
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_import
            | Rule::kw_as
            | Rule::kw_def
            | Rule::kw_if
            | Rule::kw_else
            | Rule::kw_while
            | Rule::kw_do
            | Rule::kw_for
            | Rule::kw_parfor
            | Rule::kw_in
            | Rule::kw_return
    )
}

pub fn get_location_from_pair(
    rule: &Pair,
    script: &crate::script::Script,
) -> Option<crate::location::Location> {
    let (line, column) = rule.as_span().start_pos().line_col();
    Some(crate::location::Location {
        file: script.name.clone(),
        line,
        column,
    })
}

pub fn get_span_from_pair(
    rule: &Pair,
    script: &crate::script::Script,
) -> Option<crate::location::Span> {
    let span = rule.as_span();
    let (start_line, start_column) = span.start_pos().line_col();
    let (end_line, end_column) = span.end_pos().line_col();
    Some(crate::location::Span {
        start: crate::location::Location {
            file: script.name.clone(),
            line: start_line,
            column: start_column,
        },
        end: crate::location::Location {
            file: script.name.clone(),
            line: end_line,
            column: end_column,
        },
    })
}
