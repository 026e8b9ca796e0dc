//! file: core/src/ast/mod.rs
//! description: syntax tree of the scripting language and its parser.
//!
//! `generate_ast_from_source` runs the `pest` grammar over a `Script` and
//! builds the `AstNode` tree the translator consumes.

mod err;
mod expr;
mod kind;
mod node;
mod rules;
mod stmt;

pub use crate::error::TabulaErrorExt;
pub use err::{EmptyScriptError, SyntaxError};
pub use kind::{
    AssignTarget, AstNodeKind, BinaryOperator, DataTypeName, IndexAxis, Indexing, Literal, Param,
    TypeAnnotation, UnaryOperator,
};
pub use node::AstNode;
pub use rules::{Rule, RulesParser};

use pest::Parser;

use crate::location::{Location, Span};
use crate::script::Script;

/// Parse `script` into an `AstNodeKind::Script` node.
///
/// An empty (or whitespace-only) script is rejected with an
/// `EmptyScriptError`; anything the grammar does not accept becomes a
/// `SyntaxError` pointing at the offending position.
pub fn generate_ast_from_source(script: &Script) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    if script.is_empty() {
        return Err(Box::new(EmptyScriptError::new(script.name.clone())));
    }

    let mut pairs = RulesParser::parse(Rule::script, &script.content)
        .map_err(|err| pest_error(err, &script.name))?;
    match pairs.next() {
        Some(pair) => stmt::parse_script_rule(pair, script),
        None => Err(err::syntax_error(
            "The parser produced no script node.",
            "tabula.ast.generate_ast_from_source",
            None,
            None,
        )),
    }
}

/// Parse the text of a `$name` command-line argument, which must be exactly
/// one literal.
pub fn parse_literal_argument(text: &str) -> Result<AstNode, Box<dyn TabulaErrorExt>> {
    let script = Script::from_source(std::path::Path::new("<argument>"), text);
    let mut pairs = RulesParser::parse(Rule::literal_argument, text)
        .map_err(|err| pest_error(err, &script.name))?;
    let outer = pairs.next();
    let literal = outer
        .and_then(|p| p.into_inner().find(|inner| inner.as_rule() == Rule::literal))
        .ok_or_else(|| {
            err::syntax_error(
                format!("`{}` is not a literal", text),
                "tabula.ast.parse_literal_argument",
                None,
                None,
            )
        })?;
    expr::parse_literal_rule(literal, &script)
}

fn pest_error(err: pest::error::Error<Rule>, file: &str) -> Box<dyn TabulaErrorExt> {
    let ((line, column), (end_line, end_column)) = match err.line_col {
        pest::error::LineColLocation::Pos(pos) => (pos, pos),
        pest::error::LineColLocation::Span(start, end) => (start, end),
    };
    let location = Location::new(file, line, column);
    let end = Location::new(file, end_line, end_column);
    err::syntax_error(
        format!("Syntax error: {}", err.variant.message()),
        "tabula.ast.parser",
        Some(location.clone()),
        Some(Span::new(location, end)),
    )
}
