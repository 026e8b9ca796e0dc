use crate::error::{Level, TabulaErrorExt};
use crate::location::{Location, Span};

/// Raised before parsing when the script holds nothing but whitespace.
#[derive(Debug, Clone)]
pub struct EmptyScriptError {
    script: String,
}

impl EmptyScriptError {
    pub fn new(script: impl Into<String>) -> Self {
        EmptyScriptError {
            script: script.into(),
        }
    }
}

impl std::fmt::Display for EmptyScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at {}:1:1)", self.message(), self.script)
    }
}

impl std::error::Error for EmptyScriptError {}

impl TabulaErrorExt for EmptyScriptError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        "The provided script is empty.".to_string()
    }

    fn issuer(&self) -> String {
        "tabula.ast.generate_ast_from_source".to_string()
    }

    fn span(&self) -> Option<Span> {
        None
    }

    fn location(&self) -> Option<Location> {
        Some(Location::new(self.script.clone(), 1, 1))
    }
}

/// Text the grammar rejected, or a parse tree the builders could not read.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    message: String,
    issuer: &'static str,
    location: Option<Location>,
    span: Option<Span>,
}

impl SyntaxError {
    pub fn new(
        message: impl Into<String>,
        issuer: &'static str,
        location: Option<Location>,
        span: Option<Span>,
    ) -> Self {
        SyntaxError {
            message: message.into(),
            issuer,
            location,
            span,
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{} (at {})", self.message, loc),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for SyntaxError {}

impl TabulaErrorExt for SyntaxError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn issuer(&self) -> String {
        self.issuer.to_string()
    }

    fn span(&self) -> Option<Span> {
        self.span.clone()
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}

/// Boxed `SyntaxError`, the form every parse helper returns.
pub(crate) fn syntax_error(
    message: impl Into<String>,
    issuer: &'static str,
    location: Option<Location>,
    span: Option<Span>,
) -> Box<dyn TabulaErrorExt> {
    Box::new(SyntaxError::new(message, issuer, location, span))
}
