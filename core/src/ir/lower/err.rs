use std::fmt;

use crate::ast::AstNode;
use crate::error::{Level, TabulaErrorExt};
use crate::location::{Location, Span};

/// Failure classes of the translator. All of them abort translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UndefinedVariable,
    ReadOnlyAssignment,
    TypeAmbiguity,
    ArityMismatch,
    OverloadResolutionError,
    ImportError,
    UnsupportedConstruct,
    InvalidLiteral,
}

impl ErrorKind {
    fn issuer(&self) -> &'static str {
        match self {
            ErrorKind::UndefinedVariable => "tabula.lower.undefined_variable",
            ErrorKind::ReadOnlyAssignment => "tabula.lower.read_only_assignment",
            ErrorKind::TypeAmbiguity => "tabula.lower.type_ambiguity",
            ErrorKind::ArityMismatch => "tabula.lower.arity_mismatch",
            ErrorKind::OverloadResolutionError => "tabula.lower.overload_resolution",
            ErrorKind::ImportError => "tabula.lower.import",
            ErrorKind::UnsupportedConstruct => "tabula.lower.unsupported_construct",
            ErrorKind::InvalidLiteral => "tabula.lower.invalid_literal",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationError {
    pub kind: ErrorKind,
    message: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl TranslationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        TranslationError {
            kind,
            message: message.into(),
            location: None,
            span: None,
        }
    }

    /// Attach the position of `node`.
    pub fn at(mut self, node: &AstNode) -> Self {
        self.location = node.location.clone();
        self.span = node.span.clone();
        self
    }

    pub fn at_location(mut self, location: Option<&Location>) -> Self {
        self.location = location.cloned();
        self
    }
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(loc) = &self.location {
            write!(f, "{} (at {})", self.message, loc)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for TranslationError {}

impl TabulaErrorExt for TranslationError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn issuer(&self) -> String {
        self.kind.issuer().to_string()
    }

    fn span(&self) -> Option<Span> {
        self.span.clone()
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}
