//! Diagnostics shared by the parser, the import resolver and the IR
//! translator.

use std::fmt;

/// Severity of a diagnostic. Errors stop translation; warnings are
/// collected on the module, e.g. for statements dropped after a `return`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Warning => write!(f, "WARNING"),
            Level::Error => write!(f, "ERROR"),
        }
    }
}

/// Common surface of every error the front-end can raise, so the CLI can
/// report parse, import and translation failures the same way.
pub trait TabulaErrorExt {
    fn level(&self) -> Level;
    /// One-line, human readable description without the location.
    fn message(&self) -> String;
    /// Dotted name of the stage that raised it, e.g. `tabula.ast.parser`.
    fn issuer(&self) -> String;
    fn span(&self) -> Option<crate::location::Span>;
    /// Script position the diagnostic points at; `None` for failures that
    /// have no source position, such as an unreadable file.
    fn location(&self) -> Option<crate::location::Location>;
}

/// `TABULA | level | location | issuer | span | message`
impl fmt::Debug for dyn TabulaErrorExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loc_str = match self.location() {
            Some(loc) => loc.to_string(),
            None => "unknown".to_string(),
        };
        let span_str = match self.span() {
            Some(span) => span.to_string(),
            None => "span:none".to_string(),
        };

        write!(
            f,
            "TABULA | {} | {} | {} | {} | {}",
            self.level(),
            loc_str,
            self.issuer(),
            span_str,
            self.message()
        )
    }
}

impl fmt::Display for dyn TabulaErrorExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
