//! Source positions attached to AST nodes, IR ops and diagnostics.

/// A point in a script: 1-based line and column. `file` is the path the
/// script was loaded from, or the name given to an in-memory source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Location in `file`; lines and columns start at 1, as pest reports them.
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

/// Rendered as `file:line:column`, the form diagnostics and the CLI print.
impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Source range covered by a syntax node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Span {
    /// First character of the node.
    pub start: Location,
    /// Where the node ends; equal to `start` for single-point diagnostics.
    pub end: Location,
}

impl Span {
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_file_line_column() {
        let start = Location::new("main.daph", 3, 7);
        assert_eq!(start.to_string(), "main.daph:3:7");
        let span = Span::new(start, Location::new("main.daph", 3, 12));
        assert_eq!(span.to_string(), "main.daph:3:7 - main.daph:3:12");
    }
}
