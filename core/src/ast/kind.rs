//! file: core/src/ast/kind.rs
//! description: AST node kind definitions and operator enums.
//!
//! Defines `AstNodeKind` and the helper types it is built from: operators,
//! literal payloads, index expressions, assignment targets and the type
//! annotations of function signatures.
//!
use super::node::AstNode;

/// Represents binary operators in the AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    MatMul, // @
    Pow,    // ^
    Mod,    // %
    Mul,    // *
    Div,    // /
    Add,    // +
    Sub,    // -
    Eq,     // ==
    Ne,     // !=
    Lt,     // <
    Le,     // <=
    Gt,     // >
    Ge,     // >=
    And,    // &&
    Or,     // ||
}

impl BinaryOperator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "@" => BinaryOperator::MatMul,
            "^" => BinaryOperator::Pow,
            "%" => BinaryOperator::Mod,
            "*" => BinaryOperator::Mul,
            "/" => BinaryOperator::Div,
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Sub,
            "==" => BinaryOperator::Eq,
            "!=" => BinaryOperator::Ne,
            "<" => BinaryOperator::Lt,
            "<=" => BinaryOperator::Le,
            ">" => BinaryOperator::Gt,
            ">=" => BinaryOperator::Ge,
            "&&" => BinaryOperator::And,
            "||" => BinaryOperator::Or,
            _ => return None,
        };
        Some(op)
    }

    /// Only the arithmetic operators accept a `::kernel` hint.
    pub fn accepts_kernel_hint(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Add | BinaryOperator::Sub | BinaryOperator::Mul | BinaryOperator::Div
        )
    }
}

/// Represents unary operators in the AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,  // +
    Minus, // -
}

/// Literal payloads. Numbers keep their source text so suffixes and digit
/// separators are interpreted in one place.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(String),
    Float(String),
    Bool(bool),
    Str(String),
}

/// Data-type keyword of a cast or a type annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataTypeName {
    Matrix,
    Frame,
    Scalar,
}

impl DataTypeName {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "matrix" => Some(DataTypeName::Matrix),
            "frame" => Some(DataTypeName::Frame),
            "scalar" => Some(DataTypeName::Scalar),
            _ => None,
        }
    }
}

/// `matrix`, `matrix<vt>`, `frame`, `scalar<vt>` or a bare value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotation {
    pub data_type: Option<DataTypeName>,
    pub value_type: Option<String>,
}

/// Selection along one axis of an index expression.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexAxis {
    Position(Box<AstNode>),
    /// `lower:upper`; a missing bound defaults to the start or extent.
    Range {
        lower: Option<Box<AstNode>>,
        upper: Option<Box<AstNode>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Indexing {
    pub rows: Option<IndexAxis>,
    pub cols: Option<IndexAxis>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignTarget {
    pub name: String,
    pub indexing: Option<Indexing>,
}

impl AssignTarget {
    pub fn plain(name: impl Into<String>) -> Self {
        AssignTarget {
            name: name.into(),
            indexing: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeAnnotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AstNodeKind {
    Script { body: Vec<AstNode> },
    Import { path: String, alias: Option<String> },
    Function {
        name: String,
        params: Vec<Param>,
        returns: Option<Vec<TypeAnnotation>>,
        body: Box<AstNode>,
    },

    Block { statements: Vec<AstNode> },
    ExprStatement { expr: Box<AstNode> },
    Assignment { targets: Vec<AssignTarget>, value: Box<AstNode> },
    Return { values: Vec<AstNode> },

    If {
        condition: Box<AstNode>,
        then_branch: Box<AstNode>,
        else_branch: Option<Box<AstNode>>,
    },
    While {
        condition: Box<AstNode>,
        body: Box<AstNode>,
        do_while: bool,
    },
    For {
        var: String,
        from: Box<AstNode>,
        to: Box<AstNode>,
        step: Option<Box<AstNode>>,
        body: Box<AstNode>,
    },
    ParFor {
        var: String,
        from: Box<AstNode>,
        to: Box<AstNode>,
        step: Option<Box<AstNode>>,
        body: Box<AstNode>,
    },

    Literal(Literal),
    Arg { name: String },
    Identifier { name: String },
    Call { name: String, kernel_hint: Option<String>, args: Vec<AstNode> },
    Cast { target: TypeAnnotation, expr: Box<AstNode> },
    RightIndex { object: Box<AstNode>, indexing: Indexing },
    Filter {
        object: Box<AstNode>,
        rows: Option<Box<AstNode>>,
        cols: Option<Box<AstNode>>,
    },
    Unary { op: UnaryOperator, expr: Box<AstNode> },
    Binary {
        left: Box<AstNode>,
        op: BinaryOperator,
        right: Box<AstNode>,
        kernel_hint: Option<String>,
    },
    Ternary {
        condition: Box<AstNode>,
        then_expr: Box<AstNode>,
        else_expr: Box<AstNode>,
    },
    MatrixLiteral {
        elements: Vec<AstNode>,
        rows: Option<Box<AstNode>>,
        cols: Option<Box<AstNode>>,
    },
    ColMajorFrame { columns: Vec<(AstNode, AstNode)> },
    RowMajorFrame { labels: Vec<AstNode>, rows: Vec<Vec<AstNode>> },
}

impl AstNodeKind {
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            AstNodeKind::Import { .. }
                | AstNodeKind::Function { .. }
                | AstNodeKind::Block { .. }
                | AstNodeKind::ExprStatement { .. }
                | AstNodeKind::Assignment { .. }
                | AstNodeKind::Return { .. }
                | AstNodeKind::If { .. }
                | AstNodeKind::While { .. }
                | AstNodeKind::For { .. }
                | AstNodeKind::ParFor { .. }
        )
    }

    /// Short name used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            AstNodeKind::Script { .. } => "script",
            AstNodeKind::Import { .. } => "import",
            AstNodeKind::Function { .. } => "function definition",
            AstNodeKind::Block { .. } => "block",
            AstNodeKind::ExprStatement { .. } => "expression statement",
            AstNodeKind::Assignment { .. } => "assignment",
            AstNodeKind::Return { .. } => "return",
            AstNodeKind::If { .. } => "if-statement",
            AstNodeKind::While { do_while: false, .. } => "while-loop",
            AstNodeKind::While { do_while: true, .. } => "do-while-loop",
            AstNodeKind::For { .. } => "for-loop",
            AstNodeKind::ParFor { .. } => "parfor-loop",
            AstNodeKind::Literal(_) => "literal",
            AstNodeKind::Arg { .. } => "argument",
            AstNodeKind::Identifier { .. } => "identifier",
            AstNodeKind::Call { .. } => "call",
            AstNodeKind::Cast { .. } => "cast",
            AstNodeKind::RightIndex { .. } => "indexing",
            AstNodeKind::Filter { .. } => "filter",
            AstNodeKind::Unary { .. } => "unary operation",
            AstNodeKind::Binary { .. } => "binary operation",
            AstNodeKind::Ternary { .. } => "conditional expression",
            AstNodeKind::MatrixLiteral { .. } => "matrix literal",
            AstNodeKind::ColMajorFrame { .. } | AstNodeKind::RowMajorFrame { .. } => {
                "frame literal"
            }
        }
    }
}
