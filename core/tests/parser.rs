use std::path::Path;

use tabula_core::ast::{
    AstNodeKind, BinaryOperator, DataTypeName, Literal, TypeAnnotation, parse_literal_argument,
};
use tabula_core::{AstNode, Script, TabulaErrorExt, generate_ast_from_source};

fn parse(src: &str) -> Vec<AstNode> {
    let script = Script::from_source(Path::new("parse.daph"), src);
    match generate_ast_from_source(&script) {
        Ok(AstNode {
            kind: AstNodeKind::Script { body },
            ..
        }) => body,
        Ok(other) => panic!("expected a script node, got {:?}", other.kind),
        Err(err) => panic!("parse failed: {}", err.message()),
    }
}

fn assigned_value(stmt: &AstNode) -> &AstNode {
    match &stmt.kind {
        AstNodeKind::Assignment { value, .. } => value,
        other => panic!("expected an assignment, got {:?}", other),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let body = parse("x = 1 + 2 * 3;");
    let AstNodeKind::Binary { op, right, .. } = &assigned_value(&body[0]).kind else {
        panic!("expected a binary expression");
    };
    assert_eq!(*op, BinaryOperator::Add);
    assert!(matches!(
        right.kind,
        AstNodeKind::Binary {
            op: BinaryOperator::Mul,
            ..
        }
    ));
}

#[test]
fn subtraction_is_left_associative() {
    let body = parse("x = 8 - 4 - 2;");
    let AstNodeKind::Binary { op, left, right, .. } = &assigned_value(&body[0]).kind else {
        panic!("expected a binary expression");
    };
    assert_eq!(*op, BinaryOperator::Sub);
    assert!(matches!(left.kind, AstNodeKind::Binary { op: BinaryOperator::Sub, .. }));
    assert_eq!(right.kind, AstNodeKind::Literal(Literal::Int("2".into())));
}

#[test]
fn power_is_right_associative() {
    let body = parse("x = 2 ^ 3 ^ 2;");
    let AstNodeKind::Binary { op, left, right, .. } = &assigned_value(&body[0]).kind else {
        panic!("expected a binary expression");
    };
    assert_eq!(*op, BinaryOperator::Pow);
    assert_eq!(left.kind, AstNodeKind::Literal(Literal::Int("2".into())));
    assert!(matches!(right.kind, AstNodeKind::Binary { op: BinaryOperator::Pow, .. }));
}

#[test]
fn kernel_hint_is_attached_to_operator() {
    let body = parse("x = a *::blas b;");
    let AstNodeKind::Binary { kernel_hint, .. } = &assigned_value(&body[0]).kind else {
        panic!("expected a binary expression");
    };
    assert_eq!(kernel_hint.as_deref(), Some("blas"));
}

#[test]
fn statement_kinds() {
    let body = parse(
        "import \"lib.daph\" as \"l\";\n\
         def f(a: si64, b) -> matrix<f64> { return a; }\n\
         if (x) y = 1; else { y = 2; }\n\
         while (x < 3) x = x + 1;\n\
         do { x = x - 1; } while (x > 0)\n\
         for (i in 1:10:2) print(i);\n\
         parfor (j in 1:3) { print(j); }\n\
         a, b = f(1, 2);\n\
         print(\"done\");\n",
    );
    assert_eq!(body.len(), 9);

    assert_eq!(
        body[0].kind,
        AstNodeKind::Import {
            path: "lib.daph".into(),
            alias: Some("l".into())
        }
    );

    let AstNodeKind::Function { name, params, returns, .. } = &body[1].kind else {
        panic!("expected a function definition");
    };
    assert_eq!(name, "f");
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].ty.as_ref().and_then(|t| t.value_type.as_deref()), Some("si64"));
    assert!(params[1].ty.is_none());
    assert_eq!(
        returns.as_deref(),
        Some(
            &[TypeAnnotation {
                data_type: Some(DataTypeName::Matrix),
                value_type: Some("f64".into()),
            }][..]
        )
    );

    assert!(matches!(&body[2].kind, AstNodeKind::If { else_branch: Some(_), .. }));
    assert!(matches!(&body[3].kind, AstNodeKind::While { do_while: false, .. }));
    assert!(matches!(&body[4].kind, AstNodeKind::While { do_while: true, .. }));
    assert!(matches!(&body[5].kind, AstNodeKind::For { step: Some(_), .. }));
    assert!(matches!(&body[6].kind, AstNodeKind::ParFor { step: None, .. }));

    let AstNodeKind::Assignment { targets, .. } = &body[7].kind else {
        panic!("expected an assignment");
    };
    let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);

    assert!(matches!(&body[8].kind, AstNodeKind::ExprStatement { .. }));
}

#[test]
fn comments_are_skipped() {
    let body = parse("// line\n# hash\n/* block\n comment */ x = 1;\n");
    assert_eq!(body.len(), 1);
}

#[test]
fn qualified_names_keep_their_prefix() {
    let body = parse("x = util.k;\nutil.f(1);\n");
    assert_eq!(
        assigned_value(&body[0]).kind,
        AstNodeKind::Identifier {
            name: "util.k".into()
        }
    );
    let AstNodeKind::ExprStatement { expr } = &body[1].kind else {
        panic!("expected an expression statement");
    };
    assert!(matches!(&expr.kind, AstNodeKind::Call { name, .. } if name == "util.f"));
}

#[test]
fn string_literals_are_unescaped() {
    let body = parse("s = \"tab\\there\";");
    assert_eq!(
        assigned_value(&body[0]).kind,
        AstNodeKind::Literal(Literal::Str("tab\there".into()))
    );
}

#[test]
fn syntax_error_reports_position() {
    let script = Script::from_source(Path::new("bad.daph"), "x = 1;\ny = ;\n");
    let err = generate_ast_from_source(&script).unwrap_err();
    assert!(err.message().starts_with("Syntax error"), "{}", err.message());
    let location = err.location().unwrap();
    assert_eq!(location.file, "bad.daph");
    assert_eq!(location.line, 2);
}

#[test]
fn keywords_are_not_identifiers() {
    let script = Script::from_source(Path::new("kw.daph"), "while = 1;\n");
    assert!(generate_ast_from_source(&script).is_err());
}

#[test]
fn empty_script_is_rejected() {
    let script = Script::from_source(Path::new("empty.daph"), "  \n\t\n");
    let err = generate_ast_from_source(&script).unwrap_err();
    assert_eq!(err.message(), "The provided script is empty.");
}

#[test]
fn literal_arguments() {
    let node = parse_literal_argument("3.5").unwrap();
    assert_eq!(node.kind, AstNodeKind::Literal(Literal::Float("3.5".into())));

    let node = parse_literal_argument("true").unwrap();
    assert_eq!(node.kind, AstNodeKind::Literal(Literal::Bool(true)));

    assert!(parse_literal_argument("1 + 2").is_err());
    assert!(parse_literal_argument("abc").is_err());
}
