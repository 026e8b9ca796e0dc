mod common;

use common::{count_ops, run, translate, translate_err};
use tabula_core::ir::{OpKind, Type, ValueType};
use tabula_core::{ErrorKind, TabulaErrorExt};

#[test]
fn early_return_in_then_branch_is_rectified() {
    let module = translate(
        "def f(x: si64) -> si64 {\n  if (x > 0) { return 1; }\n  return 2;\n}\nprint(f(5));\nprint(f(-5));\n",
    );
    let f = &module.functions[0];
    assert_eq!(f.symbol, "f-0");
    // exactly one return, and it is the last op of the body
    assert_eq!(count_ops(&f.body.ops, |op| op.kind == OpKind::Return), 1);
    assert_eq!(f.body.ops.last().map(|op| &op.kind), Some(&OpKind::Return));
    assert_eq!(run(&module), vec!["1", "2"]);
}

#[test]
fn statements_after_guarded_return_run_only_on_fallthrough() {
    let module = translate(
        "def f(a: si64) -> si64 {\n  if (a > 10) { return 1; }\n  print(\"x\");\n  return 2;\n}\nprint(f(3));\nprint(f(30));\n",
    );
    let f = &module.functions[0];
    assert_eq!(count_ops(&f.body.ops, |op| op.kind == OpKind::Return), 1);
    assert_eq!(f.result_types, vec![Type::Scalar(ValueType::SI64)]);
    assert_eq!(run(&module), vec!["x", "2", "1"]);
}

#[test]
fn early_return_in_void_function() {
    let module = translate(
        "def p(x: si64) {\n  if (x > 0) { print(1); return; }\n  print(2);\n}\np(1);\np(0);\n",
    );
    let p = &module.functions[0];
    assert_eq!(count_ops(&p.body.ops, |op| op.kind == OpKind::Return), 1);
    assert!(p.result_types.is_empty());
    assert_eq!(run(&module), vec!["1", "2"]);
}

#[test]
fn early_returns_in_nested_ifs() {
    let module = translate(
        "def sign(x: si64) -> si64 {\n  if (x >= 0) {\n    if (x == 0) { return 0; }\n    return 1;\n  }\n  return -1;\n}\nprint(sign(7)); print(sign(0)); print(sign(-3));\n",
    );
    let sign = &module.functions[0];
    assert_eq!(count_ops(&sign.body.ops, |op| op.kind == OpKind::Return), 1);
    assert_eq!(run(&module), vec!["1", "0", "-1"]);
}

#[test]
fn code_after_return_is_dropped_with_warning() {
    let module = translate("def g() -> si64 {\n  return 1;\n  print(2);\n}\n");
    let g = &module.functions[0];
    assert_eq!(count_ops(&g.body.ops, |op| op.kind == OpKind::Return), 1);
    assert_eq!(count_ops(&g.body.ops, |op| op.kind.name() == "print"), 0);
    assert_eq!(module.diagnostics.len(), 2);
    assert!(module.diagnostics.iter().all(|d| d.message.contains("ignored")));
}

#[test]
fn return_inside_loop_is_unsupported() {
    let err = translate_err("def w() {\n  x = 0;\n  while (x < 3) { return; }\n}\n");
    assert_eq!(err.kind, ErrorKind::UnsupportedConstruct);
    assert!(err.message().contains("early return"));
}

#[test]
fn return_outside_function_is_rejected() {
    let err = translate_err("return 1;\n");
    assert_eq!(err.kind, ErrorKind::UnsupportedConstruct);
}

#[test]
fn declared_result_count_must_match() {
    let err = translate_err("def f() -> si64, si64 { return 1; }\n");
    assert_eq!(err.kind, ErrorKind::ArityMismatch);
    assert!(err.message().contains("function `f`"), "{}", err.message());
}

#[test]
fn declared_result_type_must_match() {
    let err = translate_err("def f() -> si64 { return \"text\"; }\n");
    assert_eq!(err.kind, ErrorKind::TypeAmbiguity);
}

#[test]
fn result_types_are_inferred_without_declaration() {
    let module = translate("def half() { return 0.5; }\n");
    assert_eq!(module.functions[0].result_types, vec![Type::Scalar(ValueType::F64)]);
}

#[test]
fn result_types_follow_computed_values() {
    let module = translate("def twice(a: f64) { return a * 2; }\nprint(twice(1.5));\n");
    assert_eq!(module.functions[0].result_types, vec![Type::Scalar(ValueType::F64)]);
    assert_eq!(run(&module), vec!["3.0"]);
}

#[test]
fn overloads_resolve_by_argument_type() {
    let module = translate(
        "def f(a: si64) -> si64 { return a + 1; }\ndef f(a: f64) -> f64 { return a * 2.0; }\nprint(f(1));\nprint(f(1.5));\n",
    );
    assert_eq!(module.functions.len(), 2);
    assert_eq!(module.functions[0].symbol, "f-0");
    assert_eq!(module.functions[1].symbol, "f-1");
    assert_eq!(run(&module), vec!["2", "3.0"]);
}

#[test]
fn first_matching_overload_wins() {
    let module = translate(
        "def f(a) { return 1; }\ndef f(a: si64) { return 2; }\nprint(f(3));\n",
    );
    assert_eq!(run(&module), vec!["1"]);
}

#[test]
fn no_matching_overload_lists_options() {
    let err = translate_err("def f(a: si64) { print(a); }\nf(true);\n");
    assert_eq!(err.kind, ErrorKind::OverloadResolutionError);
    assert!(err.message().contains("f(si64)"), "{}", err.message());
    assert!(err.message().contains("(bool)"), "{}", err.message());
}

#[test]
fn recursive_function_with_declared_results() {
    let module = translate(
        "def fact(n: si64) -> si64 {\n  if (n <= 1) { return 1; }\n  return n * fact(n - 1);\n}\nprint(fact(5));\n",
    );
    assert_eq!(run(&module), vec!["120"]);
}

#[test]
fn multiple_results_are_assigned_in_order() {
    let module = translate("def two() { return 1, 2; }\na, b = two();\nprint(a);\nprint(b);\n");
    assert_eq!(run(&module), vec!["1", "2"]);
}

#[test]
fn function_bodies_do_not_see_outer_variables() {
    let err = translate_err("x = 1;\ndef f() { return x; }\n");
    assert_eq!(err.kind, ErrorKind::UndefinedVariable);
}

#[test]
fn nested_function_definition_is_rejected() {
    let err = translate_err("if (true) { def g() { print(1); } }\n");
    assert_eq!(err.kind, ErrorKind::UnsupportedConstruct);
}

#[test]
fn duplicate_parameter_names_are_rejected() {
    let err = translate_err("def h(a, a) { print(a); }\n");
    assert_eq!(err.kind, ErrorKind::UnsupportedConstruct);
    assert!(err.message().contains("used twice"));
}

#[test]
fn kernel_hint_on_user_function_is_rejected() {
    let err = translate_err("def f(a) { return 1; }\nf::fast(1);\n");
    assert_eq!(err.kind, ErrorKind::UnsupportedConstruct);
}

#[test]
fn unknown_function_is_unsupported() {
    let err = translate_err("frobnicate(1);\n");
    assert_eq!(err.kind, ErrorKind::UnsupportedConstruct);
    assert!(err.message().contains("frobnicate"));
}

#[test]
fn builtin_argument_count_is_checked() {
    let err = translate_err("print();\n");
    assert_eq!(err.kind, ErrorKind::ArityMismatch);
}

#[test]
fn kernel_hint_on_builtin_is_kept_as_attribute() {
    let module = translate("m = [1.0, 2.0];\ns = sum::fast(m);\n");
    let sum = module
        .entry
        .ops
        .iter()
        .find(|op| op.kind.name() == "sum")
        .unwrap();
    assert_eq!(sum.attr("kernel_hint"), Some("fast"));
}

#[test]
fn map_resolves_unary_function_symbol() {
    let module = translate("def twice(x: f64) -> f64 { return x * 2.0; }\nm = [1.0, 2.0];\nr = map(m, twice);\n");
    let map = module
        .entry
        .ops
        .iter()
        .find(|op| op.kind.name() == "map")
        .unwrap();
    assert_eq!(module.type_of(map.results[0]), &Type::Matrix(ValueType::F64));
    let text = module.to_string();
    assert!(text.contains("\"twice-0\""), "{}", text);
}
