use assert_cmd::Command;
use std::fs;
use tempfile::tempdir;

fn tabula() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tabula"))
}

#[test]
fn build_prints_ir_to_stdout() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("main.daph");
    fs::write(&script, "x = 1;\nwhile (x < 10) { x = x * 2; }\nprint(x);\n").unwrap();

    let assert = tabula().arg("build").arg(&script).assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("entry {"), "{}", stdout);
    assert!(stdout.contains("while"), "{}", stdout);
    assert!(stdout.contains("print"), "{}", stdout);
}

#[test]
fn script_arguments_are_substituted() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("args.daph");
    fs::write(&script, "print($n + 1);\n").unwrap();

    let assert = tabula()
        .args(["build", "--arg", "n=41"])
        .arg(&script)
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("constant 41 : si64"), "{}", stdout);
}

#[test]
fn translation_error_is_reported_with_failure_code() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("bad.daph");
    fs::write(&script, "print(y);\n").unwrap();

    let assert = tabula().arg("build").arg(&script).assert().failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("TABULA | ERROR"), "{}", stderr);
    assert!(stderr.contains("referenced before assignment"), "{}", stderr);
}

#[test]
fn functions_dump_lists_symbols() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("funcs.daph");
    fs::write(
        &script,
        "def inc(a: si64) -> si64 { return a + 1; }\nprint(inc(2));\n",
    )
    .unwrap();

    let assert = tabula()
        .args(["build", "--dump", "functions"])
        .arg(&script)
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("inc-0"), "{}", stdout);
    assert!(stdout.contains("si64"), "{}", stdout);
}

#[test]
fn output_file_receives_ast_dump() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("ast.daph");
    let out = dir.path().join("ast.txt");
    fs::write(&script, "x = 3;\n").unwrap();

    tabula()
        .args(["build", "--dump", "ast", "--output"])
        .arg(&out)
        .arg(&script)
        .assert()
        .success();
    let dumped = fs::read_to_string(&out).unwrap();
    assert!(dumped.contains("Assign"), "{}", dumped);
}

#[test]
fn missing_script_fails() {
    tabula()
        .args(["build", "/nonexistent/tabula/script.daph"])
        .assert()
        .failure();
}

#[test]
fn malformed_script_argument_is_rejected_by_clap() {
    tabula()
        .args(["build", "--arg", "novalue", "x.daph"])
        .assert()
        .failure();
}
