// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Integration tests for the `cel-inline` binary.
//! Each test runs the binary on a JSON fixture and checks stdout/stderr.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;

use cel_ast::{Constant, Entry, EntryKey, Expr, ExprId, ExprKind};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn cel_inline(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cel-inline"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run cel-inline")
}

fn run_ok(args: &[&str]) -> Expr {
    let out = cel_inline(args);
    assert!(
        out.status.success(),
        "cel-inline {:?} failed:\nstdout: {}\nstderr: {}",
        args,
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr),
    );
    serde_json::from_slice(&out.stdout).expect("stdout is an expression")
}

#[test]
fn rewrite_call() {
    let path = fixture("call.json");
    let expected = Expr::call(1, None, "f", vec![Expr::constant(2, 1i64), Expr::ident(3, "z")]);

    let out = run_ok(&["rewrite", path.to_str().unwrap()]);
    assert_eq!(out, *expected);

    let out = run_ok(&["rewrite", path.to_str().unwrap(), "--iterative"]);
    assert_eq!(out, *expected);
}

#[test]
fn inline_ignores_aliases() {
    let path = fixture("call.json");
    let out = run_ok(&["inline", path.to_str().unwrap()]);
    assert_eq!(
        out,
        *Expr::call(1, None, "f", vec![Expr::constant(2, 1i64), Expr::ident(3, "y")])
    );
}

#[test]
fn map_literal_keys() {
    let path = fixture("map_literal.json");
    let out = run_ok(&["inline", path.to_str().unwrap()]);
    let expected = Expr::new(
        1,
        ExprKind::Struct {
            message_name: None,
            entries: vec![
                Entry {
                    id: ExprId(2),
                    key: EntryKey::Field("a".to_string()),
                    value: Expr::constant(3, "v"),
                },
                Entry {
                    id: ExprId(4),
                    key: EntryKey::MapKey(Expr::constant(5, "K")),
                    value: Expr::constant(6, "v"),
                },
            ],
        },
    );
    assert_eq!(out, expected);
}

#[test]
fn unknown_kind_fails() {
    let path = fixture("not_set.json");
    let out = cel_inline(&["rewrite", path.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("error: unknown expression kind `not_set` at node 3"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn missing_request_file() {
    let out = cel_inline(&["rewrite", "/nonexistent/request.json"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("cannot read /nonexistent/request.json"));
}

#[test]
fn unknown_option() {
    let path = fixture("call.json");
    let out = cel_inline(&["rewrite", path.to_str().unwrap(), "--fast"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown option `--fast`"));
}

#[test]
fn const_null_in_table() {
    // `"Null"` is the unit variant's JSON form.
    let expr: Arc<Expr> = Expr::constant(2, Constant::Null);
    let json = serde_json::to_string(&*expr).unwrap();
    assert_eq!(json, r#"{"id":2,"kind":{"Const":"Null"}}"#);
}
