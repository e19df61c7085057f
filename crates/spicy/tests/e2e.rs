//! End-to-end tests for the spicy pipeline.
//!
//! Each test drives the full compile-check-run pipeline in-process with
//! capture sinks, asserting program output, diagnostics, and exit codes.
//! The demo programs under `demos/` are run verbatim.

use std::path::Path;

use spicy::{run_source, Emit, Options, EXIT_DIAGNOSTICS, EXIT_IO, EXIT_OK};

/// Run a source string through the whole pipeline, capturing both streams.
fn run_capture(source: &str, opts: &Options) -> (i32, String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = run_source("test.spc", source, opts, &mut out, &mut err);
    (
        code,
        String::from_utf8_lossy(&out).to_string(),
        String::from_utf8_lossy(&err).to_string(),
    )
}

/// Read a demo program from the workspace `demos/` directory.
fn read_demo(name: &str) -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let path = Path::new(manifest_dir)
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read demo {}: {e}", path.display()))
}

// ── Demo Programs ──────────────────────────────────────────────────────

#[test]
fn e2e_shapes_demo() {
    let source = read_demo("shapes.spc");
    let (code, out, err) = run_capture(&source, &Options::default());
    assert_eq!(code, EXIT_OK, "stderr: {err}");
    assert_eq!(err, "", "expected a clean check");
    assert_eq!(
        out,
        "Name: circle\n\
         Kind: shape\n\
         Sketch: ( )\n\
         Area: 78.54\n\
         Perimeter: 31.42\n\
         circle: area=78.54 perimeter=31.42\n\
         Name: rectangle\n\
         Kind: shape\n\
         Sketch: [ ]\n\
         Area: 13.50\n\
         Perimeter: 15.00\n\
         rectangle: area=13.50 perimeter=15.00\n\
         Shapes made: 2\n\
         Total area: 92.04\n"
    );
}

#[test]
fn e2e_audit_log_demo() {
    let source = read_demo("audit_log.spc");
    let (code, out, err) = run_capture(&source, &Options::default());
    assert_eq!(code, EXIT_OK, "stderr: {err}");
    assert_eq!(out, "ada login\nada update\nbob login\n3 entries\n");
}

#[test]
fn e2e_zoo_demo() {
    let source = read_demo("zoo.spc");
    let (code, out, err) = run_capture(&source, &Options::default());
    assert_eq!(code, EXIT_OK, "stderr: {err}");
    assert_eq!(out, "Rex says woof\nMia says meow\n");
}

// ── Acceptance Scenarios ───────────────────────────────────────────────

#[test]
fn e2e_scenario_1_runs_clean() {
    let source = "abstract class A { abstract def m() -> int; } \
                  class B extends A { def m() -> int { return 1; } } \
                  print(B().m());";
    let (code, out, err) = run_capture(source, &Options::default());
    assert_eq!(code, EXIT_OK);
    assert_eq!(out, "1\n");
    assert_eq!(err, "");
}

#[test]
fn e2e_scenario_2_reports_missing_members() {
    let source = "abstract class A { abstract def m() -> int; } \
                  class B extends A {} \
                  B();";
    let (code, out, err) = run_capture(source, &Options::default());
    assert_eq!(code, EXIT_DIAGNOSTICS);
    assert_eq!(out, "", "no execution after errors");
    assert!(err.contains("error[ConcreteClassHasAbstractMembers]"), "stderr: {err}");
    assert!(!err.contains("AbstractInstantiation"), "stderr: {err}");
}

#[test]
fn e2e_scenario_3_extends_final() {
    let source = "final class F {} class G extends F {}";
    let (code, _, err) = run_capture(source, &Options::default());
    assert_eq!(code, EXIT_DIAGNOSTICS);
    assert!(err.contains("error[ExtendsFinalClass]"), "stderr: {err}");
}

// ── Modes and Flags ────────────────────────────────────────────────────

#[test]
fn check_only_skips_execution() {
    let source = "print(1);";
    let opts = Options {
        check_only: true,
        ..Options::default()
    };
    let (code, out, _) = run_capture(source, &opts);
    assert_eq!(code, EXIT_OK);
    assert_eq!(out, "", "--check-only must not execute");
}

#[test]
fn emit_check_skips_execution() {
    let source = "print(1);";
    let opts = Options {
        emit: Emit::Check,
        ..Options::default()
    };
    let (code, out, _) = run_capture(source, &opts);
    assert_eq!(code, EXIT_OK);
    assert_eq!(out, "");
}

#[test]
fn warnings_alone_do_not_fail_the_build() {
    let source = "class P { def __init__(self) { pass; } } \
                  class C extends P { def __init__(self) { pass; } } \
                  C(); print(\"ok\");";
    let (code, out, err) = run_capture(source, &Options::default());
    assert_eq!(code, EXIT_OK);
    assert_eq!(out, "ok\n");
    assert!(err.contains("warning[MissingSuperInit]"), "stderr: {err}");
}

#[test]
fn verbose_adds_report_frames() {
    let source = "final class F {} class G extends F {}";
    let (_, _, plain) = run_capture(source, &Options::default());
    let verbose_opts = Options {
        verbose: true,
        ..Options::default()
    };
    let (_, _, verbose) = run_capture(source, &verbose_opts);
    assert!(verbose.len() > plain.len(), "verbose output should add frames");
    assert!(verbose.contains("declared final here"), "stderr: {verbose}");
}

#[test]
fn syntax_errors_exit_one_and_keep_going() {
    let source = "x = 1\ny = ;";
    let (code, _, err) = run_capture(source, &Options::default());
    assert_eq!(code, EXIT_DIAGNOSTICS);
    assert!(err.contains("error["), "stderr: {err}");
}

#[test]
fn runtime_errors_exit_one() {
    let source = "print(1 / 0);";
    let (code, out, err) = run_capture(source, &Options::default());
    assert_eq!(code, EXIT_DIAGNOSTICS);
    assert_eq!(out, "");
    assert!(err.contains("error[ZeroDivision]"), "stderr: {err}");
}

#[test]
fn leading_bom_is_tolerated() {
    let source = "\u{feff}print(42);";
    let (code, out, _) = run_capture(source, &Options::default());
    assert_eq!(code, EXIT_OK);
    assert_eq!(out, "42\n");
}

#[test]
fn empty_file_is_fine() {
    let (code, out, err) = run_capture("", &Options::default());
    assert_eq!(code, EXIT_OK);
    assert_eq!(out, "");
    assert_eq!(err, "");
}

// ── File-Level Entry ───────────────────────────────────────────────────

#[test]
fn run_file_reports_missing_input_as_io_error() {
    let code = spicy::run_file(
        Path::new("/nonexistent/never.spc"),
        &Options::default(),
        None,
    );
    assert_eq!(code, EXIT_IO);
}

#[test]
fn run_file_redirects_output() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("hello.spc");
    let output = dir.path().join("hello.out");
    std::fs::write(&input, "print(\"hello file\");").expect("write input");

    let code = spicy::run_file(&input, &Options::default(), Some(&output));
    assert_eq!(code, EXIT_OK);
    let written = std::fs::read_to_string(&output).expect("read output");
    assert_eq!(written, "hello file\n");
}
