//! Tests for diagnostic rendering and ordering.
//!
//! The one-line `file:line:col: severity[CODE]: message` form is pinned
//! with inline snapshots (it is fully deterministic); the ariadne report
//! frames are checked by substring, since their layout belongs to ariadne.

use spy_common::source::LineIndex;
use spy_typeck::diagnostics::{render_all, render_report};
use spy_typeck::CheckResult;

fn check_source(src: &str) -> CheckResult {
    let parse = spy_parser::parse(src);
    assert!(
        parse.errors().is_empty() && parse.lex_errors().is_empty(),
        "unexpected syntax errors: {:?}",
        parse.errors()
    );
    spy_typeck::check(&parse)
}

#[test]
fn one_line_form_for_extends_final() {
    let src = "final class F {}\nclass G extends F {}\n";
    let result = check_source(src);
    assert_eq!(result.diagnostics.len(), 1);
    let index = LineIndex::new(src);
    let line = result.diagnostics[0].render_line("demo.spc", &index);
    insta::assert_snapshot!(
        line,
        @"demo.spc:2:17: error[ExtendsFinalClass]: class `G` extends final class `F`"
    );
}

#[test]
fn one_line_form_for_missing_super_init_warning() {
    let src = "class P { def __init__(self) { pass; } }\nclass C extends P { def __init__(self) { pass; } }";
    let result = check_source(src);
    assert_eq!(result.diagnostics.len(), 1);
    let index = LineIndex::new(src);
    let line = result.diagnostics[0].render_line("demo.spc", &index);
    insta::assert_snapshot!(
        line,
        @"demo.spc:2:25: warning[MissingSuperInit]: constructor of `C` does not call `super(...)` before using the `P` base"
    );
}

#[test]
fn report_frame_carries_code_and_related_note() {
    let src = "final class F {}\nclass G extends F {}\n";
    let result = check_source(src);
    let rendered = render_report(&result.diagnostics[0], src, "demo.spc");
    assert!(rendered.contains("ExtendsFinalClass"), "missing code: {rendered}");
    assert!(
        rendered.contains("declared final here"),
        "missing related note: {rendered}"
    );
}

#[test]
fn render_all_interleaves_lines_and_frames() {
    let src = "final class F {}\nclass G extends F {}\n";
    let result = check_source(src);
    let rendered = render_all(&result.diagnostics, src, "demo.spc");
    assert!(rendered.starts_with("demo.spc:2:17: error[ExtendsFinalClass]"));
    assert!(rendered.contains("Error"));
}

#[test]
fn diagnostics_sort_by_span_start() {
    // The undefined name appears before the final-class violation in the
    // source, so it must come first in the bag regardless of which pass
    // emitted it.
    let src = "x = missing;\nfinal class F {}\nclass G extends F {}\n";
    let result = check_source(src);
    let codes: Vec<&str> = result.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec!["UndefinedName", "ExtendsFinalClass"]);
    let starts: Vec<u32> = result.diagnostics.iter().map(|d| d.span.start).collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted);
}

#[test]
fn diagnostics_serialize_to_json() {
    let src = "final class F {}\nclass G extends F {}\n";
    let result = check_source(src);
    let json = result.diagnostics_json();
    let value: serde_json::Value = serde_json::from_str(json.lines().next().unwrap()).unwrap();
    assert_eq!(value["code"], "ExtendsFinalClass");
    assert_eq!(value["severity"], "Error");
    assert!(value["span"]["start"].is_number());
}
