//! Ariadne-based rendering for diagnostics.
//!
//! Two forms are produced: the stable one-line
//! `file:line:col: severity[CODE]: message` form (rendered by
//! [`Diagnostic::render_line`] in `spy-common`), and a labelled source
//! frame built here with ariadne. Output is colorless so test assertions
//! and piped CLI output stay deterministic.

use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind, Source};

use spy_common::diag::{Diagnostic, Severity};

/// Render a labelled ariadne report frame for one diagnostic.
///
/// Notes with spans become secondary labels; span-less notes become help
/// text. The caller prints the one-line form separately.
pub fn render_report(diag: &Diagnostic, source: &str, _file: &str) -> String {
    let config = Config::default().with_color(false);
    let source_len = source.len();

    // Clamp a range into source bounds; ariadne needs a non-empty span.
    let clamp = |r: Range<usize>| -> Range<usize> {
        let s = r.start.min(source_len);
        let e = r.end.min(source_len).max(s);
        if s == e {
            s..e.saturating_add(1).min(source_len)
        } else {
            s..e
        }
    };

    let kind = match diag.severity {
        Severity::Warning => ReportKind::Warning,
        Severity::Error => ReportKind::Error,
    };
    let span = clamp(diag.span.as_range());

    let mut builder = Report::build(kind, span.clone())
        .with_code(diag.code)
        .with_message(&diag.message)
        .with_config(config);

    builder.add_label(Label::new(span).with_message(&diag.message));

    for note in &diag.notes {
        match note.span {
            Some(s) => {
                builder.add_label(Label::new(clamp(s.as_range())).with_message(&note.message));
            }
            None => builder.set_help(note.message.clone()),
        }
    }

    let report = builder.finish();
    let mut buf = Vec::new();
    report
        .write(Source::from(source), &mut buf)
        .expect("diagnostic rendering never fails on an in-memory buffer");
    String::from_utf8(buf).expect("ariadne output is valid UTF-8")
}

/// Render every diagnostic as `one-line form` + report frame.
pub fn render_all(diags: &[Diagnostic], source: &str, file: &str) -> String {
    let index = spy_common::source::LineIndex::new(source);
    let mut out = String::new();
    for diag in diags {
        out.push_str(&diag.render_line(file, &index));
        out.push('\n');
        out.push_str(&render_report(diag, source, file));
    }
    out
}
