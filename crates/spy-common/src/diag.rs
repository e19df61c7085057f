//! The shared diagnostic bag.
//!
//! Every pipeline phase converts its own error type into [`Diagnostic`] and
//! appends to one [`DiagnosticBag`] owned by the compilation. Codes are
//! stable strings; ordering is by span start so output stays deterministic
//! no matter which phase emitted what.

use std::fmt;

use serde::Serialize;

use crate::source::LineIndex;
use crate::span::Span;

/// Hard cap on collected diagnostics, to bound error floods.
pub const MAX_DIAGNOSTICS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single reported problem, attached to at least one span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable machine-readable code, e.g. `ExtendsFinalClass`.
    pub code: &'static str,
    pub span: Span,
    pub message: String,
    /// Secondary context lines, each optionally anchored to its own span.
    pub notes: Vec<Note>,
}

/// A secondary remark attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        code: &'static str,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code,
            span,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    pub fn error(code: &'static str, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, span, message)
    }

    pub fn warning(code: &'static str, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, span, message)
    }

    pub fn with_note(mut self, message: impl Into<String>, span: Option<Span>) -> Self {
        self.notes.push(Note {
            message: message.into(),
            span,
        });
        self
    }

    /// Render the one-line `file:line:col: severity[CODE]: message` form.
    pub fn render_line(&self, file: &str, index: &LineIndex) -> String {
        let lc = index.line_col(self.span.start);
        format!(
            "{file}:{}:{}: {}[{}]: {}",
            lc.line, lc.col, self.severity, self.code, self.message
        )
    }
}

/// An append-only collection of diagnostics with a flood cap.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diags: Vec<Diagnostic>,
    overflowed: bool,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diag: Diagnostic) {
        if self.diags.len() >= MAX_DIAGNOSTICS {
            self.overflowed = true;
            return;
        }
        self.diags.push(diag);
    }

    pub fn extend(&mut self, diags: impl IntoIterator<Item = Diagnostic>) {
        for d in diags {
            self.push(d);
        }
    }

    /// Sort by span start. The sort is stable, so emission order breaks ties.
    pub fn sort_by_span(&mut self) {
        self.diags.sort_by_key(|d| d.span.start);
    }

    pub fn has_errors(&self) -> bool {
        self.diags.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.diags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diags.len()
    }

    /// Whether the cap was hit and diagnostics were dropped.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diags.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_line_format() {
        let index = LineIndex::new("class A {}\nclass A {}\n");
        let diag = Diagnostic::error("DuplicateDeclaration", Span::new(17, 18), "duplicate declaration of `A`");
        assert_eq!(
            diag.render_line("dup.spc", &index),
            "dup.spc:2:7: error[DuplicateDeclaration]: duplicate declaration of `A`"
        );
    }

    #[test]
    fn bag_orders_by_span_start() {
        let mut bag = DiagnosticBag::new();
        bag.push(Diagnostic::error("UndefinedName", Span::new(30, 31), "b"));
        bag.push(Diagnostic::error("UndefinedName", Span::new(5, 6), "a"));
        bag.push(Diagnostic::warning("MissingSuperInit", Span::new(30, 31), "c"));
        bag.sort_by_span();
        let messages: Vec<&str> = bag.iter().map(|d| d.message.as_str()).collect();
        // Stable sort keeps emission order for equal starts.
        assert_eq!(messages, vec!["a", "b", "c"]);
    }

    #[test]
    fn bag_caps_at_limit() {
        let mut bag = DiagnosticBag::new();
        for i in 0..(MAX_DIAGNOSTICS + 5) {
            bag.push(Diagnostic::error("UndefinedName", Span::point(i as u32), "x"));
        }
        assert_eq!(bag.len(), MAX_DIAGNOSTICS);
        assert!(bag.overflowed());
    }

    #[test]
    fn has_errors_ignores_warnings() {
        let mut bag = DiagnosticBag::new();
        bag.push(Diagnostic::warning("MissingSuperInit", Span::point(0), "w"));
        assert!(!bag.has_errors());
        bag.push(Diagnostic::error("UndefinedName", Span::point(0), "e"));
        assert!(bag.has_errors());
    }
}
