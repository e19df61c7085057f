//! Runtime error types.
//!
//! A runtime error unwinds the whole evaluation; there is no user-level
//! catch. The CLI renders it as a diagnostic and exits non-zero.

use std::fmt;

use spy_common::diag::{Diagnostic, Severity};
use spy_common::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    AttributeError,
    TypeError,
    ValueError,
    NotImplementedError,
    ZeroDivision,
    IndexError,
}

impl RuntimeErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            RuntimeErrorKind::AttributeError => "AttributeError",
            RuntimeErrorKind::TypeError => "TypeError",
            RuntimeErrorKind::ValueError => "ValueError",
            RuntimeErrorKind::NotImplementedError => "NotImplementedError",
            RuntimeErrorKind::ZeroDivision => "ZeroDivision",
            RuntimeErrorKind::IndexError => "IndexError",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub message: String,
    pub span: Option<Span>,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach a span only if no more precise one was recorded deeper in.
    pub fn or_span(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(
            Severity::Error,
            self.kind.code(),
            self.span.unwrap_or(Span::point(0)),
            self.message.clone(),
        )
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)
    }
}

impl std::error::Error for RuntimeError {}
