//! Lexer error types.
//!
//! Errors are collected during lexing rather than aborting immediately; the
//! lexer always tokenizes past the bad byte so the parser and checker can
//! still surface downstream issues.

use std::fmt;

use serde::Serialize;

use crate::diag::{Diagnostic, Severity};
use crate::span::Span;

/// A lexer error with location information.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Stable diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self.kind {
            LexErrorKind::UnterminatedString => "UnterminatedString",
            LexErrorKind::InvalidNumber(_) => "InvalidNumber",
            LexErrorKind::StrayCharacter(_) => "StrayCharacter",
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(Severity::Error, self.code(), self.span, self.to_string())
    }
}

/// The specific kind of lexer error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LexErrorKind {
    /// A string or f-string literal was not closed before end of line/input.
    UnterminatedString,
    /// A number literal could not be parsed.
    InvalidNumber(String),
    /// A character with no place in the grammar.
    StrayCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::InvalidNumber(s) => write!(f, "invalid number literal: {s}"),
            Self::StrayCharacter(c) => write!(f, "stray character: {c:?}"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for LexError {}
