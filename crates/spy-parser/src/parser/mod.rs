//! Marker-based event parser infrastructure.
//!
//! The parser walks the non-trivia token stream and records a flat list of
//! events (`Open`/`Close`/`Advance`); the tree builder in `lib.rs` replays
//! them into a rowan green tree, re-attaching trivia. Markers (`open`,
//! `close`, `open_before`) let postfix and infix parsers wrap an
//! already-parsed left-hand side in a new node.

pub(crate) mod expressions;
pub(crate) mod items;
pub(crate) mod statements;

use spy_common::span::Span;
use spy_common::token::Token;

use crate::error::ParseError;
use crate::syntax_kind::SyntaxKind;

/// Parser recursion cap, bounding stack use on pathological nesting.
pub(crate) const MAX_DEPTH: u32 = 512;

#[derive(Debug)]
pub(crate) enum Event {
    Open { kind: SyntaxKind },
    Close,
    Advance,
}

/// An opened node waiting for its matching [`Parser::close`].
pub(crate) struct MarkOpened {
    index: usize,
}

/// A closed node; can be wrapped by a later [`Parser::open_before`].
#[derive(Clone, Copy)]
pub(crate) struct MarkClosed {
    index: usize,
}

pub(crate) struct Parser {
    /// Non-trivia tokens, EOF excluded.
    tokens: Vec<Token>,
    pos: usize,
    events: Vec<Event>,
    errors: Vec<ParseError>,
    /// Current expression nesting depth, checked against [`MAX_DEPTH`].
    pub(crate) depth: u32,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            errors: Vec::new(),
            depth: 0,
        }
    }

    pub(crate) fn finish(self) -> (Vec<Event>, Vec<ParseError>) {
        (self.events, self.errors)
    }

    // ── Markers ──────────────────────────────────────────────────────────

    pub(crate) fn open(&mut self) -> MarkOpened {
        let m = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
        });
        m
    }

    /// Open a node that wraps the already-closed node `m`.
    ///
    /// Invalidates any other `MarkClosed` values the caller may be holding;
    /// the standard pattern is `lhs = p.close(p.open_before(lhs), ..)`.
    pub(crate) fn open_before(&mut self, m: MarkClosed) -> MarkOpened {
        self.events.insert(
            m.index,
            Event::Open {
                kind: SyntaxKind::TOMBSTONE,
            },
        );
        MarkOpened { index: m.index }
    }

    pub(crate) fn close(&mut self, m: MarkOpened, kind: SyntaxKind) -> MarkClosed {
        self.events[m.index] = Event::Open { kind };
        self.events.push(Event::Close);
        MarkClosed { index: m.index }
    }

    // ── Cursor ───────────────────────────────────────────────────────────

    pub(crate) fn eof(&self) -> bool {
        self.pos == self.tokens.len()
    }

    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + n)
            .map_or(SyntaxKind::EOF, |t| t.kind.into())
    }

    pub(crate) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    pub(crate) fn current_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some(t) => t.span,
            None => {
                let end = self.tokens.last().map_or(0, |t| t.span.end);
                Span::point(end)
            }
        }
    }

    pub(crate) fn advance(&mut self) {
        debug_assert!(!self.eof(), "advance past end of input");
        self.events.push(Event::Advance);
        self.pos += 1;
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) {
        if !self.eat(kind) {
            self.error(format!("expected {kind}"));
        }
    }

    // ── Errors ───────────────────────────────────────────────────────────

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let span = self.current_span();
        self.errors.push(ParseError::new(message, span));
    }

    pub(crate) fn error_with_code(&mut self, code: &'static str, message: impl Into<String>) {
        let span = self.current_span();
        self.errors.push(ParseError::new(message, span).with_code(code));
    }

    pub(crate) fn error_with_related(
        &mut self,
        message: impl Into<String>,
        related_span: Span,
        related_message: impl Into<String>,
    ) {
        let span = self.current_span();
        self.errors.push(ParseError::with_related(
            message,
            span,
            related_message,
            related_span,
        ));
    }

    /// Wrap the current token in an ERROR node and report it.
    pub(crate) fn advance_with_error(&mut self, message: impl Into<String>) {
        let m = self.open();
        self.error_with_code("UnexpectedToken", message);
        if !self.eof() {
            self.advance();
        }
        self.close(m, SyntaxKind::ERROR);
    }
}

/// Parse a whole source file: declarations and statements until EOF.
pub(crate) fn source_file(p: &mut Parser) {
    let m = p.open();
    while !p.eof() {
        let before = p.pos;
        items::top_decl(p);
        if p.pos == before {
            // A stray token (e.g. an unmatched `}`) nothing could consume.
            p.advance_with_error(format!("unexpected {}", p.current()));
        }
    }
    p.close(m, SyntaxKind::SOURCE_FILE);
}
