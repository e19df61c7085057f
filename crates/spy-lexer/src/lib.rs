//! Tokenizer for the Spy language.
//!
//! Whitespace (including newlines) is insignificant outside strings;
//! statements end at `;` and blocks are braced. The lexer produces the full
//! token stream including trivia, so the parser can build a lossless tree,
//! and it always scans past bad input, collecting errors on the side.
//!
//! F-strings are lexed into a token run rather than one opaque token:
//! `FStringStart (StringText | InterpStart expr-tokens FormatSpec? InterpEnd)* FStringEnd`.
//! Interpolations nest arbitrarily; braces, brackets, and parens inside an
//! interpolation are counted so the closing `}` and the `:` that starts a
//! format spec are only recognized at depth zero.

use spy_common::error::{LexError, LexErrorKind};
use spy_common::span::Span;
use spy_common::token::{Token, TokenKind};

/// Tokenize `src`, returning the token stream (trivia included, EOF token
/// last) and any lexical errors encountered along the way.
pub fn tokenize(src: &str) -> (Vec<Token>, Vec<LexError>) {
    Lexer::new(src).run()
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    /// Inside an f-string body, scanning literal text chunks.
    FString { quote: char },
    /// Inside a `{...}` interpolation; `depth` counts nested delimiters.
    Interp { depth: u32 },
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
    modes: Vec<Mode>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
            modes: Vec::new(),
        }
    }

    fn run(mut self) -> (Vec<Token>, Vec<LexError>) {
        while self.pos < self.src.len() {
            match self.modes.last().copied() {
                Some(Mode::FString { quote }) => self.fstring_body(quote),
                _ => self.scan_token(),
            }
        }
        if !self.modes.is_empty() {
            // Input ended inside an f-string or interpolation.
            self.errors.push(LexError::new(
                LexErrorKind::UnterminatedString,
                Span::point(self.pos as u32),
            ));
            self.modes.clear();
        }
        let at = self.pos as u32;
        self.tokens
            .push(Token::new(TokenKind::Eof, "", Span::point(at)));
        (self.tokens, self.errors)
    }

    // ── Character helpers ────────────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut it = self.src[self.pos..].chars();
        it.next();
        it.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn emit(&mut self, kind: TokenKind, start: usize) {
        let span = Span::new(start as u32, self.pos as u32);
        self.tokens
            .push(Token::new(kind, &self.src[start..self.pos], span));
    }

    fn error(&mut self, kind: LexErrorKind, start: usize) {
        self.errors
            .push(LexError::new(kind, Span::new(start as u32, self.pos as u32)));
    }

    // ── Normal / interpolation scanning ──────────────────────────────────

    fn scan_token(&mut self) {
        let start = self.pos;
        let c = match self.peek() {
            Some(c) => c,
            None => return,
        };

        if c.is_whitespace() {
            while self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            }
            self.emit(TokenKind::Whitespace, start);
            return;
        }

        if c == '#' {
            while self.peek().is_some_and(|c| c != '\n') {
                self.bump();
            }
            self.emit(TokenKind::Comment, start);
            return;
        }

        if c == '"' || c == '\'' {
            self.scan_string(c);
            return;
        }

        // `f"` / `f'` opens an f-string.
        if c == 'f' && matches!(self.peek_second(), Some('"') | Some('\'')) {
            self.bump(); // f
            let quote = self.bump().unwrap();
            self.emit(TokenKind::FStringStart, start);
            self.modes.push(Mode::FString { quote });
            return;
        }

        if c.is_alphabetic() || c == '_' {
            while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
                self.bump();
            }
            let text = &self.src[start..self.pos];
            let kind = TokenKind::from_keyword(text).unwrap_or(TokenKind::Ident);
            self.emit(kind, start);
            return;
        }

        if c.is_ascii_digit() {
            self.scan_number(start);
            return;
        }

        self.scan_punct(start, c);
    }

    fn scan_punct(&mut self, start: usize, c: char) {
        self.bump();
        let next = self.peek();
        let kind = match c {
            '{' => {
                self.interp_open();
                TokenKind::LBrace
            }
            '}' => {
                if let Some(Mode::Interp { depth: 0 }) = self.modes.last() {
                    self.modes.pop();
                    TokenKind::InterpEnd
                } else {
                    self.interp_close();
                    TokenKind::RBrace
                }
            }
            '(' => {
                self.interp_open();
                TokenKind::LParen
            }
            ')' => {
                self.interp_close();
                TokenKind::RParen
            }
            '[' => {
                self.interp_open();
                TokenKind::LBracket
            }
            ']' => {
                self.interp_close();
                TokenKind::RBracket
            }
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            ':' => {
                if let Some(Mode::Interp { depth: 0 }) = self.modes.last() {
                    // A top-level `:` inside an interpolation starts the
                    // format spec, which runs to the closing `}`.
                    return self.scan_format_spec(start);
                }
                TokenKind::Colon
            }
            '-' => match next {
                Some('>') => {
                    self.bump();
                    TokenKind::Arrow
                }
                Some('=') => {
                    self.bump();
                    TokenKind::MinusEq
                }
                _ => TokenKind::Minus,
            },
            '+' => match next {
                Some('=') => {
                    self.bump();
                    TokenKind::PlusEq
                }
                _ => TokenKind::Plus,
            },
            '*' => match next {
                Some('*') => {
                    self.bump();
                    TokenKind::StarStar
                }
                Some('=') => {
                    self.bump();
                    TokenKind::StarEq
                }
                _ => TokenKind::Star,
            },
            '/' => match next {
                Some('=') => {
                    self.bump();
                    TokenKind::SlashEq
                }
                _ => TokenKind::Slash,
            },
            '%' => TokenKind::Percent,
            '=' => match next {
                Some('=') => {
                    self.bump();
                    TokenKind::EqEq
                }
                _ => TokenKind::Eq,
            },
            '!' => match next {
                Some('=') => {
                    self.bump();
                    TokenKind::NotEq
                }
                _ => {
                    self.error(LexErrorKind::StrayCharacter('!'), start);
                    TokenKind::Error
                }
            },
            '<' => match next {
                Some('=') => {
                    self.bump();
                    TokenKind::LtEq
                }
                _ => TokenKind::Lt,
            },
            '>' => match next {
                Some('=') => {
                    self.bump();
                    TokenKind::GtEq
                }
                _ => TokenKind::Gt,
            },
            other => {
                self.error(LexErrorKind::StrayCharacter(other), start);
                TokenKind::Error
            }
        };
        self.emit(kind, start);
    }

    fn interp_open(&mut self) {
        if let Some(Mode::Interp { depth }) = self.modes.last_mut() {
            *depth += 1;
        }
    }

    fn interp_close(&mut self) {
        if let Some(Mode::Interp { depth }) = self.modes.last_mut() {
            *depth = depth.saturating_sub(1);
        }
    }

    /// `:spec` inside an interpolation, e.g. `:.2f`. The spec text runs to
    /// the closing `}` (which the next scan emits as `InterpEnd`).
    fn scan_format_spec(&mut self, colon_start: usize) {
        while let Some(c) = self.peek() {
            if c == '}' || c == '\n' {
                break;
            }
            self.bump();
        }
        self.emit(TokenKind::FormatSpec, colon_start);
    }

    // ── Strings ──────────────────────────────────────────────────────────

    fn scan_string(&mut self, quote: char) {
        let start = self.pos;
        self.bump(); // opening quote
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some('\n') | None => {
                    self.error(LexErrorKind::UnterminatedString, start);
                    break;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        self.emit(TokenKind::Str, start);
    }

    /// Literal text inside an f-string, up to the next `{`, the closing
    /// quote, or the end of the line.
    fn fstring_body(&mut self, quote: char) {
        let start = self.pos;
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    if self.pos > start {
                        self.emit(TokenKind::StringText, start);
                    }
                    let q = self.pos;
                    self.bump();
                    self.emit(TokenKind::FStringEnd, q);
                    self.modes.pop();
                    return;
                }
                Some('{') if self.peek_second() == Some('{') => {
                    self.bump();
                    self.bump();
                }
                Some('}') if self.peek_second() == Some('}') => {
                    self.bump();
                    self.bump();
                }
                Some('{') => {
                    if self.pos > start {
                        self.emit(TokenKind::StringText, start);
                    }
                    let b = self.pos;
                    self.bump();
                    self.emit(TokenKind::InterpStart, b);
                    self.modes.push(Mode::Interp { depth: 0 });
                    return;
                }
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some('\n') | None => {
                    if self.pos > start {
                        self.emit(TokenKind::StringText, start);
                    }
                    self.error(LexErrorKind::UnterminatedString, start);
                    self.modes.pop();
                    return;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    // ── Numbers ──────────────────────────────────────────────────────────

    fn scan_number(&mut self, start: usize) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        let mut kind = TokenKind::Int;
        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.bump(); // .
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
            kind = TokenKind::Float;
        }
        // `123abc` is one bad token, not an int followed by an identifier.
        if self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
                self.bump();
            }
            let text = self.src[start..self.pos].to_string();
            self.error(LexErrorKind::InvalidNumber(text), start);
            kind = TokenKind::Error;
        }
        self.emit(kind, start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Kinds of all non-trivia tokens, EOF excluded.
    fn kinds(src: &str) -> Vec<TokenKind> {
        let (tokens, errors) = tokenize(src);
        assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
        tokens
            .iter()
            .filter(|t| !t.kind.is_trivia() && t.kind != TokenKind::Eof)
            .map(|t| t.kind)
            .collect()
    }

    fn texts(src: &str) -> Vec<String> {
        let (tokens, _) = tokenize(src);
        tokens
            .iter()
            .filter(|t| !t.kind.is_trivia() && t.kind != TokenKind::Eof)
            .map(|t| t.text.clone())
            .collect()
    }

    #[test]
    fn keywords_and_punctuation() {
        use TokenKind::*;
        assert_eq!(
            kinds("abstract class Shape extends Base implements I {}"),
            vec![AbstractKw, ClassKw, Ident, ExtendsKw, Ident, ImplementsKw, Ident, LBrace, RBrace]
        );
    }

    #[test]
    fn operators_maximal_munch() {
        use TokenKind::*;
        assert_eq!(
            kinds("a -> b ** c *= d == e != f <= g >= h += i -= j /= k"),
            vec![
                Ident, Arrow, Ident, StarStar, Ident, StarEq, Ident, EqEq, Ident, NotEq, Ident,
                LtEq, Ident, GtEq, Ident, PlusEq, Ident, MinusEq, Ident, SlashEq, Ident
            ]
        );
    }

    #[test]
    fn numbers() {
        use TokenKind::*;
        assert_eq!(kinds("1 23 4.5 0.25"), vec![Int, Int, Float, Float]);
        // `1.` is an int followed by a dot (attribute position), not a float.
        assert_eq!(kinds("1."), vec![Int, Dot]);
    }

    #[test]
    fn invalid_number_is_one_error_token() {
        let (tokens, errors) = tokenize("12abc;");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0].kind, LexErrorKind::InvalidNumber(ref s) if s == "12abc"));
        let non_trivia: Vec<_> = tokens
            .iter()
            .filter(|t| !t.kind.is_trivia() && t.kind != TokenKind::Eof)
            .collect();
        assert_eq!(non_trivia[0].kind, TokenKind::Error);
        assert_eq!(non_trivia[1].kind, TokenKind::Semicolon);
    }

    #[test]
    fn strings_and_escapes() {
        assert_eq!(kinds(r#""hello" 'wo\'rld'"#), vec![TokenKind::Str, TokenKind::Str]);
        assert_eq!(texts(r#""a\"b""#), vec![r#""a\"b""#.to_string()]);
    }

    #[test]
    fn unterminated_string_at_newline() {
        let (_, errors) = tokenize("\"oops\nx;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn comments_are_trivia() {
        use TokenKind::*;
        assert_eq!(kinds("x; # trailing note\ny;"), vec![Ident, Semicolon, Ident, Semicolon]);
    }

    #[test]
    fn fstring_plain_text() {
        use TokenKind::*;
        assert_eq!(
            kinds(r#"f"hello""#),
            vec![FStringStart, StringText, FStringEnd]
        );
    }

    #[test]
    fn fstring_with_interpolation_and_spec() {
        use TokenKind::*;
        assert_eq!(
            kinds(r#"f"Area: {area:.2f}!""#),
            vec![
                FStringStart, StringText, InterpStart, Ident, FormatSpec, InterpEnd, StringText,
                FStringEnd
            ]
        );
        assert_eq!(
            texts(r#"f"{r:.2%}""#),
            vec!["f\"", "{", "r", ":.2%", "}", "\""]
        );
    }

    #[test]
    fn fstring_nested_braces_balance() {
        use TokenKind::*;
        // The dict literal's braces nest inside the interpolation; its colon
        // is at depth 1, so it stays a plain colon.
        assert_eq!(
            kinds(r#"f"{ {1: 2} }""#),
            vec![
                FStringStart, InterpStart, LBrace, Int, Colon, Int, RBrace, InterpEnd, FStringEnd
            ]
        );
    }

    #[test]
    fn fstring_slice_colon_is_spec_boundary_only_at_depth_zero() {
        use TokenKind::*;
        assert_eq!(
            kinds(r#"f"{xs[1:2]}""#),
            vec![
                FStringStart, InterpStart, Ident, LBracket, Int, Colon, Int, RBracket, InterpEnd,
                FStringEnd
            ]
        );
    }

    #[test]
    fn fstring_doubled_braces_are_text() {
        use TokenKind::*;
        assert_eq!(kinds(r#"f"{{not interp}}""#), vec![FStringStart, StringText, FStringEnd]);
    }

    #[test]
    fn nested_fstring_inside_interpolation() {
        use TokenKind::*;
        assert_eq!(
            kinds(r#"f"{f'{x}'}""#),
            vec![
                FStringStart, InterpStart, FStringStart, InterpStart, Ident, InterpEnd,
                FStringEnd, InterpEnd, FStringEnd
            ]
        );
    }

    #[test]
    fn unterminated_fstring() {
        let (_, errors) = tokenize("f\"open {x}");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn stray_character() {
        let (tokens, errors) = tokenize("a @ b");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0].kind, LexErrorKind::StrayCharacter('@')));
        // Lexing continued past the bad byte.
        assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Ident).count(), 2);
    }

    #[test]
    fn unicode_identifiers() {
        let (tokens, errors) = tokenize("área = 1;");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].text, "área");
    }

    #[test]
    fn token_stream_snapshot() {
        let (tokens, _) = tokenize("def f(x) { return x + 1; }");
        let kinds: Vec<String> = tokens
            .iter()
            .filter(|t| !t.kind.is_trivia() && t.kind != TokenKind::Eof)
            .map(|t| format!("{:?}", t.kind))
            .collect();
        insta::assert_snapshot!(
            kinds.join(" "),
            @"DefKw Ident LParen Ident RParen LBrace ReturnKw Ident Plus Int Semicolon RBrace"
        );
    }

    #[test]
    fn spans_cover_the_file() {
        let src = "def f() { return 1; }";
        let (tokens, _) = tokenize(src);
        for t in &tokens {
            assert!(t.span.end as usize <= src.len());
            assert_eq!(&src[t.span.as_range()], t.text);
        }
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }
}
