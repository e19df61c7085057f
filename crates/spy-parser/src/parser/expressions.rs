//! Pratt expression parser for Spy.
//!
//! Implements operator precedence parsing with binding power tables.
//! Handles literals, names, `self`/`super`, unary and binary operators
//! (including the two-token comparisons `not in` and `is not`), calls,
//! attribute access, indexing and slicing, list/dict/tuple literals, and
//! f-strings with interpolated expressions and format specs.

use crate::syntax_kind::SyntaxKind;

use super::{MarkClosed, Parser, MAX_DEPTH};

// ── Binding Power Tables ───────────────────────────────────────────────

/// Returns (left_bp, right_bp) for infix operators.
///
/// Left < right means left-associative; left > right right-associative
/// (only `**`).
fn infix_binding_power(op: SyntaxKind) -> Option<(u8, u8)> {
    match op {
        // Logical OR: lowest
        SyntaxKind::OR_KW => Some((1, 2)),

        // Logical AND
        SyntaxKind::AND_KW => Some((3, 4)),

        // `not` sits between `and` and the comparisons as a prefix; see
        // prefix_binding_power.

        // Comparisons, membership, identity: one level, left-associative
        SyntaxKind::EQ_EQ
        | SyntaxKind::NOT_EQ
        | SyntaxKind::LT
        | SyntaxKind::LT_EQ
        | SyntaxKind::GT
        | SyntaxKind::GT_EQ
        | SyntaxKind::IN_KW
        | SyntaxKind::IS_KW => Some((7, 8)),

        // Additive
        SyntaxKind::PLUS | SyntaxKind::MINUS => Some((9, 10)),

        // Multiplicative
        SyntaxKind::STAR | SyntaxKind::SLASH | SyntaxKind::PERCENT => Some((11, 12)),

        // Power: right-associative
        SyntaxKind::STAR_STAR => Some((14, 13)),

        _ => None,
    }
}

/// Binding power of the comparison level, used for `not in`.
const COMPARISON_BP: (u8, u8) = (7, 8);

/// Right binding power for prefix operators.
fn prefix_binding_power(op: SyntaxKind) -> Option<u8> {
    match op {
        // `not` binds looser than comparisons: `not a == b` is `not (a == b)`.
        SyntaxKind::NOT_KW => Some(5),
        // Unary minus binds tighter than `*` but looser than `**`,
        // so `-2 ** 2` is `-(2 ** 2)`.
        SyntaxKind::MINUS => Some(15),
        _ => None,
    }
}

/// Postfix operations (call, attribute, index) bind tightest.
const POSTFIX_BP: u8 = 17;

// ── Expression Entry Point ─────────────────────────────────────────────

/// Parse an expression at the lowest binding power.
///
/// Returns `None` (with an error reported) if no expression could start
/// at the current token; nothing is consumed in that case.
pub(crate) fn expr(p: &mut Parser) -> Option<MarkClosed> {
    expr_bp(p, 0)
}

fn expr_bp(p: &mut Parser, min_bp: u8) -> Option<MarkClosed> {
    if p.depth >= MAX_DEPTH {
        p.error("expression nesting too deep");
        return None;
    }
    p.depth += 1;
    let result = expr_bp_inner(p, min_bp);
    p.depth -= 1;
    result
}

/// The core Pratt loop: parse an atom or prefix expression, then consume
/// postfix and infix operators while their binding power allows.
fn expr_bp_inner(p: &mut Parser, min_bp: u8) -> Option<MarkClosed> {
    let mut lhs = lhs(p)?;

    loop {
        let current = p.current();

        // ── Postfix: function call ──
        if current == SyntaxKind::L_PAREN && POSTFIX_BP >= min_bp {
            let m = p.open_before(lhs);
            parse_arg_list(p);
            lhs = p.close(m, SyntaxKind::CALL_EXPR);
            continue;
        }

        // ── Postfix: attribute access ──
        if current == SyntaxKind::DOT && POSTFIX_BP >= min_bp {
            let m = p.open_before(lhs);
            p.advance(); // .
            if !p.eat(SyntaxKind::IDENT) {
                p.error("expected attribute name");
            }
            lhs = p.close(m, SyntaxKind::FIELD_ACCESS);
            continue;
        }

        // ── Postfix: index / slice ──
        if current == SyntaxKind::L_BRACKET && POSTFIX_BP >= min_bp {
            let m = p.open_before(lhs);
            p.advance(); // [
            parse_index_contents(p);
            p.expect(SyntaxKind::R_BRACKET);
            lhs = p.close(m, SyntaxKind::INDEX_EXPR);
            continue;
        }

        // ── `not in`: a two-token comparison operator ──
        if current == SyntaxKind::NOT_KW && p.nth(1) == SyntaxKind::IN_KW {
            let (l_bp, r_bp) = COMPARISON_BP;
            if l_bp < min_bp {
                break;
            }
            let m = p.open_before(lhs);
            p.advance(); // not
            p.advance(); // in
            expr_bp(p, r_bp);
            lhs = p.close(m, SyntaxKind::BINARY_EXPR);
            continue;
        }

        // ── Infix operators ──
        if let Some((l_bp, r_bp)) = infix_binding_power(current) {
            if l_bp < min_bp {
                break;
            }
            let m = p.open_before(lhs);
            p.advance(); // operator
            if current == SyntaxKind::IS_KW {
                // `is not`
                p.eat(SyntaxKind::NOT_KW);
            }
            expr_bp(p, r_bp);
            lhs = p.close(m, SyntaxKind::BINARY_EXPR);
            continue;
        }

        break;
    }

    Some(lhs)
}

// ── Atom / Prefix Parsing (LHS) ───────────────────────────────────────

/// Parse the left-hand side of an expression: an atom or prefix operator.
fn lhs(p: &mut Parser) -> Option<MarkClosed> {
    let current = p.current();

    if let Some(r_bp) = prefix_binding_power(current) {
        let m = p.open();
        p.advance(); // operator
        expr_bp(p, r_bp);
        return Some(p.close(m, SyntaxKind::UNARY_EXPR));
    }

    match current {
        SyntaxKind::INT_LITERAL
        | SyntaxKind::FLOAT_LITERAL
        | SyntaxKind::STRING_LITERAL
        | SyntaxKind::TRUE_KW
        | SyntaxKind::FALSE_KW
        | SyntaxKind::NONE_KW => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::LITERAL))
        }

        SyntaxKind::IDENT => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::NAME_REF))
        }

        SyntaxKind::SELF_KW => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::SELF_EXPR))
        }

        SyntaxKind::SUPER_KW => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::SUPER_EXPR))
        }

        SyntaxKind::FSTRING_START => Some(parse_fstring(p)),

        SyntaxKind::L_PAREN => Some(parse_paren_or_tuple(p)),

        SyntaxKind::L_BRACKET => Some(parse_list(p)),

        SyntaxKind::L_BRACE => Some(parse_dict(p)),

        _ => {
            p.error("expected expression");
            None
        }
    }
}

// ── Composite Literals ─────────────────────────────────────────────────

/// `(expr)` grouping, or `(a, b, ...)` tuple; `()` is the empty tuple.
fn parse_paren_or_tuple(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // (

    if p.eat(SyntaxKind::R_PAREN) {
        return p.close(m, SyntaxKind::TUPLE_EXPR);
    }

    expr_bp(p, 0);

    if p.at(SyntaxKind::COMMA) {
        while p.eat(SyntaxKind::COMMA) {
            if p.at(SyntaxKind::R_PAREN) {
                break;
            }
            if expr_bp(p, 0).is_none() {
                break;
            }
        }
        p.expect(SyntaxKind::R_PAREN);
        p.close(m, SyntaxKind::TUPLE_EXPR)
    } else {
        p.expect(SyntaxKind::R_PAREN);
        p.close(m, SyntaxKind::PAREN_EXPR)
    }
}

/// `[a, b, ...]`, trailing comma allowed.
fn parse_list(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // [
    while !p.at(SyntaxKind::R_BRACKET) && !p.eof() {
        if expr_bp(p, 0).is_none() {
            break;
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_BRACKET);
    p.close(m, SyntaxKind::LIST_EXPR)
}

/// `{k: v, ...}`, trailing comma allowed.
fn parse_dict(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // {
    while !p.at(SyntaxKind::R_BRACE) && !p.eof() {
        let e = p.open();
        if expr_bp(p, 0).is_none() {
            p.close(e, SyntaxKind::DICT_ENTRY);
            break;
        }
        p.expect(SyntaxKind::COLON);
        expr_bp(p, 0);
        p.close(e, SyntaxKind::DICT_ENTRY);
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_BRACE);
    p.close(m, SyntaxKind::DICT_EXPR)
}

// ── Calls, Indexing ────────────────────────────────────────────────────

/// `(arg, ...)`
fn parse_arg_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // (
    while !p.at(SyntaxKind::R_PAREN) && !p.eof() {
        if expr_bp(p, 0).is_none() {
            break;
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_PAREN);
    p.close(m, SyntaxKind::ARG_LIST);
}

/// The interior of `a[...]`: a plain index expression, or a slice with an
/// optional start and/or end around `:`.
fn parse_index_contents(p: &mut Parser) {
    if p.at(SyntaxKind::COLON) {
        let s = p.open();
        p.advance(); // :
        if !p.at(SyntaxKind::R_BRACKET) {
            expr_bp(p, 0);
        }
        p.close(s, SyntaxKind::SLICE);
        return;
    }
    let e = match expr_bp(p, 0) {
        Some(e) => e,
        None => return,
    };
    if p.at(SyntaxKind::COLON) {
        let s = p.open_before(e);
        p.advance(); // :
        if !p.at(SyntaxKind::R_BRACKET) {
            expr_bp(p, 0);
        }
        p.close(s, SyntaxKind::SLICE);
    }
}

// ── F-Strings ──────────────────────────────────────────────────────────

/// Parse an f-string: text chunks interleaved with `{expr(:spec)?}`
/// interpolations. The lexer has already segmented the pieces.
fn parse_fstring(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // FSTRING_START
    loop {
        match p.current() {
            SyntaxKind::STRING_TEXT => p.advance(),
            SyntaxKind::INTERP_START => {
                let i = p.open();
                p.advance(); // {
                expr_bp(p, 0);
                if p.at(SyntaxKind::FORMAT_SPEC) {
                    p.advance();
                }
                p.expect(SyntaxKind::INTERP_END);
                p.close(i, SyntaxKind::INTERPOLATION);
            }
            SyntaxKind::FSTRING_END => {
                p.advance();
                break;
            }
            // Unterminated f-string: the lexer already reported it.
            _ => break,
        }
    }
    p.close(m, SyntaxKind::F_STRING)
}
