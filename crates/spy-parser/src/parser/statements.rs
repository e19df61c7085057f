//! Statement parsers for Spy.
//!
//! Statements terminate at `;`; blocks are braced. Error recovery is
//! panic-mode: on a malformed statement the parser skips to just past the
//! next `;` (or stops before `}`), wrapping the skipped tokens in an ERROR
//! node, and keeps going.

use crate::syntax_kind::SyntaxKind;

use super::{expressions, items, Parser};

/// Parse one statement.
pub(crate) fn stmt(p: &mut Parser) {
    match p.current() {
        SyntaxKind::RETURN_KW => return_stmt(p),
        SyntaxKind::IF_KW => if_stmt(p),
        SyntaxKind::FOR_KW => for_stmt(p),
        SyntaxKind::WHILE_KW => while_stmt(p),
        SyntaxKind::PASS_KW => {
            let m = p.open();
            p.advance();
            semi(p);
            p.close(m, SyntaxKind::PASS_STMT);
        }
        SyntaxKind::RAISE_KW => {
            let m = p.open();
            p.advance();
            expressions::expr(p);
            semi(p);
            p.close(m, SyntaxKind::RAISE_STMT);
        }
        SyntaxKind::IMPORT_KW => import_stmt(p),
        SyntaxKind::FROM_KW => from_import_stmt(p),
        _ => expr_or_assign_stmt(p),
    }
}

/// Expect a `;`; on failure, report and recover to the next sync point.
pub(crate) fn semi(p: &mut Parser) {
    if !p.eat(SyntaxKind::SEMICOLON) {
        p.error("expected `;`");
        recover_stmt(p);
    }
}

/// Panic-mode recovery: consume to just past the next `;`, or stop before
/// `}` / EOF. Skipped tokens land in an ERROR node.
fn recover_stmt(p: &mut Parser) {
    if p.at(SyntaxKind::R_BRACE) || p.eof() {
        return;
    }
    let m = p.open();
    while !p.eof() && !p.at(SyntaxKind::R_BRACE) {
        let at_semi = p.at(SyntaxKind::SEMICOLON);
        p.advance();
        if at_semi {
            break;
        }
    }
    p.close(m, SyntaxKind::ERROR);
}

/// Parse `{ stmt* }`.
pub(crate) fn block(p: &mut Parser) {
    let m = p.open();
    let brace_span = p.current_span();
    if !p.eat(SyntaxKind::L_BRACE) {
        p.error("expected `{`");
        p.close(m, SyntaxKind::BLOCK);
        return;
    }
    while !p.at(SyntaxKind::R_BRACE) && !p.eof() {
        stmt(p);
    }
    if !p.eat(SyntaxKind::R_BRACE) {
        p.error_with_related("expected `}` to close block", brace_span, "block started here");
    }
    p.close(m, SyntaxKind::BLOCK);
}

// ── Statement Forms ──────────────────────────────────────────────────────

fn return_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // return
    if !p.at(SyntaxKind::SEMICOLON) {
        expressions::expr(p);
    }
    semi(p);
    p.close(m, SyntaxKind::RETURN_STMT);
}

/// `if expr block (elif expr block)* (else block)?`
fn if_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // if
    expressions::expr(p);
    block(p);
    while p.at(SyntaxKind::ELIF_KW) {
        let b = p.open();
        p.advance(); // elif
        expressions::expr(p);
        block(p);
        p.close(b, SyntaxKind::ELIF_BRANCH);
    }
    if p.at(SyntaxKind::ELSE_KW) {
        let b = p.open();
        p.advance(); // else
        block(p);
        p.close(b, SyntaxKind::ELSE_BRANCH);
    }
    p.close(m, SyntaxKind::IF_STMT);
}

/// `for name in expr block`
fn for_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // for
    if p.at(SyntaxKind::IDENT) {
        items::name(p);
    } else {
        p.error("expected loop variable");
    }
    p.expect(SyntaxKind::IN_KW);
    expressions::expr(p);
    block(p);
    p.close(m, SyntaxKind::FOR_STMT);
}

fn while_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // while
    expressions::expr(p);
    block(p);
    p.close(m, SyntaxKind::WHILE_STMT);
}

/// `import Name ;`
fn import_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // import
    if p.at(SyntaxKind::IDENT) {
        items::name_ref(p);
    } else {
        p.error("expected module name");
    }
    semi(p);
    p.close(m, SyntaxKind::IMPORT_STMT);
}

/// `from Name import a, b ;`
fn from_import_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // from
    if p.at(SyntaxKind::IDENT) {
        items::name_ref(p);
    } else {
        p.error("expected module name");
    }
    p.expect(SyntaxKind::IMPORT_KW);
    if p.at(SyntaxKind::IDENT) {
        items::name_ref(p);
        while p.eat(SyntaxKind::COMMA) {
            if p.at(SyntaxKind::IDENT) {
                items::name_ref(p);
            } else {
                p.error("expected import name");
                break;
            }
        }
    } else {
        p.error("expected import name");
    }
    semi(p);
    p.close(m, SyntaxKind::IMPORT_STMT);
}

/// An expression statement, or an assignment if an assignment operator
/// follows the first expression.
fn expr_or_assign_stmt(p: &mut Parser) {
    let m = p.open();
    let lhs = expressions::expr(p);
    if lhs.is_none() {
        // `expr` reported the problem; skip ahead for progress.
        recover_stmt(p);
        p.close(m, SyntaxKind::ERROR);
        return;
    }
    if p.at_any(&[
        SyntaxKind::EQ,
        SyntaxKind::PLUS_EQ,
        SyntaxKind::MINUS_EQ,
        SyntaxKind::STAR_EQ,
        SyntaxKind::SLASH_EQ,
    ]) {
        p.advance(); // the assignment operator
        expressions::expr(p);
        semi(p);
        p.close(m, SyntaxKind::ASSIGN_STMT);
    } else {
        semi(p);
        p.close(m, SyntaxKind::EXPR_STMT);
    }
}
