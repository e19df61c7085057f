//! Declaration parsers for Spy.
//!
//! Parses interface declarations, class declarations with modifiers and
//! `extends`/`implements` clauses, class members (methods, fields), and
//! free functions. Interface bodies deliberately accept the full member
//! grammar so the checker can report bodies and fields inside interfaces
//! instead of bailing at parse time.

use crate::syntax_kind::SyntaxKind;

use super::{expressions, statements, Parser};

/// Whether a `def` member lives in an interface or class body. Interfaces
/// turn body-less signatures into METHOD_SIG nodes.
#[derive(Clone, Copy, PartialEq)]
enum DefContext {
    Interface,
    Class,
}

/// Parse one top-level declaration or statement.
pub(crate) fn top_decl(p: &mut Parser) {
    match p.current() {
        SyntaxKind::INTERFACE_KW => parse_interface_def(p),
        SyntaxKind::CLASS_KW | SyntaxKind::ABSTRACT_KW | SyntaxKind::FINAL_KW => {
            parse_class_def(p)
        }
        SyntaxKind::DEF_KW => parse_fn_def(p),
        _ => statements::stmt(p),
    }
}

// ── Interface Declaration ────────────────────────────────────────────────

/// Parse an interface declaration:
/// `interface Name (extends A, B)? { methodSig* }`
pub(crate) fn parse_interface_def(p: &mut Parser) {
    let m = p.open();
    p.advance(); // INTERFACE_KW

    if p.at(SyntaxKind::IDENT) {
        name(p);
    } else {
        p.error_with_code("MalformedDeclaration", "expected interface name");
        p.close(m, SyntaxKind::INTERFACE_DEF);
        return;
    }

    if p.at(SyntaxKind::EXTENDS_KW) {
        let c = p.open();
        p.advance(); // extends
        name_ref_list(p, "expected base interface name");
        p.close(c, SyntaxKind::EXTENDS_CLAUSE);
    }

    parse_braced_members(p, m, SyntaxKind::INTERFACE_DEF, DefContext::Interface);
}

// ── Class Declaration ────────────────────────────────────────────────────

/// Parse a class declaration:
/// `(abstract|final)* class Name (extends Base)? (implements I, J)? { member* }`
///
/// Repeated or conflicting modifiers parse; the checker diagnoses them.
pub(crate) fn parse_class_def(p: &mut Parser) {
    let m = p.open();

    while p.at(SyntaxKind::ABSTRACT_KW) || p.at(SyntaxKind::FINAL_KW) {
        p.advance();
    }

    if !p.eat(SyntaxKind::CLASS_KW) {
        p.error_with_code("MalformedDeclaration", "expected `class` after class modifier");
        if !p.eof() {
            p.advance();
        }
        p.close(m, SyntaxKind::ERROR);
        return;
    }

    if p.at(SyntaxKind::IDENT) {
        name(p);
    } else {
        p.error_with_code("MalformedDeclaration", "expected class name");
        p.close(m, SyntaxKind::CLASS_DEF);
        return;
    }

    if p.at(SyntaxKind::EXTENDS_KW) {
        let c = p.open();
        p.advance(); // extends
        if p.at(SyntaxKind::IDENT) {
            name_ref(p);
        } else {
            p.error("expected base class name");
        }
        p.close(c, SyntaxKind::EXTENDS_CLAUSE);
    }

    if p.at(SyntaxKind::IMPLEMENTS_KW) {
        let c = p.open();
        p.advance(); // implements
        name_ref_list(p, "expected interface name");
        p.close(c, SyntaxKind::IMPLEMENTS_CLAUSE);
    }

    parse_braced_members(p, m, SyntaxKind::CLASS_DEF, DefContext::Class);
}

/// Parse `{ member* }` and close the declaration node.
fn parse_braced_members(
    p: &mut Parser,
    m: super::MarkOpened,
    kind: SyntaxKind,
    ctx: DefContext,
) {
    let brace_span = p.current_span();
    if !p.eat(SyntaxKind::L_BRACE) {
        p.error("expected `{` to open body");
        p.close(m, kind);
        return;
    }

    while !p.at(SyntaxKind::R_BRACE) && !p.eof() {
        parse_member(p, ctx);
    }

    if !p.eat(SyntaxKind::R_BRACE) {
        let what = if kind == SyntaxKind::CLASS_DEF {
            "class"
        } else {
            "interface"
        };
        p.error_with_related(
            format!("expected `}}` to close {what} body"),
            brace_span,
            format!("{what} body started here"),
        );
    }
    p.close(m, kind);
}

// ── Members ──────────────────────────────────────────────────────────────

/// Parse one member: `modifier* def name(params) (-> type)? (; | block)`
/// or a field `modifier* name (: type)? = expr ;`.
fn parse_member(p: &mut Parser, ctx: DefContext) {
    let m = p.open();

    while p.at_any(&[
        SyntaxKind::ABSTRACT_KW,
        SyntaxKind::FINAL_KW,
        SyntaxKind::STATIC_KW,
    ]) {
        p.advance();
    }

    if p.at(SyntaxKind::DEF_KW) {
        parse_def_tail(p, m, ctx);
    } else if p.at(SyntaxKind::IDENT) {
        // Field declaration.
        name(p);
        if p.at(SyntaxKind::COLON) {
            type_annotation(p, SyntaxKind::COLON);
        }
        if p.eat(SyntaxKind::EQ) {
            expressions::expr(p);
        } else {
            p.error("expected `=` in field declaration");
        }
        statements::semi(p);
        p.close(m, SyntaxKind::FIELD_DEF);
    } else {
        p.error_with_code("MalformedDeclaration", "expected member declaration");
        if !p.at(SyntaxKind::R_BRACE) && !p.eof() {
            p.advance();
        }
        p.close(m, SyntaxKind::ERROR);
    }
}

/// The `def ...` part of a member, after any modifiers.
fn parse_def_tail(p: &mut Parser, m: super::MarkOpened, ctx: DefContext) {
    p.advance(); // DEF_KW

    if p.at(SyntaxKind::IDENT) {
        name(p);
    } else {
        p.error("expected method name");
    }

    param_list(p);

    if p.at(SyntaxKind::ARROW) {
        type_annotation(p, SyntaxKind::ARROW);
    }

    if p.eat(SyntaxKind::SEMICOLON) {
        // Signature-only: a requirement in interfaces, an abstract-style
        // declaration in classes.
        let kind = match ctx {
            DefContext::Interface => SyntaxKind::METHOD_SIG,
            DefContext::Class => SyntaxKind::METHOD_DEF,
        };
        p.close(m, kind);
    } else if p.at(SyntaxKind::L_BRACE) {
        statements::block(p);
        p.close(m, SyntaxKind::METHOD_DEF);
    } else {
        p.error("expected `;` or `{` after method signature");
        p.close(m, SyntaxKind::METHOD_DEF);
    }
}

// ── Free Functions ───────────────────────────────────────────────────────

/// Parse a free function: `def name(params) (-> type)? block`
pub(crate) fn parse_fn_def(p: &mut Parser) {
    let m = p.open();
    p.advance(); // DEF_KW

    if p.at(SyntaxKind::IDENT) {
        name(p);
    } else {
        p.error("expected function name");
        p.close(m, SyntaxKind::FN_DEF);
        return;
    }

    param_list(p);

    if p.at(SyntaxKind::ARROW) {
        type_annotation(p, SyntaxKind::ARROW);
    }

    if p.at(SyntaxKind::L_BRACE) {
        statements::block(p);
    } else {
        p.error("expected function body");
    }
    p.close(m, SyntaxKind::FN_DEF);
}

// ── Shared Pieces ────────────────────────────────────────────────────────

/// Parse the current IDENT as a NAME node. Caller checks `p.at(IDENT)`.
pub(crate) fn name(p: &mut Parser) {
    let m = p.open();
    p.advance();
    p.close(m, SyntaxKind::NAME);
}

/// Parse the current IDENT as a NAME_REF node.
pub(crate) fn name_ref(p: &mut Parser) {
    let m = p.open();
    p.advance();
    p.close(m, SyntaxKind::NAME_REF);
}

/// Parse a comma-separated list of NAME_REFs, at least one expected.
fn name_ref_list(p: &mut Parser, missing: &str) {
    if p.at(SyntaxKind::IDENT) {
        name_ref(p);
        while p.eat(SyntaxKind::COMMA) {
            if p.at(SyntaxKind::IDENT) {
                name_ref(p);
            } else {
                p.error(missing);
                break;
            }
        }
    } else {
        p.error(missing);
    }
}

/// Parse `(params)`.
pub(crate) fn param_list(p: &mut Parser) {
    let m = p.open();
    if !p.eat(SyntaxKind::L_PAREN) {
        p.error("expected `(`");
        p.close(m, SyntaxKind::PARAM_LIST);
        return;
    }
    while !p.at(SyntaxKind::R_PAREN) && !p.eof() {
        param(p);
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_PAREN);
    p.close(m, SyntaxKind::PARAM_LIST);
}

/// Parse one parameter: `name (: type)?` where name may be `self`.
fn param(p: &mut Parser) {
    let m = p.open();
    if p.at(SyntaxKind::IDENT) || p.at(SyntaxKind::SELF_KW) {
        p.advance();
    } else {
        p.error("expected parameter name");
        if !p.at_any(&[SyntaxKind::R_PAREN, SyntaxKind::COMMA]) && !p.eof() {
            p.advance();
        }
    }
    if p.at(SyntaxKind::COLON) {
        type_annotation(p, SyntaxKind::COLON);
    }
    p.close(m, SyntaxKind::PARAM);
}

/// Parse `: Type` or `-> Type` as a TYPE_ANNOTATION. Caller checks the
/// introducing token.
pub(crate) fn type_annotation(p: &mut Parser, intro: SyntaxKind) {
    debug_assert!(p.at(intro));
    let m = p.open();
    p.advance(); // `:` or `->`
    p.expect(SyntaxKind::IDENT);
    p.close(m, SyntaxKind::TYPE_ANNOTATION);
}
