//! Parser for the Spy language.
//!
//! `parse` runs the lexer and the event parser, then replays the recorded
//! events into a lossless rowan green tree: every byte of the input,
//! trivia and bad tokens included, appears in the tree, so the CST text is
//! exactly the source. The typed accessors in [`ast`] sit on top.

pub mod ast;
pub mod cst;
pub mod error;
mod parser;
pub mod syntax_kind;

use rowan::GreenNodeBuilder;

use spy_common::error::LexError;
use spy_common::token::{Token, TokenKind};

use crate::ast::AstNode;
use crate::cst::SyntaxNode;
use crate::error::ParseError;
use crate::parser::Event;
use crate::syntax_kind::SyntaxKind;

/// The result of parsing one source file.
#[derive(Debug)]
pub struct Parse {
    green: rowan::GreenNode,
    errors: Vec<ParseError>,
    lex_errors: Vec<LexError>,
}

impl Parse {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn source_file(&self) -> ast::item::SourceFile {
        ast::item::SourceFile::cast(self.syntax()).expect("parse root is always SOURCE_FILE")
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn lex_errors(&self) -> &[LexError] {
        &self.lex_errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || !self.lex_errors.is_empty()
    }

    /// The reconstructed source text. Equal to the input byte-for-byte.
    pub fn text(&self) -> String {
        self.syntax().text().to_string()
    }

    /// A debug dump of the full tree, for structural comparisons in tests.
    pub fn debug_tree(&self) -> String {
        format!("{:#?}", self.syntax())
    }
}

/// Lex and parse `src` into a lossless syntax tree plus collected errors.
pub fn parse(src: &str) -> Parse {
    let (all_tokens, lex_errors) = spy_lexer::tokenize(src);

    let parse_tokens: Vec<Token> = all_tokens
        .iter()
        .filter(|t| {
            !t.kind.is_trivia() && t.kind != TokenKind::Error && t.kind != TokenKind::Eof
        })
        .cloned()
        .collect();

    let mut p = parser::Parser::new(parse_tokens);
    parser::source_file(&mut p);
    let (events, errors) = p.finish();

    let green = build_tree(&all_tokens, events);
    Parse {
        green,
        errors,
        lex_errors,
    }
}

/// Replay parser events into a green tree, re-attaching trivia and error
/// tokens in front of the next real token (trailing ones land at the end
/// of the root node).
fn build_tree(all_tokens: &[Token], mut events: Vec<Event>) -> rowan::GreenNode {
    let mut builder = GreenNodeBuilder::new();

    // Drop the final Close so trailing trivia can be emitted inside the root.
    let last = events.pop();
    debug_assert!(matches!(last, Some(Event::Close)));

    let mut cursor = 0usize;
    let emit_passthrough = |builder: &mut GreenNodeBuilder<'_>, cursor: &mut usize| {
        while let Some(t) = all_tokens.get(*cursor) {
            if t.kind.is_trivia() || t.kind == TokenKind::Error {
                builder.token(SyntaxKind::from(t.kind).into(), &t.text);
                *cursor += 1;
            } else {
                break;
            }
        }
    };

    // Trivia is flushed before each Open (into the enclosing node) so that
    // named nodes start exactly at their first real token; node spans never
    // include leading whitespace or comments.
    let mut depth = 0usize;
    for event in events {
        match event {
            Event::Open { kind } => {
                if depth > 0 {
                    emit_passthrough(&mut builder, &mut cursor);
                }
                builder.start_node(kind.into());
                depth += 1;
            }
            Event::Close => {
                builder.finish_node();
                depth -= 1;
            }
            Event::Advance => {
                emit_passthrough(&mut builder, &mut cursor);
                let t = &all_tokens[cursor];
                builder.token(SyntaxKind::from(t.kind).into(), &t.text);
                cursor += 1;
            }
        }
    }

    // Whatever is left before EOF is trailing trivia.
    emit_passthrough(&mut builder, &mut cursor);

    builder.finish_node();
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::expr::{BinaryOp, Expr, FStringPart, LiteralKind};
    use crate::ast::item::{ClassMember, Item};
    use crate::ast::stmt::Stmt;

    fn parse_ok(src: &str) -> Parse {
        let parse = parse(src);
        assert!(
            parse.errors().is_empty() && parse.lex_errors().is_empty(),
            "unexpected errors for {src:?}: {:?} {:?}",
            parse.errors(),
            parse.lex_errors()
        );
        parse
    }

    /// The first top-level statement's expression.
    fn first_expr(parse: &Parse) -> Expr {
        let file = parse.source_file();
        let stmt = file.stmts().next().expect("a statement");
        match stmt {
            Stmt::Expr(e) => e.expr().expect("an expression"),
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn lossless_round_trip() {
        let src = "abstract class A { # note\n  abstract def m() -> int;\n}\nB().m();\n";
        let parse = parse(src);
        assert_eq!(parse.text(), src);

        // Reparsing the reconstructed text yields a structurally equal tree.
        let again = super::parse(&parse.text());
        assert_eq!(parse.debug_tree(), again.debug_tree());
    }

    #[test]
    fn class_declaration_shape() {
        let parse = parse_ok(
            "final class Circle extends Shape implements Drawable, Comparable {
                def area(self) -> float { return 1.0; }
                static count: int = 0;
             }",
        );
        let file = parse.source_file();
        let Some(Item::Class(class)) = file.items().next() else {
            panic!("expected a class");
        };
        assert_eq!(class.name().unwrap().text(), "Circle");
        assert!(class.is_final());
        assert!(!class.is_abstract());
        assert_eq!(
            class.extends_clause().unwrap().base().unwrap().text(),
            "Shape"
        );
        let impls: Vec<String> = class
            .implements_clause()
            .unwrap()
            .names()
            .map(|n| n.text())
            .collect();
        assert_eq!(impls, vec!["Drawable", "Comparable"]);

        let members: Vec<ClassMember> = class.members().collect();
        assert_eq!(members.len(), 2);
        let ClassMember::Method(method) = &members[0] else {
            panic!("expected method first");
        };
        assert_eq!(method.name().unwrap().text(), "area");
        assert!(method.body().is_some());
        assert_eq!(method.return_type().unwrap().type_name().unwrap(), "float");
        let params: Vec<_> = method.param_list().unwrap().params().collect();
        assert_eq!(params.len(), 1);
        assert!(params[0].is_self());

        let ClassMember::Field(field) = &members[1] else {
            panic!("expected field second");
        };
        assert_eq!(field.name().unwrap().text(), "count");
        assert!(field.is_static());
        assert_eq!(field.type_annotation().unwrap().type_name().unwrap(), "int");
        assert!(field.initializer().is_some());
    }

    #[test]
    fn interface_signatures_and_bodies() {
        let parse = parse_ok(
            "interface Shape extends Base {
                def area() -> float;
                def describe() { pass; }
             }",
        );
        let file = parse.source_file();
        let Some(Item::Interface(iface)) = file.items().next() else {
            panic!("expected an interface");
        };
        assert_eq!(iface.name().unwrap().text(), "Shape");
        let sigs: Vec<String> = iface.method_sigs().map(|s| s.name().unwrap().text()).collect();
        assert_eq!(sigs, vec!["area"]);
        // The body-carrying method parses as a METHOD_DEF for the checker.
        let defs: Vec<String> = iface.method_defs().map(|s| s.name().unwrap().text()).collect();
        assert_eq!(defs, vec!["describe"]);
    }

    #[test]
    fn abstract_method_has_no_body() {
        let parse = parse_ok("abstract class A { abstract def m() -> int; }");
        let file = parse.source_file();
        let Some(Item::Class(class)) = file.items().next() else {
            panic!("expected a class");
        };
        let method = class.methods().next().unwrap();
        assert!(method.is_abstract());
        assert!(method.body().is_none());
    }

    #[test]
    fn precedence_mul_over_add() {
        let parse = parse_ok("1 + 2 * 3;");
        let Expr::Binary(add) = first_expr(&parse) else {
            panic!("expected binary");
        };
        assert_eq!(add.op(), Some(BinaryOp::Add));
        let Expr::Binary(mul) = add.rhs().unwrap() else {
            panic!("expected rhs to be the multiplication");
        };
        assert_eq!(mul.op(), Some(BinaryOp::Mul));
    }

    #[test]
    fn power_is_right_associative() {
        let parse = parse_ok("2 ** 3 ** 2;");
        let Expr::Binary(top) = first_expr(&parse) else {
            panic!("expected binary");
        };
        assert_eq!(top.op(), Some(BinaryOp::Pow));
        assert!(matches!(top.rhs().unwrap(), Expr::Binary(_)));
        assert!(matches!(top.lhs().unwrap(), Expr::Literal(_)));
    }

    #[test]
    fn unary_minus_binds_looser_than_power() {
        let parse = parse_ok("-2 ** 2;");
        assert!(matches!(first_expr(&parse), Expr::Unary(_)));
    }

    #[test]
    fn keyword_comparisons() {
        let parse = parse_ok("a not in b;");
        let Expr::Binary(e) = first_expr(&parse) else {
            panic!("expected binary");
        };
        assert_eq!(e.op(), Some(BinaryOp::NotIn));

        let parse = parse_ok("a is not None;");
        let Expr::Binary(e) = first_expr(&parse) else {
            panic!("expected binary");
        };
        assert_eq!(e.op(), Some(BinaryOp::IsNot));
    }

    #[test]
    fn not_binds_looser_than_comparison() {
        let parse = parse_ok("not a == b;");
        let Expr::Unary(e) = first_expr(&parse) else {
            panic!("expected unary");
        };
        assert!(matches!(e.operand().unwrap(), Expr::Binary(_)));
    }

    #[test]
    fn call_attr_index_chain() {
        let parse = parse_ok("shapes[0].area();");
        let Expr::Call(call) = first_expr(&parse) else {
            panic!("expected call");
        };
        let Expr::Field(field) = call.callee().unwrap() else {
            panic!("expected attribute callee");
        };
        assert_eq!(field.name().unwrap(), "area");
        assert!(matches!(field.receiver().unwrap(), Expr::Index(_)));
    }

    #[test]
    fn slices() {
        let parse = parse_ok("xs[1:3];");
        let Expr::Index(idx) = first_expr(&parse) else {
            panic!("expected index");
        };
        let slice = idx.slice().unwrap();
        assert!(slice.start().is_some());
        assert!(slice.end().is_some());

        let parse = parse_ok("xs[-2:];");
        let Expr::Index(idx) = first_expr(&parse) else {
            panic!("expected index");
        };
        let slice = idx.slice().unwrap();
        assert!(slice.start().is_some());
        assert!(slice.end().is_none());

        let parse = parse_ok("xs[:2];");
        let Expr::Index(idx) = first_expr(&parse) else {
            panic!("expected index");
        };
        let slice = idx.slice().unwrap();
        assert!(slice.start().is_none());
        assert!(slice.end().is_some());
    }

    #[test]
    fn dict_and_tuple_literals() {
        let parse = parse_ok("{\"a\": 1, \"b\": 2};");
        let Expr::Dict(d) = first_expr(&parse) else {
            panic!("expected dict");
        };
        assert_eq!(d.entries().count(), 2);

        let parse = parse_ok("(1, 2.5, \"x\");");
        let Expr::Tuple(t) = first_expr(&parse) else {
            panic!("expected tuple");
        };
        assert_eq!(t.elements().count(), 3);

        let parse = parse_ok("(1);");
        assert!(matches!(first_expr(&parse), Expr::Paren(_)));
    }

    #[test]
    fn fstring_parts() {
        let parse = parse_ok("f\"Area: {r * r:.2f}!\";");
        let Expr::FString(f) = first_expr(&parse) else {
            panic!("expected f-string");
        };
        let parts: Vec<FStringPart> = f.parts().collect();
        assert_eq!(parts.len(), 3);
        let FStringPart::Interp(interp) = &parts[1] else {
            panic!("expected interpolation in the middle");
        };
        assert!(matches!(interp.expr().unwrap(), Expr::Binary(_)));
        assert_eq!(interp.format_spec().unwrap(), ".2f");
    }

    #[test]
    fn literal_kinds() {
        for (src, kind) in [
            ("1;", LiteralKind::Int),
            ("1.5;", LiteralKind::Float),
            ("\"s\";", LiteralKind::Str),
            ("True;", LiteralKind::True),
            ("False;", LiteralKind::False),
            ("None;", LiteralKind::NoneLit),
        ] {
            let parse = parse_ok(src);
            let Expr::Literal(lit) = first_expr(&parse) else {
                panic!("expected literal for {src}");
            };
            assert_eq!(lit.kind(), Some(kind), "for {src}");
        }
    }

    #[test]
    fn if_elif_else_chain() {
        let parse = parse_ok("if a { x = 1; } elif b { x = 2; } elif c { x = 3; } else { x = 4; }");
        let file = parse.source_file();
        let Some(Stmt::If(stmt)) = file.stmts().next() else {
            panic!("expected if statement");
        };
        assert!(stmt.condition().is_some());
        assert!(stmt.then_block().is_some());
        assert_eq!(stmt.elif_branches().count(), 2);
        assert!(stmt.else_branch().is_some());
    }

    #[test]
    fn super_forms() {
        let parse = parse_ok("class C extends P { def __init__(self) { super(1); super.m(); } }");
        assert!(parse.errors().is_empty());
    }

    #[test]
    fn recovery_missing_semicolon_continues() {
        let parse = parse("x = 1\ny = 2;");
        assert!(!parse.errors().is_empty());
        // The second statement still parses.
        let file = parse.source_file();
        assert!(file.stmts().count() >= 1);
        // And the tree is still lossless.
        assert_eq!(parse.text(), "x = 1\ny = 2;");
    }

    #[test]
    fn recovery_unclosed_class_body_reports_related_span() {
        let parse = parse("class C { def m() { return 1; }");
        let err = parse
            .errors()
            .iter()
            .find(|e| e.message.contains("close class body"))
            .expect("an unclosed-body error");
        let (related_msg, _) = err.related.as_ref().expect("related span");
        assert!(related_msg.contains("started here"));
    }

    #[test]
    fn unclosed_class_error_message_snapshot() {
        let parse = parse("class C {");
        assert_eq!(parse.errors().len(), 1);
        insta::assert_snapshot!(parse.errors()[0].message, @"expected `}` to close class body");
    }

    #[test]
    fn recovery_stray_rbrace_at_top_level() {
        let parse = parse("} x = 1;");
        assert!(!parse.errors().is_empty());
        assert_eq!(parse.text(), "} x = 1;");
        let file = parse.source_file();
        assert_eq!(file.stmts().count(), 1);
    }

    #[test]
    fn deep_nesting_hits_the_recursion_cap() {
        let depth = 600;
        let mut src = String::new();
        for _ in 0..depth {
            src.push('(');
        }
        src.push('1');
        for _ in 0..depth {
            src.push(')');
        }
        src.push(';');
        let parse = parse(&src);
        assert!(parse
            .errors()
            .iter()
            .any(|e| e.message.contains("nesting too deep")));
    }

    #[test]
    fn import_statements() {
        let parse = parse_ok("import time;\nfrom time import time;");
        let file = parse.source_file();
        let stmts: Vec<Stmt> = file.stmts().collect();
        assert_eq!(stmts.len(), 2);
        let Stmt::Import(first) = &stmts[0] else {
            panic!("expected import");
        };
        assert_eq!(first.module().unwrap().text(), "time");
        assert!(!first.is_from());
        let Stmt::Import(second) = &stmts[1] else {
            panic!("expected import");
        };
        assert!(second.is_from());
        assert_eq!(second.imported().count(), 1);
    }
}
