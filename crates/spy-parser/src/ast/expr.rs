//! Typed AST nodes for expressions.

use crate::ast::{ast_node, child_node, child_nodes, child_token, span_of, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;
use spy_common::span::Span;

use super::item::NameRef;

/// Any expression.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    FString(FString),
    NameRef(NameRef),
    SelfExpr(SelfExpr),
    SuperExpr(SuperExpr),
    List(ListExpr),
    Dict(DictExpr),
    Tuple(TupleExpr),
    Paren(ParenExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Call(CallExpr),
    Field(FieldAccess),
    Index(IndexExpr),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::LITERAL => Some(Expr::Literal(Literal { syntax: node })),
            SyntaxKind::F_STRING => Some(Expr::FString(FString { syntax: node })),
            SyntaxKind::NAME_REF => Some(Expr::NameRef(NameRef { syntax: node })),
            SyntaxKind::SELF_EXPR => Some(Expr::SelfExpr(SelfExpr { syntax: node })),
            SyntaxKind::SUPER_EXPR => Some(Expr::SuperExpr(SuperExpr { syntax: node })),
            SyntaxKind::LIST_EXPR => Some(Expr::List(ListExpr { syntax: node })),
            SyntaxKind::DICT_EXPR => Some(Expr::Dict(DictExpr { syntax: node })),
            SyntaxKind::TUPLE_EXPR => Some(Expr::Tuple(TupleExpr { syntax: node })),
            SyntaxKind::PAREN_EXPR => Some(Expr::Paren(ParenExpr { syntax: node })),
            SyntaxKind::BINARY_EXPR => Some(Expr::Binary(BinaryExpr { syntax: node })),
            SyntaxKind::UNARY_EXPR => Some(Expr::Unary(UnaryExpr { syntax: node })),
            SyntaxKind::CALL_EXPR => Some(Expr::Call(CallExpr { syntax: node })),
            SyntaxKind::FIELD_ACCESS => Some(Expr::Field(FieldAccess { syntax: node })),
            SyntaxKind::INDEX_EXPR => Some(Expr::Index(IndexExpr { syntax: node })),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::Literal(e) => &e.syntax,
            Expr::FString(e) => &e.syntax,
            Expr::NameRef(e) => e.syntax(),
            Expr::SelfExpr(e) => &e.syntax,
            Expr::SuperExpr(e) => &e.syntax,
            Expr::List(e) => &e.syntax,
            Expr::Dict(e) => &e.syntax,
            Expr::Tuple(e) => &e.syntax,
            Expr::Paren(e) => &e.syntax,
            Expr::Binary(e) => &e.syntax,
            Expr::Unary(e) => &e.syntax,
            Expr::Call(e) => &e.syntax,
            Expr::Field(e) => &e.syntax,
            Expr::Index(e) => &e.syntax,
        }
    }

    pub fn span(&self) -> Span {
        span_of(self.syntax())
    }
}

// ── Literals ─────────────────────────────────────────────────────────────

ast_node!(Literal, LITERAL);

/// What a LITERAL node holds, by its single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Int,
    Float,
    Str,
    True,
    False,
    NoneLit,
}

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| !t.kind().is_trivia())
    }

    pub fn kind(&self) -> Option<LiteralKind> {
        Some(match self.token()?.kind() {
            SyntaxKind::INT_LITERAL => LiteralKind::Int,
            SyntaxKind::FLOAT_LITERAL => LiteralKind::Float,
            SyntaxKind::STRING_LITERAL => LiteralKind::Str,
            SyntaxKind::TRUE_KW => LiteralKind::True,
            SyntaxKind::FALSE_KW => LiteralKind::False,
            SyntaxKind::NONE_KW => LiteralKind::NoneLit,
            _ => return None,
        })
    }

    /// The raw token text, quotes included for strings.
    pub fn text(&self) -> String {
        self.token().map(|t| t.text().to_string()).unwrap_or_default()
    }
}

// ── F-Strings ────────────────────────────────────────────────────────────

ast_node!(FString, F_STRING);

/// One piece of an f-string: literal text or an interpolation.
#[derive(Debug, Clone)]
pub enum FStringPart {
    Text(SyntaxToken),
    Interp(Interpolation),
}

impl FString {
    pub fn parts(&self) -> impl Iterator<Item = FStringPart> + '_ {
        self.syntax.children_with_tokens().filter_map(|e| match e {
            rowan::NodeOrToken::Token(t) if t.kind() == SyntaxKind::STRING_TEXT => {
                Some(FStringPart::Text(t))
            }
            rowan::NodeOrToken::Node(n) => Interpolation::cast(n).map(FStringPart::Interp),
            _ => None,
        })
    }
}

ast_node!(Interpolation, INTERPOLATION);

impl Interpolation {
    pub fn expr(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    /// The format spec text without the leading `:` (e.g. `.2f`).
    pub fn format_spec(&self) -> Option<String> {
        child_token(&self.syntax, SyntaxKind::FORMAT_SPEC)
            .map(|t| t.text().trim_start_matches(':').to_string())
    }
}

// ── Container Literals ───────────────────────────────────────────────────

ast_node!(ListExpr, LIST_EXPR);

impl ListExpr {
    pub fn elements(&self) -> impl Iterator<Item = Expr> + '_ {
        self.syntax.children().filter_map(Expr::cast)
    }
}

ast_node!(DictExpr, DICT_EXPR);

impl DictExpr {
    pub fn entries(&self) -> impl Iterator<Item = DictEntry> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(DictEntry, DICT_ENTRY);

impl DictEntry {
    pub fn key(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    pub fn value(&self) -> Option<Expr> {
        self.syntax.children().filter_map(Expr::cast).nth(1)
    }
}

ast_node!(TupleExpr, TUPLE_EXPR);

impl TupleExpr {
    pub fn elements(&self) -> impl Iterator<Item = Expr> + '_ {
        self.syntax.children().filter_map(Expr::cast)
    }
}

ast_node!(ParenExpr, PAREN_EXPR);

impl ParenExpr {
    pub fn inner(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

// ── Operators ────────────────────────────────────────────────────────────

/// Binary operator, including the keyword comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Is,
    IsNot,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinaryOp {
    /// Source spelling, for error messages.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::In => "in",
            BinaryOp::NotIn => "not in",
            BinaryOp::Is => "is",
            BinaryOp::IsNot => "is not",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
        }
    }
}

ast_node!(BinaryExpr, BINARY_EXPR);

impl BinaryExpr {
    pub fn lhs(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    pub fn rhs(&self) -> Option<Expr> {
        self.syntax.children().filter_map(Expr::cast).nth(1)
    }

    /// The operator. The operand subtrees are nodes, so the node's direct
    /// tokens are exactly the operator tokens (two for `not in`/`is not`).
    pub fn op(&self) -> Option<BinaryOp> {
        let mut has_not = false;
        let mut base = None;
        for e in self.syntax.children_with_tokens() {
            let Some(t) = e.into_token() else { continue };
            match t.kind() {
                SyntaxKind::NOT_KW => has_not = true,
                SyntaxKind::OR_KW => base = Some(BinaryOp::Or),
                SyntaxKind::AND_KW => base = Some(BinaryOp::And),
                SyntaxKind::EQ_EQ => base = Some(BinaryOp::Eq),
                SyntaxKind::NOT_EQ => base = Some(BinaryOp::Ne),
                SyntaxKind::LT => base = Some(BinaryOp::Lt),
                SyntaxKind::LT_EQ => base = Some(BinaryOp::Le),
                SyntaxKind::GT => base = Some(BinaryOp::Gt),
                SyntaxKind::GT_EQ => base = Some(BinaryOp::Ge),
                SyntaxKind::IN_KW => base = Some(BinaryOp::In),
                SyntaxKind::IS_KW => base = Some(BinaryOp::Is),
                SyntaxKind::PLUS => base = Some(BinaryOp::Add),
                SyntaxKind::MINUS => base = Some(BinaryOp::Sub),
                SyntaxKind::STAR => base = Some(BinaryOp::Mul),
                SyntaxKind::SLASH => base = Some(BinaryOp::Div),
                SyntaxKind::PERCENT => base = Some(BinaryOp::Mod),
                SyntaxKind::STAR_STAR => base = Some(BinaryOp::Pow),
                _ => {}
            }
        }
        match (base, has_not) {
            (Some(BinaryOp::In), true) => Some(BinaryOp::NotIn),
            (Some(BinaryOp::Is), true) => Some(BinaryOp::IsNot),
            (other, _) => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

ast_node!(UnaryExpr, UNARY_EXPR);

impl UnaryExpr {
    pub fn op(&self) -> Option<UnaryOp> {
        for e in self.syntax.children_with_tokens() {
            let Some(t) = e.into_token() else { continue };
            match t.kind() {
                SyntaxKind::MINUS => return Some(UnaryOp::Neg),
                SyntaxKind::NOT_KW => return Some(UnaryOp::Not),
                _ => {}
            }
        }
        None
    }

    pub fn operand(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

// ── Calls, Attributes, Indexing ──────────────────────────────────────────

ast_node!(CallExpr, CALL_EXPR);

impl CallExpr {
    pub fn callee(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        child_node(&self.syntax)
    }

    pub fn args(&self) -> impl Iterator<Item = Expr> + '_ {
        self.arg_list()
            .into_iter()
            .flat_map(|a| a.syntax.children().filter_map(Expr::cast).collect::<Vec<_>>())
    }
}

ast_node!(ArgList, ARG_LIST);

impl ArgList {
    pub fn args(&self) -> impl Iterator<Item = Expr> + '_ {
        self.syntax.children().filter_map(Expr::cast)
    }
}

ast_node!(FieldAccess, FIELD_ACCESS);

impl FieldAccess {
    pub fn receiver(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::IDENT)
    }

    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }
}

ast_node!(IndexExpr, INDEX_EXPR);

impl IndexExpr {
    pub fn receiver(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    /// The plain index expression, if this is not a slice.
    pub fn index(&self) -> Option<Expr> {
        self.syntax.children().filter_map(Expr::cast).nth(1)
    }

    pub fn slice(&self) -> Option<Slice> {
        child_node(&self.syntax)
    }
}

/// `start? : end?` inside an index.
ast_node!(Slice, SLICE);

impl Slice {
    pub fn start(&self) -> Option<Expr> {
        let mut before_colon = true;
        for e in self.syntax.children_with_tokens() {
            match e {
                rowan::NodeOrToken::Token(t) if t.kind() == SyntaxKind::COLON => {
                    before_colon = false;
                }
                rowan::NodeOrToken::Node(n) if before_colon => {
                    if let Some(expr) = Expr::cast(n) {
                        return Some(expr);
                    }
                }
                _ => {}
            }
        }
        None
    }

    pub fn end(&self) -> Option<Expr> {
        let mut before_colon = true;
        for e in self.syntax.children_with_tokens() {
            match e {
                rowan::NodeOrToken::Token(t) if t.kind() == SyntaxKind::COLON => {
                    before_colon = false;
                }
                rowan::NodeOrToken::Node(n) if !before_colon => {
                    if let Some(expr) = Expr::cast(n) {
                        return Some(expr);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

// ── Self / Super ─────────────────────────────────────────────────────────

ast_node!(SelfExpr, SELF_EXPR);

ast_node!(SuperExpr, SUPER_EXPR);
