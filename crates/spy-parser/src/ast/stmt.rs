//! Typed AST nodes for statements and blocks.

use crate::ast::{ast_node, child_node, child_nodes, span_of};
use crate::cst::SyntaxNode;
use crate::syntax_kind::SyntaxKind;
use spy_common::span::Span;

use super::expr::Expr;
use super::item::{Name, NameRef};

/// Any statement.
#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(ExprStmt),
    Assign(AssignStmt),
    Return(ReturnStmt),
    If(IfStmt),
    For(ForStmt),
    While(WhileStmt),
    Pass(PassStmt),
    Raise(RaiseStmt),
    Import(ImportStmt),
}

impl Stmt {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::EXPR_STMT => Some(Stmt::Expr(ExprStmt { syntax: node })),
            SyntaxKind::ASSIGN_STMT => Some(Stmt::Assign(AssignStmt { syntax: node })),
            SyntaxKind::RETURN_STMT => Some(Stmt::Return(ReturnStmt { syntax: node })),
            SyntaxKind::IF_STMT => Some(Stmt::If(IfStmt { syntax: node })),
            SyntaxKind::FOR_STMT => Some(Stmt::For(ForStmt { syntax: node })),
            SyntaxKind::WHILE_STMT => Some(Stmt::While(WhileStmt { syntax: node })),
            SyntaxKind::PASS_STMT => Some(Stmt::Pass(PassStmt { syntax: node })),
            SyntaxKind::RAISE_STMT => Some(Stmt::Raise(RaiseStmt { syntax: node })),
            SyntaxKind::IMPORT_STMT => Some(Stmt::Import(ImportStmt { syntax: node })),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Stmt::Expr(s) => &s.syntax,
            Stmt::Assign(s) => &s.syntax,
            Stmt::Return(s) => &s.syntax,
            Stmt::If(s) => &s.syntax,
            Stmt::For(s) => &s.syntax,
            Stmt::While(s) => &s.syntax,
            Stmt::Pass(s) => &s.syntax,
            Stmt::Raise(s) => &s.syntax,
            Stmt::Import(s) => &s.syntax,
        }
    }

    pub fn span(&self) -> Span {
        span_of(self.syntax())
    }
}

// ── Block ────────────────────────────────────────────────────────────────

ast_node!(Block, BLOCK);

impl Block {
    pub fn stmts(&self) -> impl Iterator<Item = Stmt> + '_ {
        self.syntax.children().filter_map(Stmt::cast)
    }
}

// ── Simple Statements ────────────────────────────────────────────────────

ast_node!(ExprStmt, EXPR_STMT);

impl ExprStmt {
    pub fn expr(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

/// `target op value ;` where op is `=`, `+=`, `-=`, `*=` or `/=`.
ast_node!(AssignStmt, ASSIGN_STMT);

/// The operator of an assignment statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

impl AssignStmt {
    pub fn target(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    pub fn value(&self) -> Option<Expr> {
        self.syntax.children().filter_map(Expr::cast).nth(1)
    }

    pub fn op(&self) -> AssignOp {
        for e in self.syntax.children_with_tokens() {
            if let Some(t) = e.into_token() {
                match t.kind() {
                    SyntaxKind::EQ => return AssignOp::Assign,
                    SyntaxKind::PLUS_EQ => return AssignOp::Add,
                    SyntaxKind::MINUS_EQ => return AssignOp::Sub,
                    SyntaxKind::STAR_EQ => return AssignOp::Mul,
                    SyntaxKind::SLASH_EQ => return AssignOp::Div,
                    _ => {}
                }
            }
        }
        AssignOp::Assign
    }
}

ast_node!(ReturnStmt, RETURN_STMT);

impl ReturnStmt {
    pub fn value(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(PassStmt, PASS_STMT);

ast_node!(RaiseStmt, RAISE_STMT);

impl RaiseStmt {
    pub fn value(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

// ── Control Flow ─────────────────────────────────────────────────────────

ast_node!(IfStmt, IF_STMT);

impl IfStmt {
    pub fn condition(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    pub fn then_block(&self) -> Option<Block> {
        child_node(&self.syntax)
    }

    pub fn elif_branches(&self) -> impl Iterator<Item = ElifBranch> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn else_branch(&self) -> Option<ElseBranch> {
        child_node(&self.syntax)
    }
}

ast_node!(ElifBranch, ELIF_BRANCH);

impl ElifBranch {
    pub fn condition(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    pub fn block(&self) -> Option<Block> {
        child_node(&self.syntax)
    }
}

ast_node!(ElseBranch, ELSE_BRANCH);

impl ElseBranch {
    pub fn block(&self) -> Option<Block> {
        child_node(&self.syntax)
    }
}

/// `for name in iterable { ... }`
ast_node!(ForStmt, FOR_STMT);

impl ForStmt {
    pub fn binding(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn iterable(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    pub fn body(&self) -> Option<Block> {
        child_node(&self.syntax)
    }
}

ast_node!(WhileStmt, WHILE_STMT);

impl WhileStmt {
    pub fn condition(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    pub fn body(&self) -> Option<Block> {
        child_node(&self.syntax)
    }
}

// ── Imports ──────────────────────────────────────────────────────────────

/// `import Name ;` or `from Name import a, b ;`
ast_node!(ImportStmt, IMPORT_STMT);

impl ImportStmt {
    /// The module name (first NAME_REF).
    pub fn module(&self) -> Option<NameRef> {
        child_node(&self.syntax)
    }

    /// For `from M import a, b`: the imported names after the module.
    pub fn imported(&self) -> impl Iterator<Item = NameRef> + '_ {
        child_nodes::<NameRef>(&self.syntax).skip(1)
    }

    pub fn is_from(&self) -> bool {
        crate::ast::has_child_token(&self.syntax, SyntaxKind::FROM_KW)
    }
}
