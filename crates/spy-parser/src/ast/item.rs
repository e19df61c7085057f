//! Typed AST nodes for declarations.
//!
//! Covers: SourceFile, InterfaceDef, MethodSig, ClassDef, MethodDef,
//! FieldDef, FnDef, ParamList, Param, TypeAnnotation, ExtendsClause,
//! ImplementsClause, Name, NameRef.

use crate::ast::{ast_node, child_node, child_nodes, child_token, has_child_token};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

use super::stmt::{Block, Stmt};

// ── Source File ──────────────────────────────────────────────────────────

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    /// All top-level declarations in the source file.
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.syntax.children().filter_map(Item::cast)
    }

    /// All top-level statements, in source order.
    pub fn stmts(&self) -> impl Iterator<Item = Stmt> + '_ {
        self.syntax.children().filter_map(Stmt::cast)
    }

    /// Whether the file contains any declaration or statement at all.
    pub fn is_empty(&self) -> bool {
        self.items().next().is_none() && self.stmts().next().is_none()
    }
}

// ── Item enum ────────────────────────────────────────────────────────────

/// Any top-level declaration.
#[derive(Debug, Clone)]
pub enum Item {
    Interface(InterfaceDef),
    Class(ClassDef),
    Fn(FnDef),
}

impl Item {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::INTERFACE_DEF => Some(Item::Interface(InterfaceDef { syntax: node })),
            SyntaxKind::CLASS_DEF => Some(Item::Class(ClassDef { syntax: node })),
            SyntaxKind::FN_DEF => Some(Item::Fn(FnDef { syntax: node })),
            _ => None,
        }
    }
}

// ── Interface Declaration ────────────────────────────────────────────────

ast_node!(InterfaceDef, INTERFACE_DEF);

impl InterfaceDef {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    /// The `extends A, B` clause, if present.
    pub fn extends_clause(&self) -> Option<ExtendsClause> {
        child_node(&self.syntax)
    }

    /// Method requirements (`def f(...) -> T;`).
    pub fn method_sigs(&self) -> impl Iterator<Item = MethodSig> + '_ {
        child_nodes(&self.syntax)
    }

    /// Methods declared *with a body* -- illegal in an interface, kept in
    /// the tree so the checker can report them.
    pub fn method_defs(&self) -> impl Iterator<Item = MethodDef> + '_ {
        child_nodes(&self.syntax)
    }

    /// Field declarations -- also illegal in an interface.
    pub fn field_defs(&self) -> impl Iterator<Item = FieldDef> + '_ {
        child_nodes(&self.syntax)
    }
}

// ── Class Declaration ────────────────────────────────────────────────────

ast_node!(ClassDef, CLASS_DEF);

impl ClassDef {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn is_abstract(&self) -> bool {
        has_child_token(&self.syntax, SyntaxKind::ABSTRACT_KW)
    }

    pub fn is_final(&self) -> bool {
        has_child_token(&self.syntax, SyntaxKind::FINAL_KW)
    }

    pub fn abstract_token(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::ABSTRACT_KW)
    }

    pub fn final_token(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::FINAL_KW)
    }

    /// The single `extends Base` clause, if present.
    pub fn extends_clause(&self) -> Option<ExtendsClause> {
        child_node(&self.syntax)
    }

    /// The `implements I, J` clause, if present.
    pub fn implements_clause(&self) -> Option<ImplementsClause> {
        child_node(&self.syntax)
    }

    /// All members, methods and fields interleaved in source order.
    pub fn members(&self) -> impl Iterator<Item = ClassMember> + '_ {
        self.syntax.children().filter_map(ClassMember::cast)
    }

    pub fn methods(&self) -> impl Iterator<Item = MethodDef> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldDef> + '_ {
        child_nodes(&self.syntax)
    }
}

/// A member of a class body.
#[derive(Debug, Clone)]
pub enum ClassMember {
    Method(MethodDef),
    Field(FieldDef),
}

impl ClassMember {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::METHOD_DEF => Some(ClassMember::Method(MethodDef { syntax: node })),
            SyntaxKind::FIELD_DEF => Some(ClassMember::Field(FieldDef { syntax: node })),
            _ => None,
        }
    }
}

// ── Method Signature (interface requirement) ─────────────────────────────

ast_node!(MethodSig, METHOD_SIG);

impl MethodSig {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn param_list(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }

    /// The return type annotation (`-> Type`), if present.
    pub fn return_type(&self) -> Option<TypeAnnotation> {
        child_node(&self.syntax)
    }

    pub fn is_static(&self) -> bool {
        has_child_token(&self.syntax, SyntaxKind::STATIC_KW)
    }
}

// ── Method Definition ────────────────────────────────────────────────────

ast_node!(MethodDef, METHOD_DEF);

impl MethodDef {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn is_abstract(&self) -> bool {
        has_child_token(&self.syntax, SyntaxKind::ABSTRACT_KW)
    }

    pub fn is_final(&self) -> bool {
        has_child_token(&self.syntax, SyntaxKind::FINAL_KW)
    }

    pub fn is_static(&self) -> bool {
        has_child_token(&self.syntax, SyntaxKind::STATIC_KW)
    }

    pub fn param_list(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }

    /// The return type annotation. Parameter annotations live inside the
    /// PARAM nodes, so the only direct TYPE_ANNOTATION child is the return.
    pub fn return_type(&self) -> Option<TypeAnnotation> {
        child_node(&self.syntax)
    }

    /// The body block. `None` for signature-only (abstract-style)
    /// declarations ending in `;`.
    pub fn body(&self) -> Option<Block> {
        child_node(&self.syntax)
    }
}

// ── Field Definition ─────────────────────────────────────────────────────

ast_node!(FieldDef, FIELD_DEF);

impl FieldDef {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn is_static(&self) -> bool {
        has_child_token(&self.syntax, SyntaxKind::STATIC_KW)
    }

    pub fn type_annotation(&self) -> Option<TypeAnnotation> {
        child_node(&self.syntax)
    }

    pub fn initializer(&self) -> Option<super::expr::Expr> {
        self.syntax.children().find_map(super::expr::Expr::cast)
    }
}

// ── Free Function ────────────────────────────────────────────────────────

ast_node!(FnDef, FN_DEF);

impl FnDef {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn param_list(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }

    pub fn return_type(&self) -> Option<TypeAnnotation> {
        child_node(&self.syntax)
    }

    pub fn body(&self) -> Option<Block> {
        child_node(&self.syntax)
    }
}

// ── Parameters ───────────────────────────────────────────────────────────

ast_node!(ParamList, PARAM_LIST);

impl ParamList {
    pub fn params(&self) -> impl Iterator<Item = Param> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(Param, PARAM);

impl Param {
    /// The parameter name token: an IDENT, or the `self` keyword.
    pub fn name_token(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::IDENT)
            .or_else(|| child_token(&self.syntax, SyntaxKind::SELF_KW))
    }

    pub fn name_text(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }

    pub fn is_self(&self) -> bool {
        has_child_token(&self.syntax, SyntaxKind::SELF_KW)
    }

    pub fn type_annotation(&self) -> Option<TypeAnnotation> {
        child_node(&self.syntax)
    }
}

// ── Type Annotation ──────────────────────────────────────────────────────

ast_node!(TypeAnnotation, TYPE_ANNOTATION);

impl TypeAnnotation {
    /// The annotated type name token.
    pub fn type_token(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::IDENT)
    }

    pub fn type_name(&self) -> Option<String> {
        self.type_token().map(|t| t.text().to_string())
    }
}

// ── Extends / Implements ─────────────────────────────────────────────────

ast_node!(ExtendsClause, EXTENDS_CLAUSE);

impl ExtendsClause {
    pub fn names(&self) -> impl Iterator<Item = NameRef> + '_ {
        child_nodes(&self.syntax)
    }

    /// The single base for a class `extends`.
    pub fn base(&self) -> Option<NameRef> {
        child_node(&self.syntax)
    }
}

ast_node!(ImplementsClause, IMPLEMENTS_CLAUSE);

impl ImplementsClause {
    pub fn names(&self) -> impl Iterator<Item = NameRef> + '_ {
        child_nodes(&self.syntax)
    }
}

// ── Names ────────────────────────────────────────────────────────────────

ast_node!(Name, NAME);

impl Name {
    pub fn text(&self) -> String {
        child_token(&self.syntax, SyntaxKind::IDENT)
            .map(|t| t.text().to_string())
            .unwrap_or_default()
    }
}

ast_node!(NameRef, NAME_REF);

impl NameRef {
    pub fn text(&self) -> String {
        child_token(&self.syntax, SyntaxKind::IDENT)
            .map(|t| t.text().to_string())
            .unwrap_or_default()
    }
}
