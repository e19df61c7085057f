//! Typed AST wrappers over the rowan CST.
//!
//! Each wrapper is a thin newtype around a `SyntaxNode` whose kind is
//! checked by `cast`. Accessors navigate children by kind, so the AST layer
//! tolerates partially-parsed trees: anything missing comes back as `None`.

pub mod expr;
pub mod item;
pub mod stmt;

use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;
use spy_common::span::Span;

pub trait AstNode: Sized {
    fn cast(syntax: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;

    fn span(&self) -> Span {
        span_of(self.syntax())
    }
}

pub(crate) fn span_of(node: &SyntaxNode) -> Span {
    let range = node.text_range();
    Span::new(range.start().into(), range.end().into())
}

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub(crate) syntax: $crate::cst::SyntaxNode,
        }

        impl $crate::ast::AstNode for $name {
            fn cast(syntax: $crate::cst::SyntaxNode) -> Option<Self> {
                if syntax.kind() == $crate::syntax_kind::SyntaxKind::$kind {
                    Some(Self { syntax })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &$crate::cst::SyntaxNode {
                &self.syntax
            }
        }
    };
}
pub(crate) use ast_node;

/// First child node castable to `N`.
pub(crate) fn child_node<N: AstNode>(parent: &SyntaxNode) -> Option<N> {
    parent.children().find_map(N::cast)
}

/// All child nodes castable to `N`, in source order.
pub(crate) fn child_nodes<N: AstNode>(parent: &SyntaxNode) -> impl Iterator<Item = N> {
    parent.children().filter_map(N::cast)
}

/// First direct child token of the given kind.
pub(crate) fn child_token(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

/// Whether a direct child token of the given kind exists.
pub(crate) fn has_child_token(parent: &SyntaxNode, kind: SyntaxKind) -> bool {
    child_token(parent, kind).is_some()
}
