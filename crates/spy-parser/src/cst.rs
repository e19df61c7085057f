//! Rowan language binding for the Spy concrete syntax tree.

use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpyLanguage {}

impl rowan::Language for SpyLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> SyntaxKind {
        SyntaxKind::from_raw(raw.0)
    }

    fn kind_to_raw(kind: SyntaxKind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

pub type SyntaxNode = rowan::SyntaxNode<SpyLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<SpyLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<SpyLanguage>;
