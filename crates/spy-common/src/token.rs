//! The token vocabulary shared by the lexer and parser.

use std::fmt;

use serde::Serialize;

use crate::span::Span;

/// A single lexed token.
///
/// Tokens own their text so the parser can hand lexemes straight to the
/// syntax tree builder; they live only for the duration of parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// The lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Keywords
    InterfaceKw,
    ClassKw,
    AbstractKw,
    FinalKw,
    StaticKw,
    ExtendsKw,
    ImplementsKw,
    DefKw,
    ReturnKw,
    IfKw,
    ElifKw,
    ElseKw,
    ForKw,
    InKw,
    WhileKw,
    NotKw,
    AndKw,
    OrKw,
    IsKw,
    NoneKw,
    TrueKw,
    FalseKw,
    SelfKw,
    SuperKw,
    PassKw,
    RaiseKw,
    ImportKw,
    FromKw,

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Arrow,
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    StarStar,
    Percent,

    // Literals and identifiers
    Int,
    Float,
    Str,
    Ident,

    // F-string pieces. An f-string lexes as a run:
    // FStringStart (StringText | InterpStart .. tokens .. FormatSpec? InterpEnd)* FStringEnd
    FStringStart,
    StringText,
    InterpStart,
    FormatSpec,
    InterpEnd,
    FStringEnd,

    // Trivia
    Whitespace,
    Comment,

    /// A byte the lexer could not classify; carried so the parser can skip it.
    Error,

    Eof,
}

impl TokenKind {
    /// Look up a keyword by its source spelling.
    pub fn from_keyword(ident: &str) -> Option<TokenKind> {
        Some(match ident {
            "interface" => TokenKind::InterfaceKw,
            "class" => TokenKind::ClassKw,
            "abstract" => TokenKind::AbstractKw,
            "final" => TokenKind::FinalKw,
            "static" => TokenKind::StaticKw,
            "extends" => TokenKind::ExtendsKw,
            "implements" => TokenKind::ImplementsKw,
            "def" => TokenKind::DefKw,
            "return" => TokenKind::ReturnKw,
            "if" => TokenKind::IfKw,
            "elif" => TokenKind::ElifKw,
            "else" => TokenKind::ElseKw,
            "for" => TokenKind::ForKw,
            "in" => TokenKind::InKw,
            "while" => TokenKind::WhileKw,
            "not" => TokenKind::NotKw,
            "and" => TokenKind::AndKw,
            "or" => TokenKind::OrKw,
            "is" => TokenKind::IsKw,
            "None" => TokenKind::NoneKw,
            "True" => TokenKind::TrueKw,
            "False" => TokenKind::FalseKw,
            "self" => TokenKind::SelfKw,
            "super" => TokenKind::SuperKw,
            "pass" => TokenKind::PassKw,
            "raise" => TokenKind::RaiseKw,
            "import" => TokenKind::ImportKw,
            "from" => TokenKind::FromKw,
            _ => return None,
        })
    }

    /// Whitespace and comments carry no syntax.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::InterfaceKw
                | TokenKind::ClassKw
                | TokenKind::AbstractKw
                | TokenKind::FinalKw
                | TokenKind::StaticKw
                | TokenKind::ExtendsKw
                | TokenKind::ImplementsKw
                | TokenKind::DefKw
                | TokenKind::ReturnKw
                | TokenKind::IfKw
                | TokenKind::ElifKw
                | TokenKind::ElseKw
                | TokenKind::ForKw
                | TokenKind::InKw
                | TokenKind::WhileKw
                | TokenKind::NotKw
                | TokenKind::AndKw
                | TokenKind::OrKw
                | TokenKind::IsKw
                | TokenKind::NoneKw
                | TokenKind::TrueKw
                | TokenKind::FalseKw
                | TokenKind::SelfKw
                | TokenKind::SuperKw
                | TokenKind::PassKw
                | TokenKind::RaiseKw
                | TokenKind::ImportKw
                | TokenKind::FromKw
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::InterfaceKw => "`interface`",
            TokenKind::ClassKw => "`class`",
            TokenKind::AbstractKw => "`abstract`",
            TokenKind::FinalKw => "`final`",
            TokenKind::StaticKw => "`static`",
            TokenKind::ExtendsKw => "`extends`",
            TokenKind::ImplementsKw => "`implements`",
            TokenKind::DefKw => "`def`",
            TokenKind::ReturnKw => "`return`",
            TokenKind::IfKw => "`if`",
            TokenKind::ElifKw => "`elif`",
            TokenKind::ElseKw => "`else`",
            TokenKind::ForKw => "`for`",
            TokenKind::InKw => "`in`",
            TokenKind::WhileKw => "`while`",
            TokenKind::NotKw => "`not`",
            TokenKind::AndKw => "`and`",
            TokenKind::OrKw => "`or`",
            TokenKind::IsKw => "`is`",
            TokenKind::NoneKw => "`None`",
            TokenKind::TrueKw => "`True`",
            TokenKind::FalseKw => "`False`",
            TokenKind::SelfKw => "`self`",
            TokenKind::SuperKw => "`super`",
            TokenKind::PassKw => "`pass`",
            TokenKind::RaiseKw => "`raise`",
            TokenKind::ImportKw => "`import`",
            TokenKind::FromKw => "`from`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Comma => "`,`",
            TokenKind::Colon => "`:`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Dot => "`.`",
            TokenKind::Arrow => "`->`",
            TokenKind::Eq => "`=`",
            TokenKind::PlusEq => "`+=`",
            TokenKind::MinusEq => "`-=`",
            TokenKind::StarEq => "`*=`",
            TokenKind::SlashEq => "`/=`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::LtEq => "`<=`",
            TokenKind::Gt => "`>`",
            TokenKind::GtEq => "`>=`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::StarStar => "`**`",
            TokenKind::Percent => "`%`",
            TokenKind::Int => "integer literal",
            TokenKind::Float => "float literal",
            TokenKind::Str => "string literal",
            TokenKind::Ident => "identifier",
            TokenKind::FStringStart => "f-string",
            TokenKind::StringText => "string text",
            TokenKind::InterpStart => "`{`",
            TokenKind::FormatSpec => "format spec",
            TokenKind::InterpEnd => "`}`",
            TokenKind::FStringEnd => "end of f-string",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Comment => "comment",
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of file",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup() {
        assert_eq!(TokenKind::from_keyword("class"), Some(TokenKind::ClassKw));
        assert_eq!(TokenKind::from_keyword("elif"), Some(TokenKind::ElifKw));
        assert_eq!(TokenKind::from_keyword("None"), Some(TokenKind::NoneKw));
        // Capitalization matters.
        assert_eq!(TokenKind::from_keyword("none"), None);
        assert_eq!(TokenKind::from_keyword("shape"), None);
    }

    #[test]
    fn trivia_classification() {
        assert!(TokenKind::Whitespace.is_trivia());
        assert!(TokenKind::Comment.is_trivia());
        assert!(!TokenKind::Ident.is_trivia());
    }
}
