//! Syntax kinds for the Spy concrete syntax tree.
//!
//! One flat enum covers both token kinds and node kinds, as rowan expects.
//! Token kinds mirror [`spy_common::token::TokenKind`]; node kinds describe
//! the grammar productions the parser builds.

use std::fmt;

use spy_common::token::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
#[repr(u16)]
pub enum SyntaxKind {
    /// Placeholder kind for not-yet-closed parser markers. Never in a tree.
    TOMBSTONE,
    /// End-of-file sentinel used by the parser cursor. Never in a tree.
    EOF,

    // ── Trivia and error tokens ─────────────────────────────────────────
    WHITESPACE,
    COMMENT,
    ERROR_TOKEN,

    // ── Literals and identifiers ────────────────────────────────────────
    IDENT,
    INT_LITERAL,
    FLOAT_LITERAL,
    STRING_LITERAL,
    FSTRING_START,
    STRING_TEXT,
    INTERP_START,
    FORMAT_SPEC,
    INTERP_END,
    FSTRING_END,

    // ── Keywords ────────────────────────────────────────────────────────
    INTERFACE_KW,
    CLASS_KW,
    ABSTRACT_KW,
    FINAL_KW,
    STATIC_KW,
    EXTENDS_KW,
    IMPLEMENTS_KW,
    DEF_KW,
    RETURN_KW,
    IF_KW,
    ELIF_KW,
    ELSE_KW,
    FOR_KW,
    IN_KW,
    WHILE_KW,
    NOT_KW,
    AND_KW,
    OR_KW,
    IS_KW,
    NONE_KW,
    TRUE_KW,
    FALSE_KW,
    SELF_KW,
    SUPER_KW,
    PASS_KW,
    RAISE_KW,
    IMPORT_KW,
    FROM_KW,

    // ── Punctuation ─────────────────────────────────────────────────────
    L_BRACE,
    R_BRACE,
    L_PAREN,
    R_PAREN,
    L_BRACKET,
    R_BRACKET,
    COMMA,
    COLON,
    SEMICOLON,
    DOT,
    ARROW,
    EQ,
    PLUS_EQ,
    MINUS_EQ,
    STAR_EQ,
    SLASH_EQ,
    EQ_EQ,
    NOT_EQ,
    LT,
    LT_EQ,
    GT,
    GT_EQ,
    PLUS,
    MINUS,
    STAR,
    SLASH,
    STAR_STAR,
    PERCENT,

    // ── Nodes: names, types, parameters ─────────────────────────────────
    ERROR,
    NAME,
    NAME_REF,
    TYPE_ANNOTATION,
    PARAM,
    PARAM_LIST,
    ARG_LIST,
    EXTENDS_CLAUSE,
    IMPLEMENTS_CLAUSE,

    // ── Nodes: declarations ─────────────────────────────────────────────
    INTERFACE_DEF,
    METHOD_SIG,
    CLASS_DEF,
    METHOD_DEF,
    FIELD_DEF,
    FN_DEF,

    // ── Nodes: statements ───────────────────────────────────────────────
    BLOCK,
    EXPR_STMT,
    ASSIGN_STMT,
    RETURN_STMT,
    IF_STMT,
    ELIF_BRANCH,
    ELSE_BRANCH,
    FOR_STMT,
    WHILE_STMT,
    PASS_STMT,
    RAISE_STMT,
    IMPORT_STMT,

    // ── Nodes: expressions ──────────────────────────────────────────────
    LITERAL,
    F_STRING,
    INTERPOLATION,
    LIST_EXPR,
    DICT_EXPR,
    DICT_ENTRY,
    TUPLE_EXPR,
    PAREN_EXPR,
    BINARY_EXPR,
    UNARY_EXPR,
    CALL_EXPR,
    FIELD_ACCESS,
    INDEX_EXPR,
    SLICE,
    SELF_EXPR,
    SUPER_EXPR,

    /// The root node. Keep last: it bounds the raw-kind conversion.
    SOURCE_FILE,
}

impl SyntaxKind {
    pub fn from_raw(raw: u16) -> SyntaxKind {
        assert!(raw <= SyntaxKind::SOURCE_FILE as u16, "invalid syntax kind {raw}");
        // Field-less #[repr(u16)] enum with contiguous discriminants.
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw) }
    }

    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::WHITESPACE | SyntaxKind::COMMENT | SyntaxKind::ERROR_TOKEN
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::InterfaceKw => SyntaxKind::INTERFACE_KW,
            TokenKind::ClassKw => SyntaxKind::CLASS_KW,
            TokenKind::AbstractKw => SyntaxKind::ABSTRACT_KW,
            TokenKind::FinalKw => SyntaxKind::FINAL_KW,
            TokenKind::StaticKw => SyntaxKind::STATIC_KW,
            TokenKind::ExtendsKw => SyntaxKind::EXTENDS_KW,
            TokenKind::ImplementsKw => SyntaxKind::IMPLEMENTS_KW,
            TokenKind::DefKw => SyntaxKind::DEF_KW,
            TokenKind::ReturnKw => SyntaxKind::RETURN_KW,
            TokenKind::IfKw => SyntaxKind::IF_KW,
            TokenKind::ElifKw => SyntaxKind::ELIF_KW,
            TokenKind::ElseKw => SyntaxKind::ELSE_KW,
            TokenKind::ForKw => SyntaxKind::FOR_KW,
            TokenKind::InKw => SyntaxKind::IN_KW,
            TokenKind::WhileKw => SyntaxKind::WHILE_KW,
            TokenKind::NotKw => SyntaxKind::NOT_KW,
            TokenKind::AndKw => SyntaxKind::AND_KW,
            TokenKind::OrKw => SyntaxKind::OR_KW,
            TokenKind::IsKw => SyntaxKind::IS_KW,
            TokenKind::NoneKw => SyntaxKind::NONE_KW,
            TokenKind::TrueKw => SyntaxKind::TRUE_KW,
            TokenKind::FalseKw => SyntaxKind::FALSE_KW,
            TokenKind::SelfKw => SyntaxKind::SELF_KW,
            TokenKind::SuperKw => SyntaxKind::SUPER_KW,
            TokenKind::PassKw => SyntaxKind::PASS_KW,
            TokenKind::RaiseKw => SyntaxKind::RAISE_KW,
            TokenKind::ImportKw => SyntaxKind::IMPORT_KW,
            TokenKind::FromKw => SyntaxKind::FROM_KW,
            TokenKind::LBrace => SyntaxKind::L_BRACE,
            TokenKind::RBrace => SyntaxKind::R_BRACE,
            TokenKind::LParen => SyntaxKind::L_PAREN,
            TokenKind::RParen => SyntaxKind::R_PAREN,
            TokenKind::LBracket => SyntaxKind::L_BRACKET,
            TokenKind::RBracket => SyntaxKind::R_BRACKET,
            TokenKind::Comma => SyntaxKind::COMMA,
            TokenKind::Colon => SyntaxKind::COLON,
            TokenKind::Semicolon => SyntaxKind::SEMICOLON,
            TokenKind::Dot => SyntaxKind::DOT,
            TokenKind::Arrow => SyntaxKind::ARROW,
            TokenKind::Eq => SyntaxKind::EQ,
            TokenKind::PlusEq => SyntaxKind::PLUS_EQ,
            TokenKind::MinusEq => SyntaxKind::MINUS_EQ,
            TokenKind::StarEq => SyntaxKind::STAR_EQ,
            TokenKind::SlashEq => SyntaxKind::SLASH_EQ,
            TokenKind::EqEq => SyntaxKind::EQ_EQ,
            TokenKind::NotEq => SyntaxKind::NOT_EQ,
            TokenKind::Lt => SyntaxKind::LT,
            TokenKind::LtEq => SyntaxKind::LT_EQ,
            TokenKind::Gt => SyntaxKind::GT,
            TokenKind::GtEq => SyntaxKind::GT_EQ,
            TokenKind::Plus => SyntaxKind::PLUS,
            TokenKind::Minus => SyntaxKind::MINUS,
            TokenKind::Star => SyntaxKind::STAR,
            TokenKind::Slash => SyntaxKind::SLASH,
            TokenKind::StarStar => SyntaxKind::STAR_STAR,
            TokenKind::Percent => SyntaxKind::PERCENT,
            TokenKind::Int => SyntaxKind::INT_LITERAL,
            TokenKind::Float => SyntaxKind::FLOAT_LITERAL,
            TokenKind::Str => SyntaxKind::STRING_LITERAL,
            TokenKind::Ident => SyntaxKind::IDENT,
            TokenKind::FStringStart => SyntaxKind::FSTRING_START,
            TokenKind::StringText => SyntaxKind::STRING_TEXT,
            TokenKind::InterpStart => SyntaxKind::INTERP_START,
            TokenKind::FormatSpec => SyntaxKind::FORMAT_SPEC,
            TokenKind::InterpEnd => SyntaxKind::INTERP_END,
            TokenKind::FStringEnd => SyntaxKind::FSTRING_END,
            TokenKind::Whitespace => SyntaxKind::WHITESPACE,
            TokenKind::Comment => SyntaxKind::COMMENT,
            TokenKind::Error => SyntaxKind::ERROR_TOKEN,
            TokenKind::Eof => SyntaxKind::EOF,
        }
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyntaxKind::IDENT => "identifier",
            SyntaxKind::INT_LITERAL => "integer literal",
            SyntaxKind::FLOAT_LITERAL => "float literal",
            SyntaxKind::STRING_LITERAL => "string literal",
            SyntaxKind::FSTRING_START => "f-string",
            SyntaxKind::STRING_TEXT => "string text",
            SyntaxKind::INTERP_START => "`{`",
            SyntaxKind::FORMAT_SPEC => "format spec",
            SyntaxKind::INTERP_END => "`}`",
            SyntaxKind::FSTRING_END => "end of f-string",
            SyntaxKind::INTERFACE_KW => "`interface`",
            SyntaxKind::CLASS_KW => "`class`",
            SyntaxKind::ABSTRACT_KW => "`abstract`",
            SyntaxKind::FINAL_KW => "`final`",
            SyntaxKind::STATIC_KW => "`static`",
            SyntaxKind::EXTENDS_KW => "`extends`",
            SyntaxKind::IMPLEMENTS_KW => "`implements`",
            SyntaxKind::DEF_KW => "`def`",
            SyntaxKind::RETURN_KW => "`return`",
            SyntaxKind::IF_KW => "`if`",
            SyntaxKind::ELIF_KW => "`elif`",
            SyntaxKind::ELSE_KW => "`else`",
            SyntaxKind::FOR_KW => "`for`",
            SyntaxKind::IN_KW => "`in`",
            SyntaxKind::WHILE_KW => "`while`",
            SyntaxKind::NOT_KW => "`not`",
            SyntaxKind::AND_KW => "`and`",
            SyntaxKind::OR_KW => "`or`",
            SyntaxKind::IS_KW => "`is`",
            SyntaxKind::NONE_KW => "`None`",
            SyntaxKind::TRUE_KW => "`True`",
            SyntaxKind::FALSE_KW => "`False`",
            SyntaxKind::SELF_KW => "`self`",
            SyntaxKind::SUPER_KW => "`super`",
            SyntaxKind::PASS_KW => "`pass`",
            SyntaxKind::RAISE_KW => "`raise`",
            SyntaxKind::IMPORT_KW => "`import`",
            SyntaxKind::FROM_KW => "`from`",
            SyntaxKind::L_BRACE => "`{`",
            SyntaxKind::R_BRACE => "`}`",
            SyntaxKind::L_PAREN => "`(`",
            SyntaxKind::R_PAREN => "`)`",
            SyntaxKind::L_BRACKET => "`[`",
            SyntaxKind::R_BRACKET => "`]`",
            SyntaxKind::COMMA => "`,`",
            SyntaxKind::COLON => "`:`",
            SyntaxKind::SEMICOLON => "`;`",
            SyntaxKind::DOT => "`.`",
            SyntaxKind::ARROW => "`->`",
            SyntaxKind::EQ => "`=`",
            SyntaxKind::PLUS_EQ => "`+=`",
            SyntaxKind::MINUS_EQ => "`-=`",
            SyntaxKind::STAR_EQ => "`*=`",
            SyntaxKind::SLASH_EQ => "`/=`",
            SyntaxKind::EQ_EQ => "`==`",
            SyntaxKind::NOT_EQ => "`!=`",
            SyntaxKind::LT => "`<`",
            SyntaxKind::LT_EQ => "`<=`",
            SyntaxKind::GT => "`>`",
            SyntaxKind::GT_EQ => "`>=`",
            SyntaxKind::PLUS => "`+`",
            SyntaxKind::MINUS => "`-`",
            SyntaxKind::STAR => "`*`",
            SyntaxKind::SLASH => "`/`",
            SyntaxKind::STAR_STAR => "`**`",
            SyntaxKind::PERCENT => "`%`",
            SyntaxKind::EOF => "end of file",
            other => return write!(f, "{other:?}"),
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_round_trip() {
        for kind in [
            SyntaxKind::TOMBSTONE,
            SyntaxKind::IDENT,
            SyntaxKind::CLASS_KW,
            SyntaxKind::BINARY_EXPR,
            SyntaxKind::SOURCE_FILE,
        ] {
            assert_eq!(SyntaxKind::from_raw(kind as u16), kind);
        }
    }

    #[test]
    fn token_kind_conversion() {
        assert_eq!(SyntaxKind::from(TokenKind::ClassKw), SyntaxKind::CLASS_KW);
        assert_eq!(SyntaxKind::from(TokenKind::FStringStart), SyntaxKind::FSTRING_START);
        assert_eq!(SyntaxKind::from(TokenKind::Error), SyntaxKind::ERROR_TOKEN);
    }
}
