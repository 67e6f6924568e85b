//! Token definitions for the schema language

use logos::Logos;
use quill_ast::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//([^/\n][^\n]*)?")]
pub enum TokenKind {
    // === Keywords ===
    #[token("struct")]
    Struct,
    #[token("enum")]
    Enum,
    #[token("type")]
    Type,
    #[token("dispatch")]
    Dispatch,
    #[token("to")]
    To,

    // Primitive type names
    #[token("any")]
    Any,
    #[token("boolean")]
    Boolean,
    #[token("byte")]
    Byte,
    #[token("short")]
    Short,
    #[token("int")]
    Int,
    #[token("long")]
    Long,
    #[token("float")]
    Float,
    #[token("double")]
    Double,
    #[token("string")]
    StringKw,

    // === Delimiters ===
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    // === Punctuation ===
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token("@")]
    At,
    #[token("..")]
    DotDot,
    #[token("<")]
    Lt,
    #[token("|")]
    Pipe,
    #[token("=")]
    Eq,
    #[token("#")]
    Hash,

    // === Literals ===
    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][-+]?[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    /// `namespace:path`; a field separator must be followed by whitespace
    #[regex(r"[a-z0-9_\-]+:[a-z0-9_./\-]+")]
    ResourceLocation,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"///[^\n]*")]
    DocComment,

    // === Special ===
    Error,
    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Struct => "'struct'",
            TokenKind::Enum => "'enum'",
            TokenKind::Type => "'type'",
            TokenKind::Dispatch => "'dispatch'",
            TokenKind::To => "'to'",
            TokenKind::Any => "'any'",
            TokenKind::Boolean => "'boolean'",
            TokenKind::Byte => "'byte'",
            TokenKind::Short => "'short'",
            TokenKind::Int => "'int'",
            TokenKind::Long => "'long'",
            TokenKind::Float => "'float'",
            TokenKind::Double => "'double'",
            TokenKind::StringKw => "'string'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Question => "'?'",
            TokenKind::At => "'@'",
            TokenKind::DotDot => "'..'",
            TokenKind::Lt => "'<'",
            TokenKind::Pipe => "'|'",
            TokenKind::Eq => "'='",
            TokenKind::Hash => "'#'",
            TokenKind::Number => "number",
            TokenKind::String => "string literal",
            TokenKind::ResourceLocation => "resource location",
            TokenKind::Ident => "identifier",
            TokenKind::DocComment => "doc comment",
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of file",
        }
    }

    /// Keywords that may still be used as struct keys
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Struct
                | TokenKind::Enum
                | TokenKind::Type
                | TokenKind::Dispatch
                | TokenKind::To
                | TokenKind::Any
                | TokenKind::Boolean
                | TokenKind::Byte
                | TokenKind::Short
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::StringKw
        )
    }
}

/// A token with its source range
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }
}

/// Tokenize schema source, ending with an `Eof` token
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = result.unwrap_or(TokenKind::Error);
        tokens.push(Token {
            kind,
            span: Range::new(span.start, span.end),
        });
    }

    let end = source.len();
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Range::empty(end),
    });

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_field_tokens() {
        assert_eq!(
            kinds("Health?: float @ 0..20"),
            vec![
                TokenKind::Ident,
                TokenKind::Question,
                TokenKind::Colon,
                TokenKind::Float,
                TokenKind::At,
                TokenKind::Number,
                TokenKind::DotDot,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_open_range_tokens() {
        assert_eq!(
            kinds("int @ 1.."),
            vec![
                TokenKind::Int,
                TokenKind::At,
                TokenKind::Number,
                TokenKind::DotDot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_resource_location_vs_field() {
        assert_eq!(
            kinds("minecraft:entity[[id]]"),
            vec![
                TokenKind::ResourceLocation,
                TokenKind::LBracket,
                TokenKind::LBracket,
                TokenKind::Ident,
                TokenKind::RBracket,
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );
        assert_eq!(kinds("id: string")[..3], [TokenKind::Ident, TokenKind::Colon, TokenKind::StringKw]);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("// note\n/// doc\nstruct"),
            vec![TokenKind::DocComment, TokenKind::Struct, TokenKind::Eof]
        );
    }
}
