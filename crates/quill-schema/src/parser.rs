//! Recursive descent parser for the schema language
//!
//! ```text
//! /// A zombie
//! struct Zombie {
//!     IsBaby?: boolean,
//!     #[deprecated] CanBreakDoors?: boolean,
//!     Health?: float @ 0..20,
//!     HandItems?: [Item] @ 2,
//! }
//! enum(string) Color { "red", "blue" }
//! type Count = int @ 0..
//! dispatch minecraft:entity[zombie, husk] to Zombie
//! ```

use quill_ast::{resource, NumericKind, Range};

use crate::lexer::{Token, TokenKind};
use crate::{McdocType, NumericRange, ParallelIndex, SchemaError, SchemaTable, StructField};

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    // === Utilities ===

    fn current(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek(&self) -> TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn peek_ahead(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len().saturating_sub(1) {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind) -> Result<Token, SchemaError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    fn unexpected(&self, expected: &str) -> SchemaError {
        let token = self.current();
        if token.kind == TokenKind::Eof {
            SchemaError::UnexpectedEof { span: token.span }
        } else {
            SchemaError::unexpected(expected, token)
        }
    }

    fn text(&self, token: &Token) -> &'a str {
        token.text(self.source)
    }

    fn string_literal(&self, token: &Token) -> String {
        let raw = self.text(token);
        let inner = &raw[1..raw.len().saturating_sub(1).max(1)];
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    // === Schema ===

    pub fn parse_schema(&mut self) -> Result<SchemaTable, SchemaError> {
        let mut table = SchemaTable::new();
        while !self.at(TokenKind::Eof) {
            self.skip_docs();
            match self.peek() {
                TokenKind::Struct => {
                    let start = self.current().span;
                    self.advance();
                    let name = self.parse_decl_name()?;
                    let fields = self.parse_struct_body()?;
                    self.define(&mut table, name, McdocType::Struct { fields }, start)?;
                }
                TokenKind::Enum => {
                    let start = self.current().span;
                    let (name, ty) = self.parse_enum_decl()?;
                    self.define(&mut table, name, ty, start)?;
                }
                TokenKind::Type => {
                    let start = self.current().span;
                    self.advance();
                    let name = self.parse_decl_name()?;
                    self.consume(TokenKind::Eq)?;
                    let ty = self.parse_type()?;
                    self.define(&mut table, name, ty, start)?;
                }
                TokenKind::Dispatch => self.parse_dispatch_decl(&mut table)?,
                TokenKind::Eof => break,
                _ => return Err(self.unexpected("declaration")),
            }
        }
        Ok(table)
    }

    fn define(
        &self,
        table: &mut SchemaTable,
        name: String,
        ty: McdocType,
        span: Range,
    ) -> Result<(), SchemaError> {
        if table.types.contains_key(&name) {
            return Err(SchemaError::DuplicateType { name, span });
        }
        table.insert_type(name, ty);
        Ok(())
    }

    /// Declared names are plain identifiers or namespaced paths
    fn parse_decl_name(&mut self) -> Result<String, SchemaError> {
        match self.peek() {
            TokenKind::Ident | TokenKind::ResourceLocation => {
                let token = self.advance();
                Ok(self.text(&token).to_string())
            }
            _ => Err(self.unexpected("type name")),
        }
    }

    fn skip_docs(&mut self) -> Option<String> {
        let mut lines = Vec::new();
        while self.at(TokenKind::DocComment) {
            let token = self.advance();
            let line = self.text(&token).trim_start_matches('/').trim();
            lines.push(line.to_string());
        }
        (!lines.is_empty()).then(|| lines.join("\n"))
    }

    /// `#[name]` attributes; returns whether `deprecated` was among them
    fn parse_attributes(&mut self) -> Result<bool, SchemaError> {
        let mut deprecated = false;
        while self.eat(TokenKind::Hash) {
            self.consume(TokenKind::LBracket)?;
            let name = self.consume(TokenKind::Ident)?;
            deprecated |= self.text(&name) == "deprecated";
            self.consume(TokenKind::RBracket)?;
        }
        Ok(deprecated)
    }

    fn parse_enum_decl(&mut self) -> Result<(String, McdocType), SchemaError> {
        self.consume(TokenKind::Enum)?;
        self.consume(TokenKind::LParen)?;
        self.consume(TokenKind::StringKw)?;
        self.consume(TokenKind::RParen)?;
        let name = self.parse_decl_name()?;
        self.consume(TokenKind::LBrace)?;
        let mut pool = Vec::new();
        while !self.at(TokenKind::RBrace) {
            self.skip_docs();
            let value = self.consume(TokenKind::String)?;
            pool.push(self.string_literal(&value));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RBrace)?;
        Ok((name, McdocType::string_pool(pool)))
    }

    fn parse_dispatch_decl(&mut self, table: &mut SchemaTable) -> Result<(), SchemaError> {
        self.consume(TokenKind::Dispatch)?;
        let registry = self.consume(TokenKind::ResourceLocation)?;
        let registry = self.text(&registry).to_string();
        self.consume(TokenKind::LBracket)?;
        let mut keys = Vec::new();
        loop {
            let token = self.advance();
            let key = match token.kind {
                TokenKind::Ident | TokenKind::ResourceLocation => self.text(&token).to_string(),
                TokenKind::String => self.string_literal(&token),
                kind if kind.is_keyword() => self.text(&token).to_string(),
                _ => return Err(SchemaError::unexpected("dispatch key", &token)),
            };
            keys.push(key);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RBracket)?;
        self.consume(TokenKind::To)?;
        let ty = self.parse_type()?;
        for key in keys {
            table.insert_dispatch(registry.clone(), &key, ty.clone());
        }
        Ok(())
    }

    // === Types ===

    fn parse_struct_body(&mut self) -> Result<Vec<StructField>, SchemaError> {
        self.consume(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.at(TokenKind::RBrace) {
            let doc = self.skip_docs();
            let deprecated = self.parse_attributes()?;
            let doc = doc.or_else(|| self.skip_docs());
            let key = self.advance();
            let key = match key.kind {
                TokenKind::Ident => self.text(&key).to_string(),
                TokenKind::String => self.string_literal(&key),
                kind if kind.is_keyword() => self.text(&key).to_string(),
                _ => return Err(SchemaError::unexpected("field key", &key)),
            };
            let optional = self.eat(TokenKind::Question);
            self.consume(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            fields.push(StructField {
                key,
                optional,
                deprecated,
                ty,
                doc,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RBrace)?;
        Ok(fields)
    }

    pub fn parse_type(&mut self) -> Result<McdocType, SchemaError> {
        let mut ty = self.parse_primary_type()?;
        if self.eat(TokenKind::At) {
            let range = self.parse_range()?;
            match &mut ty {
                McdocType::Numeric { range: slot, .. }
                | McdocType::String { length: slot, .. }
                | McdocType::List { length: slot, .. }
                | McdocType::Array { length: slot, .. } => *slot = Some(range),
                _ => {}
            }
        }
        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> Result<McdocType, SchemaError> {
        let token = self.advance();
        let ty = match token.kind {
            TokenKind::Any => McdocType::Any,
            TokenKind::Boolean => McdocType::Boolean,
            TokenKind::StringKw => McdocType::string(),
            TokenKind::Byte
            | TokenKind::Short
            | TokenKind::Int
            | TokenKind::Long
            | TokenKind::Float
            | TokenKind::Double => {
                let kind = numeric_kind(token.kind);
                if self.at(TokenKind::LBracket) && self.peek_ahead(1) == TokenKind::RBracket {
                    self.advance();
                    self.advance();
                    McdocType::Array { kind, length: None }
                } else {
                    McdocType::numeric(kind)
                }
            }
            TokenKind::LBracket => {
                let item = self.parse_type()?;
                self.consume(TokenKind::RBracket)?;
                McdocType::list(item)
            }
            TokenKind::Struct => McdocType::Struct {
                fields: self.parse_struct_body()?,
            },
            TokenKind::LParen => {
                let mut members = vec![self.parse_type()?];
                while self.eat(TokenKind::Pipe) {
                    members.push(self.parse_type()?);
                }
                self.consume(TokenKind::RParen)?;
                if members.len() == 1 {
                    members.remove(0)
                } else {
                    McdocType::Union { members }
                }
            }
            TokenKind::ResourceLocation if self.at(TokenKind::LBracket) => {
                let registry = self.text(&token).to_string();
                self.parse_dispatcher(registry)?
            }
            TokenKind::ResourceLocation | TokenKind::Ident => McdocType::reference(self.text(&token)),
            TokenKind::Eof => return Err(SchemaError::UnexpectedEof { span: token.span }),
            _ => return Err(SchemaError::unexpected("type", &token)),
        };
        Ok(ty)
    }

    fn parse_dispatcher(&mut self, registry: String) -> Result<McdocType, SchemaError> {
        self.consume(TokenKind::LBracket)?;
        let mut parallel_indices = Vec::new();
        loop {
            if self.eat(TokenKind::LBracket) {
                let field = self.advance();
                let field = match field.kind {
                    TokenKind::Ident => self.text(&field).to_string(),
                    TokenKind::String => self.string_literal(&field),
                    kind if kind.is_keyword() => self.text(&field).to_string(),
                    _ => return Err(SchemaError::unexpected("field name", &field)),
                };
                self.consume(TokenKind::RBracket)?;
                parallel_indices.push(ParallelIndex::Field(field));
            } else {
                let key = self.advance();
                let key = match key.kind {
                    TokenKind::Ident | TokenKind::ResourceLocation => self.text(&key).to_string(),
                    TokenKind::String => self.string_literal(&key),
                    kind if kind.is_keyword() => self.text(&key).to_string(),
                    _ => return Err(SchemaError::unexpected("dispatch key", &key)),
                };
                parallel_indices.push(ParallelIndex::Static(resource::lengthen(&key)));
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RBracket)?;
        Ok(McdocType::Dispatcher {
            registry,
            parallel_indices,
        })
    }

    /// `1`, `0..`, `..5`, `0..20`, `0<..<1`
    fn parse_range(&mut self) -> Result<NumericRange, SchemaError> {
        let mut range = NumericRange::default();
        if self.at(TokenKind::Number) {
            range.min = Some(self.parse_number()?);
        }
        range.min_exclusive = self.eat(TokenKind::Lt);
        if !self.eat(TokenKind::DotDot) {
            if range.min.is_none() || range.min_exclusive {
                return Err(self.unexpected("'..'"));
            }
            range.max = range.min;
            return Ok(range);
        }
        range.max_exclusive = self.eat(TokenKind::Lt);
        if self.at(TokenKind::Number) {
            range.max = Some(self.parse_number()?);
        }
        Ok(range)
    }

    fn parse_number(&mut self) -> Result<f64, SchemaError> {
        let token = self.consume(TokenKind::Number)?;
        let text = self.text(&token);
        text.parse().map_err(|_| SchemaError::InvalidNumber {
            text: text.to_string(),
            span: token.span,
        })
    }
}

fn numeric_kind(kind: TokenKind) -> NumericKind {
    match kind {
        TokenKind::Byte => NumericKind::Byte,
        TokenKind::Short => NumericKind::Short,
        TokenKind::Long => NumericKind::Long,
        TokenKind::Float => NumericKind::Float,
        TokenKind::Double => NumericKind::Double,
        _ => NumericKind::Int,
    }
}
