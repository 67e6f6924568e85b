//! Quill Schema - Structural type descriptors and lookup services
//!
//! Checkers validate values against [`McdocType`] descriptors. Named types and
//! dispatcher members come from a [`SchemaService`]; registry and tag contents
//! from a [`RegistryService`]. Both have in-memory implementations that load
//! from JSON, and schemas can also be written in a small textual language.

mod error;
mod lexer;
mod parser;
mod service;
mod types;

pub use error::*;
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::Parser;
pub use service::*;
pub use types::*;

/// Parse schema-language source into a table of named types and dispatchers
pub fn parse_schema(source: &str) -> Result<SchemaTable, SchemaError> {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    let table = parser.parse_schema()?;
    tracing::debug!(
        types = table.types.len(),
        registries = table.dispatchers.len(),
        "parsed schema"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_ast::NumericKind;

    #[test]
    fn test_parse_struct() {
        let table = parse_schema(
            r#"
            /// Item stack
            struct Item {
                id: string,
                Count?: byte @ 1..64,
                #[deprecated] Damage?: int,
            }
            "#,
        )
        .expect("schema should parse");
        let item = table.resolve_reference("Item").expect("Item defined");
        let fields = item.fields().expect("struct");
        assert_eq!(fields.len(), 3);
        assert!(!fields[0].optional);
        assert_eq!(
            fields[1].ty,
            McdocType::numeric_in(NumericKind::Byte, NumericRange::between(1.0, 64.0))
        );
        assert!(fields[2].deprecated);
    }

    #[test]
    fn test_parse_enum_and_alias() {
        let table = parse_schema(
            r#"
            enum(string) Color { "red", "blue", }
            type Colors = [Color] @ ..4
            "#,
        )
        .expect("schema should parse");
        assert_eq!(
            table.resolve_reference("Color"),
            Some(McdocType::string_pool(["red", "blue"]))
        );
        assert_eq!(
            table.resolve_reference("Colors"),
            Some(McdocType::List {
                item: Box::new(McdocType::reference("Color")),
                length: Some(NumericRange::at_most(4.0)),
            })
        );
    }

    #[test]
    fn test_parse_dispatch() {
        let table = parse_schema(
            r#"
            struct Mob { Health?: float }
            dispatch minecraft:entity[zombie, minecraft:husk] to Mob
            type AnyMob = minecraft:entity[[id]]
            type Arrays = (byte[] | long[] @ 2)
            "#,
        )
        .expect("schema should parse");
        assert_eq!(
            table.dispatch("minecraft:entity", "minecraft:zombie"),
            Some(McdocType::reference("Mob"))
        );
        assert_eq!(table.dispatch_keys("minecraft:entity").len(), 2);
        assert_eq!(
            table.resolve_reference("AnyMob").map(|t| t.to_string()),
            Some("minecraft:entity[[id]]".to_string())
        );
        assert_eq!(
            table.resolve_reference("Arrays").map(|t| t.to_string()),
            Some("(byte[] | long[] @ 2)".to_string())
        );
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_schema("struct { }").expect_err("missing name");
        assert!(matches!(err, SchemaError::UnexpectedToken { .. }));
        assert_eq!(err.span(), Some(quill_ast::Range::new(7, 8)));

        let err = parse_schema("type A = int\ntype A = long").expect_err("duplicate");
        assert!(matches!(err, SchemaError::DuplicateType { .. }));

        let err = parse_schema("type A =").expect_err("eof");
        assert!(matches!(err, SchemaError::UnexpectedEof { .. }));
    }
}
