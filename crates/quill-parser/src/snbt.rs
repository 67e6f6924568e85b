//! Tag-based object notation (SNBT)
//!
//! ```text
//! {id: "minecraft:stick", Count: 3b, Tags: ["a", 'b'], Data: [I; 1, 2]}
//! ```
//!
//! Unquoted tokens are classified after reading: numbers with an optional
//! type suffix, `true`/`false` as bytes, anything else as an unquoted string.

use once_cell::sync::Lazy;
use quill_ast::{AstNode, NbtNumber, NodeKind, NumericKind, Range, StringNode};
use regex::Regex;

use crate::collection::{collection, sequence, Delimiters};
use crate::primitive::{is_unquotable_char, string_with, StringOptions};
use crate::{Failure, ParseResult, ParserContext, Source, SyntaxError};

static BYTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i)[-+]?(?:0|[1-9][0-9]*)b$").unwrap());
static SHORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i)[-+]?(?:0|[1-9][0-9]*)s$").unwrap());
static INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?(?:0|[1-9][0-9]*)$").unwrap());
static LONG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i)[-+]?(?:0|[1-9][0-9]*)l$").unwrap());
static FLOAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)[-+]?(?:[0-9]+\.?|[0-9]*\.[0-9]+)(?:e[-+]?[0-9]+)?f$").unwrap());
static DOUBLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)[-+]?(?:[0-9]+\.?|[0-9]*\.[0-9]+)(?:e[-+]?[0-9]+)?d$").unwrap());
static DOUBLE_NO_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)[-+]?(?:[0-9]+\.|[0-9]*\.[0-9]+)(?:e[-+]?[0-9]+)?$").unwrap());

/// Parse a whole SNBT value; reports trailing data
pub fn parse_snbt(src: &mut Source<'_>, ctx: &mut ParserContext) -> AstNode {
    src.skip_whitespace();
    let node = value(src, ctx);
    src.skip_whitespace();
    if src.can_read() {
        let start = src.cursor;
        src.cursor = src.end();
        ctx.report(SyntaxError::TrailingData {
            span: src.range_from(start),
        });
    }
    node
}

/// `{key: value, ...}`; fails when the next character is not `{`
pub fn compound(src: &mut Source<'_>, ctx: &mut ParserContext) -> ParseResult {
    collection(
        src,
        ctx,
        NodeKind::NbtCompound,
        Delimiters::SNBT_COMPOUND,
        key,
        |src, ctx, _key| value_or_fail(src, ctx),
    )
}

fn key(src: &mut Source<'_>, ctx: &mut ParserContext) -> ParseResult {
    string_with(src, ctx, StringOptions::BRIGADIER, NodeKind::NbtString)
}

/// Any SNBT value, always producing a node
pub fn value(src: &mut Source<'_>, ctx: &mut ParserContext) -> AstNode {
    match value_or_fail(src, ctx) {
        Ok(node) => node,
        Err(Failure) => {
            let range = Range::empty(src.cursor);
            ctx.report(SyntaxError::expected("a value", range));
            AstNode::new(NodeKind::Error, range)
        }
    }
}

/// Any SNBT value; fails when nothing value-like starts at the cursor
pub fn value_or_fail(src: &mut Source<'_>, ctx: &mut ParserContext) -> ParseResult {
    match src.peek() {
        Some('{') => compound(src, ctx),
        Some('[') => list_or_array(src, ctx),
        Some('"' | '\'') => string_with(src, ctx, StringOptions::BRIGADIER, NodeKind::NbtString),
        Some(c) if is_unquotable_char(c) => Ok(primitive(src)),
        _ => Err(Failure),
    }
}

fn list_or_array(src: &mut Source<'_>, ctx: &mut ParserContext) -> ParseResult {
    for (prefix, kind) in [
        ("[B;", NumericKind::Byte),
        ("[I;", NumericKind::Int),
        ("[L;", NumericKind::Long),
    ] {
        if src.peek_is(prefix) {
            let start = src.cursor;
            src.cursor += prefix.len() - 1;
            let mut node = sequence(src, ctx, NodeKind::NbtArray(kind), ";", ",", "]", value_or_fail)?;
            node.range = src.range_from(start);
            return Ok(node);
        }
    }
    sequence(src, ctx, NodeKind::NbtList, "[", ",", "]", value_or_fail)
}

/// Unquoted token classified as number, boolean or string
fn primitive(src: &mut Source<'_>) -> AstNode {
    let start = src.cursor;
    let raw = src.read_while(is_unquotable_char);
    let range = src.range_from(start);
    let kind = classify(raw).unwrap_or_else(|| {
        NodeKind::NbtString(StringNode {
            value: raw.to_string(),
            quote: None,
            value_map: (range.start..=range.end).collect(),
        })
    });
    AstNode::new(kind, range)
}

fn classify(raw: &str) -> Option<NodeKind> {
    let number = |kind: NumericKind, digits: &str| -> Option<NodeKind> {
        let value: f64 = digits.parse().ok()?;
        let (min, max) = kind.bounds();
        if kind.is_integral() && !(min..=max).contains(&value) {
            return None;
        }
        Some(NodeKind::NbtNumber(NbtNumber { value, kind }))
    };
    let without_suffix = || &raw[..raw.len() - 1];

    if raw.eq_ignore_ascii_case("true") {
        return number(NumericKind::Byte, "1");
    }
    if raw.eq_ignore_ascii_case("false") {
        return number(NumericKind::Byte, "0");
    }
    if BYTE.is_match(raw) {
        number(NumericKind::Byte, without_suffix())
    } else if SHORT.is_match(raw) {
        number(NumericKind::Short, without_suffix())
    } else if LONG.is_match(raw) {
        number(NumericKind::Long, without_suffix())
    } else if FLOAT.is_match(raw) {
        number(NumericKind::Float, without_suffix())
    } else if DOUBLE.is_match(raw) {
        number(NumericKind::Double, without_suffix())
    } else if INT.is_match(raw) {
        number(NumericKind::Int, raw)
    } else if DOUBLE_NO_SUFFIX.is_match(raw) {
        number(NumericKind::Double, raw)
    } else {
        None
    }
}

/// Render a number the way SNBT writes it, with its type suffix
pub fn format_number(value: f64, kind: NumericKind) -> String {
    match kind {
        NumericKind::Byte => format!("{}b", value),
        NumericKind::Short => format!("{}s", value),
        NumericKind::Int => format!("{}", value),
        NumericKind::Long => format!("{}L", value),
        NumericKind::Float => format!("{}f", value),
        NumericKind::Double if value.fract() == 0.0 => format!("{}.0", value),
        NumericKind::Double => format!("{}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> (AstNode, ParserContext) {
        let mut src = Source::new(text);
        let mut ctx = ParserContext::new();
        let node = parse_snbt(&mut src, &mut ctx);
        (node, ctx)
    }

    fn number(node: &AstNode) -> Option<(f64, NumericKind)> {
        match node.kind {
            NodeKind::NbtNumber(n) => Some((n.value, n.kind)),
            _ => None,
        }
    }

    #[test]
    fn test_number_suffixes() {
        for (text, expected) in [
            ("1b", (1.0, NumericKind::Byte)),
            ("-3S", (-3.0, NumericKind::Short)),
            ("42", (42.0, NumericKind::Int)),
            ("7L", (7.0, NumericKind::Long)),
            ("1.5f", (1.5, NumericKind::Float)),
            ("2.5", (2.5, NumericKind::Double)),
            ("3d", (3.0, NumericKind::Double)),
            ("true", (1.0, NumericKind::Byte)),
        ] {
            let (node, ctx) = parse(text);
            assert!(ctx.err.is_empty(), "{text}");
            assert_eq!(number(&node), Some(expected), "{text}");
        }
    }

    #[test]
    fn test_out_of_range_integer_is_string() {
        let (node, _) = parse("300b");
        assert_eq!(node.string_value(), Some("300b"));
    }

    #[test]
    fn test_compound() {
        let (node, ctx) = parse(r#"{id: "minecraft:stick", Count: 3b, "quoted key": [1, 2]}"#);
        assert!(ctx.err.is_empty(), "{:?}", ctx.err.diagnostics());
        assert_eq!(node.kind.tag(), "nbt:compound");
        let keys: Vec<_> = node
            .pairs()
            .filter_map(|p| p.pair_key())
            .filter_map(|k| k.string_value())
            .collect();
        assert_eq!(keys, vec!["id", "Count", "quoted key"]);
        let list = node.children[2].pair_value().expect("list value");
        assert_eq!(list.kind.tag(), "nbt:list");
        assert_eq!(list.children.len(), 2);
    }

    #[test]
    fn test_arrays() {
        let (node, ctx) = parse("[I; 1, 2, 3]");
        assert!(ctx.err.is_empty(), "{:?}", ctx.err.diagnostics());
        assert_eq!(node.kind, NodeKind::NbtArray(NumericKind::Int));
        assert_eq!(node.range, Range::new(0, 12));
        assert_eq!(node.children.len(), 3);
    }

    #[test]
    fn test_recovery_keeps_partial_compound() {
        let (node, ctx) = parse("{a: 1, b: ");
        assert_eq!(node.kind.tag(), "nbt:compound");
        assert_eq!(node.children.len(), 2);
        assert_eq!(ctx.err.len(), 1);
    }

    #[test]
    fn test_trailing_data() {
        let (_, ctx) = parse("{} x");
        assert_eq!(ctx.err.diagnostics()[0].message, "trailing data");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0, NumericKind::Byte), "1b");
        assert_eq!(format_number(2.0, NumericKind::Long), "2L");
        assert_eq!(format_number(0.5, NumericKind::Float), "0.5f");
        assert_eq!(format_number(3.0, NumericKind::Double), "3.0");
    }
}
