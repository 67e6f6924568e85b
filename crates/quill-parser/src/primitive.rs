//! Integer, boolean, string, identifier and keyword primitives
//!
//! All follow the [`float`](crate::float()) contract: a fallible parser
//! returns [`Failure`] without moving the cursor, an infallible one always
//! yields a node and reports what was wrong with it.

use once_cell::sync::Lazy;
use quill_ast::{resource, AstNode, NodeKind, Range, ResourceLocationNode, StringNode};
use regex::Regex;

use crate::float::format_bound;
use crate::source::is_digit;
use crate::{Failure, ParseResult, ParserContext, Source, SyntaxError};

/// Strings matching this pattern need no quotes in SNBT and command arguments
pub static UNQUOTABLE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9A-Za-z_\-.+]+$").unwrap());

pub fn is_unquotable_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+')
}

// === Integer ===

#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerOptions {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub fails_on_empty: bool,
}

pub fn integer(src: &mut Source<'_>, ctx: &mut ParserContext, options: IntegerOptions) -> ParseResult {
    let start = src.cursor;
    if matches!(src.peek(), Some('-' | '+')) {
        src.skip();
    }
    src.read_while(is_digit);
    let range = src.range_from(start);
    let raw = src.slice(range);
    let value = raw.parse::<i64>().unwrap_or(0);
    let node = AstNode::new(NodeKind::Integer(value), range);

    if raw.is_empty() {
        if options.fails_on_empty {
            return Err(Failure);
        }
        ctx.report(SyntaxError::expected("an integer", range));
    } else if raw.parse::<i64>().is_err() {
        ctx.report(SyntaxError::IllegalNumber { span: range });
    } else if options.min.is_some_and(|min| value < min) || options.max.is_some_and(|max| value > max) {
        ctx.report(SyntaxError::NumberOutOfRange {
            min: format_bound(options.min.map(|v| v as f64), "-∞"),
            max: format_bound(options.max.map(|v| v as f64), "+∞"),
            span: range,
        });
    }
    Ok(node)
}

// === Boolean ===

/// `true` or `false`; fails on anything else
pub fn boolean(src: &mut Source<'_>, _ctx: &mut ParserContext) -> ParseResult {
    let start = src.cursor;
    for (text, value) in [("true", true), ("false", false)] {
        if src.peek_is(text) && !src.remaining()[text.len()..].starts_with(is_unquotable_char) {
            src.cursor += text.len();
            return Ok(AstNode::new(NodeKind::Boolean(value), src.range_from(start)));
        }
    }
    Err(Failure)
}

// === String ===

#[derive(Debug, Clone, Copy)]
pub struct StringOptions {
    /// Accepted quote characters; empty disallows quoted strings
    pub quotes: &'static [char],
    /// Characters allowed in an unquoted string; `None` disallows unquoted strings
    pub unquotable: Option<fn(char) -> bool>,
    /// Accept JSON escapes (`\n`, `\uXXXX`, ...) in addition to `\\` and quotes
    pub json_escapes: bool,
}

impl StringOptions {
    /// Brigadier-style: quoted with `"` or `'`, or unquoted
    pub const BRIGADIER: StringOptions = StringOptions {
        quotes: &['"', '\''],
        unquotable: Some(is_unquotable_char),
        json_escapes: false,
    };

    /// JSON strings: double quotes only
    pub const JSON: StringOptions = StringOptions {
        quotes: &['"'],
        unquotable: None,
        json_escapes: true,
    };
}

/// Parse a string into `NodeKind::String`.
///
/// Fails when the next character neither opens a quote nor starts an unquoted
/// string. An unterminated quoted string is reported and kept.
pub fn string(src: &mut Source<'_>, ctx: &mut ParserContext, options: StringOptions) -> ParseResult {
    string_with(src, ctx, options, NodeKind::String)
}

/// Like [`string`], wrapping the payload in a grammar-specific kind
pub fn string_with(
    src: &mut Source<'_>,
    ctx: &mut ParserContext,
    options: StringOptions,
    kind: fn(StringNode) -> NodeKind,
) -> ParseResult {
    let start = src.cursor;
    match src.peek() {
        Some(q) if options.quotes.contains(&q) => {
            src.skip();
            let payload = quoted_body(src, ctx, q, options.json_escapes, start);
            Ok(AstNode::new(kind(payload), src.range_from(start)))
        }
        Some(c) if options.unquotable.is_some_and(|ok| ok(c)) => {
            let value_start = src.cursor;
            let pred = options.unquotable.unwrap_or(is_unquotable_char);
            let value = src.read_while(pred).to_string();
            let value_map = (value_start..=src.cursor).collect();
            let payload = StringNode {
                value,
                quote: None,
                value_map,
            };
            Ok(AstNode::new(kind(payload), src.range_from(start)))
        }
        _ => Err(Failure),
    }
}

fn quoted_body(
    src: &mut Source<'_>,
    ctx: &mut ParserContext,
    quote: char,
    json_escapes: bool,
    start: usize,
) -> StringNode {
    let mut value = String::new();
    let mut value_map = Vec::new();
    loop {
        let at = src.cursor;
        let Some(c) = src.read() else {
            ctx.report(SyntaxError::UnterminatedString {
                span: src.range_from(start),
            });
            value_map.push(src.cursor);
            break;
        };
        if c == quote {
            value_map.push(at);
            break;
        }
        let decoded = if c == '\\' {
            match escape(src, json_escapes) {
                Some(decoded) => decoded,
                None => {
                    let escape = src.peek().unwrap_or('\\');
                    src.skip();
                    ctx.report(SyntaxError::InvalidEscape {
                        escape,
                        span: src.range_from(at),
                    });
                    escape
                }
            }
        } else {
            c
        };
        value_map.extend(std::iter::repeat(at).take(decoded.len_utf8()));
        value.push(decoded);
    }
    StringNode {
        value,
        quote: Some(quote),
        value_map,
    }
}

fn escape(src: &mut Source<'_>, json_escapes: bool) -> Option<char> {
    let c = src.peek()?;
    let decoded = match c {
        '\\' | '"' | '\'' => c,
        'n' if json_escapes => '\n',
        't' if json_escapes => '\t',
        'r' if json_escapes => '\r',
        'b' if json_escapes => '\u{8}',
        'f' if json_escapes => '\u{c}',
        '/' if json_escapes => '/',
        'u' if json_escapes => {
            let hex = src.remaining().get(1..5)?;
            let code = u32::from_str_radix(hex, 16).ok()?;
            let decoded = char::from_u32(code)?;
            src.cursor += 4;
            decoded
        }
        _ => return None,
    };
    src.skip();
    Some(decoded)
}

// === Resource location ===

#[derive(Debug, Clone, Default)]
pub struct ResourceLocationOptions {
    /// Registry the identifier belongs to
    pub category: Option<String>,
    pub allow_tag: bool,
    pub fails_on_empty: bool,
}

/// `namespace:path`, `path`, or `#namespace:path` when tags are allowed
pub fn resource_location(
    src: &mut Source<'_>,
    ctx: &mut ParserContext,
    options: &ResourceLocationOptions,
) -> ParseResult {
    let start = src.cursor;
    let is_tag = src.peek() == Some(resource::TAG_PREFIX);
    if is_tag {
        src.skip();
    }
    let raw = src.read_while(|c| resource::is_path_char(c) || c == ':');
    let range = src.range_from(start);

    if raw.is_empty() && !is_tag {
        if options.fails_on_empty {
            return Err(Failure);
        }
        ctx.report(SyntaxError::expected("a resource location", range));
    }

    let (namespace, path) = match raw.split_once(':') {
        Some((namespace, path)) => (Some(namespace), path),
        None => (None, raw),
    };
    let malformed = path.contains(':')
        || namespace.is_some_and(|ns| !ns.chars().all(resource::is_namespace_char))
        || (is_tag && raw.is_empty());
    if malformed {
        ctx.report(SyntaxError::IllegalResourceLocation { span: range });
    } else if is_tag && !options.allow_tag {
        ctx.report(SyntaxError::TagNotAllowed { span: range });
    }

    let payload = ResourceLocationNode {
        namespace: namespace.filter(|ns| !ns.is_empty()).map(str::to_string),
        path: path.split('/').map(str::to_string).collect(),
        is_tag,
        category: options.category.clone(),
    };
    Ok(AstNode::new(NodeKind::ResourceLocation(payload), range))
}

// === Literal ===

/// One of `pool`, followed by the end of input or a non-word character
pub fn literal(src: &mut Source<'_>, _ctx: &mut ParserContext, pool: &[&str]) -> ParseResult {
    let start = src.cursor;
    let word = src.remaining().split(char::is_whitespace).next().unwrap_or_default();
    match pool.iter().find(|candidate| **candidate == word) {
        Some(matched) => {
            src.cursor += matched.len();
            Ok(AstNode::new(NodeKind::Literal(matched.to_string()), Range::new(start, src.cursor)))
        }
        None => Err(Failure),
    }
}
