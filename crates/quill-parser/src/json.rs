//! JSON-like config grammar
//!
//! Objects and arrays reuse the generic collection parser, so a document cut
//! off mid-object still yields the pairs read so far.

use once_cell::sync::Lazy;
use quill_ast::{AstNode, NodeKind, Range};
use regex::Regex;

use crate::collection::{collection, sequence, Delimiters};
use crate::primitive::{string_with, StringOptions};
use crate::{Failure, ParseResult, ParserContext, Source, SyntaxError};

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][-+]?[0-9]+)?").unwrap());

/// Parse a whole JSON document; reports trailing data
pub fn parse_json(src: &mut Source<'_>, ctx: &mut ParserContext) -> AstNode {
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

/// Any JSON value, always producing a node
pub fn value(src: &mut Source<'_>, ctx: &mut ParserContext) -> AstNode {
    match value_or_fail(src, ctx) {
        Ok(node) => node,
        Err(Failure) => {
            let range = Range::empty(src.cursor);
            ctx.report(SyntaxError::expected("a JSON value", range));
            AstNode::new(NodeKind::Error, range)
        }
    }
}

pub fn value_or_fail(src: &mut Source<'_>, ctx: &mut ParserContext) -> ParseResult {
    match src.peek() {
        Some('{') => object(src, ctx),
        Some('[') => sequence(src, ctx, NodeKind::JsonArray, "[", ",", "]", value_or_fail),
        Some('"') => string(src, ctx),
        Some('-' | '0'..='9') => number(src),
        _ => keyword(src),
    }
}

pub fn object(src: &mut Source<'_>, ctx: &mut ParserContext) -> ParseResult {
    collection(
        src,
        ctx,
        NodeKind::JsonObject,
        Delimiters::JSON_OBJECT,
        string,
        |src, ctx, _key| value_or_fail(src, ctx),
    )
}

fn string(src: &mut Source<'_>, ctx: &mut ParserContext) -> ParseResult {
    string_with(src, ctx, StringOptions::JSON, NodeKind::JsonString)
}

fn number(src: &mut Source<'_>) -> ParseResult {
    let start = src.cursor;
    let matched = NUMBER.find(src.remaining()).ok_or(Failure)?;
    let value = matched.as_str().parse::<f64>().map_err(|_| Failure)?;
    src.cursor += matched.end();
    Ok(AstNode::new(NodeKind::JsonNumber(value), src.range_from(start)))
}

fn keyword(src: &mut Source<'_>) -> ParseResult {
    let start = src.cursor;
    let kind = if src.try_read("true") {
        NodeKind::JsonBoolean(true)
    } else if src.try_read("false") {
        NodeKind::JsonBoolean(false)
    } else if src.try_read("null") {
        NodeKind::JsonNull
    } else {
        return Err(Failure);
    };
    Ok(AstNode::new(kind, src.range_from(start)))
}
