//! Generic delimited collection parser
//!
//! `OPEN (key SEP value (PAIRSEP key SEP value)*)? CLOSE`, reused by SNBT
//! compounds, JSON objects, selector arguments, item components and block
//! states. Lists use the keyless [`sequence`] form.

use quill_ast::{AstNode, NodeKind, PairNode, Range, MAX_NESTING};

use crate::context::skip_whitespace;
use crate::{Failure, ParseResult, ParserContext, Source, SyntaxError};

/// The four delimiter strings of a key/value collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub open: &'static str,
    pub sep: &'static str,
    pub pair_sep: &'static str,
    pub close: &'static str,
}

impl Delimiters {
    pub const SNBT_COMPOUND: Delimiters = Delimiters {
        open: "{",
        sep: ":",
        pair_sep: ",",
        close: "}",
    };

    pub const JSON_OBJECT: Delimiters = Delimiters::SNBT_COMPOUND;

    /// Selector arguments, item components and block states
    pub const BRACKET_ASSIGN: Delimiters = Delimiters {
        open: "[",
        sep: "=",
        pair_sep: ",",
        close: "]",
    };
}

/// Parse a key/value collection into a `kind` node whose children are `Pair` nodes.
///
/// Fails only when the opening delimiter is missing. Any later expectation
/// failure is reported once on the collection's range and the partial node is
/// returned, so it stays usable for completion.
pub fn collection<'a, K, V>(
    src: &mut Source<'a>,
    ctx: &mut ParserContext,
    kind: NodeKind,
    delimiters: Delimiters,
    mut key: K,
    mut value: V,
) -> ParseResult
where
    K: FnMut(&mut Source<'a>, &mut ParserContext) -> ParseResult,
    V: FnMut(&mut Source<'a>, &mut ParserContext, &AstNode) -> ParseResult,
{
    let start = src.cursor;
    if !src.peek_is(delimiters.open) {
        return Err(Failure);
    }
    if ctx.depth >= MAX_NESTING {
        return Ok(too_deep(src, ctx));
    }
    src.cursor += delimiters.open.len();
    ctx.depth += 1;

    let mut children = Vec::new();
    let mut failure = None;
    loop {
        skip_whitespace(src, ctx);
        if !src.can_read() || src.peek_is(delimiters.close) {
            break;
        }

        let pair_start = src.cursor;
        let Ok(key_node) = key(src, ctx) else {
            failure = Some("a key".to_string());
            break;
        };
        skip_whitespace(src, ctx);

        let sep_start = src.cursor;
        if !src.try_read(delimiters.sep) {
            let range = Range::new(pair_start, key_node.range.end);
            children.push(pair(range, Some(key_node), None, None));
            failure = Some(format!("'{}'", delimiters.sep));
            break;
        }
        let sep = src.range_from(sep_start);
        skip_whitespace(src, ctx);

        match value(src, ctx, &key_node) {
            Ok(value_node) => {
                let range = Range::new(pair_start, value_node.range.end);
                children.push(pair(range, Some(key_node), Some(sep), Some(value_node)));
            }
            Err(Failure) => {
                // covers the whitespace after the separator, where the value goes
                let range = src.range_from(pair_start);
                children.push(pair(range, Some(key_node), Some(sep), None));
                failure = Some("a value".to_string());
                break;
            }
        }

        skip_whitespace(src, ctx);
        if src.try_read(delimiters.pair_sep) {
            continue;
        }
        break;
    }

    skip_whitespace(src, ctx);
    if !src.try_read(delimiters.close) && failure.is_none() {
        failure = Some(format!("'{}'", delimiters.close));
    }
    ctx.depth -= 1;

    let range = src.range_from(start);
    if let Some(expected) = failure {
        ctx.report(SyntaxError::expected(expected, range));
    }
    Ok(AstNode::with_children(kind, range, children))
}

fn pair(range: Range, key: Option<AstNode>, sep: Option<Range>, value: Option<AstNode>) -> AstNode {
    let payload = PairNode {
        has_key: key.is_some(),
        has_value: value.is_some(),
        sep,
    };
    let children = key.into_iter().chain(value).collect();
    AstNode::with_children(NodeKind::Pair(payload), range, children)
}

/// Skip a collection opened past [`MAX_NESTING`] up to its matching close.
///
/// Brackets inside quoted strings are ignored. The skipped text becomes one
/// error node so the enclosing collections still parse normally.
fn too_deep(src: &mut Source<'_>, ctx: &mut ParserContext) -> AstNode {
    let start = src.cursor;
    let mut open = 0usize;
    while let Some(c) = src.read() {
        match c {
            '[' | '{' => open += 1,
            ']' | '}' => {
                open = open.saturating_sub(1);
                if open == 0 {
                    break;
                }
            }
            '"' | '\'' => skip_quoted(src, c),
            _ => {}
        }
    }
    let range = src.range_from(start);
    ctx.report(SyntaxError::TooDeeplyNested { span: range });
    AstNode::new(NodeKind::Error, range)
}

fn skip_quoted(src: &mut Source<'_>, quote: char) {
    while let Some(c) = src.read() {
        if c == '\\' {
            src.skip();
        } else if c == quote {
            break;
        }
    }
}

/// Parse `OPEN (item (SEP item)*)? CLOSE` into a `kind` node whose children are the items.
///
/// Same failure contract as [`collection`].
pub fn sequence<'a, I>(
    src: &mut Source<'a>,
    ctx: &mut ParserContext,
    kind: NodeKind,
    open: &str,
    sep: &str,
    close: &str,
    mut item: I,
) -> ParseResult
where
    I: FnMut(&mut Source<'a>, &mut ParserContext) -> ParseResult,
{
    let start = src.cursor;
    if !src.peek_is(open) {
        return Err(Failure);
    }
    if ctx.depth >= MAX_NESTING {
        return Ok(too_deep(src, ctx));
    }
    src.cursor += open.len();
    ctx.depth += 1;

    let mut children = Vec::new();
    let mut failure = None;
    loop {
        skip_whitespace(src, ctx);
        if !src.can_read() || src.peek_is(close) {
            break;
        }
        match item(src, ctx) {
            Ok(node) => children.push(node),
            Err(Failure) => {
                failure = Some("a value".to_string());
                break;
            }
        }
        skip_whitespace(src, ctx);
        if !src.try_read(sep) {
            break;
        }
    }

    skip_whitespace(src, ctx);
    if !src.try_read(close) && failure.is_none() {
        failure = Some(format!("'{}'", close));
    }
    ctx.depth -= 1;

    let range = src.range_from(start);
    if let Some(expected) = failure {
        ctx.report(SyntaxError::expected(expected, range));
    }
    Ok(AstNode::with_children(kind, range, children))
}
