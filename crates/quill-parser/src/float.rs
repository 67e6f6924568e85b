//! Numeric literal parser
//!
//! The scan is tolerant: it accepts anything shaped like
//! `sign? digits? (. digits?)? (e sign? digits?)?`. Whether the capture is the
//! right kind of number for the slot is decided afterwards by the supplied
//! pattern and bounds, so one scanner serves every numeric argument.

use once_cell::sync::Lazy;
use quill_ast::{AstNode, NodeKind, Range};
use regex::Regex;

use crate::source::is_digit;
use crate::{Failure, ParseResult, ParserContext, Source, SyntaxError};

/// Decimal floating point literal with optional exponent
pub static FLOAT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][-+]?[0-9]+)?$").unwrap());

/// Called instead of the default report when the value is outside `[min, max]`
pub type OutOfRange = fn(&AstNode, &mut ParserContext, &FloatOptions);

#[derive(Debug, Clone)]
pub struct FloatOptions {
    /// Lexical pattern the capture must match
    pub pattern: Regex,
    /// Inclusive
    pub min: Option<f64>,
    /// Inclusive
    pub max: Option<f64>,
    pub on_out_of_range: Option<OutOfRange>,
    /// Fail without a node when nothing was captured
    pub fails_on_empty: bool,
}

impl Default for FloatOptions {
    fn default() -> Self {
        Self {
            pattern: FLOAT_PATTERN.clone(),
            min: None,
            max: None,
            on_out_of_range: None,
            fails_on_empty: false,
        }
    }
}

impl FloatOptions {
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Self::default()
        }
    }
}

/// Render a bound, using infinities for absent ones
pub fn format_bound(bound: Option<f64>, fallback: &str) -> String {
    match bound {
        Some(value) => value.to_string(),
        None => fallback.to_string(),
    }
}

fn report_out_of_range(node: &AstNode, ctx: &mut ParserContext, options: &FloatOptions) {
    ctx.report(SyntaxError::NumberOutOfRange {
        min: format_bound(options.min, "-∞"),
        max: format_bound(options.max, "+∞"),
        span: node.range,
    });
}

pub fn float(src: &mut Source<'_>, ctx: &mut ParserContext, options: &FloatOptions) -> ParseResult {
    let start = src.cursor;

    if matches!(src.peek(), Some('-' | '+')) {
        src.skip();
    }
    src.read_while(is_digit);

    if src.peek() == Some('.') {
        src.skip();
        src.read_while(is_digit);
    }

    if matches!(src.peek(), Some('e' | 'E')) {
        src.skip();
        if matches!(src.peek(), Some('-' | '+')) {
            src.skip();
        }
        src.read_while(is_digit);
    }

    let range = src.range_from(start);
    let raw = src.slice(range);
    let value = raw.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0);
    let node = AstNode::new(NodeKind::Float(value), range);

    if raw.is_empty() {
        if options.fails_on_empty {
            return Err(Failure);
        }
        ctx.report(SyntaxError::expected("a number", range));
    } else if !options.pattern.is_match(raw) {
        ctx.report(SyntaxError::IllegalNumber { span: range });
    } else if options.min.is_some_and(|min| value < min) || options.max.is_some_and(|max| value > max) {
        let on_out_of_range = options.on_out_of_range.unwrap_or(report_out_of_range);
        on_out_of_range(&node, ctx, options);
    }

    Ok(node)
}
