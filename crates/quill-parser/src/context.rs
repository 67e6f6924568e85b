//! Ambient parser state

use quill_ast::{AstNode, ErrorSink};

use crate::{Failure, Source, SyntaxError};

/// Outcome of a fallible parser
pub type ParseResult = Result<AstNode, Failure>;

/// State threaded through every parser call
#[derive(Debug, Clone, Default)]
pub struct ParserContext {
    pub err: ErrorSink,
    /// Cursor position of a pending completion request.
    ///
    /// Collection parsers move it forward when it sits in skipped whitespace.
    pub completion_offset: Option<usize>,
    /// Collections currently open around the cursor
    pub depth: usize,
}

impl ParserContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_completion(offset: usize) -> Self {
        Self {
            completion_offset: Some(offset),
            ..Self::default()
        }
    }

    pub fn report(&mut self, error: SyntaxError) {
        self.err.report(error.to_string(), error.span());
    }
}

/// Run `parser`; when it fails, rewind the cursor and drop what it reported
pub fn attempt<'a, F>(src: &mut Source<'a>, ctx: &mut ParserContext, parser: F) -> ParseResult
where
    F: FnOnce(&mut Source<'a>, &mut ParserContext) -> ParseResult,
{
    let cursor = src.cursor;
    let mark = ctx.err.mark();
    let result = parser(src, ctx);
    if result.is_err() {
        src.cursor = cursor;
        ctx.err.rollback(mark);
    }
    result
}

/// Skip whitespace, moving a completion offset inside the skipped run to its end
pub fn skip_whitespace(src: &mut Source<'_>, ctx: &mut ParserContext) {
    let skipped = src.skip_whitespace();
    if let Some(offset) = ctx.completion_offset {
        if skipped.start <= offset && offset < skipped.end {
            ctx.completion_offset = Some(skipped.end);
        }
    }
}
