//! Syntax diagnostics and the structural failure value

use quill_ast::Range;
use thiserror::Error;

/// A malformed token or literal. The parser recovers with a best-effort node.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("expected {expected}")]
    Expected { expected: String, span: Range },

    #[error("illegal number literal")]
    IllegalNumber { span: Range },

    #[error("expected a number between {min} and {max}")]
    NumberOutOfRange { min: String, max: String, span: Range },

    #[error("illegal resource location")]
    IllegalResourceLocation { span: Range },

    #[error("tags are not allowed here")]
    TagNotAllowed { span: Range },

    #[error("unterminated string")]
    UnterminatedString { span: Range },

    #[error("unexpected escape sequence \\{escape}")]
    InvalidEscape { escape: char, span: Range },

    #[error("unknown command")]
    UnknownCommand { span: Range },

    #[error("trailing data")]
    TrailingData { span: Range },

    #[error("too deeply nested")]
    TooDeeplyNested { span: Range },
}

impl SyntaxError {
    pub fn span(&self) -> Range {
        match self {
            SyntaxError::Expected { span, .. } => *span,
            SyntaxError::IllegalNumber { span } => *span,
            SyntaxError::NumberOutOfRange { span, .. } => *span,
            SyntaxError::IllegalResourceLocation { span } => *span,
            SyntaxError::TagNotAllowed { span } => *span,
            SyntaxError::UnterminatedString { span } => *span,
            SyntaxError::InvalidEscape { span, .. } => *span,
            SyntaxError::UnknownCommand { span } => *span,
            SyntaxError::TrailingData { span } => *span,
            SyntaxError::TooDeeplyNested { span } => *span,
        }
    }

    pub fn expected(expected: impl Into<String>, span: Range) -> Self {
        SyntaxError::Expected {
            expected: expected.into(),
            span,
        }
    }
}

/// A fallible parser could not even start.
///
/// Carries no node. The cursor has not moved, so the caller may try another
/// alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no match")]
pub struct Failure;
