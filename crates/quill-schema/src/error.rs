//! Schema loading errors

use quill_ast::Range;
use thiserror::Error;

use crate::Token;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Range,
    },

    #[error("unexpected end of schema")]
    UnexpectedEof { span: Range },

    #[error("invalid number literal `{text}`")]
    InvalidNumber { text: String, span: Range },

    #[error("duplicate type definition: {name}")]
    DuplicateType { name: String, span: Range },

    #[error("invalid schema table: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Source range of a schema-language error
    pub fn span(&self) -> Option<Range> {
        match self {
            SchemaError::UnexpectedToken { span, .. } => Some(*span),
            SchemaError::UnexpectedEof { span } => Some(*span),
            SchemaError::InvalidNumber { span, .. } => Some(*span),
            SchemaError::DuplicateType { span, .. } => Some(*span),
            SchemaError::Json(_) => None,
        }
    }

    pub fn unexpected(expected: impl Into<String>, found: &Token) -> Self {
        SchemaError::UnexpectedToken {
            expected: expected.into(),
            found: found.kind.describe().to_string(),
            span: found.span,
        }
    }
}
