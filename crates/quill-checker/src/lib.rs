//! Quill Checker - Schema-directed validation and completion
//!
//! Checkers are registered per node tag in a [`MetaRegistry`] and run over a
//! parsed tree by [`check_document`]. Values are validated against
//! [`McdocType`](quill_schema::McdocType) descriptors resolved through the
//! schema and registry services; completion walks the same descriptors.

mod binder;
mod command;
mod context;
mod dispatch;
mod document;
mod engine;
mod entity;
mod loader;
mod registry;
mod release;

pub mod completion;
pub mod mcdoc;

pub use context::*;
pub use dispatch::{bind, dispatch};
pub use engine::{CheckedDocument, Engine};
pub use entity::entity_types;
pub use loader::{prefetch, SchemaLoader};
pub use registry::*;
pub use release::*;

pub use completion::{complete, CompletionItem, CompletionKind};
pub use mcdoc::{check_dispatch, check_type, CheckOptions};

use quill_ast::{set_parents, AstNode, NodeIndex, Severity};
use quill_schema::NumericRange;
use thiserror::Error;

/// Semantic problems found while checking; the `Display` text is the diagnostic message
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    #[error("expected {expected}")]
    Expected { expected: String },

    #[error("expected a value in range {range}")]
    OutOfRange { range: NumericRange },

    #[error("expected a length in range {range}")]
    LengthOutOfRange { range: NumericRange },

    #[error("expected one of {values}")]
    NotInPool { values: String },

    #[error("missing required key {key}")]
    MissingKey { key: String },

    #[error("unknown key {key}")]
    UnknownKey { key: String },

    #[error("duplicate key {key}")]
    DuplicateKey { key: String },

    #[error("duplicate component {id}")]
    DuplicateComponent { id: String },

    #[error("deprecated key {key}")]
    DeprecatedKey { key: String },

    #[error("unexpected leading slash")]
    LeadingSlash,
}

impl CheckError {
    pub fn expected(expected: impl Into<String>) -> Self {
        CheckError::Expected {
            expected: expected.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            CheckError::UnknownKey { .. } | CheckError::DuplicateComponent { .. } => Severity::Warning,
            CheckError::DeprecatedKey { .. } => Severity::Hint,
            _ => Severity::Error,
        }
    }
}

/// Assign node ids, then bind and check `root`.
///
/// Diagnostics land in `ctx.err`, annotations in `ctx.annotations`. The pass
/// always completes; a cancelled pass just stops producing diagnostics.
pub fn check_document(root: &mut AstNode, ctx: &mut CheckerContext<'_>) {
    let span = tracing::debug_span!("check_document", path = ctx.doc_path.unwrap_or("<memory>"));
    let _enter = span.enter();

    ctx.ids = set_parents(root);
    ctx.index = NodeIndex::build(root);
    bind(root, ctx);
    dispatch(root, ctx);

    tracing::debug!(
        diagnostics = ctx.err.len(),
        references = ctx.references.len(),
        "checked document"
    );
}
