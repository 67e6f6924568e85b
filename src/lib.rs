//! Quill - Schema-directed parsing, checking and completion for data pack documents
//!
//! This is the root workspace crate that provides integration tests.
//! The implementation lives in the workspace member crates.

pub use quill_ast as ast;
pub use quill_checker as checker;
pub use quill_parser as parser;
pub use quill_schema as schema;
