//! Quill AST - Syntax tree model shared by every grammar
//!
//! This crate defines source ranges, diagnostics, the node tree with its
//! parent links, and the offset-based traversals the checker and completer
//! build on.

mod range;
mod diagnostic;
pub mod resource;
mod node;
mod tree;
mod traverse;

pub use range::*;
pub use diagnostic::*;
pub use node::*;
pub use tree::*;
pub use traverse::*;
