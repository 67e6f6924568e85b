//! SNBT completers

use quill_ast::AstNode;

use super::{CompletionItem, Style};
use crate::CompleterContext;

pub fn compound(node: &AstNode, _parents: &[&AstNode], ctx: &CompleterContext<'_>) -> Vec<CompletionItem> {
    super::record(node, Style::Snbt, ctx)
}

/// Lists and typed arrays
pub fn collection(node: &AstNode, _parents: &[&AstNode], ctx: &CompleterContext<'_>) -> Vec<CompletionItem> {
    super::collection(node, Style::Snbt, ctx)
}

/// Strings and numbers, either as compound keys or values
pub fn primitive(node: &AstNode, parents: &[&AstNode], ctx: &CompleterContext<'_>) -> Vec<CompletionItem> {
    super::primitive(node, parents, Style::Snbt, ctx)
}
