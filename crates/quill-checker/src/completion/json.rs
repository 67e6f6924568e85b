//! JSON completers
//!
//! Keys are always quoted and values inserted as snippets. A `:` trigger only
//! completes values; see [`JSON_TRIGGER_CHARACTERS`](super::JSON_TRIGGER_CHARACTERS).

use quill_ast::AstNode;

use super::{CompletionItem, Style};
use crate::CompleterContext;

pub fn object(node: &AstNode, _parents: &[&AstNode], ctx: &CompleterContext<'_>) -> Vec<CompletionItem> {
    super::record(node, Style::Json, ctx)
}

pub fn array(node: &AstNode, _parents: &[&AstNode], ctx: &CompleterContext<'_>) -> Vec<CompletionItem> {
    super::collection(node, Style::Json, ctx)
}

pub fn primitive(node: &AstNode, parents: &[&AstNode], ctx: &CompleterContext<'_>) -> Vec<CompletionItem> {
    super::primitive(node, parents, Style::Json, ctx)
}
