//! Resource location completer

use quill_ast::AstNode;

use super::CompletionItem;
use crate::CompleterContext;

/// Entries of the registry the identifier belongs to
pub fn resource_location(node: &AstNode, _parents: &[&AstNode], ctx: &CompleterContext<'_>) -> Vec<CompletionItem> {
    let Some(category) = node.resource_location().and_then(|id| id.category.as_deref()) else {
        return Vec::new();
    };
    ctx.registry
        .registry_entries(category)
        .into_iter()
        .map(|entry| CompletionItem::value(entry, node.range))
        .collect()
}
