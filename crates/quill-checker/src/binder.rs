//! Symbol binders

use quill_ast::AstNode;

use crate::{CheckerContext, SymbolReference};

/// Record every resource id as a reference into its registry
pub fn resource_location(node: &AstNode, ctx: &mut CheckerContext<'_>) {
    let Some(id) = node.resource_location() else {
        return;
    };
    ctx.references.push(SymbolReference {
        id: id.to_full(),
        category: id.category.clone(),
        range: node.range,
    });
}
