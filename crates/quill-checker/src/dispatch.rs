//! Top-level binding and checking passes

use quill_ast::{traverse_pre_order, AstNode, MAX_NESTING};

use crate::CheckerContext;

/// Each collection level adds at most a pair and a value node
const MAX_TREE_DEPTH: usize = 4 * MAX_NESTING;

/// Run the registered checker of every shallowest node that has one.
///
/// Nodes without a checker are descended into. The pass stops early once the
/// context is cancelled; diagnostics already reported stay valid.
pub fn dispatch(node: &mut AstNode, ctx: &mut CheckerContext<'_>) {
    dispatch_at(node, ctx, 0);
}

fn dispatch_at(node: &mut AstNode, ctx: &mut CheckerContext<'_>, depth: usize) {
    if ctx.cancel.is_cancelled() {
        tracing::debug!("check cancelled");
        return;
    }
    if depth > MAX_TREE_DEPTH {
        tracing::debug!(range = ?node.range, "tree nested too deeply");
        return;
    }
    let meta = ctx.meta;
    if let Some(checker) = meta.checker(node.kind.tag()) {
        checker(node, ctx);
        return;
    }
    for child in &mut node.children {
        dispatch_at(child, ctx, depth + 1);
    }
}

/// Run the registered binder of every shallowest node that has one
pub fn bind(node: &AstNode, ctx: &mut CheckerContext<'_>) {
    let meta = ctx.meta;
    let cancel = ctx.cancel.clone();
    traverse_pre_order(
        node,
        &mut |_, _| cancel.is_cancelled(),
        &mut |node, _| meta.binder(node.kind.tag()).is_some(),
        &mut |node, _| {
            if let Some(binder) = meta.binder(node.kind.tag()) {
                binder(node, ctx);
            }
        },
    );
}
