//! Offset- and range-based traversal
//!
//! Parent chains handed to callbacks are ordered innermost first: `parents[0]`
//! is the direct parent and the last entry is the root.

use crate::{AstNode, Range};

/// Visit every leaf in document order.
///
/// With a `range`, subtrees whose range does not intersect it are skipped
/// without being descended into.
pub fn traverse_leaves<'a>(
    node: &'a AstNode,
    range: Option<Range>,
    visit: &mut impl FnMut(&'a AstNode, &[&'a AstNode]),
) {
    let mut parents = Vec::new();
    leaves(node, range, visit, &mut parents);
}

fn leaves<'a>(
    node: &'a AstNode,
    range: Option<Range>,
    visit: &mut impl FnMut(&'a AstNode, &[&'a AstNode]),
    parents: &mut Vec<&'a AstNode>,
) {
    if let Some(range) = range {
        if !node.range.intersects(range) {
            return;
        }
    }
    if node.children.is_empty() {
        visit(node, parents);
        return;
    }
    parents.insert(0, node);
    for child in &node.children {
        leaves(child, range, visit, parents);
    }
    parents.remove(0);
}

/// Depth-first pre-order walk that stops at the shallowest match.
///
/// `stop` is checked first and prunes the subtree without a visit. Otherwise a
/// node satisfying `matches` is visited and its subtree is not entered.
pub fn traverse_pre_order<'a>(
    node: &'a AstNode,
    stop: &mut impl FnMut(&'a AstNode, &[&'a AstNode]) -> bool,
    matches: &mut impl FnMut(&'a AstNode, &[&'a AstNode]) -> bool,
    visit: &mut impl FnMut(&'a AstNode, &[&'a AstNode]),
) {
    let mut parents = Vec::new();
    pre_order(node, stop, matches, visit, &mut parents);
}

fn pre_order<'a>(
    node: &'a AstNode,
    stop: &mut impl FnMut(&'a AstNode, &[&'a AstNode]) -> bool,
    matches: &mut impl FnMut(&'a AstNode, &[&'a AstNode]) -> bool,
    visit: &mut impl FnMut(&'a AstNode, &[&'a AstNode]),
    parents: &mut Vec<&'a AstNode>,
) {
    if stop(node, parents) {
        return;
    }
    if matches(node, parents) {
        visit(node, parents);
        return;
    }
    parents.insert(0, node);
    for child in &node.children {
        pre_order(child, stop, matches, visit, parents);
    }
    parents.remove(0);
}

/// The node selected by a cursor and its parent chain
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub leaf: &'a AstNode,
    /// Innermost first, root last
    pub parents: Vec<&'a AstNode>,
}

/// Deepest node whose range contains `offset` (end-inclusive).
///
/// Returns `None` when the offset lies outside the root. When two adjacent
/// children both touch the offset the earlier one wins.
pub fn selected_leaf(node: &AstNode, offset: usize) -> Option<Selection<'_>> {
    if !node.range.contains_inclusive(offset) {
        return None;
    }
    let mut parents = Vec::new();
    let mut current = node;
    while let Some(child) = child_at(current, offset) {
        parents.insert(0, current);
        current = child;
    }
    Some(Selection {
        leaf: current,
        parents,
    })
}

/// Deepest node containing `offset`, without its parent chain
pub fn selected_node(node: &AstNode, offset: usize) -> Option<&AstNode> {
    selected_leaf(node, offset).map(|selection| selection.leaf)
}

/// First child containing `offset`, found by binary search over the sorted children
pub fn child_at(node: &AstNode, offset: usize) -> Option<&AstNode> {
    let index = node.children.partition_point(|child| child.range.end < offset);
    node.children
        .get(index)
        .filter(|child| child.range.contains_inclusive(offset))
}
