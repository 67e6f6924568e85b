//! Node identity and the parent-assignment pass
//!
//! Children are owned by their parent. The back-reference from a node to its
//! parent is a [`NodeId`], written once by [`set_parents`] after parsing.
//! [`NodeIndex`] is a rebuildable lookup table over those ids.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{AstNode, Range};

/// Deepest collection nesting that parsers build and checkers descend into
pub const MAX_NESTING: usize = 128;

/// Identity of a node within one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Id of a node that has not been through [`set_parents`]
    pub const DETACHED: NodeId = NodeId(u32::MAX);

    pub fn is_detached(self) -> bool {
        self == Self::DETACHED
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::DETACHED
    }
}

/// Hands out node ids in pre-order
#[derive(Debug, Clone, Default)]
pub struct NodeIdAllocator {
    next: u32,
}

impl NodeIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An allocator continuing after the highest id already used in `root`
    pub fn after(root: &AstNode) -> Self {
        let mut max = None;
        walk(root, &mut |node| {
            if !node.id.is_detached() {
                max = Some(max.map_or(node.id.0, |m: u32| m.max(node.id.0)));
            }
        });
        Self {
            next: max.map_or(0, |m| m + 1),
        }
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far
    pub fn count(&self) -> u32 {
        self.next
    }
}

/// Assign ids and parent links to a freshly parsed tree
pub fn set_parents(root: &mut AstNode) -> NodeIdAllocator {
    let mut ids = NodeIdAllocator::new();
    set_parents_under(root, None, &mut ids);
    ids
}

/// Assign ids and parent links to `node` as a child of `parent`.
///
/// Used for the document root and for sub-documents spliced into an
/// already numbered tree.
pub fn set_parents_under(node: &mut AstNode, parent: Option<NodeId>, ids: &mut NodeIdAllocator) {
    node.id = ids.next_id();
    node.parent = parent;
    let id = node.id;
    for child in &mut node.children {
        set_parents_under(child, Some(id), ids);
    }
}

/// Find a node by id
pub fn find_node(root: &AstNode, id: NodeId) -> Option<&AstNode> {
    if root.id == id {
        return Some(root);
    }
    root.children.iter().find_map(|child| find_node(child, id))
}

/// Parent of `node` inside the tree rooted at `root`
pub fn parent_of<'a>(root: &'a AstNode, node: &AstNode) -> Option<&'a AstNode> {
    node.parent.and_then(|parent| find_node(root, parent))
}

fn walk(node: &AstNode, f: &mut impl FnMut(&AstNode)) {
    f(node);
    for child in &node.children {
        walk(child, f);
    }
}

/// What the index remembers about a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub parent: Option<NodeId>,
    pub tag: &'static str,
    pub range: Range,
}

/// Id → parent/tag lookup built from a tree after [`set_parents`]
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    entries: HashMap<NodeId, IndexEntry>,
}

impl NodeIndex {
    pub fn build(root: &AstNode) -> Self {
        let mut index = Self::default();
        index.extend(root);
        index
    }

    /// Add every node of `node`'s subtree
    pub fn extend(&mut self, node: &AstNode) {
        walk(node, &mut |n| {
            if !n.id.is_detached() {
                self.entries.insert(
                    n.id,
                    IndexEntry {
                        parent: n.parent,
                        tag: n.kind.tag(),
                        range: n.range,
                    },
                );
            }
        });
    }

    pub fn get(&self, id: NodeId) -> Option<&IndexEntry> {
        self.entries.get(&id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entries.get(&id).and_then(|entry| entry.parent)
    }

    pub fn tag(&self, id: NodeId) -> Option<&'static str> {
        self.entries.get(&id).map(|entry| entry.tag)
    }

    /// Ancestors of `id`, innermost first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
