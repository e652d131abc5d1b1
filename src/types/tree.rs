//! Display tree
//!
//! Nodes live in an arena owned by [`ExplorerTree`] and refer to each other by
//! [`NodeId`]. Resolution replaces a node's child list in place; the nodes it
//! replaces stay in the arena but are no longer reachable from the roots, so
//! ids held by a display layer never dangle.

use std::fmt;

use crate::{
    error::{Error, Result},
    session::Handle,
    types::value::{StructuralMap, StructuralValue},
};

/// Key whose presence marks a structural fragment as an indirect reference
pub const REFERENCE_TYPE_KEY: &str = "$Type";

/// Key carrying the target object number of an indirect reference
pub const REFERENCE_NUMBER_KEY: &str = "num";

/// Index of a node inside an [`ExplorerTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a node was rendered from a scalar or from a composite value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Branch,
}

/// Metadata attached to nodes that stand for a PDF object boundary
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectReference {
    /// Object number used for stream retrieval
    pub object_index: Option<u32>,
    /// Raw fragment the node was built from
    pub source_object: Option<StructuralMap>,
    /// Set once, the first time resolution runs for the node
    pub resolved: bool,
}

impl ObjectReference {
    /// True when the fragment is an indirect reference that has not been resolved yet.
    pub fn is_unresolved_reference(&self) -> bool {
        !self.resolved
            && self
                .source_object
                .as_ref()
                .is_some_and(|map| map.contains_key(REFERENCE_TYPE_KEY))
    }

    /// Target object number named by the fragment, if it parses.
    ///
    /// Numbers past `i32::MAX` cannot be passed to the analyzer and yield `None`.
    pub fn target_number(&self) -> Option<u32> {
        self.source_object
            .as_ref()
            .and_then(|map| map.get(REFERENCE_NUMBER_KEY))
            .and_then(StructuralValue::as_object_number)
            .filter(|&n| i32::try_from(n).is_ok())
    }
}

/// A single entry of the navigable tree
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayNode {
    pub label: String,
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub reference: Option<ObjectReference>,
    /// Flagged by the top-level object-index heuristic
    pub candidate: bool,
    /// Array position recorded for candidate nodes
    pub candidate_index: Option<u32>,
}

impl DisplayNode {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: NodeKind::Leaf,
            children: Vec::new(),
            parent: None,
            reference: None,
            candidate: false,
            candidate_index: None,
        }
    }

    pub fn branch(label: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Branch,
            ..Self::leaf(label)
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Leaf
    }

    /// True when activating the node would trigger a resolution.
    pub fn needs_resolution(&self) -> bool {
        self.reference
            .as_ref()
            .is_some_and(ObjectReference::is_unresolved_reference)
    }

    /// Object number to use when fetching this node's stream.
    pub fn stream_target(&self) -> Option<u32> {
        self.reference
            .as_ref()
            .and_then(|r| r.object_index)
            .or(self.candidate_index)
    }
}

/// Arena-backed tree bound to the session handle it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerTree {
    handle: Handle,
    nodes: Vec<DisplayNode>,
    roots: Vec<NodeId>,
}

impl ExplorerTree {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&DisplayNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut DisplayNode> {
        self.nodes.get_mut(id.0)
    }

    /// Like [`node`](Self::node) but reports a missing id as an error.
    pub fn get(&self, id: NodeId) -> Result<&DisplayNode> {
        self.node(id).ok_or(Error::NodeNotFound(id.0))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut DisplayNode> {
        self.nodes.get_mut(id.0).ok_or(Error::NodeNotFound(id.0))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Appends a node under `parent`, or as a root when `parent` is `None`.
    pub fn push(&mut self, parent: Option<NodeId>, mut node: DisplayNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = parent;
        self.nodes.push(node);
        match parent.and_then(|p| self.nodes.get_mut(p.0)) {
            Some(parent_node) => parent_node.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Detaches every child of `id`, leaving it childless.
    pub fn clear_children(&mut self, id: NodeId) -> Result<Vec<NodeId>> {
        let node = self.get_mut(id)?;
        Ok(std::mem::take(&mut node.children))
    }

    /// Depth-first walk over reachable nodes, yielding each id with its depth.
    pub fn walk(&self) -> Walk<'_> {
        let stack = self.roots.iter().rev().map(|&id| (id, 0)).collect();
        Walk { tree: self, stack }
    }

    /// Ids on the path from a root down to `id`, inclusive.
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            path.push(current);
            cursor = self.node(current).and_then(|n| n.parent);
        }
        path.reverse();
        path
    }

    /// Number of reachable leaves.
    pub fn leaf_count(&self) -> usize {
        self.walk()
            .filter(|(id, _)| self.node(*id).is_some_and(DisplayNode::is_leaf))
            .count()
    }

    /// First reachable node whose label equals `label`.
    pub fn find_by_label(&self, label: &str) -> Option<NodeId> {
        self.walk()
            .map(|(id, _)| id)
            .find(|id| self.node(*id).is_some_and(|n| n.label == label))
    }
}

/// Iterator returned by [`ExplorerTree::walk`]
pub struct Walk<'a> {
    tree: &'a ExplorerTree,
    stack: Vec<(NodeId, usize)>,
}

impl Iterator for Walk<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().map(|&c| (c, depth + 1)));
        Some((id, depth))
    }
}
