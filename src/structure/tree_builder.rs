//! Structural value to display tree conversion
//!
//! Arrays become `[i]` nodes, objects become keyed nodes carrying an
//! [`ObjectReference`], scalars become `label : value` leaves. Any input
//! yields a tree; nothing here fails.
//!
//! One positional heuristic is applied while rendering the outermost array of
//! a whole-document description: element `[1]` holds the object table, so it
//! and everything below it are flagged as object-index candidates. The direct
//! entries of that table record their position as a candidate object number;
//! arrays nested further down do not. It assumes that specific document shape
//! and is not a general PDF rule.

use tracing::{debug, trace};

use crate::{
    analyzer::describe::{CONTENTS_NUMBER_KEY, RESOURCES_NUMBER_KEY},
    session::Handle,
    types::{DisplayNode, ExplorerTree, NodeId, ObjectReference, StructuralValue},
};

/// Depth at which the top-level value of an initial build is processed
pub const ROOT_DEPTH: usize = 1;

/// Depth used when splicing a resolved object; disables the root heuristic
pub const SPLICE_DEPTH: usize = 2;

/// Default recursion limit
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Builds display nodes from structural values
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    max_depth: usize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Values nested deeper than `max_depth` render as a single compact leaf.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(SPLICE_DEPTH);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Renders a whole description into a fresh tree bound to `handle`.
    pub fn build_document(&self, handle: Handle, value: &StructuralValue) -> ExplorerTree {
        let mut tree = ExplorerTree::new(handle);
        self.build(&mut tree, None, value, "", false, ROOT_DEPTH);
        debug!(
            "Built tree with {} nodes, {} leaves",
            tree.arena_len(),
            tree.leaf_count()
        );
        tree
    }

    /// Appends the nodes for `value` under `parent` (or as roots).
    ///
    /// `key_label` only matters for a scalar `value`; `candidate` is the
    /// inherited heuristic flag.
    pub fn build(
        &self,
        tree: &mut ExplorerTree,
        parent: Option<NodeId>,
        value: &StructuralValue,
        key_label: &str,
        candidate: bool,
        depth: usize,
    ) {
        match value {
            StructuralValue::Array(items) => {
                // Only the elements of the `[1]` table itself are object slots.
                let object_table = candidate && depth == ROOT_DEPTH + 1;
                for (i, item) in items.iter().enumerate() {
                    let flag = candidate || (depth == ROOT_DEPTH && i == 1);
                    let label = format!("[{}]", i);
                    let mut node = if item.is_composite() {
                        DisplayNode::branch(label)
                    } else {
                        DisplayNode::leaf(format!("{} : {}", label, item.display_text()))
                    };
                    node.candidate = flag;
                    if object_table {
                        node.candidate_index = u32::try_from(i).ok();
                    }
                    let id = tree.push(parent, node);
                    if item.is_composite() {
                        self.descend(tree, id, item, flag, depth);
                    }
                }
            }
            StructuralValue::Object(map) => {
                for (key, item) in map {
                    if item.is_composite() {
                        let mut node = DisplayNode::branch(key.clone());
                        node.candidate = candidate;
                        node.reference = Some(reference_for(item));
                        let id = tree.push(parent, node);
                        self.descend(tree, id, item, candidate, depth);
                    } else {
                        let mut node =
                            DisplayNode::leaf(format!("{} : {}", key, item.display_text()));
                        node.candidate = candidate;
                        tree.push(parent, node);
                    }
                }
            }
            scalar => {
                let text = scalar.display_text();
                let label = if key_label.is_empty() {
                    text
                } else {
                    format!("{} : {}", key_label, text)
                };
                let mut node = DisplayNode::leaf(label);
                node.candidate = candidate;
                tree.push(parent, node);
            }
        }
    }

    fn descend(
        &self,
        tree: &mut ExplorerTree,
        id: NodeId,
        value: &StructuralValue,
        candidate: bool,
        depth: usize,
    ) {
        if depth >= self.max_depth {
            trace!("Depth limit {} reached at {}", self.max_depth, id);
            let mut node = DisplayNode::leaf(value.display_text());
            node.candidate = candidate;
            tree.push(Some(id), node);
            return;
        }
        self.build(tree, Some(id), value, "", candidate, depth + 1);
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Reference metadata for a keyed composite value.
fn reference_for(value: &StructuralValue) -> ObjectReference {
    let object_index = value
        .get(CONTENTS_NUMBER_KEY)
        .and_then(StructuralValue::as_object_number)
        .or_else(|| {
            value
                .get(RESOURCES_NUMBER_KEY)
                .and_then(StructuralValue::as_object_number)
        });
    ObjectReference {
        object_index,
        source_object: value.as_object().cloned(),
        resolved: false,
    }
}
