//! Tree formatter implementation

use serde_json::{json, Map, Value};

use super::TreeFormat;
use crate::{
    error::{Result, StructureError},
    types::{ExplorerTree, NodeId},
};

/// Renders an [`ExplorerTree`] as indented text or nested JSON
#[derive(Debug, Clone, Default)]
pub struct TreeFormatter {
    max_depth: Option<usize>,
}

impl TreeFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hides nodes deeper than `depth` (roots are depth 0).
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn format(&self, tree: &ExplorerTree, format: TreeFormat) -> Result<String> {
        match format {
            TreeFormat::Text => Ok(self.to_text(tree)),
            TreeFormat::Json => self.to_json(tree),
        }
    }

    fn visible(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth <= max)
    }

    /// One node per line: `<indent><id> <label>` plus markers.
    ///
    /// `[ref]` marks an unresolved reference, `[stream N]` the object whose
    /// stream the node maps to.
    fn to_text(&self, tree: &ExplorerTree) -> String {
        let mut output = String::new();
        for (id, depth) in tree.walk() {
            if !self.visible(depth) {
                continue;
            }
            let Some(node) = tree.node(id) else { continue };
            output.push_str(&"  ".repeat(depth));
            output.push_str(&format!("{} {}", id, node.label));
            if node.needs_resolution() {
                output.push_str(" [ref]");
            }
            if let Some(target) = node.stream_target() {
                output.push_str(&format!(" [stream {}]", target));
            }
            output.push('\n');
        }
        output
    }

    fn to_json(&self, tree: &ExplorerTree) -> Result<String> {
        let roots: Vec<Value> = tree
            .roots()
            .iter()
            .map(|&id| self.node_json(tree, id, 0))
            .collect();
        let document = json!({
            "handle": tree.handle().raw(),
            "nodes": roots,
        });
        serde_json::to_string_pretty(&document)
            .map_err(|e| StructureError::InvalidJson(e.to_string()).into())
    }

    fn node_json(&self, tree: &ExplorerTree, id: NodeId, depth: usize) -> Value {
        let mut map = Map::new();
        map.insert("id".into(), json!(id.0));
        let Some(node) = tree.node(id) else {
            return Value::Object(map);
        };
        map.insert("label".into(), json!(node.label));
        if node.candidate {
            map.insert("candidate".into(), json!(true));
        }
        if node.needs_resolution() {
            map.insert("unresolved".into(), json!(true));
        }
        if let Some(target) = node.stream_target() {
            map.insert("stream".into(), json!(target));
        }
        if !node.children.is_empty() && self.visible(depth + 1) {
            let children: Vec<Value> = node
                .children
                .iter()
                .map(|&child| self.node_json(tree, child, depth + 1))
                .collect();
            map.insert("children".into(), Value::Array(children));
        }
        Value::Object(map)
    }
}
