//! Lazy resolution of indirect references
//!
//! A node built from a `{"$Type": ..., "num": n}` fragment is expanded the
//! first time it is activated: the description of object `n` is requested
//! from the analyzer and spliced in place of the node's children.

use tracing::{debug, info, instrument, warn};

use super::tree_builder::{TreeBuilder, SPLICE_DEPTH};
use crate::{
    analyzer::{request, PdfAnalyzer, Request},
    error::{Error, Result},
    session::DocumentSession,
    types::{ExplorerTree, NodeId, StructuralValue},
};

/// What a resolution attempt did to the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Children were replaced by the description of `object_number`
    Resolved {
        object_number: u32,
        children: Vec<NodeId>,
    },
    /// The analyzer had nothing for `object_number`; children were cleared
    Empty { object_number: u32 },
    AlreadyResolved,
    NotAReference,
}

impl ResolveOutcome {
    /// True when the tree was modified.
    pub fn changed_tree(&self) -> bool {
        matches!(
            self,
            ResolveOutcome::Resolved { .. } | ResolveOutcome::Empty { .. }
        )
    }
}

/// Expands reference nodes using a [`TreeBuilder`]
#[derive(Debug, Clone, Default)]
pub struct ReferenceResolver {
    builder: TreeBuilder,
}

impl ReferenceResolver {
    pub fn new(builder: TreeBuilder) -> Self {
        Self { builder }
    }

    /// Resolves `node` if it is an unresolved reference.
    ///
    /// The caller is responsible for checking that `session` is live. Until
    /// the analyzer answers, any failure leaves the node untouched.
    #[instrument(skip(self, analyzer, session, tree), fields(handle = %session.handle))]
    pub fn resolve<A: PdfAnalyzer + ?Sized>(
        &self,
        analyzer: &mut A,
        session: &DocumentSession,
        tree: &mut ExplorerTree,
        node: NodeId,
    ) -> Result<ResolveOutcome> {
        if tree.handle() != session.handle {
            return Err(Error::StaleTree);
        }

        let current = tree.get(node)?;
        let Some(reference) = current.reference.as_ref() else {
            return Ok(ResolveOutcome::NotAReference);
        };
        if reference.resolved {
            debug!("Node {} already resolved", node);
            return Ok(ResolveOutcome::AlreadyResolved);
        }
        if !reference.is_unresolved_reference() {
            return Ok(ResolveOutcome::NotAReference);
        }
        let Some(object_number) = reference.target_number() else {
            warn!("Node {} ({}) has no usable object number", node, current.label);
            return Err(Error::ReferenceUnresolvable(current.label.clone()));
        };

        let bytes = request(analyzer, session.handle, Request::Object(object_number))?;

        tree.clear_children(node)?;
        let outcome = if bytes.is_empty() {
            debug!("Object {} has no description", object_number);
            ResolveOutcome::Empty { object_number }
        } else {
            let value = StructuralValue::from_slice_lossy(&bytes);
            self.builder
                .build(tree, Some(node), &value, "", false, SPLICE_DEPTH);
            ResolveOutcome::Resolved {
                object_number,
                children: tree.children(node).to_vec(),
            }
        };

        let resolved = tree.get_mut(node)?;
        resolved.label = format!("{} ({} 0 R)", resolved.label, object_number);
        if let Some(reference) = resolved.reference.as_mut() {
            reference.object_index = Some(object_number);
            reference.resolved = true;
        }
        info!("Resolved {} as object {}", node, object_number);
        Ok(outcome)
    }
}
