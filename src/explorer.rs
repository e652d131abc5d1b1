//! Explorer facade
//!
//! Ties the session manager, tree builder, resolver and stream retriever
//! together behind the operations a presentation layer needs.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    analyzer::{request, PdfAnalyzer, Request},
    config::ExplorerConfig,
    content::{self, StreamPreview},
    error::{Error, Result},
    session::{DocumentSession, SessionManager},
    structure::{ReferenceResolver, ResolveOutcome, TreeBuilder},
    types::{ExplorerTree, NodeId, StructuralValue},
};

/// Which description an initial tree is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Per-page dictionaries with content/resources companions
    #[default]
    Pages,
    /// Trailer, full object table and summary
    Whole,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMode::Pages => f.write_str("pages"),
            AnalysisMode::Whole => f.write_str("whole"),
        }
    }
}

impl FromStr for AnalysisMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pages" => Ok(AnalysisMode::Pages),
            "whole" => Ok(AnalysisMode::Whole),
            other => Err(Error::ConfigError(format!("Unknown analysis mode: {}", other))),
        }
    }
}

/// Result of activating a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationOutcome {
    /// `None` when resolution was not attempted
    pub resolution: Option<ResolveOutcome>,
    /// Object number whose stream belongs to the node, after any resolution
    pub stream_target: Option<u32>,
}

/// Presentation-facing entry point
pub struct Explorer<A: PdfAnalyzer> {
    sessions: SessionManager<A>,
    builder: TreeBuilder,
    resolver: ReferenceResolver,
    config: ExplorerConfig,
}

impl<A: PdfAnalyzer> Explorer<A> {
    pub fn new(analyzer: A, config: ExplorerConfig) -> Self {
        let builder = TreeBuilder::new().with_max_depth(config.max_tree_depth);
        Self {
            sessions: SessionManager::new(analyzer),
            resolver: ReferenceResolver::new(builder.clone()),
            builder,
            config,
        }
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn current_session(&self) -> Option<&DocumentSession> {
        self.sessions.current()
    }

    pub fn analyzer(&self) -> &A {
        self.sessions.analyzer()
    }

    /// Opens a document, replacing any open one.
    pub fn open_session(&mut self, path: &Path) -> Result<DocumentSession> {
        self.sessions.open(path)
    }

    /// Builds the tree for the whole document or for its pages.
    ///
    /// An empty description yields an empty tree; a malformed one yields a
    /// single leaf holding its text.
    #[instrument(skip(self, session), fields(handle = %session.handle))]
    pub fn build_initial_tree(
        &mut self,
        session: &DocumentSession,
        mode: AnalysisMode,
    ) -> Result<ExplorerTree> {
        self.sessions.ensure_live(session)?;
        let kind = match mode {
            AnalysisMode::Pages => Request::Pages,
            AnalysisMode::Whole => Request::Whole,
        };
        let bytes = request(self.sessions.analyzer_mut(), session.handle, kind)?;
        if bytes.is_empty() {
            warn!("Analyzer returned no {} description", mode);
            return Ok(ExplorerTree::new(session.handle));
        }

        let value = StructuralValue::from_slice_lossy(&bytes);
        let tree = self.builder.build_document(session.handle, &value);
        info!("Built {} tree with {} nodes", mode, tree.arena_len());
        Ok(tree)
    }

    /// Handles a node activation, resolving it first when `auto_resolve` is set.
    pub fn on_node_activated(
        &mut self,
        tree: &mut ExplorerTree,
        node: NodeId,
        session: &DocumentSession,
        auto_resolve: bool,
    ) -> Result<ActivationOutcome> {
        self.sessions.ensure_live(session)?;
        if tree.handle() != session.handle {
            return Err(Error::StaleTree);
        }

        let needs_resolution = tree.get(node)?.needs_resolution();
        let resolution = if auto_resolve && needs_resolution {
            Some(
                self.resolver
                    .resolve(self.sessions.analyzer_mut(), session, tree, node)?,
            )
        } else {
            debug!("Activated {} without resolution", node);
            None
        };

        Ok(ActivationOutcome {
            resolution,
            stream_target: tree.get(node)?.stream_target(),
        })
    }

    /// Preview of an object's stream, `None` when it has none.
    pub fn get_stream_for_preview(
        &mut self,
        session: &DocumentSession,
        object_index: u32,
    ) -> Result<Option<StreamPreview>> {
        let bytes = self.get_stream_for_export(session, object_index)?;
        Ok(content::preview(
            object_index,
            &bytes,
            self.config.preview_char_cap,
        ))
    }

    /// Full stream bytes of an object, empty when it has none.
    pub fn get_stream_for_export(
        &mut self,
        session: &DocumentSession,
        object_index: u32,
    ) -> Result<Vec<u8>> {
        self.sessions.ensure_live(session)?;
        content::fetch_stream(self.sessions.analyzer_mut(), session, object_index)
    }

    /// Writes an object's stream to `destination`, or to the default export
    /// path when none is given. Returns the path written, if any.
    pub fn export_stream(
        &mut self,
        session: &DocumentSession,
        object_index: u32,
        destination: Option<&Path>,
    ) -> Result<Option<PathBuf>> {
        let bytes = self.get_stream_for_export(session, object_index)?;
        let path = match destination {
            Some(path) => path.to_path_buf(),
            None => {
                let name = content::default_export_name(&session.file_path, object_index);
                match &self.config.export_dir {
                    Some(dir) => dir.join(name),
                    None => name,
                }
            }
        };
        Ok(content::export(&bytes, &path)?.map(|_| path))
    }

    pub fn save_session(&mut self, session: &DocumentSession, path: &Path) -> Result<()> {
        self.sessions.save(session, path)
    }

    pub fn close_session(&mut self) {
        self.sessions.close();
    }

    /// Sets `key` in an object's dictionary. `false` when the analyzer refused.
    pub fn update_object_value(
        &mut self,
        session: &DocumentSession,
        object_index: u32,
        key: &str,
        value: &str,
    ) -> Result<bool> {
        self.sessions.ensure_live(session)?;
        let number = object_number_arg(object_index)?;
        Ok(self
            .sessions
            .analyzer_mut()
            .update_object_value(session.handle.raw(), number, key, value))
    }

    /// Replaces an object's stream content. `false` when the analyzer refused.
    pub fn update_object_stream(
        &mut self,
        session: &DocumentSession,
        object_index: u32,
        bytes: &[u8],
    ) -> Result<bool> {
        self.sessions.ensure_live(session)?;
        let number = object_number_arg(object_index)?;
        Ok(self
            .sessions
            .analyzer_mut()
            .update_object_stream(session.handle.raw(), number, bytes))
    }
}

fn object_number_arg(object_index: u32) -> Result<i32> {
    i32::try_from(object_index)
        .map_err(|_| Error::ReferenceUnresolvable(format!("object {}", object_index)))
}
