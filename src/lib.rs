//! Main Library File for the PDF tree explorer
//! Renders a document's object graph as a navigable tree, expands indirect
//! references lazily and previews or exports object streams.

// Core types and configuration
pub mod config;
pub mod error;
pub mod types;

// Analyzer contract and lopdf backend
pub mod analyzer;

// Document sessions
pub mod session;

// Tree construction and reference resolution
pub mod structure;

// Stream preview and export
pub mod content;

// Facade and asynchronous adapter
pub mod explorer;
pub mod worker;

// Tree rendering
pub mod report;

// Shared Utilities
pub mod utils;

// Re-exports for crate consumers
pub use analyzer::{LopdfAnalyzer, PdfAnalyzer, Request};
pub use config::ExplorerConfig;
pub use content::StreamPreview;
pub use error::{AnalyzerError, Error, Result, StructureError};
pub use explorer::{ActivationOutcome, AnalysisMode, Explorer};
pub use report::{TreeFormat, TreeFormatter};
pub use session::{DocumentSession, Handle, SessionManager};
pub use structure::{ReferenceResolver, ResolveOutcome, TreeBuilder};
pub use types::{DisplayNode, ExplorerTree, NodeId, NodeKind, ObjectReference, StructuralValue};
pub use utils::{Logger, UtilityConfig};
pub use worker::ExplorerWorker;
