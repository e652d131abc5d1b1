//! Error types and handling for the PDF tree explorer

use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Custom result type for explorer operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type for explorer operations
#[derive(Error, Debug)]
#[non_exhaustive]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    /// The analyzer returned the null handle for a document
    #[error("Failed to open document: {0}")]
    OpenFailed(String),

    /// An operation needed a live document session and there was none
    #[error("No active document session")]
    NoActiveSession,

    #[error("Malformed structural description: {0}")]
    MalformedStructure(#[from] StructureError),

    /// A reference node had no usable object number
    #[error("Reference cannot be resolved: {0}")]
    ReferenceUnresolvable(String),

    #[error("Analyzer error: {0}")]
    AnalyzerError(#[from] AnalyzerError),

    #[error("Node not found: {0}")]
    NodeNotFound(usize),

    /// The tree was built for a handle that is no longer live
    #[error("Tree belongs to a closed document session")]
    StaleTree,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Worker error: {0}")]
    WorkerError(String),
}

// -------------------- Sub-Error Categories --------------------

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StructureError {
    #[error("Description is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("Description is not valid JSON: {0}")]
    InvalidJson(String),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AnalyzerError {
    #[error("Unknown document handle: {0}")]
    UnknownHandle(u64),

    #[error("Fetch buffer holds {actual} bytes, {expected} pending")]
    BufferMismatch { expected: usize, actual: usize },

    #[error("Failed to save document: {0}")]
    SaveFailed(String),

    #[error("Backend failure: {0}")]
    Backend(String),
}
