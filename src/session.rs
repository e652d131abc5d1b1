//! Document session lifecycle
//!
//! A [`SessionManager`] owns the analyzer and at most one live
//! [`DocumentSession`]. Sessions are plain values handed to every operation;
//! the manager checks them against the live one so stale sessions are refused.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use tracing::{debug, info, instrument, warn};

use crate::{
    analyzer::PdfAnalyzer,
    error::{Error, Result},
};

/// Opaque analyzer document handle; zero means "no document"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u64);

impl Handle {
    pub const NULL: Handle = Handle(0);

    pub fn new(raw: u64) -> Self {
        Handle(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// An open document as seen by the explorer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSession {
    pub handle: Handle,
    pub file_path: PathBuf,
}

/// Owns the analyzer and the single live session
pub struct SessionManager<A: PdfAnalyzer> {
    analyzer: A,
    current: Option<DocumentSession>,
}

impl<A: PdfAnalyzer> SessionManager<A> {
    pub fn new(analyzer: A) -> Self {
        Self {
            analyzer,
            current: None,
        }
    }

    /// Opens `path`, closing any previously open document first.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn open(&mut self, path: &Path) -> Result<DocumentSession> {
        self.close();

        let handle = Handle::new(self.analyzer.open_document(path)?);
        if handle.is_null() {
            warn!("Analyzer refused {}", path.display());
            return Err(Error::OpenFailed(path.display().to_string()));
        }

        let session = DocumentSession {
            handle,
            file_path: path.to_path_buf(),
        };
        info!("Opened session {} for {}", handle, path.display());
        self.current = Some(session.clone());
        Ok(session)
    }

    /// Releases the live handle, if any.
    pub fn close(&mut self) {
        if let Some(session) = self.current.take() {
            self.analyzer.close_document(session.handle.raw());
            info!("Closed session {}", session.handle);
        } else {
            debug!("No session to close");
        }
    }

    /// Asks the analyzer to write the live document to `path`.
    #[instrument(skip(self, session), fields(handle = %session.handle))]
    pub fn save(&mut self, session: &DocumentSession, path: &Path) -> Result<()> {
        self.ensure_live(session)?;
        self.analyzer.save_document(session.handle.raw(), path)
    }

    /// Fails with [`Error::NoActiveSession`] unless `session` is the live one.
    pub fn ensure_live(&self, session: &DocumentSession) -> Result<()> {
        match &self.current {
            Some(current) if !session.handle.is_null() && current.handle == session.handle => {
                Ok(())
            }
            _ => Err(Error::NoActiveSession),
        }
    }

    pub fn current(&self) -> Option<&DocumentSession> {
        self.current.as_ref()
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    pub fn analyzer_mut(&mut self) -> &mut A {
        &mut self.analyzer
    }
}

impl<A: PdfAnalyzer> Drop for SessionManager<A> {
    fn drop(&mut self) {
        self.close();
    }
}
