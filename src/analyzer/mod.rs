//! Analyzer contract
//!
//! The analyzer owns the authoritative document model. The explorer talks to
//! it through [`PdfAnalyzer`] using a two-phase protocol: an `analyze_*` call
//! prepares a buffer and returns its length, then [`PdfAnalyzer::fetch`]
//! copies the prepared bytes out. A length of zero means "nothing here".

use std::path::Path;

use tracing::{debug, instrument};

use crate::{
    error::{AnalyzerError, Result},
    session::Handle,
};

pub mod describe;
pub mod lopdf_analyzer;

pub use lopdf_analyzer::LopdfAnalyzer;

/// Operations the explorer needs from a document analyzer.
///
/// Handles are raw `u64` values; `0` is reserved for "no document".
pub trait PdfAnalyzer {
    /// Opens a document, returning its handle or `0` on failure.
    fn open_document(&mut self, path: &Path) -> Result<u64>;

    /// Releases a handle. Unknown handles are ignored.
    fn close_document(&mut self, handle: u64);

    /// Prepares the structural description of the whole document.
    fn analyze_whole(&mut self, handle: u64) -> Result<u64>;

    /// Prepares the page-oriented structural description.
    fn analyze_pages(&mut self, handle: u64) -> Result<u64>;

    /// Prepares the structural description of one object.
    fn analyze_object(&mut self, handle: u64, object_number: i32) -> Result<u64>;

    /// Prepares the raw stream bytes of one object.
    fn analyze_object_stream(&mut self, handle: u64, object_number: i32) -> Result<u64>;

    /// Copies the prepared buffer into `buf`, which must match the announced length.
    fn fetch(&mut self, handle: u64, buf: &mut [u8]) -> Result<()>;

    fn save_document(&mut self, handle: u64, path: &Path) -> Result<()>;

    fn update_object_value(
        &mut self,
        handle: u64,
        object_number: i32,
        key: &str,
        value: &str,
    ) -> bool;

    fn update_object_stream(&mut self, handle: u64, object_number: i32, bytes: &[u8]) -> bool;
}

/// One analyzer request of the length-then-fetch protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Whole,
    Pages,
    Object(u32),
    ObjectStream(u32),
}

/// Runs a request and collects the prepared bytes.
///
/// A zero length yields an empty vector without calling `fetch`.
#[instrument(skip(analyzer))]
pub fn request<A: PdfAnalyzer + ?Sized>(
    analyzer: &mut A,
    handle: Handle,
    request: Request,
) -> Result<Vec<u8>> {
    let raw = handle.raw();
    let len = match request {
        Request::Whole => analyzer.analyze_whole(raw)?,
        Request::Pages => analyzer.analyze_pages(raw)?,
        Request::Object(n) => analyzer.analyze_object(raw, object_number_arg(n)?)?,
        Request::ObjectStream(n) => analyzer.analyze_object_stream(raw, object_number_arg(n)?)?,
    };

    if len == 0 {
        debug!("Analyzer returned an empty result");
        return Ok(Vec::new());
    }

    let len = usize::try_from(len).map_err(|_| {
        AnalyzerError::Backend(format!("Result length {} exceeds address space", len))
    })?;
    let mut buf = vec![0u8; len];
    analyzer.fetch(raw, &mut buf)?;
    debug!("Fetched {} bytes", len);
    Ok(buf)
}

fn object_number_arg(n: u32) -> Result<i32> {
    i32::try_from(n)
        .map_err(|_| AnalyzerError::Backend(format!("Object number {} out of range", n)).into())
}
