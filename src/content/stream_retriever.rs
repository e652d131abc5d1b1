//! Stream retrieval
//!
//! Streams are fetched on demand and never cached. An empty byte sequence
//! means the object has no stream attached: no preview is produced and no
//! file is written.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    analyzer::{request, PdfAnalyzer, Request},
    error::Result,
    session::DocumentSession,
    utils::write_file,
};

/// Default preview cap, in characters
pub const PREVIEW_CHAR_CAP: usize = 1 << 16;

/// Text shown for a stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamPreview {
    pub object_index: u32,
    pub text: String,
    /// Set when `text` does not hold the whole stream
    pub truncated: bool,
    pub total_bytes: usize,
}

/// Fetches the raw stream bytes of `object_index`, possibly empty.
#[instrument(skip(analyzer, session), fields(handle = %session.handle))]
pub fn fetch_stream<A: PdfAnalyzer + ?Sized>(
    analyzer: &mut A,
    session: &DocumentSession,
    object_index: u32,
) -> Result<Vec<u8>> {
    let bytes = request(analyzer, session.handle, Request::ObjectStream(object_index))?;
    debug!("Object {} stream holds {} bytes", object_index, bytes.len());
    Ok(bytes)
}

/// Builds a text preview of at most `cap` characters.
///
/// Lines are re-terminated with `\n`; accumulation stops once the text
/// passes the cap and the result is clipped to exactly `cap` characters.
pub fn preview(object_index: u32, bytes: &[u8], cap: usize) -> Option<StreamPreview> {
    if bytes.is_empty() {
        return None;
    }

    let decoded = String::from_utf8_lossy(bytes);
    let mut text = String::new();
    let mut chars = 0usize;
    let mut stopped_early = false;
    for line in decoded.lines() {
        if chars > cap {
            stopped_early = true;
            break;
        }
        text.push_str(line);
        text.push('\n');
        chars += line.chars().count() + 1;
    }

    let clipped = chars > cap;
    if clipped {
        if let Some((offset, _)) = text.char_indices().nth(cap) {
            text.truncate(offset);
        }
    }

    Some(StreamPreview {
        object_index,
        text,
        truncated: clipped || stopped_early,
        total_bytes: bytes.len(),
    })
}

/// Writes `bytes` verbatim to `destination`.
///
/// Returns the number of bytes written, or `None` when there was nothing to
/// write.
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub fn export(bytes: &[u8], destination: &Path) -> Result<Option<u64>> {
    if bytes.is_empty() {
        debug!("Nothing to export");
        return Ok(None);
    }
    write_file(destination, bytes)?;
    info!("Exported {} bytes to {}", bytes.len(), destination.display());
    Ok(Some(bytes.len() as u64))
}

/// `<document stem>_obj<index>.txt`
pub fn default_export_name(document_path: &Path, object_index: u32) -> PathBuf {
    let stem = document_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    PathBuf::from(format!("{}_obj{}.txt", stem, object_index))
}
