//! lopdf-backed analyzer
//!
//! Keeps every opened document in memory, keyed by handle. Each `analyze_*`
//! call serializes its result into the handle's pending buffer, which the
//! next `fetch` drains.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use lopdf::{Document, Object, ObjectId};
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument, warn};

use super::{
    describe::{
        describe_dictionary, describe_object, parse_object_text, CONTENTS_NUMBER_KEY,
        RESOURCES_NUMBER_KEY,
    },
    PdfAnalyzer,
};
use crate::error::{AnalyzerError, Result};

/// Upper bound on the dense object table emitted by `analyze_whole`
const MAX_OBJECT_TABLE: usize = 1 << 20;

struct LoadedDocument {
    path: PathBuf,
    document: Document,
    pending: Vec<u8>,
}

/// In-process analyzer built on `lopdf::Document`
pub struct LopdfAnalyzer {
    documents: HashMap<u64, LoadedDocument>,
    next_handle: u64,
}

impl LopdfAnalyzer {
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            next_handle: 1,
        }
    }

    /// Number of documents currently held open.
    pub fn open_count(&self) -> usize {
        self.documents.len()
    }

    /// Path a handle was opened from.
    pub fn document_path(&self, handle: u64) -> Option<&Path> {
        self.documents.get(&handle).map(|d| d.path.as_path())
    }

    fn loaded(&mut self, handle: u64) -> Result<&mut LoadedDocument> {
        self.documents
            .get_mut(&handle)
            .ok_or_else(|| AnalyzerError::UnknownHandle(handle).into())
    }

    fn stage(&mut self, handle: u64, bytes: Vec<u8>) -> Result<u64> {
        let loaded = self.loaded(handle)?;
        loaded.pending = bytes;
        Ok(loaded.pending.len() as u64)
    }

    fn stage_json(&mut self, handle: u64, value: &Value) -> Result<u64> {
        let bytes = serde_json::to_vec(value).map_err(|e| AnalyzerError::Backend(e.to_string()))?;
        self.stage(handle, bytes)
    }

    fn document(&mut self, handle: u64) -> Result<&Document> {
        Ok(&self.loaded(handle)?.document)
    }
}

impl Default for LopdfAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowest-generation id carrying the given object number.
fn lookup_id(document: &Document, object_number: i32) -> Option<ObjectId> {
    let number = u32::try_from(object_number).ok()?;
    document
        .objects
        .range((number, 0)..=(number, u16::MAX))
        .next()
        .map(|(id, _)| *id)
}

fn whole_description(document: &Document) -> Value {
    let header = json!({
        "Version": document.version,
        "Trailer": Value::Object(describe_dictionary(&document.trailer)),
    });

    let max_number = document.objects.keys().map(|(n, _)| *n as usize).max().unwrap_or(0);
    let table_len = (max_number + 1).min(MAX_OBJECT_TABLE);
    if max_number >= MAX_OBJECT_TABLE {
        warn!("Object table truncated at {} entries", MAX_OBJECT_TABLE);
    }

    let mut objects = vec![Value::Null; table_len];
    // Reverse order so the lowest generation of a number wins.
    for ((number, _), object) in document.objects.iter().rev() {
        if let Some(slot) = objects.get_mut(*number as usize) {
            *slot = describe_object(object);
        }
    }

    let summary = json!({
        "Objects": document.objects.len(),
        "Pages": document.get_pages().len(),
        "MaxId": document.max_id,
    });

    Value::Array(vec![header, Value::Array(objects), summary])
}

fn pages_description(document: &Document) -> Value {
    let mut pages = Map::new();
    for (page_number, page_id) in document.get_pages() {
        let mut entry = document
            .get_dictionary(page_id)
            .map(describe_dictionary)
            .unwrap_or_default();

        if let Some((contents_number, _)) = document.get_page_contents(page_id).first() {
            entry.insert(CONTENTS_NUMBER_KEY.into(), json!(contents_number));
        }
        if let Ok(Object::Reference((resources_number, _))) = document
            .get_dictionary(page_id)
            .and_then(|dict| dict.get(b"Resources"))
        {
            entry.insert(RESOURCES_NUMBER_KEY.into(), json!(resources_number));
        }

        pages.insert(format!("Page {}", page_number), Value::Object(entry));
    }
    Value::Object(pages)
}

impl PdfAnalyzer for LopdfAnalyzer {
    #[instrument(skip(self))]
    fn open_document(&mut self, path: &Path) -> Result<u64> {
        match Document::load(path) {
            Ok(document) => {
                let handle = self.next_handle;
                self.next_handle += 1;
                info!(
                    "Loaded {} ({} objects) as handle {}",
                    path.display(),
                    document.objects.len(),
                    handle
                );
                self.documents.insert(
                    handle,
                    LoadedDocument {
                        path: path.to_path_buf(),
                        document,
                        pending: Vec::new(),
                    },
                );
                Ok(handle)
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                Ok(0)
            }
        }
    }

    fn close_document(&mut self, handle: u64) {
        if self.documents.remove(&handle).is_some() {
            debug!("Released handle {}", handle);
        }
    }

    fn analyze_whole(&mut self, handle: u64) -> Result<u64> {
        let value = whole_description(self.document(handle)?);
        self.stage_json(handle, &value)
    }

    fn analyze_pages(&mut self, handle: u64) -> Result<u64> {
        let value = pages_description(self.document(handle)?);
        self.stage_json(handle, &value)
    }

    #[instrument(skip(self))]
    fn analyze_object(&mut self, handle: u64, object_number: i32) -> Result<u64> {
        let document = self.document(handle)?;
        let value = lookup_id(document, object_number)
            .and_then(|id| document.get_object(id).ok())
            .map(describe_object);
        match value {
            Some(value) => self.stage_json(handle, &value),
            None => {
                debug!("Object {} not present", object_number);
                self.stage(handle, Vec::new())
            }
        }
    }

    #[instrument(skip(self))]
    fn analyze_object_stream(&mut self, handle: u64, object_number: i32) -> Result<u64> {
        let document = self.document(handle)?;
        let object = lookup_id(document, object_number).and_then(|id| document.get_object(id).ok());
        let bytes = match object {
            Some(Object::Stream(stream)) => stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone()),
            _ => Vec::new(),
        };
        self.stage(handle, bytes)
    }

    fn fetch(&mut self, handle: u64, buf: &mut [u8]) -> Result<()> {
        let loaded = self.loaded(handle)?;
        if buf.len() != loaded.pending.len() {
            return Err(AnalyzerError::BufferMismatch {
                expected: loaded.pending.len(),
                actual: buf.len(),
            }
            .into());
        }
        buf.copy_from_slice(&loaded.pending);
        loaded.pending.clear();
        Ok(())
    }

    #[instrument(skip(self))]
    fn save_document(&mut self, handle: u64, path: &Path) -> Result<()> {
        let loaded = self.loaded(handle)?;
        loaded
            .document
            .save(path)
            .map_err(|e| AnalyzerError::SaveFailed(format!("{}: {}", path.display(), e)))?;
        info!("Saved handle {} to {}", handle, path.display());
        Ok(())
    }

    fn update_object_value(
        &mut self,
        handle: u64,
        object_number: i32,
        key: &str,
        value: &str,
    ) -> bool {
        let Some(loaded) = self.documents.get_mut(&handle) else {
            return false;
        };
        let Some(id) = lookup_id(&loaded.document, object_number) else {
            return false;
        };
        let key = key.trim_start_matches('/').as_bytes().to_vec();
        match loaded.document.get_object_mut(id) {
            Ok(Object::Dictionary(dict)) => {
                dict.set(key, parse_object_text(value));
            }
            Ok(Object::Stream(stream)) => {
                stream.dict.set(key, parse_object_text(value));
            }
            _ => return false,
        }
        debug!("Updated object {} entry", object_number);
        true
    }

    fn update_object_stream(&mut self, handle: u64, object_number: i32, bytes: &[u8]) -> bool {
        let Some(loaded) = self.documents.get_mut(&handle) else {
            return false;
        };
        let Some(id) = lookup_id(&loaded.document, object_number) else {
            return false;
        };
        match loaded.document.get_object_mut(id) {
            Ok(Object::Stream(stream)) => {
                stream.set_content(bytes.to_vec());
                true
            }
            _ => false,
        }
    }
}
