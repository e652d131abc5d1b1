//! Shared test fixtures: a scripted analyzer and generated PDF documents

#![allow(dead_code)]

use std::{
    collections::{BTreeSet, HashMap},
    path::{Path, PathBuf},
};

use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use pdftree::{
    AnalyzerError, DocumentSession, Explorer, ExplorerConfig, ExplorerTree, NodeId, PdfAnalyzer,
    Result,
};

/// Content stream text of the generated sample page
pub const SAMPLE_CONTENT: &[u8] = b"BT\n/F1 24 Tf\n100 600 Td\n(Hello) Tj\nET\n";

/// Object numbers in the generated sample document
pub const SAMPLE_FONT: u32 = 2;
pub const SAMPLE_RESOURCES: u32 = 3;
pub const SAMPLE_CONTENTS: u32 = 4;
pub const SAMPLE_PAGE: u32 = 5;

/// A call observed by [`MockAnalyzer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(PathBuf),
    Close(u64),
    Whole(u64),
    Pages(u64),
    Object(u64, i32),
    Stream(u64, i32),
    Fetch(u64, usize),
    Save(u64, PathBuf),
    UpdateValue(u64, i32, String, String),
    UpdateStream(u64, i32, usize),
}

/// Analyzer serving canned descriptions and recording every call
#[derive(Debug, Default)]
pub struct MockAnalyzer {
    pub whole: Vec<u8>,
    pub pages: Vec<u8>,
    pub objects: HashMap<i32, Vec<u8>>,
    pub streams: HashMap<i32, Vec<u8>>,
    pub refuse_open: bool,
    pub calls: Vec<Call>,
    open: BTreeSet<u64>,
    last_handle: u64,
    pending: Vec<u8>,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(mut self, json: &str) -> Self {
        self.pages = json.as_bytes().to_vec();
        self
    }

    pub fn with_whole(mut self, json: &str) -> Self {
        self.whole = json.as_bytes().to_vec();
        self
    }

    pub fn with_object(mut self, number: i32, json: &str) -> Self {
        self.objects.insert(number, json.as_bytes().to_vec());
        self
    }

    pub fn with_stream(mut self, number: i32, bytes: &[u8]) -> Self {
        self.streams.insert(number, bytes.to_vec());
        self
    }

    pub fn refusing_open(mut self) -> Self {
        self.refuse_open = true;
        self
    }

    /// Handles opened and not yet closed.
    pub fn open_handles(&self) -> Vec<u64> {
        self.open.iter().copied().collect()
    }

    pub fn object_requests(&self) -> Vec<i32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Object(_, n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    fn stage(&mut self, handle: u64, bytes: Vec<u8>) -> Result<u64> {
        if !self.open.contains(&handle) {
            return Err(AnalyzerError::UnknownHandle(handle).into());
        }
        self.pending = bytes;
        Ok(self.pending.len() as u64)
    }
}

impl PdfAnalyzer for MockAnalyzer {
    fn open_document(&mut self, path: &Path) -> Result<u64> {
        self.calls.push(Call::Open(path.to_path_buf()));
        if self.refuse_open {
            return Ok(0);
        }
        self.last_handle += 1;
        self.open.insert(self.last_handle);
        Ok(self.last_handle)
    }

    fn close_document(&mut self, handle: u64) {
        self.calls.push(Call::Close(handle));
        self.open.remove(&handle);
    }

    fn analyze_whole(&mut self, handle: u64) -> Result<u64> {
        self.calls.push(Call::Whole(handle));
        self.stage(handle, self.whole.clone())
    }

    fn analyze_pages(&mut self, handle: u64) -> Result<u64> {
        self.calls.push(Call::Pages(handle));
        self.stage(handle, self.pages.clone())
    }

    fn analyze_object(&mut self, handle: u64, object_number: i32) -> Result<u64> {
        self.calls.push(Call::Object(handle, object_number));
        let bytes = self.objects.get(&object_number).cloned().unwrap_or_default();
        self.stage(handle, bytes)
    }

    fn analyze_object_stream(&mut self, handle: u64, object_number: i32) -> Result<u64> {
        self.calls.push(Call::Stream(handle, object_number));
        let bytes = self.streams.get(&object_number).cloned().unwrap_or_default();
        self.stage(handle, bytes)
    }

    fn fetch(&mut self, handle: u64, buf: &mut [u8]) -> Result<()> {
        self.calls.push(Call::Fetch(handle, buf.len()));
        if buf.len() != self.pending.len() {
            return Err(AnalyzerError::BufferMismatch {
                expected: self.pending.len(),
                actual: buf.len(),
            }
            .into());
        }
        buf.copy_from_slice(&self.pending);
        Ok(())
    }

    fn save_document(&mut self, handle: u64, path: &Path) -> Result<()> {
        self.calls.push(Call::Save(handle, path.to_path_buf()));
        Ok(())
    }

    fn update_object_value(
        &mut self,
        handle: u64,
        object_number: i32,
        key: &str,
        value: &str,
    ) -> bool {
        self.calls.push(Call::UpdateValue(
            handle,
            object_number,
            key.to_string(),
            value.to_string(),
        ));
        self.open.contains(&handle)
    }

    fn update_object_stream(&mut self, handle: u64, object_number: i32, bytes: &[u8]) -> bool {
        self.calls.push(Call::UpdateStream(handle, object_number, bytes.len()));
        self.open.contains(&handle) && self.streams.contains_key(&object_number)
    }
}

/// Explorer over `analyzer` with default settings.
pub fn mock_explorer(analyzer: MockAnalyzer) -> Explorer<MockAnalyzer> {
    Explorer::new(analyzer, ExplorerConfig::default())
}

pub fn open(explorer: &mut Explorer<MockAnalyzer>, name: &str) -> DocumentSession {
    explorer.open_session(Path::new(name)).unwrap()
}

/// Labels of `id`'s children, in order.
pub fn child_labels(tree: &ExplorerTree, id: NodeId) -> Vec<String> {
    tree.children(id)
        .iter()
        .map(|c| tree.node(*c).unwrap().label.clone())
        .collect()
}

/// Labels of every reachable node, depth-first.
pub fn all_labels(tree: &ExplorerTree) -> Vec<String> {
    tree.walk()
        .map(|(id, _)| tree.node(id).unwrap().label.clone())
        .collect()
}

/// One-page document: font 2, resources 3, content stream 4, page 5,
/// pages 1, catalog 6.
pub fn sample_document() -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content_id = doc.add_object(Stream::new(dictionary! {}, SAMPLE_CONTENT.to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::from(page_id)],
            "Count" => 1i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Writes [`sample_document`] to `dir/name`.
pub fn write_sample_pdf(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut doc = sample_document();
    doc.save(&path).unwrap();
    path
}
