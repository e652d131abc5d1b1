//! Stream content retrieval for preview and export

pub mod stream_retriever;

pub use stream_retriever::{
    default_export_name, export, fetch_stream, preview, StreamPreview, PREVIEW_CHAR_CAP,
};
