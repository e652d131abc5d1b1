use std::{fs, path::Path};

use pdftree::{
    content::{export, fetch_stream, preview, PREVIEW_CHAR_CAP},
    SessionManager,
};
use tempfile::tempdir;

use crate::fixtures::{Call, MockAnalyzer};

#[test]
fn test_missing_stream_is_empty() {
    let mut sessions = SessionManager::new(MockAnalyzer::new());
    let session = sessions.open(Path::new("doc.pdf")).unwrap();

    let bytes = fetch_stream(sessions.analyzer_mut(), &session, 7).unwrap();
    assert!(bytes.is_empty());
    assert!(preview(7, &bytes, PREVIEW_CHAR_CAP).is_none());
    assert!(!sessions
        .analyzer()
        .calls
        .iter()
        .any(|c| matches!(c, Call::Fetch(..))));

    let dir = tempdir().unwrap();
    let dest = dir.path().join("doc_obj7.txt");
    assert_eq!(export(&bytes, &dest).unwrap(), None);
    assert!(!dest.exists());
}

#[test]
fn test_large_stream_preview_is_capped() {
    let data = vec![b'x'; 200_000];
    let mut sessions = SessionManager::new(MockAnalyzer::new().with_stream(3, &data));
    let session = sessions.open(Path::new("doc.pdf")).unwrap();

    let bytes = fetch_stream(sessions.analyzer_mut(), &session, 3).unwrap();
    let preview = preview(3, &bytes, PREVIEW_CHAR_CAP).unwrap();

    assert_eq!(preview.text.chars().count(), PREVIEW_CHAR_CAP);
    assert!(preview.truncated);
    assert_eq!(preview.total_bytes, 200_000);
}

#[test]
fn test_export_writes_exact_bytes() {
    let data: Vec<u8> = (0..4096u32).map(|i| (i * 31 % 251) as u8).collect();
    let mut sessions = SessionManager::new(MockAnalyzer::new().with_stream(5, &data));
    let session = sessions.open(Path::new("doc.pdf")).unwrap();
    let dir = tempdir().unwrap();
    let dest = dir.path().join("stream.bin");

    let bytes = fetch_stream(sessions.analyzer_mut(), &session, 5).unwrap();
    assert_eq!(export(&bytes, &dest).unwrap(), Some(4096));
    assert_eq!(fs::read(&dest).unwrap(), data);
}
