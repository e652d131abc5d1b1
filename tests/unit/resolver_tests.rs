use std::path::Path;

use pdftree::{
    Error, PdfAnalyzer, ReferenceResolver, ResolveOutcome, SessionManager, StructuralValue,
    TreeBuilder,
};
use pretty_assertions::assert_eq;

use crate::fixtures::{child_labels, Call, MockAnalyzer};

const PAGE: &str = r#"{"Type":"Page","Contents":{"$Type":"Ref","num":7}}"#;

fn setup(analyzer: MockAnalyzer) -> (SessionManager<MockAnalyzer>, pdftree::DocumentSession) {
    let mut sessions = SessionManager::new(analyzer);
    let session = sessions.open(Path::new("doc.pdf")).unwrap();
    (sessions, session)
}

#[test]
fn test_reference_resolves_to_object_seven() {
    let (mut sessions, session) =
        setup(MockAnalyzer::new().with_object(7, r#"{"Length":12,"Filter":"/FlateDecode"}"#));
    let value = StructuralValue::from_slice(PAGE.as_bytes()).unwrap();
    let mut tree = TreeBuilder::new().build_document(session.handle, &value);
    let contents = tree.find_by_label("Contents").unwrap();

    let outcome = ReferenceResolver::default()
        .resolve(sessions.analyzer_mut(), &session, &mut tree, contents)
        .unwrap();

    assert!(outcome.changed_tree());
    assert_eq!(sessions.analyzer().object_requests(), vec![7]);
    assert_eq!(tree.node(contents).unwrap().label, "Contents (7 0 R)");
    assert_eq!(
        child_labels(&tree, contents),
        vec!["Length : 12", "Filter : /FlateDecode"]
    );
}

#[test]
fn test_resolving_twice_matches_resolving_once() {
    let (mut sessions, session) = setup(
        MockAnalyzer::new().with_object(7, r#"{"Kids":[{"$Type":"Ref","num":9}],"Count":1}"#),
    );
    let value = StructuralValue::from_slice(PAGE.as_bytes()).unwrap();
    let mut once = TreeBuilder::new().build_document(session.handle, &value);
    let contents = once.find_by_label("Contents").unwrap();
    let resolver = ReferenceResolver::default();

    resolver
        .resolve(sessions.analyzer_mut(), &session, &mut once, contents)
        .unwrap();
    let mut twice = once.clone();
    let outcome = resolver
        .resolve(sessions.analyzer_mut(), &session, &mut twice, contents)
        .unwrap();

    assert_eq!(outcome, ResolveOutcome::AlreadyResolved);
    assert_eq!(twice, once);
    assert_eq!(sessions.analyzer().object_requests(), vec![7]);
}

#[test]
fn test_spliced_references_resolve_lazily() {
    let (mut sessions, session) = setup(
        MockAnalyzer::new()
            .with_object(7, r#"{"Kids":[{"$Type":"Ref","num":9}]}"#)
            .with_object(9, r#"{"Type":"/Page"}"#),
    );
    let value = StructuralValue::from_slice(PAGE.as_bytes()).unwrap();
    let mut tree = TreeBuilder::new().build_document(session.handle, &value);
    let contents = tree.find_by_label("Contents").unwrap();
    let resolver = ReferenceResolver::default();
    resolver
        .resolve(sessions.analyzer_mut(), &session, &mut tree, contents)
        .unwrap();

    // Array elements carry no reference metadata; only keyed fragments resolve.
    let kids = tree.find_by_label("Kids").unwrap();
    let element = tree.children(kids)[0];
    assert_eq!(
        resolver
            .resolve(sessions.analyzer_mut(), &session, &mut tree, element)
            .unwrap(),
        ResolveOutcome::NotAReference
    );
    assert!(!tree.node(element).unwrap().candidate);
    assert_eq!(sessions.analyzer().object_requests(), vec![7]);
}

#[test]
fn test_analyzer_failure_leaves_node_unchanged() {
    let (mut sessions, session) = setup(MockAnalyzer::new().with_object(7, "{}"));
    let value = StructuralValue::from_slice(PAGE.as_bytes()).unwrap();
    let mut tree = TreeBuilder::new().build_document(session.handle, &value);
    let contents = tree.find_by_label("Contents").unwrap();
    let before = tree.clone();

    sessions.analyzer_mut().close_document(session.handle.raw());
    let err = ReferenceResolver::default()
        .resolve(sessions.analyzer_mut(), &session, &mut tree, contents)
        .unwrap_err();

    assert!(matches!(err, Error::AnalyzerError(_)));
    assert_eq!(tree, before);
    assert!(tree.node(contents).unwrap().needs_resolution());
}

#[test]
fn test_missing_number_is_unresolvable() {
    let (mut sessions, session) = setup(MockAnalyzer::new());
    let value =
        StructuralValue::from_slice(br#"{"Contents":{"$Type":"Ref","gen":0}}"#).unwrap();
    let mut tree = TreeBuilder::new().build_document(session.handle, &value);
    let contents = tree.find_by_label("Contents").unwrap();

    let err = ReferenceResolver::default()
        .resolve(sessions.analyzer_mut(), &session, &mut tree, contents)
        .unwrap_err();

    assert!(matches!(err, Error::ReferenceUnresolvable(_)));
    assert!(!sessions
        .analyzer()
        .calls
        .iter()
        .any(|c| matches!(c, Call::Object(..))));
    assert!(!tree.node(contents).unwrap().reference.as_ref().unwrap().resolved);
}

#[test]
fn test_number_past_analyzer_range_is_unresolvable() {
    let (mut sessions, session) = setup(MockAnalyzer::new());
    let value =
        StructuralValue::from_slice(br#"{"Contents":{"$Type":"Ref","num":3000000000}}"#).unwrap();
    let mut tree = TreeBuilder::new().build_document(session.handle, &value);
    let contents = tree.find_by_label("Contents").unwrap();
    let before = tree.clone();

    let err = ReferenceResolver::default()
        .resolve(sessions.analyzer_mut(), &session, &mut tree, contents)
        .unwrap_err();

    assert!(matches!(err, Error::ReferenceUnresolvable(_)));
    assert!(sessions.analyzer().object_requests().is_empty());
    assert_eq!(tree, before);
}
